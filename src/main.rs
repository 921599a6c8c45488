//! Garden - a password-gated personal gallery
//!
//! Serves the gallery API over HTTP and offers a few local commands for
//! listing, viewing and adding items against the configured row store.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use garden::{
    api::build_app,
    auth::{AuthState, PasswordGate},
    config::GardenConfig,
    gallery::{GallerySession, GalleryState},
    model::{ItemKind, ItemMetadata},
    query::GalleryQueries,
    store,
    validate::ItemDraft,
    view::{ViewMode, ViewState},
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "garden")]
#[command(version)]
#[command(about = "Password-gated personal gallery of images, notes, links and PDFs")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "GARDEN_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// List gallery items
    Items {
        /// Only items filed under this collection id
        #[arg(long)]
        collection: Option<String>,
    },

    /// Print the flat or grouped view as JSON
    View {
        /// Group items by collection
        #[arg(long)]
        grouped: bool,

        /// Narrow to one collection id
        #[arg(long)]
        collection: Option<String>,
    },

    /// Add an item
    Add {
        /// Item type: image, text, link or pdf
        #[arg(short = 't', long = "type")]
        kind: ItemKind,

        /// Text, or a URL for image/link/pdf
        #[arg(short, long)]
        content: String,

        /// Optional title
        #[arg(long)]
        title: Option<String>,

        /// Collection id to file the item under
        #[arg(long)]
        collection: Option<String>,

        /// Optional description
        #[arg(long)]
        description: Option<String>,
    },

    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("garden={},tower_http=debug", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    let config = match &cli.config {
        Some(path) => GardenConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => GardenConfig::default(),
    };

    match cli.command {
        Commands::Serve { host, port } => {
            run_server(config, host, port).await?;
        }
        Commands::Items { collection } => {
            list_items(&config, collection.as_deref()).await?;
        }
        Commands::View {
            grouped,
            collection,
        } => {
            let mode = if grouped { ViewMode::Grouped } else { ViewMode::Flat };
            show_view(&config, ViewState::new(mode, collection)).await?;
        }
        Commands::Add {
            kind,
            content,
            title,
            collection,
            description,
        } => {
            let draft = ItemDraft {
                kind,
                title,
                content,
                collection_id: collection,
                metadata: description.map(|description| ItemMetadata {
                    description: Some(description),
                    ..ItemMetadata::default()
                }),
            };
            add_item(&config, draft).await?;
        }
        Commands::Config { default } => {
            show_config(if default { None } else { Some(&config) })?;
        }
    }

    Ok(())
}

async fn open_queries(config: &GardenConfig) -> Result<GalleryQueries> {
    let store = store::connect(&config.store).await?;
    Ok(GalleryQueries::new(store))
}

async fn run_server(config: GardenConfig, host: Option<String>, port: Option<u16>) -> Result<()> {
    tracing::info!("Starting Garden");

    let session = Arc::new(GallerySession::new(open_queries(&config).await?));
    session.load().await?;
    let gate = Arc::new(PasswordGate::from_env(&config.auth)?);

    let app = build_app(
        GalleryState { session },
        AuthState { gate },
        &config.server.cors_origins,
    );

    let host = host.unwrap_or(config.server.host);
    let port = port.unwrap_or(config.server.port);
    let listener = tokio::net::TcpListener::bind((host.as_str(), port))
        .await
        .with_context(|| format!("binding {}:{}", host, port))?;

    tracing::info!("Garden is listening on http://{}:{}. Press Ctrl+C to stop.", host, port);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Shutting down...");
        })
        .await?;

    Ok(())
}

async fn list_items(config: &GardenConfig, collection: Option<&str>) -> Result<()> {
    let queries = open_queries(config).await?;
    let items = match collection {
        Some(collection_id) => queries.fetch_items_by_collection(collection_id).await?,
        None => queries.fetch_items().await?,
    };

    for item in &items {
        let title = item.title.as_deref().unwrap_or("-");
        println!("{}  {:<5}  {}  {}", item.id, item.kind, title, item.content);
    }
    if items.is_empty() {
        println!("No items yet");
    }
    Ok(())
}

async fn show_view(config: &GardenConfig, state: ViewState) -> Result<()> {
    let session = GallerySession::new(open_queries(config).await?);
    session.load().await?;
    let json = session.view(&state).await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

async fn add_item(config: &GardenConfig, draft: ItemDraft) -> Result<()> {
    let session = GallerySession::new(open_queries(config).await?);
    let item = session.add_item(draft).await?;
    println!("{}", serde_json::to_string_pretty(item.as_ref())?);
    Ok(())
}

fn show_config(config: Option<&GardenConfig>) -> Result<()> {
    let config = config.cloned().unwrap_or_default();
    println!("{}", config.to_toml()?);
    Ok(())
}
