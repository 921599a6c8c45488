//! PostgREST (Supabase) row store client
//!
//! Talks to `<url>/rest/v1/<table>` with the project's API key. Filters
//! map to `column=eq.value`, ordering to `order=column.asc|desc`, and
//! inserts ask for the stored row back with `Prefer: return=representation`.

use super::{RowQuery, RowStore, StoreError, StoreResult, Table};
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

/// Error code PostgREST uses when a single-object request matched no rows
const NO_ROWS_CODE: &str = "PGRST116";

/// HTTP client for a PostgREST endpoint
pub struct PostgrestStore {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
}

/// Error body returned by PostgREST
#[derive(Debug, Deserialize)]
struct PostgrestErrorBody {
    code: Option<String>,
    message: Option<String>,
}

impl PostgrestStore {
    /// Create a client for the project at `base_url`
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self> {
        let mut url = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("invalid store url {}: {}", base_url, e)))?;
        if url.cannot_be_a_base() {
            return Err(Error::Config(format!("invalid store url {}", base_url)));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(Self {
            client: reqwest::Client::new(),
            base_url: url,
            api_key: api_key.into(),
        })
    }

    /// Endpoint for a table with the query encoded as PostgREST parameters
    pub fn table_url(&self, table: Table, query: &RowQuery) -> StoreResult<Url> {
        let mut url = self
            .base_url
            .join(&format!("rest/v1/{}", table.name()))
            .map_err(|e| StoreError::Malformed(e.to_string()))?;

        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("select", "*");
            for (column, value) in &query.filters {
                pairs.append_pair(column, &format!("eq.{}", value));
            }
            if let Some(order) = &query.order {
                let direction = if order.ascending { "asc" } else { "desc" };
                pairs.append_pair("order", &format!("{}.{}", order.column, direction));
            }
        }

        Ok(url)
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }
}

/// Translate an error response into a [`StoreError`]
fn error_from_body(status: StatusCode, body: &str) -> StoreError {
    match serde_json::from_str::<PostgrestErrorBody>(body) {
        Ok(PostgrestErrorBody { code: Some(code), .. }) if code == NO_ROWS_CODE => {
            StoreError::NoRows
        }
        Ok(PostgrestErrorBody { code, message }) => StoreError::Rejected {
            code: code.unwrap_or_else(|| status.as_u16().to_string()),
            message: message.unwrap_or_else(|| status.to_string()),
        },
        Err(_) => StoreError::Rejected {
            code: status.as_u16().to_string(),
            message: if body.is_empty() {
                status.to_string()
            } else {
                body.to_string()
            },
        },
    }
}

async fn read_rows(response: reqwest::Response) -> StoreResult<Vec<Value>> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(error_from_body(status, &body));
    }
    response
        .json::<Vec<Value>>()
        .await
        .map_err(|e| StoreError::Malformed(e.to_string()))
}

#[async_trait]
impl RowStore for PostgrestStore {
    fn backend_name(&self) -> &str {
        "postgrest"
    }

    async fn select(&self, table: Table, query: &RowQuery) -> StoreResult<Vec<Value>> {
        let url = self.table_url(table, query)?;
        tracing::debug!(%url, "PostgREST select");

        let response = self
            .request(reqwest::Method::GET, url)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        read_rows(response).await
    }

    async fn insert(&self, table: Table, row: Value) -> StoreResult<Value> {
        let url = self.table_url(table, &RowQuery::new())?;
        tracing::debug!(%url, "PostgREST insert");

        let response = self
            .request(reqwest::Method::POST, url)
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        read_rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Malformed("insert returned no row".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_store() -> PostgrestStore {
        PostgrestStore::new("https://project.supabase.co", "anon-key").unwrap()
    }

    #[test]
    fn test_table_url_plain() {
        let url = make_store()
            .table_url(Table::Collections, &RowQuery::new())
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://project.supabase.co/rest/v1/collections?select=*"
        );
    }

    #[test]
    fn test_table_url_filter_and_order() {
        let query = RowQuery::new()
            .eq("collection_id", "c1")
            .order_by("created_at", true);
        let url = make_store()
            .table_url(Table::GalleryItems, &query)
            .unwrap();

        assert_eq!(url.path(), "/rest/v1/gallery_items");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("collection_id".to_string(), "eq.c1".to_string())));
        assert!(pairs.contains(&("order".to_string(), "created_at.asc".to_string())));
    }

    #[test]
    fn test_base_url_with_path_prefix() {
        let store = PostgrestStore::new("http://localhost:3000/proxy", "k").unwrap();
        let url = store.table_url(Table::Collections, &RowQuery::new()).unwrap();
        assert_eq!(url.path(), "/proxy/rest/v1/collections");
    }

    #[test]
    fn test_new_rejects_invalid_url() {
        assert!(PostgrestStore::new("not a url", "k").is_err());
        assert!(PostgrestStore::new("mailto:someone@example.com", "k").is_err());
    }

    #[test]
    fn test_error_from_body() {
        let err = error_from_body(
            StatusCode::NOT_ACCEPTABLE,
            r#"{"code":"PGRST116","message":"JSON object requested, multiple (or no) rows returned"}"#,
        );
        assert_eq!(err, StoreError::NoRows);

        let err = error_from_body(
            StatusCode::CONFLICT,
            r#"{"code":"23505","message":"duplicate key value"}"#,
        );
        assert_eq!(
            err,
            StoreError::Rejected {
                code: "23505".to_string(),
                message: "duplicate key value".to_string()
            }
        );

        let err = error_from_body(StatusCode::BAD_GATEWAY, "");
        assert!(matches!(err, StoreError::Rejected { ref code, .. } if code == "502"));
    }
}
