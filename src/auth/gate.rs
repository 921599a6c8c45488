//! Password gate and signed session tokens
//!
//! The submitted password is compared against the configured one through
//! `ring::hmac::verify`, so the comparison time does not depend on where
//! the two differ. A successful check yields a session token of the form
//! `base64url(issued_at) "." base64url(HMAC-SHA256(key, issued_at))`.

use crate::config::AuthConfig;
use crate::error::{Error, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ring::hmac;
use thiserror::Error;

/// Tolerated clock skew for tokens issued "in the future" (seconds)
const MAX_CLOCK_SKEW_SECS: i64 = 60;

/// Gate failures
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateError {
    /// No site password is configured
    #[error("Server configuration error")]
    NotConfigured,

    /// Submitted password does not match
    #[error("Invalid password")]
    InvalidPassword,

    /// Session token is malformed, tampered with or expired
    #[error("Invalid or expired session")]
    InvalidSession,
}

/// Checks the site password and issues/verifies session tokens
pub struct PasswordGate {
    /// HMAC of the configured password under `key`
    password_tag: Option<hmac::Tag>,
    key: hmac::Key,
    cookie_name: String,
    max_age_secs: i64,
    secure_cookie: bool,
}

impl std::fmt::Debug for PasswordGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordGate")
            .field("configured", &self.is_configured())
            .field("cookie_name", &self.cookie_name)
            .field("max_age_secs", &self.max_age_secs)
            .field("secure_cookie", &self.secure_cookie)
            .finish()
    }
}

impl PasswordGate {
    /// Build a gate from an explicit password and signing key
    pub fn new(password: Option<&str>, signing_key: &[u8], config: &AuthConfig) -> Self {
        let key = hmac::Key::new(hmac::HMAC_SHA256, signing_key);
        Self::with_key(password, key, config)
    }

    /// Build a gate from the environment variables named in `config`.
    ///
    /// An unset or empty password leaves the gate unconfigured. An unset
    /// signing key is replaced by a random per-process key, which
    /// invalidates sessions on restart.
    pub fn from_env(config: &AuthConfig) -> Result<Self> {
        let password = non_empty_env(&config.password_env);
        if password.is_none() {
            tracing::warn!(
                "{} is not set; every login will fail",
                config.password_env
            );
        }

        let key = match non_empty_env(&config.signing_key_env) {
            Some(secret) => hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes()),
            None => {
                tracing::debug!(
                    "{} is not set; using a per-process session key",
                    config.signing_key_env
                );
                let rng = ring::rand::SystemRandom::new();
                hmac::Key::generate(hmac::HMAC_SHA256, &rng)
                    .map_err(|_| Error::Internal("failed to generate session key".to_string()))?
            }
        };

        Ok(Self::with_key(password.as_deref(), key, config))
    }

    fn with_key(password: Option<&str>, key: hmac::Key, config: &AuthConfig) -> Self {
        let password_tag = password
            .filter(|p| !p.is_empty())
            .map(|p| hmac::sign(&key, p.as_bytes()));
        Self {
            password_tag,
            key,
            cookie_name: config.cookie_name.clone(),
            max_age_secs: config.max_age_secs(),
            secure_cookie: config.secure_cookie,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.password_tag.is_some()
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn max_age_secs(&self) -> i64 {
        self.max_age_secs
    }

    /// Compare a submitted password against the configured one
    pub fn check(&self, submitted: &str) -> std::result::Result<(), GateError> {
        let expected = self.password_tag.as_ref().ok_or(GateError::NotConfigured)?;
        hmac::verify(&self.key, submitted.as_bytes(), expected.as_ref())
            .map_err(|_| GateError::InvalidPassword)
    }

    /// Issue a token stamped with `issued_at` (unix seconds)
    pub fn issue(&self, issued_at: i64) -> String {
        let payload = issued_at.to_string();
        let signature = hmac::sign(&self.key, payload.as_bytes());
        format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(payload.as_bytes()),
            URL_SAFE_NO_PAD.encode(signature.as_ref())
        )
    }

    /// Verify a token at time `now`; returns its issue time
    pub fn verify(&self, token: &str, now: i64) -> std::result::Result<i64, GateError> {
        let (payload, signature) = token.split_once('.').ok_or(GateError::InvalidSession)?;
        let payload = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| GateError::InvalidSession)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| GateError::InvalidSession)?;

        hmac::verify(&self.key, &payload, &signature).map_err(|_| GateError::InvalidSession)?;

        let issued_at: i64 = std::str::from_utf8(&payload)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or(GateError::InvalidSession)?;

        let age = now - issued_at;
        if age > self.max_age_secs || age < -MAX_CLOCK_SKEW_SECS {
            return Err(GateError::InvalidSession);
        }
        Ok(issued_at)
    }

    /// `Set-Cookie` value carrying `token`
    pub fn session_cookie(&self, token: &str) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            self.cookie_name, token, self.max_age_secs
        );
        if self.secure_cookie {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    fn make_gate(password: Option<&str>) -> PasswordGate {
        PasswordGate::new(password, b"test-signing-key", &AuthConfig::default())
    }

    #[test]
    fn test_check_password() {
        let gate = make_gate(Some("open sesame"));
        assert!(gate.is_configured());
        assert_eq!(gate.check("open sesame"), Ok(()));
        assert_eq!(gate.check("open sesame "), Err(GateError::InvalidPassword));
        assert_eq!(gate.check(""), Err(GateError::InvalidPassword));
    }

    #[test]
    fn test_unconfigured_gate() {
        for gate in [make_gate(None), make_gate(Some(""))] {
            assert!(!gate.is_configured());
            assert_eq!(gate.check("anything"), Err(GateError::NotConfigured));
        }
    }

    #[test]
    fn test_token_round_trip() {
        let gate = make_gate(Some("pw"));
        let token = gate.issue(NOW);
        assert_eq!(gate.verify(&token, NOW + 10), Ok(NOW));
    }

    #[test]
    fn test_expired_token_rejected() {
        let gate = make_gate(Some("pw"));
        let token = gate.issue(NOW);
        let max_age = gate.max_age_secs();
        assert!(gate.verify(&token, NOW + max_age).is_ok());
        assert_eq!(
            gate.verify(&token, NOW + max_age + 1),
            Err(GateError::InvalidSession)
        );
        assert_eq!(
            gate.verify(&token, NOW - MAX_CLOCK_SKEW_SECS - 1),
            Err(GateError::InvalidSession)
        );
    }

    #[test]
    fn test_tampered_token_rejected() {
        let gate = make_gate(Some("pw"));
        let token = gate.issue(NOW);
        let (_, signature) = token.split_once('.').unwrap();
        let forged = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode((NOW + 1000).to_string()),
            signature
        );
        assert_eq!(gate.verify(&forged, NOW), Err(GateError::InvalidSession));

        for garbage in ["", "no-dot", "a.b", "!!!.???"] {
            assert_eq!(gate.verify(garbage, NOW), Err(GateError::InvalidSession));
        }
    }

    #[test]
    fn test_token_from_other_key_rejected() {
        let gate = make_gate(Some("pw"));
        let other = PasswordGate::new(Some("pw"), b"another-key", &AuthConfig::default());
        let token = other.issue(NOW);
        assert_eq!(gate.verify(&token, NOW), Err(GateError::InvalidSession));
    }

    #[test]
    fn test_session_cookie_attributes() {
        let gate = make_gate(Some("pw"));
        let cookie = gate.session_cookie("abc.def");
        assert!(cookie.starts_with("site-auth=abc.def;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains(&format!("Max-Age={}", 30 * 24 * 60 * 60)));
        assert!(!cookie.contains("Secure"));

        let config = AuthConfig {
            secure_cookie: true,
            ..AuthConfig::default()
        };
        let secure = PasswordGate::new(Some("pw"), b"k", &config);
        assert!(secure.session_cookie("t").ends_with("; Secure"));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let gate = make_gate(Some("hunter2"));
        let rendered = format!("{:?}", gate);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("configured: true"));
    }

    #[test]
    fn test_from_env_reads_named_variables() {
        let config = AuthConfig {
            password_env: "GARDEN_TEST_GATE_PASSWORD".to_string(),
            signing_key_env: "GARDEN_TEST_GATE_KEY".to_string(),
            ..AuthConfig::default()
        };
        std::env::set_var("GARDEN_TEST_GATE_PASSWORD", "from-env");
        std::env::remove_var("GARDEN_TEST_GATE_KEY");

        let gate = PasswordGate::from_env(&config).unwrap();
        assert_eq!(gate.check("from-env"), Ok(()));
        let token = gate.issue(NOW);
        assert!(gate.verify(&token, NOW).is_ok());

        std::env::remove_var("GARDEN_TEST_GATE_PASSWORD");
    }
}
