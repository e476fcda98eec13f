//! Configuration module for environment variable parsing.
//!
//! All configuration is read once at startup. `Config::from_vars` works on a
//! plain map so the validation rules can be exercised without touching the
//! process environment.

use std::collections::{BTreeSet, HashMap};
use std::env;
use std::fmt;
use std::time::Duration;

use tracing::warn;
use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DC_AUTH_URL: &str = "https://auth.amplience.net";
pub const DEFAULT_DC_API_URL: &str = "https://api.amplience.net/v2/content";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 8000;

/// Application configuration loaded from environment variables.
///
/// `DC_AUTH_URL` and `DC_API_URL` are optional and default to the public
/// Amplience endpoints.
#[derive(Clone)]
pub struct Config {
    /// Shared secret used to sign inbound webhooks
    pub webhook_secret: String,

    pub algolia_api_key: String,
    pub algolia_application_id: String,
    pub algolia_index_name: String,
    /// Base URL of the Algolia REST API (derived from the application id by default)
    pub algolia_api_url: Url,

    pub dc_client_id: String,
    pub dc_client_secret: String,
    pub dc_auth_url: Url,
    pub dc_api_url: Url,

    /// Port for the web server to listen on
    pub port: u16,

    /// Timeout applied to every outbound HTTP request
    pub request_timeout: Duration,

    /// Content type schemas that are indexed. Empty means all.
    pub content_type_whitelist: BTreeSet<String>,

    /// Top-level body properties copied into the index. Empty means all.
    pub content_type_property_whitelist: BTreeSet<String>,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let vars: HashMap<String, String> = env::vars().collect();
        Self::from_vars(&vars)
    }

    /// Validate and build configuration from a map of variables.
    ///
    /// Every problem is collected before returning, so a single run reports
    /// all missing or malformed keys. Unknown keys are ignored.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let mut errors = Vec::new();

        let webhook_secret = required(vars, "WEBHOOK_SECRET", &mut errors);
        let algolia_api_key = required(vars, "ALGOLIA_API_KEY", &mut errors);
        let algolia_application_id = required(vars, "ALGOLIA_APPLICATION_ID", &mut errors);
        let algolia_index_name = required(vars, "ALGOLIA_INDEX_NAME", &mut errors);
        let dc_client_id = required(vars, "DC_CLIENT_ID", &mut errors);
        let dc_client_secret = required(vars, "DC_CLIENT_SECRET", &mut errors);

        let dc_auth_url = url_or(vars, "DC_AUTH_URL", DEFAULT_DC_AUTH_URL, &mut errors);
        let dc_api_url = url_or(vars, "DC_API_URL", DEFAULT_DC_API_URL, &mut errors);
        let algolia_api_url = if algolia_application_id.is_empty()
            && vars.get("ALGOLIA_API_URL").map_or(true, |v| v.is_empty())
        {
            // Already reported as a missing application id.
            None
        } else {
            let default = format!("https://{}.algolia.net", algolia_application_id);
            url_or(vars, "ALGOLIA_API_URL", &default, &mut errors)
        };

        let content_type_whitelist = whitelist(vars, "CONTENT_TYPE_WHITELIST", &mut errors);
        let content_type_property_whitelist =
            whitelist(vars, "CONTENT_TYPE_PROPERTY_WHITELIST", &mut errors);

        let port = vars
            .get("PORT")
            .and_then(|v| v.parse::<u16>().ok())
            .filter(|p| *p != 0)
            .unwrap_or(DEFAULT_PORT);

        let request_timeout_ms = match vars.get("REQUEST_TIMEOUT_MS") {
            None => DEFAULT_REQUEST_TIMEOUT_MS,
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(env_var = "REQUEST_TIMEOUT_MS", value = %raw, "Invalid timeout, using default");
                DEFAULT_REQUEST_TIMEOUT_MS
            }),
        };

        if !errors.is_empty() {
            return Err(ConfigError { messages: errors });
        }

        match (dc_auth_url, dc_api_url, algolia_api_url) {
            (Some(dc_auth_url), Some(dc_api_url), Some(algolia_api_url)) => Ok(Config {
                webhook_secret,
                algolia_api_key,
                algolia_application_id,
                algolia_index_name,
                algolia_api_url,
                dc_client_id,
                dc_client_secret,
                dc_auth_url,
                dc_api_url,
                port,
                request_timeout: Duration::from_millis(request_timeout_ms),
                content_type_whitelist,
                content_type_property_whitelist,
            }),
            _ => Err(ConfigError {
                messages: vec!["invalid URL configuration".to_string()],
            }),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("webhook_secret", &"<REDACTED>")
            .field("algolia_api_key", &"<REDACTED>")
            .field("algolia_application_id", &self.algolia_application_id)
            .field("algolia_index_name", &self.algolia_index_name)
            .field("algolia_api_url", &self.algolia_api_url.as_str())
            .field("dc_client_id", &self.dc_client_id)
            .field("dc_client_secret", &"<REDACTED>")
            .field("dc_auth_url", &self.dc_auth_url.as_str())
            .field("dc_api_url", &self.dc_api_url.as_str())
            .field("port", &self.port)
            .field("request_timeout", &self.request_timeout)
            .field("content_type_whitelist", &self.content_type_whitelist)
            .field(
                "content_type_property_whitelist",
                &self.content_type_property_whitelist,
            )
            .finish()
    }
}

/// Read a required, non-empty string.
fn required(vars: &HashMap<String, String>, name: &str, errors: &mut Vec<String>) -> String {
    match vars.get(name) {
        None => {
            errors.push(format!("\"{}\" is required", name));
            String::new()
        }
        Some(v) if v.is_empty() => {
            errors.push(format!("\"{}\" is not allowed to be empty", name));
            String::new()
        }
        Some(v) => v.clone(),
    }
}

/// Parse an http(s) URL, falling back to `default` when the key is unset or empty.
fn url_or(
    vars: &HashMap<String, String>,
    name: &str,
    default: &str,
    errors: &mut Vec<String>,
) -> Option<Url> {
    let raw = vars
        .get(name)
        .map(String::as_str)
        .filter(|v| !v.is_empty())
        .unwrap_or(default);

    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Some(url),
        Ok(_) => {
            errors.push(format!("\"{}\" must be an http or https URL", name));
            None
        }
        Err(e) => {
            errors.push(format!("\"{}\" must be a valid URL: {}", name, e));
            None
        }
    }
}

/// Parse a semicolon-delimited list into a set, rejecting repeated entries.
///
/// An empty value is an empty list. Otherwise every segment counts, so
/// `a;;b;;` repeats the empty entry and is rejected.
fn whitelist(
    vars: &HashMap<String, String>,
    name: &str,
    errors: &mut Vec<String>,
) -> BTreeSet<String> {
    let mut set = BTreeSet::new();
    let Some(raw) = vars.get(name) else {
        return set;
    };

    if raw.is_empty() {
        return set;
    }

    let mut duplicates = BTreeSet::new();
    for entry in raw.split(';') {
        if !set.insert(entry.to_string()) && duplicates.insert(entry) {
            errors.push(format!("\"{}\" contains a duplicate value \"{}\"", name, entry));
        }
    }
    set
}
