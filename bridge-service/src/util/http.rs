//! Outbound HTTP helpers shared by the Dynamic Content and Algolia clients.

use std::time::Duration;

use reqwest::Client;
use url::Url;

/// User agent sent on every outbound request.
pub const USER_AGENT: &str = concat!("dc-algolia-bridge/", env!("CARGO_PKG_VERSION"));

/// Build an HTTP client with the service user agent and a request timeout.
pub fn build_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
}

/// Append path segments to a base URL, percent-encoding each segment.
///
/// Unlike `Url::join`, this keeps any path already present on the base
/// (`https://api.example.com/v2/content` + `hubs` → `.../v2/content/hubs`).
pub fn endpoint(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_keeps_base_path() {
        let base = Url::parse("https://api.amplience.net/v2/content").unwrap();
        let url = endpoint(&base, &["content-items", "abc"]);
        assert_eq!(url.as_str(), "https://api.amplience.net/v2/content/content-items/abc");
    }

    #[test]
    fn test_endpoint_trailing_slash() {
        let base = Url::parse("https://auth.amplience.net/").unwrap();
        let url = endpoint(&base, &["oauth", "token"]);
        assert_eq!(url.as_str(), "https://auth.amplience.net/oauth/token");
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let base = Url::parse("https://appid.algolia.net").unwrap();
        let url = endpoint(&base, &["1", "indexes", "my index", "a/b"]);
        assert_eq!(url.as_str(), "https://appid.algolia.net/1/indexes/my%20index/a%2Fb");
    }

    #[test]
    fn test_build_client() {
        assert!(build_client(Duration::from_secs(1)).is_ok());
    }

    #[test]
    fn test_user_agent() {
        assert!(USER_AGENT.starts_with("dc-algolia-bridge/"));
    }
}
