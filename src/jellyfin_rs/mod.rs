use reqwest::{RequestBuilder, StatusCode};
use url::Url;

pub mod items;
pub mod played;
pub mod search;

pub use items::{ItemsResponse, MediaItem, get_items_page};
pub use played::mark_played;
pub use search::search_items;

/// Errors raised while talking to a Jellyfin/Emby compatible server.
///
/// `Transport` means no response was obtained at all. `Status` and `Decode`
/// mean a response came back but could not be used.
#[derive(Debug, thiserror::Error)]
pub enum MediaServerError {
    #[error("Failed to send http request: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("Server responded with {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("Failed to parse response: {0}")]
    Decode(#[source] serde_json::Error),
}

impl MediaServerError {
    pub fn is_transport(&self) -> bool {
        matches!(self, MediaServerError::Transport(_))
    }

    /// Short label for log lines.
    pub fn kind(&self) -> &'static str {
        if self.is_transport() {
            "transport"
        } else {
            "protocol"
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EndpointError {
    #[error("Server host is empty")]
    EmptyHost,
    #[error("Invalid server host '{host}': {reason}")]
    InvalidHost { host: String, reason: String },
}

/// One configured media server: where it lives, which user to act as and the
/// static API token used to authenticate.
///
/// The host is normalized on construction: a missing scheme becomes
/// `https://` and trailing slashes are removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEndpoint {
    host: String,
    base_url: Url,
    user_id: String,
    token: String,
}

impl ServerEndpoint {
    pub fn new(
        host: &str,
        user_id: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, EndpointError> {
        let host = normalize_host(host)?;
        let base_url = Url::parse(&host).map_err(|e| EndpointError::InvalidHost {
            host: host.clone(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(EndpointError::InvalidHost {
                host,
                reason: "url cannot be used as a base".to_string(),
            });
        }

        Ok(Self {
            host,
            base_url,
            user_id: user_id.into(),
            token: token.into(),
        })
    }

    /// Normalized host, always with a scheme and never with a trailing slash.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Build `{host}/{segments...}`, percent-encoding every segment and
    /// keeping any path prefix the host carries (e.g. `https://x/jellyfin`).
    pub(crate) fn url_for(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

/// Ensure the host has an explicit scheme and no trailing slash.
pub fn normalize_host(host: &str) -> Result<String, EndpointError> {
    let trimmed = host.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(EndpointError::EmptyHost);
    }

    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("https://{}", trimmed))
    }
}

/// Value of the `Authorization` header expected by the server.
pub fn authorization_header(token: &str) -> String {
    format!("MediaBrowser Token=\"{}\"", token)
}

fn authorized(request: RequestBuilder, endpoint: &ServerEndpoint) -> RequestBuilder {
    request
        .header("Accept", "application/json")
        .header("Authorization", authorization_header(endpoint.token()))
}

/// Send an authenticated request and read the whole body.
///
/// The body is always drained, on success and on a non-2xx status alike, so
/// the pooled connection can be reused.
async fn send(
    endpoint: &ServerEndpoint,
    request: RequestBuilder,
) -> Result<String, MediaServerError> {
    let response = authorized(request, endpoint)
        .send()
        .await
        .map_err(MediaServerError::Transport)?;

    let status = response.status();
    let body = response.text().await.map_err(MediaServerError::Transport)?;
    log::trace!("{} responded {} ({} bytes)", endpoint.host(), status, body.len());

    if !status.is_success() {
        return Err(MediaServerError::Status { status, body });
    }

    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_host_adds_https() {
        assert_eq!(
            normalize_host("jellyfin.example.net").unwrap(),
            "https://jellyfin.example.net"
        );
    }

    #[test]
    fn test_normalize_host_keeps_scheme_and_trims_slashes() {
        assert_eq!(
            normalize_host("http://10.0.0.5:8096//").unwrap(),
            "http://10.0.0.5:8096"
        );
        assert_eq!(
            normalize_host("https://media.example.net/").unwrap(),
            "https://media.example.net"
        );
    }

    #[test]
    fn test_normalize_host_rejects_empty() {
        assert_eq!(normalize_host(""), Err(EndpointError::EmptyHost));
        assert_eq!(normalize_host("  / "), Err(EndpointError::EmptyHost));
    }

    #[test]
    fn test_endpoint_host_has_scheme() {
        let endpoint = ServerEndpoint::new("media.local:8096/", "user", "token").unwrap();
        assert_eq!(endpoint.host(), "https://media.local:8096");
        assert!(endpoint.host().starts_with("https://"));
    }

    #[test]
    fn test_endpoint_url_for_keeps_path_prefix() {
        let endpoint = ServerEndpoint::new("https://example.net/jellyfin/", "u", "t").unwrap();
        let url = endpoint.url_for(&["Users", "abc", "Items"]);
        assert_eq!(url.as_str(), "https://example.net/jellyfin/Users/abc/Items");
    }

    #[test]
    fn test_endpoint_url_for_escapes_segments() {
        let endpoint = ServerEndpoint::new("https://example.net", "u", "t").unwrap();
        let url = endpoint.url_for(&["UserPlayedItems", "a b/c"]);
        assert_eq!(url.as_str(), "https://example.net/UserPlayedItems/a%20b%2Fc");
    }

    #[test]
    fn test_authorization_header() {
        assert_eq!(
            authorization_header("secret"),
            "MediaBrowser Token=\"secret\""
        );
    }

    #[test]
    fn test_error_classification() {
        let status = MediaServerError::Status {
            status: StatusCode::UNAUTHORIZED,
            body: "nope".to_string(),
        };
        assert!(!status.is_transport());
        assert_eq!(status.kind(), "protocol");

        let decode =
            MediaServerError::Decode(serde_json::from_str::<ItemsResponse>("{").unwrap_err());
        assert!(!decode.is_transport());
        assert_eq!(decode.kind(), "protocol");
    }
}
