use reqwest::Client;
use url::Url;

use super::items::{MediaItem, decode_items_response};
use super::{MediaServerError, ServerEndpoint, send};

/// Candidates are read from a single page of this size.
pub const SEARCH_LIMIT: u32 = 100;

/// URL for a cross-library search scoped to the endpoint's user.
///
/// Endpoint
/// - `GET /Items?userId={userId}&limit=100&recursive=true&searchTerm={term}`
pub fn search_url(endpoint: &ServerEndpoint, term: &str) -> Url {
    let mut url = endpoint.url_for(&["Items"]);
    url.query_pairs_mut()
        .append_pair("userId", endpoint.user_id())
        .append_pair("limit", &SEARCH_LIMIT.to_string())
        .append_pair("recursive", "true")
        .append_pair("searchTerm", term);
    url
}

/// Search a server for items matching `term`.
///
/// Scoping the query to the user makes the server include `UserData`, so the
/// returned candidates carry their play state.
pub async fn search_items(
    client: &Client,
    endpoint: &ServerEndpoint,
    term: &str,
) -> Result<Vec<MediaItem>, MediaServerError> {
    let url = search_url(endpoint, term);
    log::debug!("Searching {} for '{}'", endpoint.host(), term);

    let body = send(endpoint, client.get(url)).await?;
    Ok(decode_items_response(&body)?.items)
}
