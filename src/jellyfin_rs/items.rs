use reqwest::Client;
use serde::{Deserialize, Deserializer};
use url::Url;

use super::{MediaServerError, ServerEndpoint, send};

/* ---------- Shared envelope ---------- */

/// Servers send `null` for fields they have no value for. Treat it the same
/// as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Paginated envelope returned by the item listing and search endpoints.
///
/// Notes
/// - `total_record_count` is informational; servers do not always report it
///   consistently, so nothing loops on it.
/// - `items` defaults to an empty vec when missing or `null`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemsResponse {
    #[serde(rename = "Items", default, deserialize_with = "null_as_default")]
    pub items: Vec<MediaItem>,

    #[serde(rename = "TotalRecordCount", default, deserialize_with = "null_as_default")]
    pub total_record_count: i64,

    #[serde(rename = "StartIndex", default, deserialize_with = "null_as_default")]
    pub start_index: i64,
}

/* ---------- Items ---------- */

/// One item as reported by a server at the time of the request.
///
/// `id` is local to the server that returned it. The same movie has an
/// unrelated id on another installation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MediaItem {
    #[serde(rename = "Id", default, deserialize_with = "null_as_default")]
    pub id: String,

    #[serde(rename = "Name", default, deserialize_with = "null_as_default")]
    pub name: String,

    #[serde(rename = "RunTimeTicks", default, deserialize_with = "null_as_default")]
    pub runtime_ticks: i64,

    #[serde(rename = "UserData", default)]
    pub play_state: Option<PlayState>,
}

/// Per-user play state (`UserData` on the wire).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PlayState {
    #[serde(rename = "PlaybackPositionTicks", default, deserialize_with = "null_as_default")]
    pub position_ticks: i64,

    #[serde(rename = "PlayCount", default, deserialize_with = "null_as_default")]
    pub play_count: i32,

    #[serde(rename = "Played", default, deserialize_with = "null_as_default")]
    pub played: bool,
}

impl PlayState {
    /// Either signal is enough: the played flag or a positive play count.
    pub fn is_played(&self) -> bool {
        self.played || self.play_count > 0
    }
}

impl MediaItem {
    /// An item without play state is never played.
    pub fn is_played(&self) -> bool {
        self.play_state.is_some_and(|state| state.is_played())
    }
}

pub fn decode_items_response(body: &str) -> Result<ItemsResponse, MediaServerError> {
    serde_json::from_str(body).map_err(MediaServerError::Decode)
}

/// URL for one page of the user's movie library.
///
/// Endpoint
/// - `GET /Users/{userId}/Items?IncludeItemTypes=Movie&Recursive=true&Limit={n}&StartIndex={k}`
pub fn items_page_url(endpoint: &ServerEndpoint, start_index: u32, limit: u32) -> Url {
    let mut url = endpoint.url_for(&["Users", endpoint.user_id(), "Items"]);
    url.query_pairs_mut()
        .append_pair("IncludeItemTypes", "Movie")
        .append_pair("Recursive", "true")
        .append_pair("Limit", &limit.to_string())
        .append_pair("StartIndex", &start_index.to_string());
    url
}

/// Fetch one page of movies for the endpoint's user.
///
/// Returns the full envelope, unfiltered. Pagination and the played filter are
/// the caller's concern.
pub async fn get_items_page(
    client: &Client,
    endpoint: &ServerEndpoint,
    start_index: u32,
    limit: u32,
) -> Result<ItemsResponse, MediaServerError> {
    let url = items_page_url(endpoint, start_index, limit);
    log::debug!("Fetching items page: {}", url);

    let body = send(endpoint, client.get(url)).await?;
    decode_items_response(&body)
}
