use reqwest::Client;
use url::Url;

use super::{MediaServerError, ServerEndpoint, send};

/// Endpoint
/// - `POST /UserPlayedItems/{itemId}?userId={userId}`
pub fn mark_played_url(endpoint: &ServerEndpoint, item_id: &str) -> Url {
    let mut url = endpoint.url_for(&["UserPlayedItems", item_id]);
    url.query_pairs_mut().append_pair("userId", endpoint.user_id());
    url
}

/// Mark an item as played for the endpoint's user.
///
/// This issues the request unconditionally. Deciding whether the item needs
/// it is up to the caller, and the result is not read back.
pub async fn mark_played(
    client: &Client,
    endpoint: &ServerEndpoint,
    item_id: &str,
) -> Result<(), MediaServerError> {
    let url = mark_played_url(endpoint, item_id);
    log::debug!("Marking item {} played on {}", item_id, endpoint.host());

    send(endpoint, client.post(url)).await?;
    Ok(())
}
