use crate::jellyfin_rs::{ItemsResponse, MediaItem, MediaServerError, ServerEndpoint};

/// Port trait wrapping the media server API capabilities used by the sync engine.
///
/// Implementations live in `services::media_server::client` (production) or test mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MediaServerClient: Send + Sync {
    async fn get_items_page(
        &self,
        endpoint: &ServerEndpoint,
        start_index: u32,
        limit: u32,
    ) -> Result<ItemsResponse, MediaServerError>;

    async fn search_items(
        &self,
        endpoint: &ServerEndpoint,
        term: &str,
    ) -> Result<Vec<MediaItem>, MediaServerError>;

    async fn mark_played(
        &self,
        endpoint: &ServerEndpoint,
        item_id: &str,
    ) -> Result<(), MediaServerError>;
}
