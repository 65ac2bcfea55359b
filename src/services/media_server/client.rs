use std::time::Duration;

use color_eyre::eyre::{Result, WrapErr};
use reqwest::Client;

use crate::jellyfin_rs::{
    ItemsResponse, MediaItem, MediaServerError, ServerEndpoint, get_items_page, mark_played,
    search_items,
};
use crate::ports::media_server::MediaServerClient;

/// Every request gives up after this long and surfaces as a transport error.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

pub struct MediaServerHttpAdapter {
    client: Client,
}

impl MediaServerHttpAdapter {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .wrap_err("Failed to build http client")?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl MediaServerClient for MediaServerHttpAdapter {
    async fn get_items_page(
        &self,
        endpoint: &ServerEndpoint,
        start_index: u32,
        limit: u32,
    ) -> Result<ItemsResponse, MediaServerError> {
        get_items_page(&self.client, endpoint, start_index, limit).await
    }

    async fn search_items(
        &self,
        endpoint: &ServerEndpoint,
        term: &str,
    ) -> Result<Vec<MediaItem>, MediaServerError> {
        search_items(&self.client, endpoint, term).await
    }

    async fn mark_played(
        &self,
        endpoint: &ServerEndpoint,
        item_id: &str,
    ) -> Result<(), MediaServerError> {
        mark_played(&self.client, endpoint, item_id).await
    }
}
