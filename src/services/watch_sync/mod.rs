pub mod matching;

use color_eyre::eyre::{Result, WrapErr};

use crate::jellyfin_rs::{MediaItem, MediaServerError, ServerEndpoint};
use crate::ports::media_server::MediaServerClient;

use matching::find_matching_item;

/// Page size used when listing a server's library.
pub const PAGE_SIZE: u32 = 100;

/// Result of one directional pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    /// Items marked played on the destination, or that would have been in a
    /// dry run.
    pub marked_count: u32,
}

/// What happened to a single played source item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    Marked,
    WouldMark,
    AlreadyPlayed,
    NoMatch,
    SearchFailed,
    WriteFailed,
}

impl ItemOutcome {
    fn counts_as_marked(&self) -> bool {
        matches!(self, ItemOutcome::Marked | ItemOutcome::WouldMark)
    }
}

#[derive(Debug)]
pub struct DirectionReport {
    pub source_host: String,
    pub destination_host: String,
    pub result: Result<SyncOutcome>,
}

impl DirectionReport {
    pub fn marked_count(&self) -> u32 {
        self.result
            .as_ref()
            .map(|outcome| outcome.marked_count)
            .unwrap_or(0)
    }
}

/// Both directions of a full run, A to B first.
#[derive(Debug)]
pub struct SyncReport {
    pub a_to_b: DirectionReport,
    pub b_to_a: DirectionReport,
}

impl SyncReport {
    pub fn total_marked(&self) -> u32 {
        self.a_to_b.marked_count() + self.b_to_a.marked_count()
    }

    /// True when either direction could not discover its played items.
    pub fn has_failures(&self) -> bool {
        self.a_to_b.result.is_err() || self.b_to_a.result.is_err()
    }
}

/// Copies played state between two media servers.
///
/// Stateless between runs: every pass re-lists the source's played items and
/// searches the destination again.
pub struct WatchSyncService<C: MediaServerClient> {
    client: C,
    dry_run: bool,
}

impl<C: MediaServerClient> WatchSyncService<C> {
    pub fn new(client: C, dry_run: bool) -> Self {
        Self { client, dry_run }
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// List every played movie for the endpoint's user.
    ///
    /// Pages are requested until a short page comes back. The reported
    /// `TotalRecordCount` is ignored. Any failed page aborts the whole listing.
    pub async fn fetch_played_items(
        &self,
        endpoint: &ServerEndpoint,
    ) -> Result<Vec<MediaItem>, MediaServerError> {
        let mut start_index: u32 = 0;
        let mut played = Vec::new();

        loop {
            let page = self
                .client
                .get_items_page(endpoint, start_index, PAGE_SIZE)
                .await?;
            let received = page.items.len();
            log::debug!(
                "{}: page at {} returned {} items (server start {}, reported total {})",
                endpoint.host(),
                start_index,
                received,
                page.start_index,
                page.total_record_count
            );

            played.extend(page.items.into_iter().filter(MediaItem::is_played));

            if received < PAGE_SIZE as usize {
                break;
            }
            start_index += PAGE_SIZE;
        }

        Ok(played)
    }

    /// Copy played state from `source` to `destination`.
    ///
    /// # Errors
    /// Only a failure to list the source's played items is returned. Search and
    /// write failures for individual items are logged and skipped.
    pub async fn sync_direction(
        &self,
        source: &ServerEndpoint,
        destination: &ServerEndpoint,
    ) -> Result<SyncOutcome> {
        log::info!(
            "Syncing played from {} -> {}",
            source.host(),
            destination.host()
        );

        let played = self
            .fetch_played_items(source)
            .await
            .wrap_err_with(|| format!("Failed to fetch played items from {}", source.host()))?;
        log::info!("Found {} played items on {}", played.len(), source.host());

        let mut outcome = SyncOutcome::default();
        for item in &played {
            if self.sync_item(source, destination, item).await.counts_as_marked() {
                outcome.marked_count += 1;
            }
        }

        log::info!(
            "Finished {} -> {}: {} items marked",
            source.host(),
            destination.host(),
            outcome.marked_count
        );
        Ok(outcome)
    }

    async fn sync_item(
        &self,
        source: &ServerEndpoint,
        destination: &ServerEndpoint,
        item: &MediaItem,
    ) -> ItemOutcome {
        let candidates = match self.client.search_items(destination, &item.name).await {
            Ok(candidates) => candidates,
            Err(e) => {
                log::warn!(
                    "Search error ({}) for '{}' on {}: {}",
                    e.kind(),
                    item.name,
                    destination.host(),
                    e
                );
                return ItemOutcome::SearchFailed;
            }
        };

        let Some(matched) = find_matching_item(item, &candidates) else {
            log::debug!("No match for '{}' on {}", item.name, destination.host());
            return ItemOutcome::NoMatch;
        };

        if matched.is_played() {
            log::debug!(
                "'{}' already played on {} (item {})",
                matched.name,
                destination.host(),
                matched.id
            );
            return ItemOutcome::AlreadyPlayed;
        }

        if self.dry_run {
            log::info!(
                "DRY-RUN: would mark played: {} -> {} (item {})",
                source.host(),
                destination.host(),
                matched.id
            );
            return ItemOutcome::WouldMark;
        }

        match self.client.mark_played(destination, &matched.id).await {
            Ok(()) => {
                log::info!(
                    "Marked played: {} on {} (item {})",
                    matched.name,
                    destination.host(),
                    matched.id
                );
                ItemOutcome::Marked
            }
            Err(e) => {
                log::error!(
                    "Failed to mark {} as played on {} ({}): {}",
                    matched.id,
                    destination.host(),
                    e.kind(),
                    e
                );
                ItemOutcome::WriteFailed
            }
        }
    }

    /// Run A to B, then B to A. A failure in one direction never stops the other.
    pub async fn sync_both(&self, a: &ServerEndpoint, b: &ServerEndpoint) -> SyncReport {
        let a_to_b = self.direction_report(a, b).await;
        let b_to_a = self.direction_report(b, a).await;
        SyncReport { a_to_b, b_to_a }
    }

    async fn direction_report(
        &self,
        source: &ServerEndpoint,
        destination: &ServerEndpoint,
    ) -> DirectionReport {
        let result = self.sync_direction(source, destination).await;
        if let Err(e) = &result {
            log::error!(
                "Error syncing {} -> {}: {:?}",
                source.host(),
                destination.host(),
                e
            );
        }

        DirectionReport {
            source_host: source.host().to_string(),
            destination_host: destination.host().to_string(),
            result,
        }
    }
}
