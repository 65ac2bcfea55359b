use crate::jellyfin_rs::{MediaItem, ServerEndpoint, items::PlayState};

pub fn endpoint(host: &str) -> ServerEndpoint {
    ServerEndpoint::new(host, "user", "token").unwrap()
}

/// An item with no play state at all.
pub fn item(id: &str, name: &str, runtime_ticks: i64) -> MediaItem {
    MediaItem {
        id: id.to_string(),
        name: name.to_string(),
        runtime_ticks,
        play_state: None,
    }
}

pub fn unplayed_item(id: &str, name: &str, runtime_ticks: i64) -> MediaItem {
    MediaItem {
        play_state: Some(PlayState::default()),
        ..item(id, name, runtime_ticks)
    }
}

pub fn played_item(id: &str, name: &str, runtime_ticks: i64) -> MediaItem {
    MediaItem {
        play_state: Some(PlayState {
            position_ticks: 0,
            play_count: 1,
            played: true,
        }),
        ..item(id, name, runtime_ticks)
    }
}
