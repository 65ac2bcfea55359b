pub mod media_server;
pub mod watch_sync;
