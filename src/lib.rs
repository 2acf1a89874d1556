pub mod config;
pub mod fake_feed;
pub mod feed;
pub mod http_client;
pub mod panel;
pub mod registry;
pub mod rotation;
pub mod score_cache;
pub mod score_fetch;
pub mod score_panels;
pub mod scroll;
pub mod state;
pub mod weather;
