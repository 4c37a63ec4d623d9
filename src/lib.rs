pub mod api;
pub mod config;
pub mod fetcher;
pub mod observability;
pub mod store;
