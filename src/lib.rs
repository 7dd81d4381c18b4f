// Infrastructure
pub mod config;
pub mod error;
pub mod metrics;

// Domain (template model, extraction, compilation, catalog)
pub mod messages;
pub mod template;

// Application layer
pub mod api;
pub mod server;
