mod settings;

pub use settings::{ApiConfig, CatalogConfig, ServerConfig, Settings};
