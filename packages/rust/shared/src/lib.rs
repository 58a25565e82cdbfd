//! Shared types, error model, and configuration for SiteDigest.
//!
//! This crate is the foundation depended on by all other SiteDigest crates.
//! It provides:
//! - [`SiteDigestError`] — the unified error type
//! - Domain types ([`PageMetadata`], [`InputSpec`])
//! - Configuration ([`AppConfig`], [`FetchConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, FetchConfig, HttpConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from,
};
pub use error::{Result, SiteDigestError};
pub use types::{InputSpec, PageMetadata, SITEMAP_FILE_EXT};
