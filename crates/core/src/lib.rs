pub mod cache;
pub mod catalog;
pub mod config;
pub mod fetcher;
pub mod file_host;
pub mod locator;
pub mod page;
pub mod resolver;
pub mod service;
pub mod testing;
pub mod text;
pub mod walker;

pub use cache::{CacheStats, LookupCache};
pub use catalog::{
    CatalogDirectory, CatalogError, CatalogRef, ItemRecord, ItemSummary, StreamCandidate,
};
pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, Config,
    ConfigError, SanitizedConfig,
};
pub use fetcher::{FetchError, Fetched, Fetcher, HttpFetcher};
pub use file_host::{file_id_from_url, EasyUploadClient, FileHost, FileHostError};
pub use locator::{ItemLink, ItemLocator, LocateOutcome};
pub use page::{PageReader, PageReaderError, SitePageReader};
pub use resolver::{ResolveError, StreamResolver};
pub use service::{AddonService, ServiceError};
pub use text::{normalize_for_search, normalize_poster_url, normalize_text, TitleQuery};
pub use walker::{ListingPages, ListingWalker, WalkerOptions};
