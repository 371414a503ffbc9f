use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub walker: WalkerConfig,
    #[serde(default)]
    pub file_host: FileHostConfig,
    #[serde(default)]
    pub addon: AddonConfig,
    #[serde(default)]
    pub records: RecordDefaults,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    7000
}

/// Source site configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SiteConfig {
    /// Site root, without trailing slash (e.g., "https://bhojpuriraas.net")
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Logo advertised in the add-on manifest
    #[serde(default = "default_logo_url")]
    pub logo_url: String,
    /// Browser identity sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Poster size variant requested from the site (`_<n>.jpg`)
    #[serde(default = "default_poster_variant")]
    pub poster_variant: u32,
    /// CSS selectors describing the page structure
    #[serde(default)]
    pub selectors: SiteSelectors,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            logo_url: default_logo_url(),
            user_agent: default_user_agent(),
            poster_variant: default_poster_variant(),
            selectors: SiteSelectors::default(),
        }
    }
}

fn default_base_url() -> String {
    "https://bhojpuriraas.net".to_string()
}

fn default_logo_url() -> String {
    "https://bhojpuriraas.net/images/BhojpuriRaas.Net_w.png".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string()
}

fn default_poster_variant() -> u32 {
    3
}

/// CSS selectors for the site's page structure.
///
/// Every field has a default matching the current markup; override single
/// entries in `[site.selectors]` when the site changes.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SiteSelectors {
    /// Anchor on the home page pointing at the category page.
    pub category_link: String,
    /// Children of the listing container (one per catalog or item).
    pub listing_entry: String,
    /// Positions among category entries that are not catalogs.
    pub catalog_skip_positions: Vec<usize>,
    /// Anchor inside a listing entry.
    pub entry_link: String,
    /// Title element inside a listing entry.
    pub entry_title: String,
    /// Poster image inside a listing entry.
    pub entry_poster: String,
    /// Candidate anchors for pagination.
    pub next_page_link: String,
    /// Text that marks the "next page" anchor.
    pub next_page_text: String,
    /// Anchors that may point at an item's detail page.
    pub item_link: String,
    /// One entry per quality on the download listing page.
    pub quality_entry: String,
    /// Quality label inside a quality entry.
    pub quality_label: String,
    /// Redirect anchor on a quality's download page.
    pub redirect_link: String,
}

impl Default for SiteSelectors {
    fn default() -> Self {
        Self {
            category_link: "#cateogry > div > div:nth-child(2) a[href]".to_string(),
            listing_entry: ".catList > *".to_string(),
            catalog_skip_positions: vec![0, 2],
            entry_link: "a".to_string(),
            entry_title: "a > div > div:nth-child(2)".to_string(),
            entry_poster: "img".to_string(),
            next_page_link: "a[href]".to_string(),
            next_page_text: "Next >".to_string(),
            item_link: ".catList a[href]".to_string(),
            quality_entry: ".fileName".to_string(),
            quality_label: "div div span:first-child".to_string(),
            redirect_link: ".dwnLink[href]".to_string(),
        }
    }
}

/// HTTP fetcher configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FetcherConfig {
    /// Attempts per GET/HEAD before giving up (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Per-request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Pause between attempts in milliseconds (default: 0)
    #[serde(default)]
    pub retry_delay_ms: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            timeout_secs: default_timeout(),
            retry_delay_ms: 0,
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_timeout() -> u64 {
    30
}

/// Listing pagination configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WalkerConfig {
    /// Hard cap on listing pages visited per walk (default: 8)
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
        }
    }
}

fn default_max_pages() -> u32 {
    8
}

/// File host (easyupload) configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FileHostConfig {
    /// Substring identifying a URL on the file host
    #[serde(default = "default_domain_marker")]
    pub domain_marker: String,
    /// Token exchange endpoint
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Origin sent with token requests; the referer is `<origin>/<file id>`
    #[serde(default = "default_origin")]
    pub origin: String,
    /// Pinned captcha token accepted by the file host
    #[serde(default = "default_captcha_token")]
    pub captcha_token: String,
    /// Transfer method requested from the file host
    #[serde(default = "default_transfer_method")]
    pub transfer_method: String,
    /// URL substrings marking a directly playable file
    #[serde(default = "default_direct_media_markers")]
    pub direct_media_markers: Vec<String>,
}

impl Default for FileHostConfig {
    fn default() -> Self {
        Self {
            domain_marker: default_domain_marker(),
            api_url: default_api_url(),
            origin: default_origin(),
            captcha_token: default_captcha_token(),
            transfer_method: default_transfer_method(),
            direct_media_markers: default_direct_media_markers(),
        }
    }
}

fn default_domain_marker() -> String {
    "easyupload.io".to_string()
}

fn default_api_url() -> String {
    "https://eu4.easyupload.io/action.php".to_string()
}

fn default_origin() -> String {
    "https://easyupload.io".to_string()
}

fn default_captcha_token() -> String {
    "gZx5mn2DRr4wxy2Bvj5FbjtWkZaTeWFC".to_string()
}

fn default_transfer_method() -> String {
    "regular".to_string()
}

fn default_direct_media_markers() -> Vec<String> {
    vec![".mp4".to_string()]
}

/// Add-on identity and id scheme
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AddonConfig {
    pub id: String,
    pub version: String,
    pub name: String,
    pub description: String,
    /// Content type served by the add-on
    pub content_type: String,
    /// Prefix of external item ids (`<prefix>:<item id>`)
    pub id_prefix: String,
    /// Prefix of catalog ids (`<prefix>-<index>`)
    pub catalog_prefix: String,
    /// Prefix of stream names shown to the player
    pub stream_name_prefix: String,
    /// Prefix of stream binge groups
    pub binge_group_prefix: String,
}

impl Default for AddonConfig {
    fn default() -> Self {
        Self {
            id: "org.bhojpuriraas".to_string(),
            version: "1.0.0".to_string(),
            name: "Bhojpuri Raas".to_string(),
            description: "Bhojpuri movies from bhojpuriraas.net".to_string(),
            content_type: "movie".to_string(),
            id_prefix: "bhojpuriraas".to_string(),
            catalog_prefix: "bhojpuriraas".to_string(),
            stream_name_prefix: "BhojpuriRaas".to_string(),
            binge_group_prefix: "bhojpuri".to_string(),
        }
    }
}

/// Fixed descriptive fields stamped on every item record
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RecordDefaults {
    pub runtime: String,
    pub language: String,
    pub country: String,
    pub genres: Vec<String>,
}

impl Default for RecordDefaults {
    fn default() -> Self {
        Self {
            runtime: "120 min".to_string(),
            language: "Bhojpuri".to_string(),
            country: "IN".to_string(),
            genres: vec!["Bhojpuri".to_string()],
        }
    }
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub site: SanitizedSiteConfig,
    pub fetcher: FetcherConfig,
    pub walker: WalkerConfig,
    pub file_host: SanitizedFileHostConfig,
    pub addon: AddonConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedSiteConfig {
    pub base_url: String,
    pub poster_variant: u32,
}

/// Sanitized file host config (captcha token hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedFileHostConfig {
    pub domain_marker: String,
    pub api_url: String,
    pub captcha_token_configured: bool,
    pub transfer_method: String,
    pub direct_media_markers: Vec<String>,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            site: SanitizedSiteConfig {
                base_url: config.site.base_url.clone(),
                poster_variant: config.site.poster_variant,
            },
            fetcher: config.fetcher.clone(),
            walker: config.walker.clone(),
            file_host: SanitizedFileHostConfig {
                domain_marker: config.file_host.domain_marker.clone(),
                api_url: config.file_host.api_url.clone(),
                captcha_token_configured: !config.file_host.captcha_token.is_empty(),
                transfer_method: config.file_host.transfer_method.clone(),
                direct_media_markers: config.file_host.direct_media_markers.clone(),
            },
            addon: config.addon.clone(),
        }
    }
}
