use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;

pub const DEFAULT_APP_URL: &str = "https://app.linkhub.dev";
pub const DEFAULT_BACKEND_URL: &str = "https://api.linkhub.dev";

pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_RETRIES: u32 = 3;
pub const DEFAULT_BACKOFF_BASE_MS: u64 = 300;
pub const DEFAULT_PAGE_SIZE: usize = 100;
pub const MAX_PAGE_SIZE: usize = 1_000;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable the demo CLI reads to override the configured token.
pub const TOKEN_ENV_VAR: &str = "LINKHUB_TOKEN";

pub const LINKS_LIST_PATH: &str = "/http/links-list";
pub const UNIVERSES_LIST_PATH: &str = "/http/universes-list";
pub const MUTATION_PATH: &str = "/api/mutation";
pub const SAVE_PATH: &str = "/api/save";

pub const SET_READ_MUTATION: &str = "links:setRead";
pub const SET_ARCHIVED_MUTATION: &str = "links:setArchived";
pub const ADD_TO_UNIVERSE_MUTATION: &str = "links:addToUniverse";
pub const REMOVE_FROM_UNIVERSE_MUTATION: &str = "links:removeFromUniverse";

pub const DEFAULT_HEADERS: &[(&str, &str)] = &[
    ("content-type", "application/json"),
    ("accept", "application/json"),
    ("user-agent", concat!("linkhub-client-rs/", env!("CARGO_PKG_VERSION"))),
];

pub fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (k, v) in DEFAULT_HEADERS {
        let name = HeaderName::from_static(k);
        if let Ok(val) = HeaderValue::from_str(v) {
            headers.insert(name, val);
        }
    }
    headers
}

pub fn default_timeout() -> Duration {
    Duration::from_millis(DEFAULT_TIMEOUT_MS)
}

pub fn default_backoff_base() -> Duration {
    Duration::from_millis(DEFAULT_BACKOFF_BASE_MS)
}
