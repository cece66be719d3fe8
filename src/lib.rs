pub mod aggregate;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod host;
pub mod models;
pub mod pipeline;
pub mod search;
pub mod token;
pub mod transport;

pub use aggregate::{fetch_all, LinkSource};
pub use client::{error_message, read_json, LinkClient};
pub use config::{load as load_config, Config, ConfigFile, CredentialStore};
pub use constants::{
    default_headers, default_timeout, DEFAULT_BACKOFF_BASE_MS, DEFAULT_PAGE_SIZE, DEFAULT_RETRIES,
    DEFAULT_TIMEOUT_MS, TOKEN_ENV_VAR,
};
pub use error::{Error, Result, TransportError};
pub use host::{
    save_target, ActiveDocument, ClipboardSource, DocumentSource, NoDocument, Notice, Notifier,
    RecordingNotifier, RecoveryAction, Severity, TracingNotifier,
};
pub use models::{
    Aggregate, ContentItem, ContentKind, FilterOptions, Page, SaveRequest, SaveResponse,
    SearchQuery, Tag, Universe, UniverseRef,
};
pub use pipeline::{RequestPipeline, RetryPolicy};
pub use search::{keywords, matches, rank};
pub use token::{decode_claims, ensure_usable, is_expired, is_present, Claims, Expiry};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
