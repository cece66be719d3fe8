use crate::aggregate::{self, LinkSource};
use crate::config::{self, Config};
use crate::constants::*;
use crate::error::{Error, Result};
use crate::host::{save_target, ClipboardSource, DocumentSource, Notice, Notifier, RecoveryAction, Severity};
use crate::models::{
    Aggregate, ContentItem, ContentKind, FilterOptions, Page, SaveRequest, SaveResponse,
    SearchQuery, Universe,
};
use crate::pipeline::{RequestPipeline, RetryPolicy};
use crate::search;
use crate::token;
use crate::transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

/// Client for the links backend.
///
/// Owned by the caller. A configuration change means building a new client
/// with [`LinkClient::reconfigure`] and dropping the old one.
pub struct LinkClient<T = ReqwestTransport> {
    config: Config,
    pipeline: RequestPipeline<T>,
    notifier: Arc<dyn Notifier>,
}

impl LinkClient<ReqwestTransport> {
    pub fn new(config: Config, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let transport = ReqwestTransport::new()?;
        LinkClient::with_transport(config, transport, notifier)
    }

    /// Fresh client for a changed configuration, sharing the notifier.
    pub fn reconfigure(&self, config: Config) -> Result<Self> {
        LinkClient::new(config, self.notifier.clone())
    }
}

impl<T: Transport> LinkClient<T> {
    pub fn with_transport(
        mut config: Config,
        transport: T,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        config::normalize(&mut config);
        config::validate(&config)?;

        let policy = RetryPolicy {
            timeout: config.timeout(),
            retries: config.http.retries,
            base_delay: config.backoff_base(),
        };
        let pipeline = RequestPipeline::new(
            transport,
            policy,
            notifier.clone(),
            config.app_base_url.clone(),
        );
        Ok(Self {
            config,
            pipeline,
            notifier,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Default listing options from the configuration.
    pub fn filter(&self) -> FilterOptions {
        FilterOptions {
            page_size: self.config.listing.page_size,
            ..FilterOptions::default()
        }
    }

    fn auth_headers(&self) -> Result<HeaderMap> {
        let token = token::guard(self.config.token.as_deref(), self.notifier.as_ref())?;
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
            Error::Validation {
                message: "API token contains characters not allowed in a header.".to_string(),
            }
        })?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    async fn send_json<R: DeserializeOwned>(&self, request: HttpRequest) -> Result<R> {
        let request = request.headers(self.auth_headers()?);
        let response = self.pipeline.execute(request).await?;
        read_json(response, self.notifier.as_ref())
    }

    /// `POST {app}/api/{path}` with `args` as the JSON body.
    pub async fn query<R, A>(&self, path: &str, args: &A) -> Result<R>
    where
        R: DeserializeOwned,
        A: Serialize + ?Sized,
    {
        let url = self
            .config
            .app_url(&format!("/api/{}", path.trim_start_matches('/')));
        self.send_json(HttpRequest::post(url).json(args)?).await
    }

    /// Run a named backend mutation and unwrap its `value`.
    pub async fn mutation<R, A>(&self, path: &str, args: &A) -> Result<R>
    where
        R: DeserializeOwned,
        A: Serialize + ?Sized,
    {
        #[derive(Deserialize)]
        struct Envelope<R> {
            value: R,
        }

        let url = self.config.backend_url(MUTATION_PATH);
        let body = json!({ "path": path, "args": args });
        let envelope: Envelope<R> = self.send_json(HttpRequest::post(url).json(&body)?).await?;
        Ok(envelope.value)
    }

    pub async fn list_links(
        &self,
        kind: ContentKind,
        filter: &FilterOptions,
        cursor: Option<&str>,
    ) -> Result<Page<ContentItem>> {
        let url = self.config.backend_url(LINKS_LIST_PATH);
        let body = json!({
            "type": kind,
            "universeId": filter.universe_id,
            "hideArchived": filter.hide_archived,
            "hideRead": filter.hide_read,
            "paginationOpts": {
                "numItems": filter.page_size,
                "cursor": cursor,
            },
        });
        let page: Page<ContentItem> = self.send_json(HttpRequest::post(url).json(&body)?).await?;
        tracing::debug!(kind = kind.as_str(), count = page.page.len(), done = page.is_done, "listed links");
        Ok(page)
    }

    pub async fn list_universes(&self) -> Result<Vec<Universe>> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Listing {
            Bare(Vec<Universe>),
            Wrapped { universes: Vec<Universe> },
        }

        let url = self.config.backend_url(UNIVERSES_LIST_PATH);
        let listing: Listing = self.send_json(HttpRequest::get(url)).await?;
        Ok(match listing {
            Listing::Bare(universes) | Listing::Wrapped { universes } => universes,
        })
    }

    pub async fn save_link(&self, request: &SaveRequest) -> Result<SaveResponse> {
        let url = self.config.app_url(SAVE_PATH);
        let saved: SaveResponse = self.send_json(HttpRequest::post(url).json(request)?).await?;
        tracing::info!(item_id = %saved.item_id, url = %request.url, "saved link");
        Ok(saved)
    }

    pub async fn set_read(&self, link_id: &str, is_read: bool) -> Result<()> {
        let _: IgnoredAny = self
            .mutation(SET_READ_MUTATION, &json!({ "linkId": link_id, "isRead": is_read }))
            .await?;
        Ok(())
    }

    pub async fn set_archived(&self, link_id: &str, is_archived: bool) -> Result<()> {
        let _: IgnoredAny = self
            .mutation(
                SET_ARCHIVED_MUTATION,
                &json!({ "linkId": link_id, "isArchived": is_archived }),
            )
            .await?;
        Ok(())
    }

    pub async fn add_to_universe(&self, link_id: &str, universe_id: &str) -> Result<()> {
        let _: IgnoredAny = self
            .mutation(
                ADD_TO_UNIVERSE_MUTATION,
                &json!({ "linkId": link_id, "universeId": universe_id }),
            )
            .await?;
        Ok(())
    }

    pub async fn remove_from_universe(&self, link_id: &str, universe_id: &str) -> Result<()> {
        let _: IgnoredAny = self
            .mutation(
                REMOVE_FROM_UNIVERSE_MUTATION,
                &json!({ "linkId": link_id, "universeId": universe_id }),
            )
            .await?;
        Ok(())
    }

    /// All kinds merged newest first. See [`aggregate::fetch_all`].
    pub async fn fetch_all(&self, filter: &FilterOptions) -> Result<Aggregate> {
        aggregate::fetch_all(self, filter).await
    }

    /// Fetch everything, then filter and rank by `query`.
    pub async fn search(&self, query: &SearchQuery, filter: &FilterOptions) -> Result<Aggregate> {
        let fetched = self.fetch_all(filter).await?;
        Ok(Aggregate {
            items: search::search(fetched.items, query),
            authenticated: fetched.authenticated,
        })
    }

    /// Save the active browser document, or a URL from the clipboard.
    ///
    /// Returns `Ok(None)` when there is nothing to save.
    pub async fn save_current(
        &self,
        documents: &dyn DocumentSource,
        clipboard: &dyn ClipboardSource,
        universe_id: Option<&str>,
    ) -> Result<Option<SaveResponse>> {
        let Some(target) = save_target(documents, clipboard) else {
            self.notifier.notify(
                Notice::new(Severity::Info, "Nothing to save")
                    .message("Open a page in your browser or copy a link first."),
            );
            return Ok(None);
        };

        let mut request = SaveRequest::new(target.url, target.title);
        request.collection_id = universe_id.map(str::to_string);
        match self.save_link(&request).await {
            Ok(saved) => {
                self.notifier
                    .notify(Notice::new(Severity::Success, "Link saved").message(request.title));
                Ok(Some(saved))
            }
            Err(err) => {
                // Guard, 401 and network failures have already been reported.
                if !err.is_auth() && !matches!(err, Error::Network { .. }) {
                    let message = match &err {
                        Error::Api { message, .. } => message.clone(),
                        other => other.to_string(),
                    };
                    self.notifier
                        .notify(Notice::new(Severity::Failure, "Failed to save link").message(message));
                }
                Err(err)
            }
        }
    }
}

impl<T: Transport> LinkSource for LinkClient<T> {
    async fn fetch_page(
        &self,
        kind: ContentKind,
        filter: &FilterOptions,
        cursor: Option<&str>,
    ) -> Result<Page<ContentItem>> {
        self.list_links(kind, filter, cursor).await
    }
}

/// Interpret the status of a response and decode its JSON body.
pub fn read_json<R: DeserializeOwned>(response: HttpResponse, notifier: &dyn Notifier) -> Result<R> {
    let status = response.status;
    if status == StatusCode::UNAUTHORIZED {
        notifier.notify(
            Notice::new(Severity::Failure, "Authentication required")
                .message("Your API token was rejected. Check it in the extension preferences.")
                .action(RecoveryAction::OpenPreferences),
        );
        return Err(Error::AuthRequired);
    }
    if !status.is_success() {
        let message = error_message(&response.body);
        tracing::warn!(%status, %message, "request rejected");
        return Err(Error::Api { status, message });
    }
    serde_json::from_str(&response.body)
        .map_err(|err| Error::Parse(format!("unexpected response body: {err}")))
}

/// Message from a `details` or `error` field, else the raw body.
pub fn error_message(body: &str) -> String {
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return body.to_string();
    };
    match json.get("details").or_else(|| json.get("error")) {
        Some(Value::String(message)) => message.clone(),
        Some(Value::Null) | None => body.to_string(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::RecordingNotifier;

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status: StatusCode::from_u16(status).expect("status"),
            body: body.to_string(),
        }
    }

    #[test]
    fn extracts_details_then_error_then_raw() {
        assert_eq!(error_message(r#"{"details":"bad id","error":"x"}"#), "bad id");
        assert_eq!(error_message(r#"{"error":"quota"}"#), "quota");
        assert_eq!(error_message(r#"{"other":1}"#), r#"{"other":1}"#);
        assert_eq!(error_message("<html>502</html>"), "<html>502</html>");
        assert_eq!(error_message(""), "");
    }

    #[test]
    fn unauthorized_notifies_and_fails() {
        let notifier = RecordingNotifier::default();
        let err = read_json::<Value>(response(401, "{}"), &notifier).expect_err("401");
        assert!(matches!(err, Error::AuthRequired));
        let notices = notifier.notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].action, Some(RecoveryAction::OpenPreferences));
    }

    #[test]
    fn error_status_carries_message() {
        let notifier = RecordingNotifier::default();
        let err = read_json::<Value>(response(422, r#"{"error":"url required"}"#), &notifier)
            .expect_err("422");
        match err {
            Error::Api { status, message } => {
                assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
                assert_eq!(message, "url required");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(notifier.notices().is_empty());
    }

    #[test]
    fn success_decodes_body() {
        let notifier = RecordingNotifier::default();
        let saved: SaveResponse =
            read_json(response(200, r#"{"itemId":"k9"}"#), &notifier).expect("decode");
        assert_eq!(saved.item_id, "k9");
        let err = read_json::<SaveResponse>(response(200, "not json"), &notifier).expect_err("parse");
        assert!(matches!(err, Error::Parse(_)));
    }
}
