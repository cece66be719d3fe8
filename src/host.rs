//! Capabilities the embedding host provides to the client.

use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Info,
    Failure,
}

/// Follow-up the host can offer next to a notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Open the web application at this URL in a browser.
    OpenWebApp(String),
    /// Open the host's preferences so the user can set a token.
    OpenPreferences,
}

/// A transient status notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub title: String,
    pub message: Option<String>,
    pub action: Option<RecoveryAction>,
}

impl Notice {
    pub fn new(severity: Severity, title: impl Into<String>) -> Self {
        Notice {
            severity,
            title: title.into(),
            message: None,
            action: None,
        }
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn action(mut self, action: RecoveryAction) -> Self {
        self.action = Some(action);
        self
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Notifier that writes notices to the `tracing` log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        let message = notice.message.as_deref().unwrap_or_default();
        match notice.severity {
            Severity::Failure => {
                tracing::error!(title = %notice.title, action = ?notice.action, "{message}")
            }
            Severity::Info | Severity::Success => {
                tracing::info!(title = %notice.title, "{message}")
            }
        }
    }
}

/// Notifier that keeps every notice; useful for hosts that batch them and for tests.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        match self.notices.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        match self.notices.lock() {
            Ok(mut guard) => guard.push(notice),
            Err(poisoned) => poisoned.into_inner().push(notice),
        }
    }
}

/// URL and title of the document in the frontmost browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveDocument {
    pub url: String,
    pub title: String,
}

pub trait DocumentSource {
    /// `None` when the active application is not a recognized browser.
    fn active_document(&self) -> Option<ActiveDocument>;
}

pub trait ClipboardSource {
    fn read_text(&self) -> Option<String>;
}

/// Source for hosts without browser integration.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDocument;

impl DocumentSource for NoDocument {
    fn active_document(&self) -> Option<ActiveDocument> {
        None
    }
}

impl ClipboardSource for Option<String> {
    fn read_text(&self) -> Option<String> {
        self.clone()
    }
}

/// Pick what to save: the active document, else a URL on the clipboard.
pub fn save_target(
    documents: &dyn DocumentSource,
    clipboard: &dyn ClipboardSource,
) -> Option<ActiveDocument> {
    if let Some(doc) = documents.active_document() {
        return Some(doc);
    }

    let text = clipboard.read_text()?;
    let candidate = text.trim();
    let url = reqwest::Url::parse(candidate).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    let title = url.host_str().unwrap_or(candidate).to_string();
    Some(ActiveDocument {
        url: candidate.to_string(),
        title,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Browser;

    impl DocumentSource for Browser {
        fn active_document(&self) -> Option<ActiveDocument> {
            Some(ActiveDocument {
                url: "https://docs.rs/".into(),
                title: "Docs.rs".into(),
            })
        }
    }

    #[test]
    fn prefers_active_document() {
        let clip = Some("https://example.com".to_string());
        let target = save_target(&Browser, &clip).expect("target");
        assert_eq!(target.title, "Docs.rs");
    }

    #[test]
    fn falls_back_to_clipboard_url() {
        let clip = Some("  https://www.example.com/post?id=1 \n".to_string());
        let target = save_target(&NoDocument, &clip).expect("target");
        assert_eq!(target.url, "https://www.example.com/post?id=1");
        assert_eq!(target.title, "www.example.com");
    }

    #[test]
    fn ignores_non_url_clipboard() {
        assert_eq!(save_target(&NoDocument, &Some("hello world".into())), None);
        assert_eq!(save_target(&NoDocument, &Some("file:///etc/hosts".into())), None);
        assert_eq!(save_target(&NoDocument, &None::<String>), None);
    }

    #[test]
    fn recording_notifier_keeps_order() {
        let notifier = RecordingNotifier::default();
        notifier.notify(Notice::new(Severity::Info, "one"));
        notifier.notify(Notice::new(Severity::Failure, "two").message("details"));
        let titles: Vec<_> = notifier.notices().into_iter().map(|n| n.title).collect();
        assert_eq!(titles, vec!["one", "two"]);
    }
}
