//! Merging the per-kind listings into one recency-ordered list.

use crate::error::Result;
use crate::models::{Aggregate, ContentItem, ContentKind, FilterOptions, Page};
use crate::search::by_recency;
use std::future::Future;

/// Anything that can list one kind of content a page at a time.
pub trait LinkSource {
    fn fetch_page(
        &self,
        kind: ContentKind,
        filter: &FilterOptions,
        cursor: Option<&str>,
    ) -> impl Future<Output = Result<Page<ContentItem>>> + Send;
}

/// Concatenate pages in the given order, then stable-sort newest first.
pub fn merge(pages: Vec<Page<ContentItem>>) -> Vec<ContentItem> {
    let mut items: Vec<ContentItem> = pages.into_iter().flat_map(|p| p.page).collect();
    items.sort_by(by_recency);
    items
}

/// Fetch the first page of every kind, one after another, and merge them.
///
/// An authentication failure from any listing yields an empty, unauthenticated
/// aggregate instead of an error. Other errors abort the whole call.
pub async fn fetch_all<S: LinkSource>(
    source: &S,
    filter: &FilterOptions,
) -> Result<Aggregate> {
    let mut pages = Vec::with_capacity(ContentKind::ALL.len());
    for kind in ContentKind::ALL {
        match source.fetch_page(kind, filter, None).await {
            Ok(page) => pages.push(page),
            Err(err) if err.is_auth() => {
                tracing::info!(kind = kind.as_str(), error = %err, "listing needs login");
                return Ok(Aggregate {
                    items: Vec::new(),
                    authenticated: false,
                });
            }
            Err(err) => return Err(err),
        }
    }

    let mut items = merge(pages);
    items.retain(|item| filter.admits(item));
    tracing::debug!(count = items.len(), "merged listings");
    Ok(Aggregate {
        items,
        authenticated: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::search::tests::item;
    use reqwest::StatusCode;
    use std::sync::Mutex;

    enum Reply {
        Items(Vec<f64>),
        /// `(creation time, is_read, is_archived)`
        Flagged(Vec<(f64, bool, bool)>),
        Auth,
        Broken,
    }

    struct Scripted {
        link: Reply,
        video: Reply,
        embed: Reply,
        asked: Mutex<Vec<ContentKind>>,
    }

    impl Scripted {
        fn new(link: Reply, video: Reply, embed: Reply) -> Self {
            Scripted {
                link,
                video,
                embed,
                asked: Mutex::new(Vec::new()),
            }
        }
    }

    impl LinkSource for Scripted {
        async fn fetch_page(
            &self,
            kind: ContentKind,
            _filter: &FilterOptions,
            _cursor: Option<&str>,
        ) -> Result<Page<ContentItem>> {
            self.asked.lock().expect("lock").push(kind);
            let reply = match kind {
                ContentKind::Link => &self.link,
                ContentKind::Video => &self.video,
                ContentKind::Embed => &self.embed,
            };
            match reply {
                Reply::Items(times) => Ok(Page {
                    page: times
                        .iter()
                        .map(|t| {
                            let mut it = item(&format!("{}-{t}", kind.as_str()), "t", *t);
                            it.kind = kind;
                            it
                        })
                        .collect(),
                    is_done: true,
                    continue_cursor: None,
                }),
                Reply::Flagged(rows) => Ok(Page {
                    page: rows
                        .iter()
                        .map(|&(t, read, archived)| {
                            let mut it = item(&format!("{}-{t}", kind.as_str()), "t", t);
                            it.kind = kind;
                            it.is_read = read;
                            it.is_archived = archived;
                            it
                        })
                        .collect(),
                    is_done: true,
                    continue_cursor: None,
                }),
                Reply::Auth => Err(Error::AuthRequired),
                Reply::Broken => Err(Error::Api {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "boom".into(),
                }),
            }
        }
    }

    fn times(items: &[ContentItem]) -> Vec<f64> {
        items.iter().map(|i| i.creation_time).collect()
    }

    #[tokio::test]
    async fn merges_kinds_newest_first() {
        let source = Scripted::new(
            Reply::Items(vec![5.0, 3.0]),
            Reply::Items(vec![4.0]),
            Reply::Items(vec![2.0, 1.0]),
        );
        let out = fetch_all(&source, &FilterOptions::default()).await.expect("fetch");
        assert!(out.authenticated);
        assert_eq!(times(&out.items), vec![5.0, 4.0, 3.0, 2.0, 1.0]);
        assert_eq!(
            *source.asked.lock().expect("lock"),
            vec![ContentKind::Link, ContentKind::Video, ContentKind::Embed]
        );
    }

    #[test]
    fn merge_is_stable_on_equal_times() {
        let mut a = item("a", "a", 7.0);
        a.kind = ContentKind::Link;
        let mut b = item("b", "b", 7.0);
        b.kind = ContentKind::Video;
        let merged = merge(vec![
            Page {
                page: vec![a],
                is_done: true,
                continue_cursor: None,
            },
            Page {
                page: vec![b],
                is_done: true,
                continue_cursor: None,
            },
        ]);
        let ids: Vec<_> = merged.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn auth_failure_downgrades_to_empty() {
        let source = Scripted::new(Reply::Items(vec![5.0]), Reply::Auth, Reply::Items(vec![1.0]));
        let out = fetch_all(&source, &FilterOptions::default()).await.expect("no error");
        assert!(out.items.is_empty());
        assert!(!out.authenticated);
    }

    #[tokio::test]
    async fn other_failures_propagate() {
        let source = Scripted::new(Reply::Items(vec![5.0]), Reply::Items(vec![4.0]), Reply::Broken);
        let err = fetch_all(&source, &FilterOptions::default())
            .await
            .expect_err("should propagate");
        assert!(matches!(err, Error::Api { .. }));
    }

    fn flagged_source() -> Scripted {
        Scripted::new(
            Reply::Flagged(vec![(4.0, true, false), (3.0, false, false)]),
            Reply::Flagged(vec![(2.0, false, true)]),
            Reply::Flagged(vec![(1.0, true, true)]),
        )
    }

    #[tokio::test]
    async fn default_filter_keeps_read_and_archived() {
        let out = fetch_all(&flagged_source(), &FilterOptions::default())
            .await
            .expect("fetch");
        assert_eq!(times(&out.items), vec![4.0, 3.0, 2.0, 1.0]);
    }

    #[tokio::test]
    async fn hide_flags_drop_leaked_items() {
        let hide_read = FilterOptions {
            hide_read: true,
            ..FilterOptions::default()
        };
        let out = fetch_all(&flagged_source(), &hide_read).await.expect("fetch");
        assert_eq!(times(&out.items), vec![3.0, 2.0]);

        let hide_archived = FilterOptions {
            hide_archived: true,
            ..FilterOptions::default()
        };
        let out = fetch_all(&flagged_source(), &hide_archived).await.expect("fetch");
        assert_eq!(times(&out.items), vec![4.0, 3.0]);

        let hide_both = FilterOptions {
            hide_read: true,
            hide_archived: true,
            ..FilterOptions::default()
        };
        let out = fetch_all(&flagged_source(), &hide_both).await.expect("fetch");
        assert_eq!(times(&out.items), vec![3.0]);
    }

    #[tokio::test]
    async fn universe_scope_is_left_to_the_source() {
        let filter = FilterOptions {
            universe_id: Some("u7".into()),
            ..FilterOptions::default()
        };
        let out = fetch_all(&flagged_source(), &filter).await.expect("fetch");
        assert_eq!(out.items.len(), 4);
    }
}
