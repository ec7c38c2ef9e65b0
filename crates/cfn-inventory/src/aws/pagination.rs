//! Token-driven page draining shared by the listing adapters

use crate::walker::TraversalError;
use anyhow::Result;
use std::collections::HashSet;
use std::future::Future;
use tracing::trace;

/// One fetched page and the token for the next, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_token: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next_token: Option<String>) -> Self {
        Self { items, next_token }
    }
}

/// IAM reports a marker even on the last page; only `IsTruncated` says
/// whether another page exists.
pub fn truncated_marker(marker: Option<&str>, is_truncated: bool) -> Option<String> {
    marker.filter(|_| is_truncated).map(str::to_string)
}

/// Fetch pages until the continuation token runs out, keeping items in
/// page order.
///
/// Fails with [`TraversalError::PageLimitExceeded`] before fetching page
/// `max_pages + 1`, and with [`TraversalError::RepeatedToken`] when the
/// service hands back a token it already gave.
pub async fn drain_pages<T, F, Fut>(
    operation: &'static str,
    max_pages: usize,
    mut fetch: F,
) -> Result<Vec<T>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let mut items = Vec::new();
    let mut token: Option<String> = None;
    let mut seen = HashSet::new();
    let mut pages = 0usize;

    loop {
        if pages == max_pages {
            return Err(TraversalError::PageLimitExceeded {
                operation,
                limit: max_pages,
            }
            .into());
        }
        pages += 1;

        let page = fetch(token.take()).await?;
        items.extend(page.items);

        match page.next_token {
            Some(next) => {
                if !seen.insert(next.clone()) {
                    return Err(TraversalError::RepeatedToken {
                        operation,
                        token: next,
                    }
                    .into());
                }
                trace!(operation, pages, "Following continuation token");
                token = Some(next);
            }
            None => break,
        }
    }

    Ok(items)
}
