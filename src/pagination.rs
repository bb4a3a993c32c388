//! Generic cursor-based traversal over paginated listing endpoints.
//!
//! GitHub communicates pagination through the `Link` response header. A
//! [`Page`] captures one response's items plus the decoded cursor, and
//! [`walk`] drains every page of a listing through a page-fetch closure.
//! The walk is an explicit loop rather than self-recursion so the call
//! stack stays flat no matter how many repositories an organization has.

use std::future::Future;

use crate::error::Error;

/// Default page size requested from every listing endpoint.
pub const PER_PAGE: u32 = 100;

/// One page of a listing plus its pagination cursor.
#[derive(Debug, Clone, Default)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Page number from the `rel="next"` link, if any.
    pub next_page: Option<u32>,
    /// Page number from the `rel="last"` link, if any.
    pub last_page: Option<u32>,
}

impl<T> Page<T> {
    /// Decide the page to fetch after `current`, or `None` when the listing
    /// is exhausted. A missing next cursor, a next cursor equal to the
    /// current page, or a last-page marker equal to the current page all
    /// signal the end of the traversal.
    pub fn advance(&self, current: u32) -> Option<u32> {
        if self.last_page == Some(current) {
            return None;
        }
        match self.next_page {
            None => None,
            Some(0) => None,
            Some(next) if next == current => None,
            Some(next) => Some(next),
        }
    }
}

/// Drain every page of a listing, yielding the concatenation of all pages'
/// items in order. `fetch` is called once per page, starting at page 1, and
/// any fetch error aborts the walk immediately.
pub async fn walk<T, F, Fut>(mut fetch: F) -> Result<Vec<T>, Error>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Page<T>, Error>>,
{
    let mut items = Vec::new();
    let mut current = 1u32;

    loop {
        let page = fetch(current).await?;
        let next = page.advance(current);
        items.extend(page.items);
        match next {
            Some(next) => current = next,
            None => break,
        }
    }

    Ok(items)
}

/// Parse GitHub's `Link` header into next/last page numbers.
///
/// The header looks like:
/// `<https://api.github.com/user/repos?per_page=100&page=2>; rel="next",
///  <https://api.github.com/user/repos?per_page=100&page=4>; rel="last"`
pub fn parse_link_header(header: &str) -> (Option<u32>, Option<u32>) {
    let mut next_page = None;
    let mut last_page = None;

    for entry in header.split(',') {
        let mut url = None;
        let mut rel = None;

        for segment in entry.trim().split(';') {
            let segment = segment.trim();
            if let Some(inner) = segment
                .strip_prefix('<')
                .and_then(|s| s.strip_suffix('>'))
            {
                url = Some(inner);
            } else if let Some(value) = segment.strip_prefix("rel=") {
                rel = Some(value.trim_matches('"'));
            }
        }

        let page = url.and_then(page_query_param);
        match (rel, page) {
            (Some("next"), Some(n)) => next_page = Some(n),
            (Some("last"), Some(n)) => last_page = Some(n),
            _ => {}
        }
    }

    (next_page, last_page)
}

/// Pull the `page` query parameter out of a pagination URL.
fn page_query_param(url: &str) -> Option<u32> {
    let query = url.split_once('?')?.1;
    query
        .split('&')
        .find_map(|param| param.strip_prefix("page="))
        .and_then(|value| value.parse().ok())
}
