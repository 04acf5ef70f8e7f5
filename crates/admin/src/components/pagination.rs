//! Page-number navigation under list tables.

use serde::Serialize;

use crate::api::{ListQuery, Page};

/// Most page links shown at once.
pub const MAX_PAGE_LINKS: u32 = 5;

/// One numbered link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageLink {
    pub number: u32,
    pub href: String,
    pub current: bool,
}

/// Pagination controls for a list page.
#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    pub links: Vec<PageLink>,
    pub prev_href: Option<String>,
    pub next_href: Option<String>,
    /// "Showing 21–40 of 57".
    pub summary: String,
}

/// The page numbers to link, at most [`MAX_PAGE_LINKS`], containing `current`.
#[must_use]
pub fn page_window(current: u32, total_pages: u32) -> Vec<u32> {
    let total = total_pages.max(1);
    let current = current.clamp(1, total);
    let half = MAX_PAGE_LINKS / 2;

    let mut start = current.saturating_sub(half).max(1);
    let end = (start + MAX_PAGE_LINKS - 1).min(total);
    if end - start + 1 < MAX_PAGE_LINKS {
        start = end.saturating_sub(MAX_PAGE_LINKS - 1).max(1);
    }
    (start..=end).collect()
}

impl Pagination {
    /// Build links for `page`, keeping the search and filters of `query`.
    #[must_use]
    pub fn new<T>(path: &str, query: &ListQuery, page: &Page<T>) -> Self {
        let href = |number: u32| {
            let mut target = query.clone();
            target.page = number;
            format!("{path}?{}", target.to_query_string())
        };

        let total_pages = page.total_pages();
        let current = page.page.clamp(1, total_pages);
        let links = page_window(current, total_pages)
            .into_iter()
            .map(|number| PageLink {
                number,
                href: href(number),
                current: number == current,
            })
            .collect();

        let summary = if page.total == 0 {
            "No results".to_string()
        } else {
            let first = u64::from(current - 1) * u64::from(page.limit) + 1;
            let shown = u64::try_from(page.data.len()).unwrap_or(0);
            let last = (first + shown).saturating_sub(1).max(first);
            format!("Showing {first}–{last} of {}", page.total)
        };

        Self {
            links,
            prev_href: page.has_prev().then(|| href(current - 1)),
            next_href: page.has_next().then(|| href(current + 1)),
            summary,
        }
    }

    /// Whether there is more than one page.
    #[must_use]
    pub fn is_multi_page(&self) -> bool {
        self.links.len() > 1
    }
}
