//! Pagination handling for Maileon list resources.
//!
//! List endpoints take 1-based `page_index` and `page_size` query parameters
//! and report the totals in the `X-Items` and `X-Pages` response headers.

use std::fmt;

use crate::client::QueryParameters;
use crate::errors::{MaileonError, MaileonResult};
use crate::response::ResponseWrapper;

/// Header carrying the total number of items.
pub const ITEMS_HEADER: &str = "X-Items";

/// Header carrying the total number of pages.
pub const PAGES_HEADER: &str = "X-Pages";

/// One page of a list resource.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Total number of items across all pages.
    pub total_items: u64,
    /// 1-based index of this page.
    pub page_index: u32,
    /// Requested page size.
    pub page_size: u32,
    /// Total number of pages as reported by the server.
    pub number_of_pages: u32,
    /// The items in this page.
    pub items: Vec<T>,
}

impl<T> Page<T> {
    /// Creates an empty page.
    pub fn new(page_index: u32, page_size: u32, total_items: u64, number_of_pages: u32) -> Self {
        Self {
            total_items,
            page_index,
            page_size,
            number_of_pages,
            items: Vec::new(),
        }
    }

    /// Sets the items of this page.
    pub fn with_items(mut self, items: Vec<T>) -> Self {
        self.items = items;
        self
    }

    /// Returns true if there is a next page.
    pub fn has_next(&self) -> bool {
        self.page_index < self.number_of_pages
    }

    /// Returns true if this is the last page.
    pub fn is_last(&self) -> bool {
        !self.has_next()
    }

    /// Returns the number of items in this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if this page is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Maps the items in this page to a different type.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            total_items: self.total_items,
            page_index: self.page_index,
            page_size: self.page_size,
            number_of_pages: self.number_of_pages,
            items: self.items.into_iter().map(f).collect(),
        }
    }
}

impl<T> fmt::Display for Page<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "page{{{} of {}. {} items}}",
            self.page_index,
            self.number_of_pages,
            self.items.len()
        )
    }
}

/// Query parameters selecting one page.
pub fn page_query(page_index: u32, page_size: u32) -> QueryParameters {
    QueryParameters::new()
        .add("page_index", page_index)
        .add("page_size", page_size)
}

/// Builds an empty page from the totals reported in the response headers.
///
/// # Errors
///
/// Returns [`MaileonError::Client`] when either header is missing or not a
/// non-negative integer.
pub fn derive_page<T>(
    page_index: u32,
    page_size: u32,
    response: &ResponseWrapper,
) -> MaileonResult<Page<T>> {
    let total_items = numeric_header::<u64>(response, ITEMS_HEADER)?;
    let number_of_pages = numeric_header::<u32>(response, PAGES_HEADER)?;

    Ok(Page::new(page_index, page_size, total_items, number_of_pages))
}

fn numeric_header<N: std::str::FromStr>(response: &ResponseWrapper, name: &str) -> MaileonResult<N> {
    let value = response
        .header(name)
        .ok_or_else(|| MaileonError::client(format!("missing {} header", name)))?;

    value
        .trim()
        .parse()
        .map_err(|_| MaileonError::client(format!("invalid {} header: '{}'", name, value)))
}

/// Fetches every page in order, starting at page 1.
///
/// `fetch` is called with each page index until the server reports no further
/// pages. The first error stops the walk.
pub fn collect_pages<T, F>(page_size: u32, mut fetch: F) -> MaileonResult<Vec<T>>
where
    F: FnMut(u32, u32) -> MaileonResult<Page<T>>,
{
    let mut items = Vec::new();
    let mut page_index = 1;

    loop {
        let page = fetch(page_index, page_size)?;
        let number_of_pages = page.number_of_pages;
        items.extend(page.items);

        if page_index >= number_of_pages {
            return Ok(items);
        }
        page_index += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use reqwest::header::{HeaderMap, HeaderValue};
    use reqwest::StatusCode;

    fn response(items: Option<&'static str>, pages: Option<&'static str>) -> ResponseWrapper {
        let mut headers = HeaderMap::new();
        if let Some(items) = items {
            headers.insert("x-items", HeaderValue::from_static(items));
        }
        if let Some(pages) = pages {
            headers.insert("x-pages", HeaderValue::from_static(pages));
        }
        ResponseWrapper::new(StatusCode::OK, headers, Bytes::new())
    }

    #[test]
    fn test_derive_page_from_headers() {
        let page: Page<String> = derive_page(3, 10, &response(Some("95"), Some("10"))).unwrap();

        assert_eq!(page.total_items, 95);
        assert_eq!(page.number_of_pages, 10);
        assert_eq!(page.page_index, 3);
        assert_eq!(page.page_size, 10);
        assert!(page.items.is_empty());
        assert!(page.has_next());
    }

    #[test]
    fn test_page_count_is_not_recomputed() {
        let page: Page<()> = derive_page(1, 10, &response(Some("95"), Some("7"))).unwrap();

        assert_eq!(page.number_of_pages, 7);
    }

    #[test]
    fn test_missing_header() {
        let result = derive_page::<()>(1, 10, &response(Some("95"), None));

        assert!(matches!(result, Err(MaileonError::Client { .. })));
    }

    #[test]
    fn test_invalid_header() {
        let result = derive_page::<()>(1, 10, &response(Some("lots"), Some("10")));

        assert!(matches!(result, Err(MaileonError::Client { .. })));
        let result = derive_page::<()>(1, 10, &response(Some("-1"), Some("10")));
        assert!(result.is_err());
    }

    #[test]
    fn test_page_map_and_display() {
        let page = Page::new(2, 2, 4, 2).with_items(vec![1, 2]).map(|n| n * 10);

        assert_eq!(page.items, vec![10, 20]);
        assert!(page.is_last());
        assert_eq!(page.to_string(), "page{2 of 2. 2 items}");
    }

    #[test]
    fn test_collect_pages() {
        let mut calls = Vec::new();
        let items = collect_pages(2, |index, size| {
            calls.push(index);
            let items = match index {
                1 => vec!["a", "b"],
                2 => vec!["c", "d"],
                _ => vec!["e"],
            };
            Ok(Page::new(index, size, 5, 3).with_items(items))
        })
        .unwrap();

        assert_eq!(items, vec!["a", "b", "c", "d", "e"]);
        assert_eq!(calls, vec![1, 2, 3]);
    }

    #[test]
    fn test_collect_pages_stops_on_error() {
        let result: MaileonResult<Vec<u8>> = collect_pages(10, |index, size| {
            if index == 2 {
                Err(MaileonError::client("boom"))
            } else {
                Ok(Page::new(index, size, 30, 3).with_items(vec![1]))
            }
        });

        assert!(result.is_err());
    }

    #[test]
    fn test_page_query() {
        let query = page_query(3, 100);

        assert_eq!(
            query.iter().collect::<Vec<_>>(),
            vec![("page_index", "3"), ("page_size", "100")]
        );
    }
}
