//! JSON response envelope for paginated listings.

use serde::Serialize;
use url::Url;

use crate::cursor::CursorError;
use crate::page::Page;

const CURSOR_PARAM: &str = "cursor";

/// Navigation links for a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationLinks {
    /// URL of the current page as requested.
    #[serde(rename = "self")]
    pub self_: String,
    /// URL of the following page, absent on the last page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

impl PaginationLinks {
    /// Build links for `request_url`, replacing its `cursor` query pair with
    /// `next_cursor` for the following page.
    ///
    /// # Examples
    /// ```
    /// use pagination::PaginationLinks;
    /// use url::Url;
    ///
    /// let url = Url::parse("http://localhost/api/v1/products?category=tea&cursor=abc")
    ///     .expect("valid url");
    /// let links = PaginationLinks::from_request_url(&url, Some("def"));
    /// assert_eq!(
    ///     links.next.as_deref(),
    ///     Some("http://localhost/api/v1/products?category=tea&cursor=def")
    /// );
    /// ```
    #[must_use]
    pub fn from_request_url(request_url: &Url, next_cursor: Option<&str>) -> Self {
        let next = next_cursor.map(|cursor| {
            let retained: Vec<(String, String)> = request_url
                .query_pairs()
                .filter(|(name, _)| name != CURSOR_PARAM)
                .map(|(name, value)| (name.into_owned(), value.into_owned()))
                .collect();
            let mut next_url = request_url.clone();
            next_url
                .query_pairs_mut()
                .clear()
                .extend_pairs(retained)
                .append_pair(CURSOR_PARAM, cursor);
            next_url.to_string()
        });
        Self {
            self_: request_url.to_string(),
            next,
        }
    }
}

/// Paginated response body: `{ data, limit, links }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paginated<T> {
    /// Rows on this page.
    pub data: Vec<T>,
    /// Effective page size.
    pub limit: u32,
    /// Navigation links.
    pub links: PaginationLinks,
}

impl<T> Paginated<T> {
    /// Wrap a page for the response to `request_url`.
    ///
    /// # Errors
    /// Returns [`CursorError`] when the next cursor cannot be encoded.
    pub fn from_page<K: Serialize>(page: Page<T, K>, request_url: &Url) -> Result<Self, CursorError> {
        let limit = page.limit().get();
        let (data, next) = page.into_parts();
        let token = next.map(|cursor| cursor.encode()).transpose()?;
        Ok(Self {
            data,
            limit,
            links: PaginationLinks::from_request_url(request_url, token.as_deref()),
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::{Cursor, PageLimit};
    use rstest::rstest;

    fn url(raw: &str) -> Url {
        Url::parse(raw).expect("valid url")
    }

    #[rstest]
    fn last_page_has_no_next_link() {
        let links = PaginationLinks::from_request_url(&url("http://h/items?limit=5"), None);
        assert_eq!(links.self_, "http://h/items?limit=5");
        assert!(links.next.is_none());
    }

    #[rstest]
    fn next_link_keeps_other_parameters() {
        let links =
            PaginationLinks::from_request_url(&url("http://h/items?limit=5&customerId=C1"), Some("xyz"));
        assert_eq!(
            links.next.as_deref(),
            Some("http://h/items?limit=5&customerId=C1&cursor=xyz")
        );
    }

    #[rstest]
    fn envelope_serialises_self_link_name() {
        let page = Page::from_overfetch(vec![1_i32, 2, 3], PageLimit::new(Some(2)), |row| *row);
        let body = Paginated::from_page(page, &url("http://h/items")).expect("envelope");
        let value = serde_json::to_value(&body).expect("json");

        assert_eq!(value["limit"], 2);
        assert_eq!(value["data"], serde_json::json!([1, 2]));
        assert_eq!(value["links"]["self"], "http://h/items");
        let expected_cursor = Cursor::new(2_i32).encode().expect("encode");
        assert_eq!(
            value["links"]["next"],
            format!("http://h/items?cursor={expected_cursor}")
        );
    }
}
