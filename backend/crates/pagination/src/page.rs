//! Page sizing, requests and over-fetched result pages.

use serde::de::DeserializeOwned;

use crate::cursor::{Cursor, CursorError};

/// Page size used when the client does not supply one.
pub const DEFAULT_LIMIT: u32 = 20;
/// Largest page size a client may request.
pub const MAX_LIMIT: u32 = 100;

/// Page size clamped into `1..=MAX_LIMIT`.
///
/// # Examples
/// ```
/// use pagination::{PageLimit, DEFAULT_LIMIT, MAX_LIMIT};
///
/// assert_eq!(PageLimit::new(None).get(), DEFAULT_LIMIT);
/// assert_eq!(PageLimit::new(Some(0)).get(), 1);
/// assert_eq!(PageLimit::new(Some(5_000)).get(), MAX_LIMIT);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimit(u32);

impl PageLimit {
    /// Clamp a requested page size, falling back to [`DEFAULT_LIMIT`].
    #[must_use]
    pub fn new(requested: Option<u32>) -> Self {
        Self(requested.map_or(DEFAULT_LIMIT, |value| value.clamp(1, MAX_LIMIT)))
    }

    /// Effective page size.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Row count to request from storage: one more than the page size so a
    /// following page can be detected without a second query.
    #[must_use]
    pub fn fetch_limit(self) -> i64 {
        i64::from(self.0) + 1
    }

    fn as_len(self) -> usize {
        usize::try_from(self.0).unwrap_or(usize::MAX)
    }
}

impl Default for PageLimit {
    fn default() -> Self {
        Self(DEFAULT_LIMIT)
    }
}

/// Keyset page request: start strictly after `after`, return at most `limit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest<K> {
    after: Option<K>,
    limit: PageLimit,
}

impl<K> PageRequest<K> {
    /// Build a request from an already decoded key.
    pub const fn new(after: Option<K>, limit: PageLimit) -> Self {
        Self { after, limit }
    }

    /// Request the first page with the given limit.
    pub const fn first(limit: PageLimit) -> Self {
        Self { after: None, limit }
    }

    /// Key the page starts after, if any.
    pub const fn after(&self) -> Option<&K> {
        self.after.as_ref()
    }

    /// Effective page size.
    pub const fn limit(&self) -> PageLimit {
        self.limit
    }

    /// Row count to request from storage.
    pub fn fetch_limit(&self) -> i64 {
        self.limit.fetch_limit()
    }
}

impl<K: DeserializeOwned> PageRequest<K> {
    /// Build a request from raw `cursor` and `limit` query values.
    ///
    /// # Errors
    /// Returns [`CursorError`] when the cursor cannot be decoded as `K`.
    pub fn from_params(cursor: Option<&str>, limit: Option<u32>) -> Result<Self, CursorError> {
        let after = cursor
            .filter(|token| !token.trim().is_empty())
            .map(Cursor::<K>::decode)
            .transpose()?
            .map(Cursor::into_key);
        Ok(Self::new(after, PageLimit::new(limit)))
    }
}

/// One page of rows plus the cursor for the following page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T, K> {
    items: Vec<T>,
    limit: PageLimit,
    next: Option<Cursor<K>>,
}

impl<T, K> Page<T, K> {
    /// Build a page from rows fetched with [`PageRequest::fetch_limit`].
    ///
    /// `rows` must already be ordered by the key `key_of` extracts. When more
    /// than `limit` rows are present the surplus is dropped and the key of
    /// the last kept row becomes the next cursor.
    ///
    /// # Examples
    /// ```
    /// use pagination::{Page, PageLimit};
    ///
    /// let page = Page::from_overfetch(vec![1, 2, 3], PageLimit::new(Some(2)), |row| *row);
    /// assert_eq!(page.items(), &[1, 2]);
    /// assert_eq!(page.next().map(|cursor| *cursor.key()), Some(2));
    /// ```
    pub fn from_overfetch<F>(mut rows: Vec<T>, limit: PageLimit, key_of: F) -> Self
    where
        F: Fn(&T) -> K,
    {
        let has_more = rows.len() > limit.as_len();
        rows.truncate(limit.as_len());
        let next = if has_more {
            rows.last().map(|row| Cursor::new(key_of(row)))
        } else {
            None
        };
        Self {
            items: rows,
            limit,
            next,
        }
    }

    /// Rows on this page.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Page size the page was built with.
    pub const fn limit(&self) -> PageLimit {
        self.limit
    }

    /// Cursor for the following page, if one exists.
    pub const fn next(&self) -> Option<&Cursor<K>> {
        self.next.as_ref()
    }

    /// Convert each row while keeping the page position.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> Page<U, K>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            limit: self.limit,
            next: self.next,
        }
    }

    /// Split the page into rows and next cursor.
    pub fn into_parts(self) -> (Vec<T>, Option<Cursor<K>>) {
        (self.items, self.next)
    }
}
