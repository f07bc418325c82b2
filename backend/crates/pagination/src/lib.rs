//! Keyset pagination primitives shared by the back-office listing endpoints.
//!
//! Listings are ordered by a stable key (usually the primary key) and fetched
//! with `WHERE key > :after ORDER BY key LIMIT :limit + 1`. The extra row only
//! signals that another page exists; it is never returned. The key of the last
//! returned row travels back to clients as an opaque [`Cursor`].
//!
//! Because each page starts strictly after the previous page's last key,
//! adjacent pages over an unchanged table neither repeat nor skip rows.

mod cursor;
mod envelope;
mod page;

pub use cursor::{Cursor, CursorError};
pub use envelope::{PaginationLinks, Paginated};
pub use page::{DEFAULT_LIMIT, MAX_LIMIT, Page, PageLimit, PageRequest};
