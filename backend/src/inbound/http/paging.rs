//! Glue between listing handlers and the `pagination` crate.
//!
//! Handlers decode `cursor`/`limit` into a [`PageRequest`] before calling a
//! port, then wrap the returned [`Page`] in the `{ data, limit, links }`
//! envelope using the URL the client actually requested.

use actix_web::{HttpRequest, HttpResponse};
use pagination::{Page, PageRequest, Paginated};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use super::validation::invalid_cursor_error;
use crate::domain::Error;

/// Decode raw `cursor` and `limit` query values.
pub(crate) fn page_request<K: DeserializeOwned>(
    cursor: Option<&str>,
    limit: Option<u32>,
) -> Result<PageRequest<K>, Error> {
    PageRequest::from_params(cursor, limit).map_err(invalid_cursor_error)
}

fn request_url(req: &HttpRequest) -> Result<Url, Error> {
    let info = req.connection_info();
    let raw = format!("{}://{}{}", info.scheme(), info.host(), req.uri());
    Url::parse(&raw).map_err(|err| Error::internal(format!("unparseable request url {raw}: {err}")))
}

/// Render a page of domain rows as the paginated JSON envelope.
pub(crate) fn page_response<T, K, R, F>(
    req: &HttpRequest,
    page: Page<T, K>,
    render: F,
) -> Result<HttpResponse, Error>
where
    K: Serialize,
    R: Serialize,
    F: FnMut(T) -> R,
{
    let url = request_url(req)?;
    let body = Paginated::from_page(page.map(render), &url)
        .map_err(|err| Error::internal(format!("failed to encode next cursor: {err}")))?;
    Ok(HttpResponse::Ok().json(body))
}
