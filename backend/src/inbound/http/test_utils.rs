//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpResponse, test, web};
use mockable::DefaultClock;

use super::error::{json_error_handler, path_error_handler, query_error_handler};
use super::session::SessionContext;
use super::state::HttpState;
use super::ApiResult;
use crate::domain::UserId;
use crate::domain::ports::{
    MockCustomerRepository, MockDashboardQuery, MockInventoryRepository, MockLoginService,
    MockOrderRepository, MockPaymentRepository, MockProductRepository, MockRegistrationService,
    MockUserProfileQuery,
};

/// Staff user every signed-in test request acts as.
pub const TEST_USER: UserId = UserId::new(7);

const SIGN_IN_PATH: &str = "/test/sign-in";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// State whose ports panic when called; tests replace the ones they use.
pub fn unused_state() -> HttpState {
    HttpState {
        login: Arc::new(MockLoginService::new()),
        registration: Arc::new(MockRegistrationService::new()),
        profile: Arc::new(MockUserProfileQuery::new()),
        customers: Arc::new(MockCustomerRepository::new()),
        products: Arc::new(MockProductRepository::new()),
        inventory: Arc::new(MockInventoryRepository::new()),
        orders: Arc::new(MockOrderRepository::new()),
        payments: Arc::new(MockPaymentRepository::new()),
        dashboard: Arc::new(MockDashboardQuery::new()),
        clock: Arc::new(DefaultClock),
    }
}

async fn sign_in(session: SessionContext) -> ApiResult<HttpResponse> {
    session.persist_user(TEST_USER)?;
    Ok(HttpResponse::NoContent().finish())
}

/// App wired like production (session, error handlers, `/api/v1` scope) with
/// an extra route that signs in as [`TEST_USER`].
pub fn test_app<F>(
    state: HttpState,
    configure: F,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    F: FnOnce(&mut web::ServiceConfig),
{
    App::new()
        .app_data(web::Data::new(state))
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        .wrap(test_session_middleware())
        .route(SIGN_IN_PATH, web::post().to(sign_in))
        .service(web::scope("/api/v1").configure(configure))
}

/// Extract the session cookie set by a response.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}

/// Sign in through the test route and return the session cookie.
pub async fn signed_in<S>(app: &S) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = test::call_service(app, test::TestRequest::post().uri(SIGN_IN_PATH).to_request())
        .await;
    assert!(res.status().is_success(), "test sign-in failed");
    session_cookie(&res)
}
