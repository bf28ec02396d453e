//! Request correlation and access logging.
//!
//! [`RequestTrace`] opens an `http_request` span per request. The span carries
//! the correlation id, method and path, plus a `user_id` field that stays
//! empty until the bearer token resolves to an account. The id comes from a
//! UUID-shaped `x-request-id` header when the caller sends one and is
//! generated otherwise. It is echoed on every response.
//!
//! Handlers read the id through [`RequestId::current`]. Tokio task-locals do
//! not follow `tokio::spawn`; wrap spawned work in [`RequestId::scope`].

use std::fmt;
use std::future::Future;
use std::rc::Rc;
use std::str::FromStr;
use std::task::{Context, Poll};
use std::time::Instant;

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::StatusCode;
use actix_web::http::header::{HeaderMap, HeaderName, HeaderValue};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tokio::task_local;
use tracing::{Instrument, Span, field, info, info_span, warn};
use uuid::Uuid;

/// Inbound and outbound correlation header.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

task_local! {
    static CURRENT: RequestId;
}

/// Correlation id of the request being served.
///
/// # Examples
/// ```
/// use backend::middleware::RequestId;
///
/// # tokio::runtime::Runtime::new().expect("runtime").block_on(async {
/// let id: RequestId = "00000000-0000-0000-0000-000000000000"
///     .parse()
///     .expect("valid UUID");
/// let seen = RequestId::scope(id, async { RequestId::current() }).await;
/// assert_eq!(seen, Some(id));
/// # });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestId(Uuid);

impl RequestId {
    fn fresh() -> Self {
        Self(Uuid::new_v4())
    }

    /// Reuse a well-formed inbound header, otherwise mint a new id.
    fn resolve(headers: &HeaderMap) -> Self {
        headers
            .get(REQUEST_ID_HEADER)
            .and_then(|raw| raw.to_str().ok())
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or_else(Self::fresh)
    }

    /// Id in scope for the current task, if any.
    pub fn current() -> Option<Self> {
        CURRENT.try_with(|id| *id).ok()
    }

    /// Run `fut` with `id` as the current request id.
    pub async fn scope<F: Future>(id: Self, fut: F) -> F::Output {
        CURRENT.scope(id, fut).await
    }

    fn header_value(self) -> Option<HeaderValue> {
        HeaderValue::from_str(&self.0.hyphenated().to_string()).ok()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for RequestId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Record the authenticated account on the enclosing request span.
pub fn record_user(user_id: &impl fmt::Display) {
    Span::current().record("user_id", field::display(user_id));
}

/// Access-log middleware. Register once on the `App`.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use backend::middleware::RequestTrace;
///
/// let app = App::new().wrap(RequestTrace);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestTrace;

impl<S, B> Transform<S, ServiceRequest> for RequestTrace
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestTraceService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestTraceService {
            inner: Rc::new(service),
        }))
    }
}

/// Service produced by [`RequestTrace`].
pub struct RequestTraceService<S> {
    inner: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequestTraceService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let id = RequestId::resolve(req.headers());
        let span = info_span!(
            "http_request",
            request_id = %id,
            method = %req.method(),
            path = %req.path(),
            user_id = field::Empty,
        );
        let inner = Rc::clone(&self.inner);
        let started = Instant::now();

        let handled = async move {
            let mut res = inner.call(req).await?;
            log_completion(res.status(), started);
            if let Some(value) = id.header_value() {
                res.headers_mut()
                    .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
            }
            Ok(res)
        };
        Box::pin(RequestId::scope(id, handled).instrument(span))
    }
}

fn log_completion(status: StatusCode, started: Instant) {
    let elapsed_ms = started.elapsed().as_millis();
    if status.is_server_error() {
        warn!(status = status.as_u16(), elapsed_ms, "request failed");
    } else {
        info!(status = status.as_u16(), elapsed_ms, "request completed");
    }
}

#[cfg(test)]
mod tests {
    //! Correlation id propagation.
    use super::*;
    use actix_web::test as actix_test;
    use actix_web::{App, HttpResponse, web};
    use rstest::rstest;

    async fn echo_current() -> HttpResponse {
        match RequestId::current() {
            Some(id) => HttpResponse::Ok().body(id.to_string()),
            None => HttpResponse::InternalServerError().finish(),
        }
    }

    async fn fetch(header: Option<&str>) -> (Option<String>, String) {
        let app = actix_test::init_service(
            App::new()
                .wrap(RequestTrace)
                .route("/", web::get().to(echo_current)),
        )
        .await;
        let mut req = actix_test::TestRequest::get().uri("/");
        if let Some(value) = header {
            req = req.insert_header((REQUEST_ID_HEADER, value));
        }
        let res = actix_test::call_service(&app, req.to_request()).await;
        let echoed = res
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = actix_test::read_body(res).await;
        (echoed, String::from_utf8(body.to_vec()).expect("utf8 body"))
    }

    #[rstest]
    #[tokio::test]
    async fn nothing_is_current_outside_a_request() {
        assert!(RequestId::current().is_none());
    }

    #[rstest]
    #[actix_web::test]
    async fn minted_id_reaches_handler_and_response() {
        let (echoed, body) = fetch(None).await;
        let echoed = echoed.expect("request id header");
        assert!(Uuid::parse_str(&echoed).is_ok());
        assert_eq!(body, echoed);
    }

    #[rstest]
    #[actix_web::test]
    async fn caller_id_is_kept() {
        let inbound = "6f1c1a47-5a0e-4c55-9d7e-0a4c3c6e2b11";
        let (echoed, body) = fetch(Some(inbound)).await;
        assert_eq!(echoed.as_deref(), Some(inbound));
        assert_eq!(body, inbound);
    }

    #[rstest]
    #[case("<script>")]
    #[case("12345")]
    #[actix_web::test]
    async fn malformed_caller_id_is_replaced(#[case] inbound: &str) {
        let (echoed, _) = fetch(Some(inbound)).await;
        let echoed = echoed.expect("request id header");
        assert_ne!(echoed, inbound);
        assert!(Uuid::parse_str(&echoed).is_ok());
    }

    #[rstest]
    #[actix_web::test]
    async fn recording_outside_a_span_is_harmless() {
        record_user(&"no-span");
        assert!(RequestId::current().is_none());
    }
}
