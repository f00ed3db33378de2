use crate::domain::user::Role;
use crate::infrastructure::security::authorize;
use crate::presentation::handlers::ApiError;
use actix_web::{
    Error, HttpMessage, ResponseError,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{self, HeaderName, HeaderValue},
};
use std::{
    future::{Ready, ready},
    pin::Pin,
    rc::Rc,
    sync::Arc,
    task::{Context, Poll},
    time::Instant,
};
use tracing::{info, warn};
use uuid::Uuid;

/// Name of the http-only cookie carrying the session token.
pub const TOKEN_COOKIE: &str = "token";

struct GuardConfig {
    jwt_secret: String,
    allowed_roles: Vec<Role>,
}

/// Per-scope auth gate. Extracts the token from the `token` cookie or the
/// `Authorization: Bearer` header (cookie wins), verifies it, checks the
/// allow-list, and hands the decoded identity to handlers through request
/// extensions. Rejections short-circuit as 401/403 before the handler runs.
pub struct AuthGuard {
    config: Arc<GuardConfig>,
}

impl AuthGuard {
    /// Authentication-only gate: any validly signed token passes.
    pub fn authenticated(jwt_secret: String) -> Self {
        Self::allow(jwt_secret, &[])
    }

    /// Role-gated: a verified token must carry one of `roles`.
    pub fn allow(jwt_secret: String, roles: &[Role]) -> Self {
        Self {
            config: Arc::new(GuardConfig {
                jwt_secret,
                allowed_roles: roles.to_vec(),
            }),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthGuardService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthGuardService {
            service: Rc::new(service),
            config: self.config.clone(),
        }))
    }
}

pub struct AuthGuardService<S> {
    service: Rc<S>,
    config: Arc<GuardConfig>,
}

impl<S, B> Service<ServiceRequest> for AuthGuardService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        let token = req
            .request()
            .cookie(TOKEN_COOKIE)
            .map(|c| c.value().to_string())
            .or_else(|| bearer_token(&req));

        match authorize(
            token.as_deref(),
            &self.config.allowed_roles,
            &self.config.jwt_secret,
        ) {
            Ok(user) => {
                req.extensions_mut().insert(user);
                let fut = service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Err(e) => {
                warn!(path = %req.path(), error = %e, "Request rejected by auth gate");
                // The rejection is a materialized response, not a service
                // error, so nothing downstream runs.
                let (req, _payload) = req.into_parts();
                let response = ApiError::from(e).error_response().map_into_right_body();
                Box::pin(ready(Ok(ServiceResponse::new(req, response))))
            }
        }
    }
}

fn bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|t| t.trim().to_string())
}

/// Tags every request with a UUID and logs method/path/duration on the way
/// out, echoing both as `x-request-id` and `x-response-time` headers.
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
            service: Rc::new(service),
        }))
    }
}

pub struct RequestTraceService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequestTraceService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let request_id = Uuid::new_v4().to_string();
        let start = Instant::now();
        let method = req.method().clone();
        let path = req.path().to_string();

        let fut = service.call(req);

        Box::pin(async move {
            let mut res = fut.await?;
            let duration_ms = start.elapsed().as_millis();

            res.headers_mut().insert(
                HeaderName::from_static("x-request-id"),
                HeaderValue::from_str(&request_id)
                    .unwrap_or_else(|_| HeaderValue::from_static("unknown")),
            );
            res.headers_mut().insert(
                HeaderName::from_static("x-response-time"),
                HeaderValue::from_str(&format!("{}ms", duration_ms))
                    .unwrap_or_else(|_| HeaderValue::from_static("0ms")),
            );

            info!(
                method = %method,
                path = %path,
                duration_ms = duration_ms,
                request_id = %request_id,
                "Request processed"
            );

            Ok(res)
        })
    }
}
