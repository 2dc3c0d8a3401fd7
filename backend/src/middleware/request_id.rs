//! Middleware attaching a per-request identifier.
//!
//! Every request receives a UUID which is stored in the request
//! extensions and echoed back in the `x-request-id` response header.
//! Handlers can extract [`RequestId`] to correlate log lines and error
//! payloads with a specific request.

use std::task::{Context, Poll};

use actix_web::dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::{FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use tracing::error;
use uuid::Uuid;

use crate::domain::Error;

/// Response header carrying the request identifier.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Identifier assigned to a single request by [`RequestTracking`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestId(Uuid);

impl RequestId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromRequest for RequestId {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let id = req.extensions().get::<RequestId>().copied();
        ready(id.ok_or_else(|| {
            error!("request id extracted without the tracking middleware installed");
            Error::internal("Internal server error")
        }))
    }
}

/// Middleware assigning a [`RequestId`] to each request and echoing it in
/// the response headers. Error responses that already carry the header,
/// written by the error renderer, are left untouched.
#[derive(Clone)]
pub struct RequestTracking;

impl<S, B> Transform<S, ServiceRequest> for RequestTracking
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = RequestTrackingMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestTrackingMiddleware { service }))
    }
}

/// Service wrapper produced by [`RequestTracking`].
pub struct RequestTrackingMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestTrackingMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let id = RequestId::generate();
        req.extensions_mut().insert(id);
        let fut = self.service.call(req);
        Box::pin(async move {
            let mut res = fut.await?;
            if !res.headers().contains_key(REQUEST_ID_HEADER) {
                match HeaderValue::from_str(&id.to_string()) {
                    Ok(value) => {
                        res.response_mut()
                            .headers_mut()
                            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
                    }
                    Err(encode_error) => {
                        error!(error = %encode_error, %id, "failed to encode request id header");
                    }
                }
            }
            Ok(res)
        })
    }
}
