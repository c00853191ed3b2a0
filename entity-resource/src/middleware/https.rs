//! HTTPS redirection behind a TLS-terminating proxy
//!
//! Load balancers report the client's scheme in `X-Forwarded-Proto`. When it
//! is present and not `https`, the request is answered with `302 Found`
//! pointing at the same host and path over https. The query string is
//! dropped so nothing sent in clear text is echoed back. Requests without
//! the header pass through untouched.

use axum::{
    extract::Request,
    http::{header, HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

pub const FORWARDED_PROTO_HEADER: HeaderName = HeaderName::from_static("x-forwarded-proto");

/// `axum::middleware::from_fn` middleware redirecting plain-HTTP requests
pub async fn https_redirect(request: Request, next: Next) -> Response {
    let insecure = request
        .headers()
        .get(FORWARDED_PROTO_HEADER)
        .map(|proto| !proto.as_bytes().eq_ignore_ascii_case(b"https"))
        .unwrap_or(false);

    if !insecure {
        return next.run(request).await;
    }

    match https_location(&request) {
        Some(location) => {
            tracing::debug!(location = ?location, "Redirecting to HTTPS");
            (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
        }
        None => {
            tracing::warn!(uri = %request.uri(), "Cannot build HTTPS redirect, passing request through");
            next.run(request).await
        }
    }
}

fn https_location(request: &Request) -> Option<HeaderValue> {
    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|host| host.to_str().ok())
        .map(str::to_string)
        .or_else(|| request.uri().authority().map(ToString::to_string))?;

    HeaderValue::from_str(&format!("https://{host}{}", request.uri().path())).ok()
}
