//! CORS policy for entity resources
//!
//! Browser clients can only read response headers that CORS exposes, so the
//! permissive policy exposes the pagination headers and the error-count header
//! in addition to allowing any origin.

use std::time::Duration;

use axum::http::{HeaderName, Method};
use tower_http::cors::{AllowHeaders, Any, CorsLayer};

use crate::config::PaginationConfig;
use crate::handlers::NUMBER_OF_ERRORS_HEADER;

/// Preflight cache lifetime (30 days)
pub const PREFLIGHT_MAX_AGE: Duration = Duration::from_secs(2_592_000);

/// Response headers a browser client needs to read
pub fn exposed_headers(pagination: &PaginationConfig) -> Vec<HeaderName> {
    [
        pagination.start_header.as_str(),
        pagination.count_header.as_str(),
        pagination.total_count_header.as_str(),
        NUMBER_OF_ERRORS_HEADER,
    ]
    .into_iter()
    .filter_map(|name| match HeaderName::from_bytes(name.as_bytes()) {
        Ok(header) => Some(header),
        Err(_) => {
            tracing::warn!(header = name, "Ignoring invalid header name in CORS exposure list");
            None
        }
    })
    .collect()
}

/// Build the CORS layer for a `cors_mode` setting
///
/// - `"permissive"`: any origin, the usual REST methods, request headers
///   echoed back, `exposed` headers readable
/// - `"restrictive"`: default-deny layer
/// - `"disabled"`: no layer
///
/// Unknown modes fall back to permissive.
pub fn cors_layer(mode: &str, exposed: Vec<HeaderName>) -> Option<CorsLayer> {
    let permissive = || {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::DELETE,
                Method::PUT,
                Method::OPTIONS,
            ])
            .allow_headers(AllowHeaders::mirror_request())
            .expose_headers(exposed)
            .max_age(PREFLIGHT_MAX_AGE)
    };

    match mode {
        "permissive" => {
            tracing::debug!("Enabling permissive CORS");
            Some(permissive())
        }
        "restrictive" => {
            tracing::debug!("Enabling restrictive CORS (default deny)");
            Some(CorsLayer::new())
        }
        "disabled" => {
            tracing::debug!("CORS disabled");
            None
        }
        other => {
            tracing::warn!(mode = other, "Unknown CORS mode, defaulting to permissive");
            Some(permissive())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    #[test]
    fn test_exposed_headers_follow_config() {
        let headers = exposed_headers(&PaginationConfig::default());
        let names: Vec<&str> = headers.iter().map(HeaderName::as_str).collect();
        assert_eq!(
            names,
            vec!["x-start", "x-count", "x-total-count", "x-number-of-errors"]
        );
    }

    #[test]
    fn test_invalid_header_names_are_skipped() {
        let config = PaginationConfig {
            start_header: "bad header".to_string(),
            ..PaginationConfig::default()
        };
        assert_eq!(exposed_headers(&config).len(), 3);
    }

    #[test]
    fn test_modes() {
        assert!(cors_layer("permissive", Vec::new()).is_some());
        assert!(cors_layer("restrictive", Vec::new()).is_some());
        assert!(cors_layer("disabled", Vec::new()).is_none());
        assert!(cors_layer("something-else", Vec::new()).is_some());
    }

    #[tokio::test]
    async fn test_permissive_exposes_headers() {
        let layer = cors_layer("permissive", exposed_headers(&PaginationConfig::default()))
            .unwrap();
        let app = Router::new().route("/", get(|| async { "ok" })).layer(layer);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header(header::ORIGIN, "https://example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        let exposed = response.headers()[header::ACCESS_CONTROL_EXPOSE_HEADERS]
            .to_str()
            .unwrap();
        assert!(exposed.contains("x-total-count"));
        assert!(exposed.contains("x-number-of-errors"));
    }
}
