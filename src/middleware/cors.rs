use axum::http::{header, Method};
use tower_http::cors::{Any, CorsLayer};

/// Browser access for the applicant front end and the HR dashboards.
pub fn portal_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_origin(Any)
}
