pub mod account;
pub mod dashboard;
pub mod health;
pub mod jobs;
pub mod reference;
pub mod wizard;

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::config::Config;
use crate::middleware::rate_limit::{rate_limit, RateLimiter};
use crate::AppState;

/// Every portal route. Applicant-facing routes are limited per client; file
/// uploads and submission also draw on a tighter per-minute budget.
pub fn app(state: AppState, config: &Config) -> Router {
    let base_routes = Router::new().route("/health", get(health::health));

    let upload_api = Router::new()
        .route(
            "/api/wizard/:id/attachments/:slot",
            post(wizard::upload_attachment).delete(wizard::remove_attachment),
        )
        .route("/api/wizard/:id/submit", post(wizard::submit))
        .layer(axum::middleware::from_fn_with_state(
            RateLimiter::per_minute("uploads", config.upload_per_minute),
            rate_limit,
        ));

    let public_api = Router::new()
        .route("/api/jobs", get(jobs::list_jobs))
        .route("/api/jobs/featured", get(jobs::featured_jobs))
        .route("/api/jobs/search", get(jobs::search_jobs))
        .route("/api/jobs/:id", get(jobs::get_job))
        .route("/api/business-units", get(jobs::list_business_units))
        .route("/api/business-units/:id", get(jobs::get_business_unit))
        .route("/api/business-units/:id/jobs", get(jobs::business_unit_jobs))
        .route(
            "/api/applications/:id/status",
            get(jobs::application_status),
        )
        .route("/api/countries", get(reference::list_countries))
        .route("/api/auth/login", post(account::login))
        .route("/api/auth/register", post(account::register))
        .route("/api/auth/logout", post(account::logout))
        .route("/api/auth/verify", get(account::verify))
        .route(
            "/api/users/:id/applications",
            get(account::user_applications),
        )
        .route(
            "/api/users/:id/profile",
            get(account::get_profile).put(account::update_profile),
        )
        .route("/api/notifications", get(account::list_notifications))
        .route(
            "/api/notifications/read-all",
            patch(account::mark_all_notifications_read),
        )
        .route(
            "/api/notifications/:id/read",
            patch(account::mark_notification_read),
        )
        .route("/api/wizard", post(wizard::create_wizard))
        .route(
            "/api/wizard/:id",
            get(wizard::get_wizard).put(wizard::replace_draft),
        )
        .route("/api/wizard/:id/next", post(wizard::next_step))
        .route("/api/wizard/:id/previous", post(wizard::previous_step))
        .route("/api/wizard/:id/jump/:step", post(wizard::jump_to_step))
        .route("/api/wizard/:id/fields", patch(wizard::update_fields))
        .route("/api/wizard/:id/sections/:section", post(wizard::add_row))
        .route(
            "/api/wizard/:id/sections/:section/:index",
            patch(wizard::update_row).delete(wizard::remove_row),
        )
        .route("/api/wizard/:id/skills/:kind", post(wizard::add_skill))
        .route(
            "/api/wizard/:id/skills/:kind/:label",
            axum::routing::delete(wizard::remove_skill),
        )
        .route(
            "/api/wizard/:id/suggestions/:kind",
            get(wizard::suggestions),
        )
        .route("/api/wizard/:id/video/confirm", post(wizard::confirm_video))
        .route("/api/wizard/:id/terms", put(wizard::set_terms))
        .merge(upload_api)
        .layer(axum::middleware::from_fn_with_state(
            RateLimiter::per_second("public", config.public_rps),
            rate_limit,
        ));

    let dashboard_api = Router::new()
        .route("/api/dashboard/candidates", get(dashboard::candidates))
        .route("/api/dashboard/offers", get(dashboard::offers))
        .route("/api/dashboard/interviews", get(dashboard::interviews))
        .route("/api/dashboard/positions", get(dashboard::positions))
        .route("/api/dashboard/actions", post(dashboard::dispatch_action));

    base_routes
        .merge(public_api)
        .merge(dashboard_api)
        .with_state(state)
}
