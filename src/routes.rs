//! HTTP router: public endpoints, token-protected endpoints and the shared
//! middleware stack.

use axum::{
    Router,
    http::{
        HeaderName,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    middleware as axum_middleware,
    routing::{delete, get, patch, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{handlers, middleware, state::AppState};

pub fn build_router(state: AppState) -> Router {
    // Account-scoped routes; admin checks happen inside the handlers
    let authenticated_routes = Router::new()
        .route(
            "/functions/v1/check-subscription",
            get(handlers::subscription::check_subscription)
                .post(handlers::subscription::check_subscription),
        )
        .route(
            "/functions/v1/create-checkout",
            post(handlers::billing::create_checkout),
        )
        .route(
            "/functions/v1/customer-portal",
            post(handlers::billing::customer_portal),
        )
        .route(
            "/api/v1/widgets",
            get(handlers::widgets::list_widgets).post(handlers::widgets::create_widget),
        )
        .route(
            "/api/v1/widgets/{id}",
            patch(handlers::widgets::update_widget).delete(handlers::widgets::delete_widget),
        )
        .route(
            "/api/v1/profile",
            get(handlers::profile::get_profile).patch(handlers::profile::update_profile),
        )
        .route("/api/v1/roles/me", get(handlers::profile::my_roles))
        .route(
            "/api/v1/invitations",
            get(handlers::invitations::list_invitations)
                .post(handlers::invitations::create_invitation),
        )
        .route(
            "/api/v1/invitations/{id}",
            delete(handlers::invitations::cancel_invitation),
        )
        .route(
            "/api/v1/invitations/token/{token}/accept",
            post(handlers::invitations::accept_invitation),
        )
        .route(
            "/api/v1/admin/demo-settings",
            get(handlers::demo::get_demo_settings).put(handlers::demo::update_demo_settings),
        )
        .route("/api/v1/admin/stats", get(handlers::admin::system_stats))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::auth_middleware,
        ));

    Router::new()
        // Public routes
        .route("/health", get(handlers::health::health_check))
        .route("/api/cron/keep-alive", get(handlers::health::keep_alive))
        .route(
            "/functions/v1/retell-create-call",
            post(handlers::calls::create_call),
        )
        .route(
            "/functions/v1/retell-text-chat",
            post(handlers::chat::text_chat),
        )
        .route(
            "/api/v1/invitations/token/{token}",
            get(handlers::invitations::validate_invitation),
        )
        .merge(authenticated_routes)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Widgets are embedded on arbitrary customer sites.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ])
}
