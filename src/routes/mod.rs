use crate::config::rate_limit::{RateLimitConfig, RateLimitRule};
use crate::handlers;
use crate::middleware::auth::auth_middleware;
use axum::{extract::DefaultBodyLimit, middleware, routing, Router};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

pub fn create_routes() -> Router {
    Router::new().nest("/api/v1", api_routes())
}

fn api_routes() -> Router {
    let rate_limit_config = RateLimitConfig::from_env();

    let auth = auth_routes(&rate_limit_config);
    let public_read = public_read_routes(&rate_limit_config);
    let protected =
        protected_routes(&rate_limit_config).layer(middleware::from_fn(auth_middleware));

    auth.merge(public_read).merge(protected)
}

/// Auth routes: register, login, token and password flows.
fn auth_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        .route("/auth/register", routing::post(handlers::register))
        .route("/auth/login", routing::post(handlers::login))
        .route(
            "/auth/refresh",
            routing::post(handlers::auth::refresh_token),
        )
        .route("/auth/verify-email", routing::post(handlers::verify_email))
        .route(
            "/auth/forgot-password",
            routing::post(handlers::auth::forgot_password),
        )
        .route(
            "/auth/reset-password",
            routing::post(handlers::auth::reset_password),
        );

    with_optional_rate_limit(router, config.enabled, config.auth)
}

/// Public read routes: the item board is browsable without an account.
fn public_read_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        .route("/items", routing::get(handlers::item::list_items))
        .route("/items/{id}", routing::get(handlers::item::get_item));

    with_optional_rate_limit(router, config.enabled, config.public_read)
}

/// Protected routes: everything that needs a logged-in user.
fn protected_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        // Auth
        .route("/auth/me", routing::get(handlers::get_current_user))
        .route("/auth/logout", routing::post(handlers::auth::logout))
        .route("/auth/password", routing::put(handlers::change_password))
        .route(
            "/auth/resend-verification",
            routing::post(handlers::resend_verification),
        )
        // Items
        .route("/items", routing::post(handlers::item::create_item))
        .route("/items/mine", routing::get(handlers::item::my_items))
        .route("/items/{id}", routing::delete(handlers::item::delete_item))
        // Claims
        .route("/claims", routing::post(handlers::claim::submit_claim))
        .route("/claims/mine", routing::get(handlers::claim::my_claims))
        // Notifications
        .route(
            "/notifications",
            routing::get(handlers::notification::list_notifications)
                .delete(handlers::notification::delete_all_notifications),
        )
        .route(
            "/notifications/unread-count",
            routing::get(handlers::notification::unread_count),
        )
        .route(
            "/notifications/read-all",
            routing::put(handlers::notification::mark_all_read),
        )
        .route(
            "/notifications/{id}/read",
            routing::put(handlers::notification::mark_read),
        )
        .route(
            "/notifications/{id}",
            routing::delete(handlers::notification::delete_notification),
        )
        // Conversations
        .route(
            "/conversations",
            routing::post(handlers::conversation::start_conversation)
                .get(handlers::conversation::list_conversations),
        )
        .route(
            "/conversations/{id}/messages",
            routing::get(handlers::conversation::list_messages)
                .post(handlers::conversation::send_message),
        )
        // Upload. The default axum body limit (2 MB) is smaller than the
        // allowed file size; raise it, with headroom for multipart framing.
        .route(
            "/upload/item-image",
            routing::post(handlers::upload::upload_item_image).layer(DefaultBodyLimit::max(
                crate::services::upload::MAX_FILE_SIZE + 64 * 1024,
            )),
        )
        // Admin (role checked in handler)
        .route("/admin/stats", routing::get(handlers::admin::get_stats))
        .route("/admin/users", routing::get(handlers::admin::list_users))
        .route(
            "/admin/users/{id}/role",
            routing::put(handlers::admin::update_user_role),
        )
        .route(
            "/admin/users/{id}",
            routing::delete(handlers::admin::delete_user),
        )
        .route("/admin/claims", routing::get(handlers::claim::list_claims))
        .route(
            "/admin/claims/{id}/approve",
            routing::post(handlers::claim::approve_claim),
        )
        .route(
            "/admin/claims/{id}/reject",
            routing::post(handlers::claim::reject_claim),
        );

    with_optional_rate_limit(router, config.enabled, config.protected)
}

fn with_optional_rate_limit(router: Router, enabled: bool, rule: RateLimitRule) -> Router {
    if !enabled {
        return router;
    }

    let governor_conf = GovernorConfigBuilder::default()
        .per_second(rule.per_second)
        .burst_size(rule.burst_size)
        .finish()
        .expect("Invalid rate limit configuration");

    router.layer(GovernorLayer::new(governor_conf))
}
