use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::handlers;

/// Конфигурация всех роутов приложения
pub fn configure_routes() -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // USECASES
        // ========================================
        .route(
            "/api/u501/price-item",
            post(handlers::usecases::u501_price_item),
        )
        // ========================================
        // CATALOG TOOLS
        // ========================================
        .route(
            "/api/a004/product/bom/validate",
            post(handlers::a004_product::validate_bom),
        )
        .route("/api/formula/evaluate", post(handlers::formula::evaluate))
        .route(
            "/api/labor-params",
            get(handlers::labor_params::get_effective),
        )
        // ========================================
        // A005 QUOTE DRAFTS
        // ========================================
        .route(
            "/api/a005/quote/draft",
            get(handlers::a005_quote::list_all).post(handlers::a005_quote::create),
        )
        .route(
            "/api/a005/quote/draft/:id",
            get(handlers::a005_quote::get_by_id)
                .put(handlers::a005_quote::update)
                .delete(handlers::a005_quote::delete),
        )
        .route(
            "/api/a005/quote/draft/:id/client",
            put(handlers::a005_quote::set_client),
        )
        .route(
            "/api/a005/quote/draft/:id/items",
            post(handlers::a005_quote::add_item),
        )
        .route(
            "/api/a005/quote/draft/:id/items/:item_id",
            delete(handlers::a005_quote::remove_item),
        )
        .route(
            "/api/a005/quote/draft/:id/items/:item_id/duplicate",
            post(handlers::a005_quote::duplicate_item),
        )
        .route(
            "/api/a005/quote/draft/:id/items/:item_id/move",
            post(handlers::a005_quote::move_item),
        )
        .route(
            "/api/a005/quote/draft/:id/groups",
            post(handlers::a005_quote::add_group),
        )
        .route(
            "/api/a005/quote/draft/:id/groups/:group_id",
            put(handlers::a005_quote::update_group).delete(handlers::a005_quote::remove_group),
        )
        .route(
            "/api/a005/quote/draft/:id/reprice",
            post(handlers::a005_quote::reprice),
        )
        .route(
            "/api/a005/quote/draft/:id/summary",
            get(handlers::a005_quote::summary),
        )
        .route(
            "/api/a005/quote/draft/:id/export.csv",
            get(handlers::a005_quote::export_csv),
        )
        // ========================================
        // LOGS
        // ========================================
        .route(
            "/api/logs",
            get(handlers::logs::list_all)
                .post(handlers::logs::create)
                .delete(handlers::logs::clear_all),
        )
}
