mod order;
mod simple_order;

use crate::{metrics::metrics_handler, state::AppState};
use anyhow::{Context, Result};
use axum::{Router, extract::DefaultBodyLimit, routing::get};
use shared::utils::shutdown_signal;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::info;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

pub use self::order::order_routes;
pub use self::simple_order::simple_order_routes;

#[derive(OpenApi)]
#[openapi(
    paths(
        order::get_orders_v1,
        order::get_orders_v2,
        order::get_orders_v3,
        order::get_orders_v3_1,
        order::get_orders_v4,
        order::get_orders_v5,
        order::get_orders_v6,

        simple_order::get_simple_orders_v1,
        simple_order::get_simple_orders_v2,
        simple_order::get_simple_orders_v3,
        simple_order::get_simple_orders_v4,
    ),
    tags(
        (name = "Order", description = "Order list endpoints"),
        (name = "Simple-order", description = "Order-level list endpoints without lines"),
    )
)]
struct ApiDoc;

pub struct AppRouter;

impl AppRouter {
    pub fn build(shared_state: Arc<AppState>) -> Router {
        let api_router = OpenApiRouter::with_openapi(ApiDoc::openapi())
            .route("/metrics", get(metrics_handler))
            .with_state(shared_state.clone())
            .merge(order_routes(shared_state.clone()))
            .merge(simple_order_routes(shared_state));

        let router_with_layers = api_router
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(1024 * 1024))
            .layer(TraceLayer::new_for_http());

        let (app_router, api) = router_with_layers.split_for_parts();

        app_router.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api))
    }

    pub async fn serve(port: u16, app_state: AppState) -> Result<()> {
        let app = Self::build(Arc::new(app_state));

        let addr = format!("0.0.0.0:{port}");
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;

        let local_addr = listener.local_addr()?;
        info!("🚀 Server running on http://{local_addr}");
        info!("📖 Swagger UI: http://localhost:{port}/swagger-ui");
        info!("📊 Metrics: http://localhost:{port}/metrics");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("HTTP server failed")?;

        Ok(())
    }
}
