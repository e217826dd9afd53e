use crate::{
    abstract_trait::order::service::DynOrderQueryService,
    domain::response::{api::ApiResponse, order::OrderSimpleSummary},
    model::aggregate::OrderAggregate,
    service::order::{Associations, RetrievalStrategy},
    state::AppState,
};
use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse, routing::get};
use shared::errors::HttpError;
use std::sync::Arc;
use utoipa_axum::router::OpenApiRouter;

#[utoipa::path(
    get,
    path = "/api/v1/simple-orders",
    tag = "Simple-order",
    responses(
        (status = 200, description = "Order aggregates with member and delivery, lines not loaded", body = ApiResponse<Vec<OrderAggregate>>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_simple_orders_v1(
    Extension(service): Extension<DynOrderQueryService>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.find_order_entities(Associations::ToOne).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/v2/simple-orders",
    tag = "Simple-order",
    responses(
        (status = 200, description = "Order-level summaries, member and delivery loaded one by one", body = ApiResponse<Vec<OrderSimpleSummary>>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_simple_orders_v2(
    Extension(service): Extension<DynOrderQueryService>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.find_simple_orders(RetrievalStrategy::Plain).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/v3/simple-orders",
    tag = "Simple-order",
    responses(
        (status = 200, description = "Order-level summaries, member and delivery joined", body = ApiResponse<Vec<OrderSimpleSummary>>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_simple_orders_v3(
    Extension(service): Extension<DynOrderQueryService>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service
        .find_simple_orders(RetrievalStrategy::SingleAssociationJoin)
        .await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/v4/simple-orders",
    tag = "Simple-order",
    responses(
        (status = 200, description = "Order-level summaries selected directly", body = ApiResponse<Vec<OrderSimpleSummary>>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_simple_orders_v4(
    Extension(service): Extension<DynOrderQueryService>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.find_simple_order_projections().await?;
    Ok((StatusCode::OK, Json(response)))
}

pub fn simple_order_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    OpenApiRouter::new()
        .route("/api/v1/simple-orders", get(get_simple_orders_v1))
        .route("/api/v2/simple-orders", get(get_simple_orders_v2))
        .route("/api/v3/simple-orders", get(get_simple_orders_v3))
        .route("/api/v4/simple-orders", get(get_simple_orders_v4))
        .layer(Extension(app_state.di_container.order_query.clone()))
}
