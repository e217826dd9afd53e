use crate::{
    abstract_trait::order::service::DynOrderQueryService,
    domain::{
        requests::order::FindAllOrder,
        response::{api::ApiResponse, order::{OrderSimpleSummary, OrderSummary}},
    },
    middleware::validate::ValidatedQuery,
    model::aggregate::OrderAggregate,
    service::order::{Associations, RetrievalStrategy},
    state::AppState,
};
use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use shared::errors::HttpError;
use std::sync::Arc;
use utoipa_axum::router::OpenApiRouter;

#[utoipa::path(
    get,
    path = "/api/v1/orders",
    tag = "Order",
    responses(
        (status = 200, description = "Order aggregates as loaded", body = ApiResponse<Vec<OrderAggregate>>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_orders_v1(
    Extension(service): Extension<DynOrderQueryService>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.find_order_entities(Associations::All).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/v2/orders",
    tag = "Order",
    responses(
        (status = 200, description = "Order summaries, associations loaded one by one", body = ApiResponse<Vec<OrderSummary>>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_orders_v2(
    Extension(service): Extension<DynOrderQueryService>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service
        .find_orders(RetrievalStrategy::Plain, Default::default())
        .await?;
    Ok((StatusCode::OK, Json(response)))
}

/// `offset` and `limit` are validated but not applied: a collection fetch
/// join cannot paginate.
#[utoipa::path(
    get,
    path = "/api/v3/orders",
    tag = "Order",
    params(FindAllOrder),
    responses(
        (status = 200, description = "Order summaries from a single fetch join", body = ApiResponse<Vec<OrderSummary>>),
        (status = 400, description = "Invalid offset or limit"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_orders_v3(
    Extension(service): Extension<DynOrderQueryService>,
    ValidatedQuery(params): ValidatedQuery<FindAllOrder>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service
        .find_orders(RetrievalStrategy::FullCollectionJoin, params.window()?)
        .await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/v3.1/orders",
    tag = "Order",
    params(FindAllOrder),
    responses(
        (status = 200, description = "Paginated order summaries, lines loaded in batches", body = ApiResponse<Vec<OrderSummary>>),
        (status = 400, description = "Invalid offset or limit"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_orders_v3_1(
    Extension(service): Extension<DynOrderQueryService>,
    ValidatedQuery(params): ValidatedQuery<FindAllOrder>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service
        .find_orders(RetrievalStrategy::BatchedLazyLoad, params.window_or_default()?)
        .await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/v4/orders",
    tag = "Order",
    responses(
        (status = 200, description = "Order-level summaries selected directly", body = ApiResponse<Vec<OrderSimpleSummary>>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_orders_v4(
    Extension(service): Extension<DynOrderQueryService>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.find_simple_order_projections().await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/v5/orders",
    tag = "Order",
    responses(
        (status = 200, description = "Order summaries, member and delivery joined", body = ApiResponse<Vec<OrderSummary>>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_orders_v5(
    Extension(service): Extension<DynOrderQueryService>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service
        .find_orders(RetrievalStrategy::SingleAssociationJoin, Default::default())
        .await?;
    Ok((StatusCode::OK, Json(response)))
}

/// Orders without lines are absent from this endpoint.
#[utoipa::path(
    get,
    path = "/api/v6/orders",
    tag = "Order",
    params(FindAllOrder),
    responses(
        (status = 200, description = "Order summaries regrouped from flat rows", body = ApiResponse<Vec<OrderSummary>>),
        (status = 400, description = "Invalid offset or limit"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_orders_v6(
    Extension(service): Extension<DynOrderQueryService>,
    ValidatedQuery(params): ValidatedQuery<FindAllOrder>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service
        .find_orders(RetrievalStrategy::DirectFlatProjection, params.window()?)
        .await?;
    Ok((StatusCode::OK, Json(response)))
}

pub fn order_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    OpenApiRouter::new()
        .route("/api/v1/orders", get(get_orders_v1))
        .route("/api/v2/orders", get(get_orders_v2))
        .route("/api/v3/orders", get(get_orders_v3))
        .route("/api/v3.1/orders", get(get_orders_v3_1))
        .route("/api/v4/orders", get(get_orders_v4))
        .route("/api/v5/orders", get(get_orders_v5))
        .route("/api/v6/orders", get(get_orders_v6))
        .layer(Extension(app_state.di_container.order_query.clone()))
}
