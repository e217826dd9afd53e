use crate::{
    abstract_trait::order::{repository::DynOrderQueryRepository, service::OrderQueryServiceTrait},
    domain::{
        requests::order::PageWindow,
        response::{
            api::ApiResponse,
            order::{OrderSimpleSummary, OrderSummary},
        },
    },
    model::aggregate::OrderAggregate,
    service::order::{
        grouping::ensure_distinct_orders,
        strategy::{Associations, OrderRetrieval, OrderRows, Retrieval, RetrievalStrategy},
    },
};
use anyhow::Result;
use async_trait::async_trait;
use opentelemetry::{
    Context, KeyValue,
    global::{self, BoxedTracer},
    trace::{Span, SpanKind, TraceContextExt, Tracer},
};
use prometheus_client::{
    metrics::{family::Family, histogram::Histogram},
    registry::Registry,
};
use prometheus_client_derive_encode::EncodeLabelSet;
use shared::{
    errors::ServiceError,
    utils::{Metrics, Status as StatusUtils, TracingContext},
};
use tokio::time::Instant;
use tracing::{error, info};

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct RetrievalLabels {
    pub strategy: RetrievalStrategy,
}

/// Store round trips per request, by retrieval strategy.
#[derive(Clone, Debug)]
pub struct RetrievalMetrics {
    pub round_trips: Family<RetrievalLabels, Histogram>,
}

impl Default for RetrievalMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl RetrievalMetrics {
    pub fn new() -> Self {
        Self {
            round_trips: Family::new_with_constructor(|| {
                Histogram::new(vec![
                    1.0, 2.0, 3.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0,
                ])
            }),
        }
    }

    pub fn register(&self, registry: &mut Registry) {
        registry.register(
            "order_retrieval_round_trips",
            "Data store round trips per order retrieval",
            self.round_trips.clone(),
        );
    }

    pub fn observe(&self, strategy: RetrievalStrategy, round_trips: usize) {
        self.round_trips
            .get_or_create(&RetrievalLabels { strategy })
            .observe(round_trips as f64);
    }
}

#[derive(Clone)]
pub struct OrderQueryService {
    retrieval: OrderRetrieval,
    metrics: Metrics,
    retrieval_metrics: RetrievalMetrics,
}

impl OrderQueryService {
    pub fn new(
        repository: DynOrderQueryRepository,
        batch_fetch_size: usize,
        registry: &mut Registry,
    ) -> Result<Self> {
        let metrics = Metrics::new();
        metrics.register(registry, "order_query_service");

        let retrieval_metrics = RetrievalMetrics::new();
        retrieval_metrics.register(registry);

        Ok(Self {
            retrieval: OrderRetrieval::new(repository, batch_fetch_size)?,
            metrics,
            retrieval_metrics,
        })
    }

    fn get_tracer(&self) -> BoxedTracer {
        global::tracer("order-query-service")
    }

    fn start_tracing(&self, operation_name: &str, attributes: Vec<KeyValue>) -> TracingContext {
        let start_time = Instant::now();
        let tracer = self.get_tracer();
        let mut span = tracer
            .span_builder(operation_name.to_string())
            .with_kind(SpanKind::Server)
            .with_attributes(attributes)
            .start(&tracer);

        info!("Starting operation: {operation_name}");

        span.add_event(
            "Operation started",
            vec![KeyValue::new("operation", operation_name.to_string())],
        );

        let cx = Context::current_with_span(span);
        TracingContext { cx, start_time }
    }

    fn complete_tracing_success(&self, tracing_ctx: &TracingContext, operation: &str, message: &str) {
        self.complete_tracing_internal(tracing_ctx, operation, true, message);
    }

    fn complete_tracing_error(&self, tracing_ctx: &TracingContext, operation: &str, message: &str) {
        self.complete_tracing_internal(tracing_ctx, operation, false, message);
    }

    fn complete_tracing_internal(
        &self,
        tracing_ctx: &TracingContext,
        operation: &str,
        is_success: bool,
        message: &str,
    ) {
        let status_str = if is_success { "SUCCESS" } else { "ERROR" };
        let status = if is_success {
            StatusUtils::Success
        } else {
            StatusUtils::Error
        };
        let elapsed = tracing_ctx.start_time.elapsed().as_secs_f64();

        tracing_ctx.cx.span().add_event(
            "Operation completed",
            vec![
                KeyValue::new("status", status_str),
                KeyValue::new("duration_secs", elapsed.to_string()),
                KeyValue::new("message", message.to_string()),
            ],
        );

        if is_success {
            info!("✅ Operation completed successfully: {message}");
        } else {
            error!("❌ Operation failed: {message}");
        }

        self.metrics.record(operation, status, elapsed);

        tracing_ctx.cx.span().end();
    }

    async fn load(
        &self,
        strategy: RetrievalStrategy,
        window: PageWindow,
        associations: Associations,
    ) -> Result<OrderRows, ServiceError> {
        let Retrieval { rows, round_trips } =
            self.retrieval.fetch(strategy, window, associations).await?;

        self.retrieval_metrics.observe(strategy, round_trips);
        info!("🔁 {strategy} finished in {round_trips} round trip(s)");

        if let OrderRows::Aggregates(orders) = &rows {
            ensure_distinct_orders(orders.iter().map(OrderAggregate::order_id))?;
        }

        Ok(rows)
    }

    fn finish<T>(
        &self,
        tracing_ctx: &TracingContext,
        operation: &str,
        result: Result<Vec<T>, ServiceError>,
    ) -> Result<ApiResponse<Vec<T>>, ServiceError> {
        match result {
            Ok(data) => {
                let log_message = format!("Found {} orders", data.len());
                self.complete_tracing_success(tracing_ctx, operation, &log_message);

                Ok(ApiResponse::success("Orders retrieved successfully", data))
            }
            Err(e) => {
                let log_message = format!("Failed to find orders: {e:?}");
                self.complete_tracing_error(tracing_ctx, operation, &log_message);

                Err(e)
            }
        }
    }
}

#[async_trait]
impl OrderQueryServiceTrait for OrderQueryService {
    async fn find_order_entities(
        &self,
        associations: Associations,
    ) -> Result<ApiResponse<Vec<OrderAggregate>>, ServiceError> {
        info!("📦 Finding order aggregates | associations: {associations:?}");

        let operation = "find_order_entities";
        let strategy = RetrievalStrategy::Plain;

        let tracing_ctx = self.start_tracing(
            operation,
            vec![
                KeyValue::new("strategy", strategy.name()),
                KeyValue::new("associations", format!("{associations:?}")),
            ],
        );

        let result = match self
            .load(strategy, PageWindow::all(), associations)
            .await
        {
            Ok(OrderRows::Aggregates(orders)) => Ok(orders),
            Ok(OrderRows::Flat(_)) => Err(ServiceError::Internal(
                "plain retrieval returned flat rows".into(),
            )),
            Err(e) => Err(e),
        };

        self.finish(&tracing_ctx, operation, result)
    }

    async fn find_orders(
        &self,
        strategy: RetrievalStrategy,
        window: PageWindow,
    ) -> Result<ApiResponse<Vec<OrderSummary>>, ServiceError> {
        info!(
            "📦 Finding orders | strategy: {strategy}, offset: {}, limit: {:?}",
            window.offset(),
            window.limit()
        );

        let operation = "find_orders";

        let tracing_ctx = self.start_tracing(
            operation,
            vec![
                KeyValue::new("strategy", strategy.name()),
                KeyValue::new("offset", window.offset()),
                KeyValue::new("limit", window.limit().unwrap_or(-1)),
            ],
        );

        let result = self
            .load(strategy, window, Associations::All)
            .await
            .and_then(|rows| match rows {
                // regrouping must yield one summary per order_id
                OrderRows::Flat(_) => {
                    let summaries = rows.into_summaries();
                    ensure_distinct_orders(summaries.iter().map(|s| s.order_id))?;
                    Ok(summaries)
                }
                OrderRows::Aggregates(_) => Ok(rows.into_summaries()),
            });

        self.finish(&tracing_ctx, operation, result)
    }

    async fn find_simple_orders(
        &self,
        strategy: RetrievalStrategy,
    ) -> Result<ApiResponse<Vec<OrderSimpleSummary>>, ServiceError> {
        info!("📦 Finding simple orders | strategy: {strategy}");

        let operation = "find_simple_orders";

        let tracing_ctx = self.start_tracing(
            operation,
            vec![KeyValue::new("strategy", strategy.name())],
        );

        let result = self
            .load(strategy, PageWindow::all(), Associations::ToOne)
            .await
            .map(OrderRows::into_simple_summaries);

        self.finish(&tracing_ctx, operation, result)
    }

    async fn find_simple_order_projections(
        &self,
    ) -> Result<ApiResponse<Vec<OrderSimpleSummary>>, ServiceError> {
        info!("📦 Finding simple order projections");

        let operation = "find_simple_order_projections";

        let tracing_ctx = self.start_tracing(operation, vec![]);

        let result = match self.retrieval.fetch_simple_projection().await {
            Ok(Retrieval { rows, round_trips }) => {
                info!("🔁 narrow projection finished in {round_trips} round trip(s)");
                ensure_distinct_orders(rows.iter().map(|row| row.order_id)).map(|_| rows)
            }
            Err(e) => Err(e),
        };

        self.finish(&tracing_ctx, operation, result)
    }
}
