use crate::{
    abstract_trait::order::repository::DynOrderQueryRepository,
    domain::{
        requests::order::PageWindow,
        response::order::{
            OrderSimpleSummary, OrderSummary, project_simple_summaries, project_summaries,
        },
    },
    model::{
        aggregate::{OrderAggregate, OrderItemAggregate},
        delivery::Delivery,
        member::Member,
        row::{OrderFlatRow, OrderMemberDeliveryRow},
    },
    service::order::{
        grouping::{dedupe_joined_rows, group_stable, regroup_flat_rows},
        session::ReadSession,
    },
};
use prometheus_client_derive_encode::EncodeLabelValue;
use serde::{Deserialize, Serialize};
use shared::errors::ServiceError;
use std::{collections::HashMap, fmt};
use tracing::{debug, info};
use utoipa::ToSchema;

pub const DEFAULT_BATCH_FETCH_SIZE: usize = 100;

/// How the order list is loaded from the store.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, EncodeLabelValue,
)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalStrategy {
    /// Orders first, then member, delivery and lines one lookup at a time.
    Plain,
    /// Orders joined with member and delivery, lines per order.
    SingleAssociationJoin,
    /// Everything in one join, one row per line. Cannot paginate.
    FullCollectionJoin,
    /// Orders joined with member and delivery, lines in `ANY` batches.
    BatchedLazyLoad,
    /// One flat row per (order, line), regrouped in process. Cannot paginate.
    DirectFlatProjection,
}

impl RetrievalStrategy {
    pub const ALL: [RetrievalStrategy; 5] = [
        RetrievalStrategy::Plain,
        RetrievalStrategy::SingleAssociationJoin,
        RetrievalStrategy::FullCollectionJoin,
        RetrievalStrategy::BatchedLazyLoad,
        RetrievalStrategy::DirectFlatProjection,
    ];

    pub fn supports_pagination(&self) -> bool {
        !matches!(
            self,
            RetrievalStrategy::FullCollectionJoin | RetrievalStrategy::DirectFlatProjection
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            RetrievalStrategy::Plain => "plain",
            RetrievalStrategy::SingleAssociationJoin => "single_association_join",
            RetrievalStrategy::FullCollectionJoin => "full_collection_join",
            RetrievalStrategy::BatchedLazyLoad => "batched_lazy_load",
            RetrievalStrategy::DirectFlatProjection => "direct_flat_projection",
        }
    }
}

impl fmt::Display for RetrievalStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which associations must be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associations {
    /// Member and delivery only; `order_items` stays empty.
    ToOne,
    All,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OrderRows {
    Aggregates(Vec<OrderAggregate>),
    Flat(Vec<OrderFlatRow>),
}

impl OrderRows {
    pub fn into_summaries(self) -> Vec<OrderSummary> {
        match self {
            OrderRows::Aggregates(orders) => project_summaries(&orders),
            OrderRows::Flat(rows) => regroup_flat_rows(rows),
        }
    }

    pub fn into_simple_summaries(self) -> Vec<OrderSimpleSummary> {
        match self {
            OrderRows::Aggregates(orders) => project_simple_summaries(&orders),
            OrderRows::Flat(rows) => regroup_flat_rows(rows)
                .into_iter()
                .map(OrderSimpleSummary::from)
                .collect(),
        }
    }
}

/// Rows loaded by one session, with the number of store calls it took.
#[derive(Debug, Clone, PartialEq)]
pub struct Retrieval<T> {
    pub rows: T,
    pub round_trips: usize,
}

#[derive(Clone)]
pub struct OrderRetrieval {
    repository: DynOrderQueryRepository,
    batch_fetch_size: usize,
}

impl fmt::Debug for OrderRetrieval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderRetrieval")
            .field("repository", &"DynOrderQueryRepository")
            .field("batch_fetch_size", &self.batch_fetch_size)
            .finish()
    }
}

impl OrderRetrieval {
    pub fn new(
        repository: DynOrderQueryRepository,
        batch_fetch_size: usize,
    ) -> Result<Self, ServiceError> {
        if batch_fetch_size == 0 {
            return Err(ServiceError::Validation(vec![
                "batch_fetch_size must be at least 1".into(),
            ]));
        }

        Ok(Self {
            repository,
            batch_fetch_size,
        })
    }

    pub fn batch_fetch_size(&self) -> usize {
        self.batch_fetch_size
    }

    /// Loads orders with `strategy` inside a fresh read session. The session
    /// is closed before this returns, whatever the outcome.
    pub async fn fetch(
        &self,
        strategy: RetrievalStrategy,
        window: PageWindow,
        associations: Associations,
    ) -> Result<Retrieval<OrderRows>, ServiceError> {
        info!(
            "🔎 Loading orders | strategy: {strategy}, offset: {}, limit: {:?}, associations: {associations:?}",
            window.offset(),
            window.limit()
        );

        if !strategy.supports_pagination() && !window.is_unbounded() {
            debug!("{strategy} cannot paginate, offset/limit ignored");
        }

        let session = ReadSession::open(self.repository.clone());

        let result = match strategy {
            RetrievalStrategy::Plain => self
                .plain(&session, &window, associations)
                .await
                .map(OrderRows::Aggregates),
            RetrievalStrategy::SingleAssociationJoin => self
                .single_association_join(&session, &window, associations)
                .await
                .map(OrderRows::Aggregates),
            RetrievalStrategy::FullCollectionJoin => self
                .full_collection_join(&session, associations)
                .await
                .map(OrderRows::Aggregates),
            RetrievalStrategy::BatchedLazyLoad => self
                .batched_lazy_load(&session, &window, associations)
                .await
                .map(OrderRows::Aggregates),
            RetrievalStrategy::DirectFlatProjection => self
                .direct_flat_projection(&session)
                .await
                .map(OrderRows::Flat),
        };

        session.close();

        Ok(Retrieval {
            rows: result?,
            round_trips: session.round_trips(),
        })
    }

    /// Order-level summaries straight from the narrow projection query.
    pub async fn fetch_simple_projection(
        &self,
    ) -> Result<Retrieval<Vec<OrderSimpleSummary>>, ServiceError> {
        let session = ReadSession::open(self.repository.clone());

        let result = match session.gateway() {
            Ok(gateway) => gateway
                .find_order_simple_rows()
                .await
                .map_err(ServiceError::from),
            Err(e) => Err(e),
        };

        session.close();

        Ok(Retrieval {
            rows: result?,
            round_trips: session.round_trips(),
        })
    }

    async fn plain(
        &self,
        session: &ReadSession,
        window: &PageWindow,
        associations: Associations,
    ) -> Result<Vec<OrderAggregate>, ServiceError> {
        let orders = session.gateway()?.find_orders(window).await?;

        // identity map for the lifetime of the session
        let mut members: HashMap<i64, Member> = HashMap::new();
        let mut deliveries: HashMap<i64, Delivery> = HashMap::new();

        let mut aggregates = Vec::with_capacity(orders.len());

        for order in orders {
            let member = match members.get(&order.member_id) {
                Some(member) => member.clone(),
                None => {
                    let member = session
                        .gateway()?
                        .find_member(order.member_id)
                        .await?
                        .ok_or_else(|| {
                            ServiceError::Internal(format!(
                                "member {} of order {} not found",
                                order.member_id, order.order_id
                            ))
                        })?;
                    members.insert(order.member_id, member.clone());
                    member
                }
            };

            let delivery = match deliveries.get(&order.delivery_id) {
                Some(delivery) => delivery.clone(),
                None => {
                    let delivery = session
                        .gateway()?
                        .find_delivery(order.delivery_id)
                        .await?
                        .ok_or_else(|| {
                            ServiceError::Internal(format!(
                                "delivery {} of order {} not found",
                                order.delivery_id, order.order_id
                            ))
                        })?;
                    deliveries.insert(order.delivery_id, delivery.clone());
                    delivery
                }
            };

            let order_items = match associations {
                Associations::ToOne => Vec::new(),
                Associations::All => session
                    .gateway()?
                    .find_order_lines(order.order_id)
                    .await?
                    .into_iter()
                    .map(OrderItemAggregate::from)
                    .collect(),
            };

            aggregates.push(OrderAggregate {
                order,
                member,
                delivery,
                order_items,
            });
        }

        Ok(aggregates)
    }

    async fn single_association_join(
        &self,
        session: &ReadSession,
        window: &PageWindow,
        associations: Associations,
    ) -> Result<Vec<OrderAggregate>, ServiceError> {
        let heads = session
            .gateway()?
            .find_orders_with_member_delivery(window)
            .await?;

        let mut aggregates = Vec::with_capacity(heads.len());

        for head in heads {
            let order_items = match associations {
                Associations::ToOne => Vec::new(),
                Associations::All => session
                    .gateway()?
                    .find_order_lines(head.order_id)
                    .await?
                    .into_iter()
                    .map(OrderItemAggregate::from)
                    .collect(),
            };

            aggregates.push(head.into_aggregate(order_items));
        }

        Ok(aggregates)
    }

    async fn full_collection_join(
        &self,
        session: &ReadSession,
        associations: Associations,
    ) -> Result<Vec<OrderAggregate>, ServiceError> {
        match associations {
            Associations::All => {
                let rows = session.gateway()?.find_orders_with_items().await?;
                Ok(dedupe_joined_rows(rows))
            }
            Associations::ToOne => {
                let heads = session
                    .gateway()?
                    .find_orders_with_member_delivery(&PageWindow::all())
                    .await?;
                Ok(into_heads_only(heads))
            }
        }
    }

    async fn batched_lazy_load(
        &self,
        session: &ReadSession,
        window: &PageWindow,
        associations: Associations,
    ) -> Result<Vec<OrderAggregate>, ServiceError> {
        let heads = session
            .gateway()?
            .find_orders_with_member_delivery(window)
            .await?;

        if associations == Associations::ToOne {
            return Ok(into_heads_only(heads));
        }

        let order_ids: Vec<i64> = heads.iter().map(|head| head.order_id).collect();
        let mut lines_by_order: HashMap<i64, Vec<OrderItemAggregate>> = HashMap::new();

        for batch in order_ids.chunks(self.batch_fetch_size) {
            let lines = session.gateway()?.find_order_lines_in(batch).await?;

            for (order_id, lines) in group_stable(lines, |line| line.order_id) {
                lines_by_order
                    .entry(order_id)
                    .or_default()
                    .extend(lines.into_iter().map(OrderItemAggregate::from));
            }
        }

        Ok(heads
            .into_iter()
            .map(|head| {
                let order_items = lines_by_order.remove(&head.order_id).unwrap_or_default();
                head.into_aggregate(order_items)
            })
            .collect())
    }

    async fn direct_flat_projection(
        &self,
        session: &ReadSession,
    ) -> Result<Vec<OrderFlatRow>, ServiceError> {
        Ok(session.gateway()?.find_order_flat_rows().await?)
    }
}

fn into_heads_only(heads: Vec<OrderMemberDeliveryRow>) -> Vec<OrderAggregate> {
    heads
        .into_iter()
        .map(|head| head.into_aggregate(Vec::new()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_join_free_strategies_paginate() {
        let paginating: Vec<_> = RetrievalStrategy::ALL
            .into_iter()
            .filter(RetrievalStrategy::supports_pagination)
            .collect();

        assert_eq!(
            paginating,
            vec![
                RetrievalStrategy::Plain,
                RetrievalStrategy::SingleAssociationJoin,
                RetrievalStrategy::BatchedLazyLoad,
            ]
        );
    }

    #[test]
    fn strategy_serializes_as_snake_case() {
        let json = serde_json::to_string(&RetrievalStrategy::BatchedLazyLoad).unwrap();

        assert_eq!(json, r#""batched_lazy_load""#);
        assert_eq!(RetrievalStrategy::BatchedLazyLoad.to_string(), "batched_lazy_load");
    }
}
