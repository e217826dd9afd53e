use chrono::NaiveDate;
use order::{
    abstract_trait::order::repository::DynOrderQueryRepository,
    domain::{requests::order::PageWindow, response::order::OrderSummary},
    model::{
        delivery::{Delivery, DeliveryStatus},
        item::Item,
        member::{Address, Member},
        order::{Order, OrderStatus},
        order_item::OrderItem,
    },
    repository::order::InMemoryOrderRepository,
    service::order::{Associations, OrderRetrieval, OrderRows, ReadSession, RetrievalStrategy},
};
use shared::errors::ServiceError;
use std::sync::Arc;

const AGGREGATE_STRATEGIES: [RetrievalStrategy; 4] = [
    RetrievalStrategy::Plain,
    RetrievalStrategy::SingleAssociationJoin,
    RetrievalStrategy::FullCollectionJoin,
    RetrievalStrategy::BatchedLazyLoad,
];

fn retrieval(repository: InMemoryOrderRepository, batch_fetch_size: usize) -> OrderRetrieval {
    OrderRetrieval::new(Arc::new(repository) as DynOrderQueryRepository, batch_fetch_size).unwrap()
}

fn window(offset: i64, limit: Option<i64>) -> PageWindow {
    PageWindow::new(offset, limit).unwrap()
}

/// Seed data plus a third order of userA with no lines.
fn with_empty_third_order() -> InMemoryOrderRepository {
    let order_date = NaiveDate::from_ymd_opt(2025, 6, 2)
        .and_then(|d| d.and_hms_opt(8, 0, 0))
        .unwrap();

    InMemoryOrderRepository::seeded()
        .with_delivery(Delivery {
            delivery_id: 3,
            address: Address::new("Seoul", "Gangnam-daero 1", "06236"),
            status: DeliveryStatus::Ready,
        })
        .with_order(Order {
            order_id: 3,
            member_id: 1,
            delivery_id: 3,
            order_date,
            status: OrderStatus::Canceled,
        })
}

/// `orders` orders of one member, one line each.
fn one_member_store(orders: i64) -> InMemoryOrderRepository {
    let order_date = NaiveDate::from_ymd_opt(2025, 6, 1)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .unwrap();

    let mut repository = InMemoryOrderRepository::new()
        .with_member(Member {
            member_id: 1,
            name: "userA".into(),
            address: Address::new("Seoul", "1 Main St", "00001"),
        })
        .with_item(Item {
            item_id: 1,
            name: "JPA1 BOOK".into(),
            price: 10000,
        });

    for id in 1..=orders {
        repository = repository
            .with_delivery(Delivery {
                delivery_id: id,
                address: Address::new("Seoul", "1 Main St", "00001"),
                status: DeliveryStatus::Ready,
            })
            .with_order(Order {
                order_id: id,
                member_id: 1,
                delivery_id: id,
                order_date,
                status: OrderStatus::Ordered,
            })
            .with_order_item(OrderItem {
                order_item_id: id,
                order_id: id,
                item_id: 1,
                order_price: 10000,
                count: 1,
            });
    }

    repository
}

async fn summaries(
    retrieval: &OrderRetrieval,
    strategy: RetrievalStrategy,
    window: PageWindow,
) -> Vec<OrderSummary> {
    retrieval
        .fetch(strategy, window, Associations::All)
        .await
        .unwrap()
        .rows
        .into_summaries()
}

fn ids(summaries: &[OrderSummary]) -> Vec<i64> {
    summaries.iter().map(|s| s.order_id).collect()
}

#[tokio::test]
async fn every_strategy_yields_the_same_summaries() {
    let retrieval = retrieval(InMemoryOrderRepository::seeded(), 100);

    let expected = summaries(&retrieval, RetrievalStrategy::Plain, PageWindow::all()).await;
    assert_eq!(ids(&expected), vec![1, 2]);
    assert_eq!(expected[0].items.len(), 2);
    assert_eq!(expected[0].items[0].item_name, "JPA1 BOOK");
    assert_eq!(expected[0].items[1].quantity, 2);
    assert_eq!(expected[1].member_name, "userB");

    for strategy in RetrievalStrategy::ALL {
        let actual = summaries(&retrieval, strategy, PageWindow::all()).await;
        assert_eq!(actual, expected, "{strategy}");
    }
}

#[tokio::test]
async fn round_trips_per_strategy() {
    let retrieval = retrieval(InMemoryOrderRepository::seeded(), 100);

    let cases = [
        (RetrievalStrategy::Plain, Associations::All, 7),
        (RetrievalStrategy::Plain, Associations::ToOne, 5),
        (RetrievalStrategy::SingleAssociationJoin, Associations::All, 3),
        (RetrievalStrategy::SingleAssociationJoin, Associations::ToOne, 1),
        (RetrievalStrategy::FullCollectionJoin, Associations::All, 1),
        (RetrievalStrategy::BatchedLazyLoad, Associations::All, 2),
        (RetrievalStrategy::BatchedLazyLoad, Associations::ToOne, 1),
        (RetrievalStrategy::DirectFlatProjection, Associations::All, 1),
    ];

    for (strategy, associations, expected) in cases {
        let loaded = retrieval
            .fetch(strategy, PageWindow::all(), associations)
            .await
            .unwrap();

        assert_eq!(loaded.round_trips, expected, "{strategy} {associations:?}");
    }
}

#[tokio::test]
async fn plain_strategy_reuses_members_within_a_session() {
    let retrieval = retrieval(one_member_store(3), 100);

    let loaded = retrieval
        .fetch(RetrievalStrategy::Plain, PageWindow::all(), Associations::All)
        .await
        .unwrap();

    // orders + one member + three deliveries + three line lookups
    assert_eq!(loaded.round_trips, 1 + 1 + 3 + 3);
}

#[tokio::test]
async fn batch_size_bounds_line_round_trips() {
    for (batch_fetch_size, expected) in [(1, 1 + 5), (2, 1 + 3), (5, 1 + 1), (100, 1 + 1)] {
        let retrieval = retrieval(one_member_store(5), batch_fetch_size);

        let loaded = retrieval
            .fetch(
                RetrievalStrategy::BatchedLazyLoad,
                PageWindow::all(),
                Associations::All,
            )
            .await
            .unwrap();

        assert_eq!(loaded.round_trips, expected, "batch size {batch_fetch_size}");
        assert_eq!(loaded.rows.into_summaries().len(), 5);
    }
}

#[test]
fn zero_batch_size_is_rejected() {
    let repository = Arc::new(InMemoryOrderRepository::seeded()) as DynOrderQueryRepository;

    let err = OrderRetrieval::new(repository, 0).unwrap_err();

    assert!(matches!(err, ServiceError::Validation(_)));
}

#[tokio::test]
async fn paginating_strategies_apply_the_window() {
    let retrieval = retrieval(with_empty_third_order(), 100);

    for strategy in [
        RetrievalStrategy::Plain,
        RetrievalStrategy::SingleAssociationJoin,
        RetrievalStrategy::BatchedLazyLoad,
    ] {
        let first = summaries(&retrieval, strategy, window(0, Some(1))).await;
        assert_eq!(ids(&first), vec![1], "{strategy}");

        let rest = summaries(&retrieval, strategy, window(1, Some(5))).await;
        assert_eq!(ids(&rest), vec![2, 3], "{strategy}");

        let none = summaries(&retrieval, strategy, window(10, Some(5))).await;
        assert!(none.is_empty(), "{strategy}");
    }
}

#[tokio::test]
async fn non_paginating_strategies_ignore_the_window() {
    let retrieval = retrieval(with_empty_third_order(), 100);

    let joined = summaries(
        &retrieval,
        RetrievalStrategy::FullCollectionJoin,
        window(1, Some(1)),
    )
    .await;
    assert_eq!(ids(&joined), vec![1, 2, 3]);

    let flat = summaries(
        &retrieval,
        RetrievalStrategy::DirectFlatProjection,
        window(1, Some(1)),
    )
    .await;
    assert_eq!(ids(&flat), vec![1, 2]);
}

#[tokio::test]
async fn orders_without_lines_survive_the_collection_join() {
    let retrieval = retrieval(with_empty_third_order(), 100);

    let joined = summaries(&retrieval, RetrievalStrategy::FullCollectionJoin, PageWindow::all()).await;

    assert_eq!(joined.len(), 3);
    assert_eq!(joined[0].items.len(), 2);
    assert_eq!(joined[1].items.len(), 2);
    assert!(joined[2].items.is_empty());
    assert_eq!(joined[2].status, OrderStatus::Canceled);
}

#[tokio::test]
async fn empty_store_gives_empty_results() {
    let retrieval = retrieval(InMemoryOrderRepository::new(), 100);

    for strategy in RetrievalStrategy::ALL {
        let loaded = retrieval
            .fetch(strategy, PageWindow::all(), Associations::All)
            .await
            .unwrap();

        assert_eq!(loaded.round_trips, 1, "{strategy}");
        assert!(loaded.rows.into_summaries().is_empty(), "{strategy}");
    }
}

#[tokio::test]
async fn flat_rows_are_passed_through_for_regrouping() {
    let retrieval = retrieval(InMemoryOrderRepository::seeded(), 100);

    let loaded = retrieval
        .fetch(
            RetrievalStrategy::DirectFlatProjection,
            PageWindow::all(),
            Associations::All,
        )
        .await
        .unwrap();

    let OrderRows::Flat(rows) = &loaded.rows else {
        panic!("expected flat rows");
    };
    assert_eq!(rows.len(), 4);

    let simple = loaded.rows.into_simple_summaries();
    assert_eq!(simple.len(), 2);
    assert_eq!(simple[1].address.city, "Busan");
}

#[tokio::test]
async fn to_one_scope_leaves_lines_unloaded() {
    let retrieval = retrieval(InMemoryOrderRepository::seeded(), 100);

    for strategy in AGGREGATE_STRATEGIES {
        let loaded = retrieval
            .fetch(strategy, PageWindow::all(), Associations::ToOne)
            .await
            .unwrap();

        let OrderRows::Aggregates(orders) = loaded.rows else {
            panic!("expected aggregates from {strategy}");
        };
        assert_eq!(orders.len(), 2, "{strategy}");
        assert!(orders.iter().all(|o| o.order_items.is_empty()), "{strategy}");
    }
}

#[tokio::test]
async fn repeated_fetches_serialize_identically() {
    let retrieval = retrieval(InMemoryOrderRepository::seeded(), 100);

    for strategy in RetrievalStrategy::ALL {
        let first = summaries(&retrieval, strategy, PageWindow::all()).await;
        let second = summaries(&retrieval, strategy, PageWindow::all()).await;

        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap(),
            "{strategy}"
        );
    }
}

#[tokio::test]
async fn gateway_failures_surface_as_repository_errors() {
    let retrieval = retrieval(InMemoryOrderRepository::seeded().failing("store offline"), 100);

    let err = retrieval
        .fetch(
            RetrievalStrategy::BatchedLazyLoad,
            PageWindow::all(),
            Associations::All,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Repo(_)));
}

#[tokio::test]
async fn narrow_projection_is_one_round_trip() {
    let retrieval = retrieval(with_empty_third_order(), 100);

    let loaded = retrieval.fetch_simple_projection().await.unwrap();

    assert_eq!(loaded.round_trips, 1);
    assert_eq!(
        loaded.rows.iter().map(|r| r.order_id).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert_eq!(loaded.rows[0].member_name, "userA");
}

#[tokio::test]
async fn closed_session_refuses_gateway_access() {
    let session = ReadSession::open(Arc::new(InMemoryOrderRepository::seeded()));

    let orders = session
        .gateway()
        .unwrap()
        .find_orders(&PageWindow::all())
        .await
        .unwrap();
    assert_eq!(orders.len(), 2);

    session.close();

    assert!(matches!(
        session.gateway(),
        Err(ServiceError::DetachedAccess(_))
    ));
}
