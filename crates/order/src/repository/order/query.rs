use crate::{
    abstract_trait::order::repository::OrderQueryRepositoryTrait,
    domain::{requests::order::PageWindow, response::order::OrderSimpleSummary},
    model::{
        delivery::Delivery,
        member::Member,
        order::Order,
        row::{OrderFlatRow, OrderItemJoinRow, OrderLineRow, OrderMemberDeliveryRow},
    },
};
use async_trait::async_trait;
use shared::{config::ConnectionPool, errors::RepositoryError};
use sqlx::{Postgres, pool::PoolConnection};
use tracing::{error, info};

const ORDER_HEAD_COLUMNS: &str = r#"
    o.order_id,
    o.order_date,
    o.status,
    m.member_id,
    m.name AS member_name,
    m.city AS member_city,
    m.street AS member_street,
    m.zipcode AS member_zipcode,
    d.delivery_id,
    d.city AS delivery_city,
    d.street AS delivery_street,
    d.zipcode AS delivery_zipcode,
    d.status AS delivery_status
"#;

const ORDER_LINE_COLUMNS: &str = r#"
    oi.order_item_id,
    oi.order_id,
    oi.item_id,
    oi.order_price,
    oi.count,
    i.name AS item_name,
    i.price AS item_price
"#;

#[derive(Clone)]
pub struct OrderQueryRepository {
    db: ConnectionPool,
}

impl OrderQueryRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }

    async fn conn(&self) -> Result<PoolConnection<Postgres>, RepositoryError> {
        self.db.acquire().await.map_err(|e| {
            error!("❌ Failed to acquire DB connection: {:?}", e);
            RepositoryError::from(e)
        })
    }
}

#[async_trait]
impl OrderQueryRepositoryTrait for OrderQueryRepository {
    async fn find_orders(&self, window: &PageWindow) -> Result<Vec<Order>, RepositoryError> {
        info!(
            "📦 Fetching orders | offset: {}, limit: {:?}",
            window.offset(),
            window.limit()
        );

        let mut conn = self.conn().await?;

        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT order_id, member_id, delivery_id, order_date, status
            FROM orders
            ORDER BY order_id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(window.limit())
        .bind(window.offset())
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| {
            error!("❌ Failed to fetch orders: {:?}", e);
            RepositoryError::from(e)
        })?;

        Ok(orders)
    }

    async fn find_member(&self, member_id: i64) -> Result<Option<Member>, RepositoryError> {
        let mut conn = self.conn().await?;

        sqlx::query_as::<_, Member>(
            r#"
            SELECT member_id, name, city, street, zipcode
            FROM members
            WHERE member_id = $1
            "#,
        )
        .bind(member_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| {
            error!("❌ Failed to fetch member {}: {:?}", member_id, e);
            RepositoryError::from(e)
        })
    }

    async fn find_delivery(&self, delivery_id: i64) -> Result<Option<Delivery>, RepositoryError> {
        let mut conn = self.conn().await?;

        sqlx::query_as::<_, Delivery>(
            r#"
            SELECT delivery_id, city, street, zipcode, status
            FROM deliveries
            WHERE delivery_id = $1
            "#,
        )
        .bind(delivery_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| {
            error!("❌ Failed to fetch delivery {}: {:?}", delivery_id, e);
            RepositoryError::from(e)
        })
    }

    async fn find_order_lines(&self, order_id: i64) -> Result<Vec<OrderLineRow>, RepositoryError> {
        let mut conn = self.conn().await?;

        let sql = format!(
            r#"
            SELECT {ORDER_LINE_COLUMNS}
            FROM order_items oi
            JOIN items i ON i.item_id = oi.item_id
            WHERE oi.order_id = $1
            ORDER BY oi.order_item_id
            "#
        );

        sqlx::query_as::<_, OrderLineRow>(&sql)
            .bind(order_id)
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| {
                error!(
                    "❌ Failed to fetch order lines for order_id {}: {:?}",
                    order_id, e
                );
                RepositoryError::from(e)
            })
    }

    async fn find_order_lines_in(
        &self,
        order_ids: &[i64],
    ) -> Result<Vec<OrderLineRow>, RepositoryError> {
        if order_ids.is_empty() {
            return Ok(Vec::new());
        }

        info!("📦 Batch fetching order lines for {} orders", order_ids.len());

        let mut conn = self.conn().await?;

        let sql = format!(
            r#"
            SELECT {ORDER_LINE_COLUMNS}
            FROM order_items oi
            JOIN items i ON i.item_id = oi.item_id
            WHERE oi.order_id = ANY($1)
            ORDER BY oi.order_id, oi.order_item_id
            "#
        );

        sqlx::query_as::<_, OrderLineRow>(&sql)
            .bind(order_ids)
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| {
                error!("❌ Failed to batch fetch order lines: {:?}", e);
                RepositoryError::from(e)
            })
    }

    async fn find_orders_with_member_delivery(
        &self,
        window: &PageWindow,
    ) -> Result<Vec<OrderMemberDeliveryRow>, RepositoryError> {
        info!(
            "📦 Fetching orders with member and delivery | offset: {}, limit: {:?}",
            window.offset(),
            window.limit()
        );

        let mut conn = self.conn().await?;

        let sql = format!(
            r#"
            SELECT {ORDER_HEAD_COLUMNS}
            FROM orders o
            JOIN members m ON m.member_id = o.member_id
            JOIN deliveries d ON d.delivery_id = o.delivery_id
            ORDER BY o.order_id
            LIMIT $1 OFFSET $2
            "#
        );

        sqlx::query_as::<_, OrderMemberDeliveryRow>(&sql)
            .bind(window.limit())
            .bind(window.offset())
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| {
                error!("❌ Failed to fetch orders with member and delivery: {:?}", e);
                RepositoryError::from(e)
            })
    }

    async fn find_orders_with_items(&self) -> Result<Vec<OrderItemJoinRow>, RepositoryError> {
        info!("📦 Fetching orders with every association in one join");

        let mut conn = self.conn().await?;

        let sql = format!(
            r#"
            SELECT {ORDER_HEAD_COLUMNS},
                oi.order_item_id,
                oi.item_id,
                oi.order_price,
                oi.count,
                i.name AS item_name,
                i.price AS item_price
            FROM orders o
            JOIN members m ON m.member_id = o.member_id
            JOIN deliveries d ON d.delivery_id = o.delivery_id
            LEFT JOIN order_items oi ON oi.order_id = o.order_id
            LEFT JOIN items i ON i.item_id = oi.item_id
            ORDER BY o.order_id, oi.order_item_id
            "#
        );

        sqlx::query_as::<_, OrderItemJoinRow>(&sql)
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| {
                error!("❌ Failed to fetch joined order rows: {:?}", e);
                RepositoryError::from(e)
            })
    }

    async fn find_order_simple_rows(&self) -> Result<Vec<OrderSimpleSummary>, RepositoryError> {
        let mut conn = self.conn().await?;

        sqlx::query_as::<_, OrderSimpleSummary>(
            r#"
            SELECT
                o.order_id,
                m.name AS member_name,
                o.order_date,
                o.status,
                d.city,
                d.street,
                d.zipcode
            FROM orders o
            JOIN members m ON m.member_id = o.member_id
            JOIN deliveries d ON d.delivery_id = o.delivery_id
            ORDER BY o.order_id
            "#,
        )
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| {
            error!("❌ Failed to fetch order projections: {:?}", e);
            RepositoryError::from(e)
        })
    }

    async fn find_order_flat_rows(&self) -> Result<Vec<OrderFlatRow>, RepositoryError> {
        info!("📦 Fetching flat order rows");

        let mut conn = self.conn().await?;

        sqlx::query_as::<_, OrderFlatRow>(
            r#"
            SELECT
                o.order_id,
                m.name AS member_name,
                o.order_date,
                o.status,
                d.city,
                d.street,
                d.zipcode,
                i.name AS item_name,
                oi.order_price,
                oi.count
            FROM orders o
            JOIN members m ON m.member_id = o.member_id
            JOIN deliveries d ON d.delivery_id = o.delivery_id
            JOIN order_items oi ON oi.order_id = o.order_id
            JOIN items i ON i.item_id = oi.item_id
            ORDER BY o.order_id, oi.order_item_id
            "#,
        )
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| {
            error!("❌ Failed to fetch flat order rows: {:?}", e);
            RepositoryError::from(e)
        })
    }
}
