use crate::{
    abstract_trait::order::repository::OrderQueryRepositoryTrait,
    domain::{requests::order::PageWindow, response::order::OrderSimpleSummary},
    model::{
        delivery::{Delivery, DeliveryStatus},
        item::Item,
        member::{Address, Member},
        order::{Order, OrderStatus},
        order_item::OrderItem,
        row::{OrderFlatRow, OrderItemJoinRow, OrderLineRow, OrderMemberDeliveryRow},
    },
};
use async_trait::async_trait;
use chrono::NaiveDate;
use shared::errors::RepositoryError;
use std::collections::BTreeMap;

/// Process-local order store with the same join and ordering rules as the
/// PostgreSQL repository: inner joins drop dangling references, results are
/// sorted by order id then order item id.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderRepository {
    members: BTreeMap<i64, Member>,
    deliveries: BTreeMap<i64, Delivery>,
    items: BTreeMap<i64, Item>,
    orders: BTreeMap<i64, Order>,
    order_items: BTreeMap<i64, OrderItem>,
    failure: Option<String>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Same rows as the demo seed migration.
    pub fn seeded() -> Self {
        let at = |h: u32, m: u32| {
            NaiveDate::from_ymd_opt(2025, 6, 1)
                .and_then(|d| d.and_hms_opt(h, m, 0))
                .unwrap_or_default()
        };

        let seoul = Address::new("Seoul", "Gangnam-daero 1", "06236");
        let busan = Address::new("Busan", "Haeundae-ro 2", "48094");

        Self::new()
            .with_member(Member {
                member_id: 1,
                name: "userA".into(),
                address: seoul.clone(),
            })
            .with_member(Member {
                member_id: 2,
                name: "userB".into(),
                address: busan.clone(),
            })
            .with_delivery(Delivery {
                delivery_id: 1,
                address: seoul,
                status: DeliveryStatus::Ready,
            })
            .with_delivery(Delivery {
                delivery_id: 2,
                address: busan,
                status: DeliveryStatus::Ready,
            })
            .with_item(Item {
                item_id: 1,
                name: "JPA1 BOOK".into(),
                price: 10000,
            })
            .with_item(Item {
                item_id: 2,
                name: "JPA2 BOOK".into(),
                price: 20000,
            })
            .with_item(Item {
                item_id: 3,
                name: "SPRING1 BOOK".into(),
                price: 20000,
            })
            .with_item(Item {
                item_id: 4,
                name: "SPRING2 BOOK".into(),
                price: 40000,
            })
            .with_order(Order {
                order_id: 1,
                member_id: 1,
                delivery_id: 1,
                order_date: at(10, 0),
                status: OrderStatus::Ordered,
            })
            .with_order(Order {
                order_id: 2,
                member_id: 2,
                delivery_id: 2,
                order_date: at(11, 30),
                status: OrderStatus::Ordered,
            })
            .with_order_item(OrderItem {
                order_item_id: 1,
                order_id: 1,
                item_id: 1,
                order_price: 10000,
                count: 1,
            })
            .with_order_item(OrderItem {
                order_item_id: 2,
                order_id: 1,
                item_id: 2,
                order_price: 20000,
                count: 2,
            })
            .with_order_item(OrderItem {
                order_item_id: 3,
                order_id: 2,
                item_id: 3,
                order_price: 20000,
                count: 3,
            })
            .with_order_item(OrderItem {
                order_item_id: 4,
                order_id: 2,
                item_id: 4,
                order_price: 40000,
                count: 4,
            })
    }

    pub fn with_member(mut self, member: Member) -> Self {
        self.members.insert(member.member_id, member);
        self
    }

    pub fn with_delivery(mut self, delivery: Delivery) -> Self {
        self.deliveries.insert(delivery.delivery_id, delivery);
        self
    }

    pub fn with_item(mut self, item: Item) -> Self {
        self.items.insert(item.item_id, item);
        self
    }

    pub fn with_order(mut self, order: Order) -> Self {
        self.orders.insert(order.order_id, order);
        self
    }

    pub fn with_order_item(mut self, order_item: OrderItem) -> Self {
        self.order_items.insert(order_item.order_item_id, order_item);
        self
    }

    /// Every query fails with `message` afterwards.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    fn check(&self) -> Result<(), RepositoryError> {
        match &self.failure {
            Some(message) => Err(RepositoryError::Custom(message.clone())),
            None => Ok(()),
        }
    }

    fn heads(&self) -> impl Iterator<Item = OrderMemberDeliveryRow> + '_ {
        self.orders.values().filter_map(|order| {
            let member = self.members.get(&order.member_id)?;
            let delivery = self.deliveries.get(&order.delivery_id)?;
            Some(OrderMemberDeliveryRow::from_parts(order, member, delivery))
        })
    }

    fn lines_of(&self, order_id: i64) -> impl Iterator<Item = OrderLineRow> + '_ {
        self.order_items
            .values()
            .filter(move |oi| oi.order_id == order_id)
            .filter_map(|oi| {
                let item = self.items.get(&oi.item_id)?;
                Some(OrderLineRow::from_parts(oi, item))
            })
    }
}

#[async_trait]
impl OrderQueryRepositoryTrait for InMemoryOrderRepository {
    async fn find_orders(&self, window: &PageWindow) -> Result<Vec<Order>, RepositoryError> {
        self.check()?;
        Ok(window.apply(self.orders.values().cloned()))
    }

    async fn find_member(&self, member_id: i64) -> Result<Option<Member>, RepositoryError> {
        self.check()?;
        Ok(self.members.get(&member_id).cloned())
    }

    async fn find_delivery(&self, delivery_id: i64) -> Result<Option<Delivery>, RepositoryError> {
        self.check()?;
        Ok(self.deliveries.get(&delivery_id).cloned())
    }

    async fn find_order_lines(&self, order_id: i64) -> Result<Vec<OrderLineRow>, RepositoryError> {
        self.check()?;
        Ok(self.lines_of(order_id).collect())
    }

    async fn find_order_lines_in(
        &self,
        order_ids: &[i64],
    ) -> Result<Vec<OrderLineRow>, RepositoryError> {
        self.check()?;

        let mut ids = order_ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        Ok(ids.into_iter().flat_map(|id| self.lines_of(id)).collect())
    }

    async fn find_orders_with_member_delivery(
        &self,
        window: &PageWindow,
    ) -> Result<Vec<OrderMemberDeliveryRow>, RepositoryError> {
        self.check()?;
        Ok(window.apply(self.heads()))
    }

    async fn find_orders_with_items(&self) -> Result<Vec<OrderItemJoinRow>, RepositoryError> {
        self.check()?;

        let mut rows = Vec::new();
        for head in self.heads() {
            let lines: Vec<OrderLineRow> = self.lines_of(head.order_id).collect();

            if lines.is_empty() {
                rows.push(OrderItemJoinRow {
                    head,
                    order_item_id: None,
                    item_id: None,
                    order_price: None,
                    count: None,
                    item_name: None,
                    item_price: None,
                });
                continue;
            }

            for line in lines {
                rows.push(OrderItemJoinRow {
                    head: head.clone(),
                    order_item_id: Some(line.order_item_id),
                    item_id: Some(line.item_id),
                    order_price: Some(line.order_price),
                    count: Some(line.count),
                    item_name: Some(line.item_name),
                    item_price: Some(line.item_price),
                });
            }
        }

        Ok(rows)
    }

    async fn find_order_simple_rows(&self) -> Result<Vec<OrderSimpleSummary>, RepositoryError> {
        self.check()?;

        Ok(self
            .heads()
            .map(|head| OrderSimpleSummary {
                order_id: head.order_id,
                member_name: head.member_name,
                order_date: head.order_date,
                status: head.status,
                address: Address {
                    city: head.delivery_city,
                    street: head.delivery_street,
                    zipcode: head.delivery_zipcode,
                },
            })
            .collect())
    }

    async fn find_order_flat_rows(&self) -> Result<Vec<OrderFlatRow>, RepositoryError> {
        self.check()?;

        let mut rows = Vec::new();
        for head in self.heads() {
            for line in self.lines_of(head.order_id) {
                rows.push(OrderFlatRow {
                    order_id: head.order_id,
                    member_name: head.member_name.clone(),
                    order_date: head.order_date,
                    status: head.status,
                    address: Address {
                        city: head.delivery_city.clone(),
                        street: head.delivery_street.clone(),
                        zipcode: head.delivery_zipcode.clone(),
                    },
                    item_name: line.item_name,
                    order_price: line.order_price,
                    count: line.count,
                });
            }
        }

        Ok(rows)
    }
}
