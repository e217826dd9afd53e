//! Regrouping of duplicated join output.
//!
//! Both the collection fetch join and the flat projection return the order
//! head once per line. [`group_stable`] folds such rows back together while
//! keeping first-seen order, so the canonical sort of the query survives.

use crate::{
    domain::response::order::{OrderLineSummary, OrderSummary},
    model::{
        aggregate::OrderAggregate,
        member::Address,
        order::OrderStatus,
        row::{OrderFlatRow, OrderItemJoinRow},
    },
};
use chrono::NaiveDateTime;
use shared::errors::ServiceError;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Groups `rows` by `key_of`. Groups come out in the order their key first
/// appears; rows inside a group keep their input order.
pub fn group_stable<T, K, F>(rows: impl IntoIterator<Item = T>, key_of: F) -> Vec<(K, Vec<T>)>
where
    K: Eq + Hash + Clone,
    F: Fn(&T) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<T>)> = Vec::new();

    for row in rows {
        let key = key_of(&row);

        match index.get(&key) {
            Some(&pos) => groups[pos].1.push(row),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, vec![row]));
            }
        }
    }

    groups
}

/// Every order-level column of a flat row. Rows of the same order must agree
/// on all of them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderFlatKey {
    pub order_id: i64,
    pub member_name: String,
    pub order_date: NaiveDateTime,
    pub status: OrderStatus,
    pub address: Address,
}

impl From<&OrderFlatRow> for OrderFlatKey {
    fn from(row: &OrderFlatRow) -> Self {
        Self {
            order_id: row.order_id,
            member_name: row.member_name.clone(),
            order_date: row.order_date,
            status: row.status,
            address: row.address.clone(),
        }
    }
}

/// One summary per distinct order key, lines in first-appearance order.
pub fn regroup_flat_rows(rows: Vec<OrderFlatRow>) -> Vec<OrderSummary> {
    group_stable(rows, |row| OrderFlatKey::from(row))
        .into_iter()
        .map(|(key, lines)| OrderSummary {
            order_id: key.order_id,
            member_name: key.member_name,
            order_date: key.order_date,
            status: key.status,
            address: key.address,
            items: lines
                .into_iter()
                .map(|row| OrderLineSummary {
                    item_name: row.item_name,
                    price: row.order_price,
                    quantity: row.count,
                })
                .collect(),
        })
        .collect()
}

/// Collapses fetch-join rows into one aggregate per order id. A head without
/// line columns (outer join, order without lines) yields an empty collection.
pub fn dedupe_joined_rows(rows: Vec<OrderItemJoinRow>) -> Vec<OrderAggregate> {
    group_stable(rows, |row| row.head.order_id)
        .into_iter()
        .filter_map(|(_, rows)| {
            let lines = rows.iter().filter_map(OrderItemJoinRow::line).collect();
            let head = rows.into_iter().next()?.head;
            Some(head.into_aggregate(lines))
        })
        .collect()
}

pub fn ensure_distinct_orders(
    order_ids: impl IntoIterator<Item = i64>,
) -> Result<(), ServiceError> {
    let mut seen = HashSet::new();

    for order_id in order_ids {
        if !seen.insert(order_id) {
            return Err(ServiceError::Internal(format!(
                "order {order_id} appears more than once in the result"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{delivery::DeliveryStatus, row::OrderMemberDeliveryRow};
    use chrono::NaiveDate;

    fn date() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 1)
            .and_then(|d| d.and_hms_opt(9, 0, 0))
            .unwrap()
    }

    fn flat(order_id: i64, member: &str, item: &str, price: i32, count: i32) -> OrderFlatRow {
        OrderFlatRow {
            order_id,
            member_name: member.into(),
            order_date: date(),
            status: OrderStatus::Ordered,
            address: Address::new("Seoul", "1 Main St", "12345"),
            item_name: item.into(),
            order_price: price,
            count,
        }
    }

    fn head(order_id: i64) -> OrderMemberDeliveryRow {
        OrderMemberDeliveryRow {
            order_id,
            order_date: date(),
            status: OrderStatus::Ordered,
            member_id: order_id,
            member_name: format!("member-{order_id}"),
            member_city: "Seoul".into(),
            member_street: "1 Main St".into(),
            member_zipcode: "12345".into(),
            delivery_id: order_id,
            delivery_city: "Seoul".into(),
            delivery_street: "1 Main St".into(),
            delivery_zipcode: "12345".into(),
            delivery_status: DeliveryStatus::Ready,
        }
    }

    fn joined(order_id: i64, order_item_id: Option<i64>) -> OrderItemJoinRow {
        OrderItemJoinRow {
            head: head(order_id),
            order_item_id,
            item_id: order_item_id.map(|id| id * 10),
            order_price: order_item_id.map(|_| 100),
            count: order_item_id.map(|_| 1),
            item_name: order_item_id.map(|id| format!("item-{id}")),
            item_price: order_item_id.map(|_| 120),
        }
    }

    #[test]
    fn group_stable_keeps_first_seen_order() {
        let groups = group_stable(vec![3, 1, 3, 2, 1], |n| *n);

        assert_eq!(
            groups,
            vec![(3, vec![3, 3]), (1, vec![1, 1]), (2, vec![2])]
        );
    }

    #[test]
    fn group_stable_of_nothing_is_empty() {
        let groups = group_stable(Vec::<i32>::new(), |n| *n);

        assert!(groups.is_empty());
    }

    #[test]
    fn flat_rows_regroup_per_order() {
        let rows = vec![
            flat(1, "Alice", "Book", 10, 2),
            flat(1, "Alice", "Pen", 2, 5),
            flat(2, "Bob", "Book", 10, 1),
        ];

        let summaries = regroup_flat_rows(rows);

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].order_id, 1);
        assert_eq!(
            summaries[0].items,
            vec![
                OrderLineSummary {
                    item_name: "Book".into(),
                    price: 10,
                    quantity: 2,
                },
                OrderLineSummary {
                    item_name: "Pen".into(),
                    price: 2,
                    quantity: 5,
                },
            ]
        );
        assert_eq!(summaries[1].member_name, "Bob");
        assert_eq!(summaries[1].items.len(), 1);
    }

    #[test]
    fn flat_key_covers_every_order_column() {
        let a = flat(1, "Alice", "Book", 10, 2);
        let mut b = flat(1, "Alice", "Pen", 2, 5);
        b.address.zipcode = "99999".into();

        let summaries = regroup_flat_rows(vec![a, b]);

        assert_eq!(summaries.len(), 2);
    }

    #[test]
    fn joined_rows_collapse_to_one_aggregate_per_order() {
        let rows = vec![
            joined(1, Some(1)),
            joined(1, Some(2)),
            joined(2, None),
            joined(3, Some(3)),
        ];

        let orders = dedupe_joined_rows(rows);

        let ids: Vec<i64> = orders.iter().map(OrderAggregate::order_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(orders[0].order_items.len(), 2);
        assert_eq!(orders[0].order_items[1].order_item.order_item_id, 2);
        assert!(orders[1].order_items.is_empty());
    }

    #[test]
    fn duplicated_order_ids_are_rejected() {
        assert!(ensure_distinct_orders([1, 2, 3]).is_ok());
        assert!(matches!(
            ensure_distinct_orders([1, 2, 1]),
            Err(ServiceError::Internal(_))
        ));
    }
}
