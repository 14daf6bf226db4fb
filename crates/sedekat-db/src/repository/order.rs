//! # Order Repository
//!
//! Checkout writes and the order ledger read.
//!
//! ## Order Ledger Read
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  fetch_completed_orders(reseller_id, range)                             │
//! │                                                                         │
//! │  orders o                                                               │
//! │    JOIN resellers r ON r.catalog_token = o.catalog_token               │
//! │   WHERE r.id = reseller_id AND r.is_active = 1     (attribution)       │
//! │     AND LOWER(TRIM(o.status)) IN ('completed', 'selesai')              │
//! │     AND o.created_at >= start 00:00                (inclusive)         │
//! │     AND o.created_at <  (end + 1 day) 00:00        (exclusive)         │
//! │                                                                         │
//! │  order_items of those orders                                            │
//! │    LEFT JOIN products p   → live rates, NULL when the product is gone  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Status strings are normalized here. Nothing above this module sees the
//! Indonesian vocabulary.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::range_bounds;
use sedekat_core::earnings::RateTable;
use sedekat_core::money::Money;
use sedekat_core::{
    DateRange, DeliveryMethod, Order, OrderItem, OrderStatus, OrderWithItems, Points,
    ProductRates,
};

// =============================================================================
// Records
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct OrderRecord {
    id: String,
    customer_name: String,
    customer_phone: String,
    catalog_token: Option<String>,
    total_amount: i64,
    status: String,
    delivery_method: DeliveryMethod,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRecord> for Order {
    type Error = DbError;

    fn try_from(r: OrderRecord) -> DbResult<Self> {
        let status: OrderStatus = r.status.parse().map_err(|e| {
            warn!(order_id = %r.id, status = %r.status, "Order row has unknown status");
            DbError::corrupt("Order", r.id.clone(), e)
        })?;

        Ok(Order {
            id: r.id,
            customer_name: r.customer_name,
            customer_phone: r.customer_phone,
            catalog_token: r.catalog_token,
            total_amount_sen: r.total_amount,
            status,
            delivery_method: r.delivery_method,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

/// An order item row, plus the live product values when the product still exists.
#[derive(Debug, sqlx::FromRow)]
struct OrderItemRecord {
    id: String,
    order_id: String,
    product_id: String,
    product_name: String,
    product_price: i64,
    quantity: i64,
    subtotal: i64,
    product_commission_snapshot: Option<i64>,
    product_points_snapshot: Option<i64>,
    live_product_id: Option<String>,
    live_commission_value: Option<i64>,
    live_points_value: Option<i64>,
}

impl OrderItemRecord {
    fn live_rates(&self) -> Option<ProductRates> {
        self.live_product_id.as_ref().map(|_| ProductRates {
            commission_value: self.live_commission_value.map(Money::from_sen),
            points_value: self.live_points_value.map(Points::new),
        })
    }

    fn into_item(self) -> OrderItem {
        OrderItem {
            id: self.id,
            order_id: self.order_id,
            product_id: self.product_id,
            product_name: self.product_name,
            product_price_sen: self.product_price,
            quantity: self.quantity,
            subtotal_sen: self.subtotal,
            commission_snapshot_sen: self.product_commission_snapshot,
            points_snapshot: self.product_points_snapshot,
        }
    }
}

const ORDER_COLUMNS: &str = r#"
    o.id, o.customer_name, o.customer_phone, o.catalog_token, o.total_amount,
    o.status, o.delivery_method, o.created_at, o.updated_at
"#;

const ITEM_COLUMNS: &str = r#"
    i.id, i.order_id, i.product_id, i.product_name, i.product_price, i.quantity,
    i.subtotal, i.product_commission_snapshot, i.product_points_snapshot,
    p.id AS live_product_id,
    p.commission_value AS live_commission_value,
    p.points_value AS live_points_value
"#;

// =============================================================================
// Order Ledger
// =============================================================================

/// Completed orders attributed to one reseller, with the live rates of every
/// product their items reference that still exists.
#[derive(Debug, Clone, Default)]
pub struct OrderLedger {
    pub orders: Vec<OrderWithItems>,
    pub rates: RateTable,
}

/// `FROM ... WHERE ...` shared by the order and item halves of the ledger read.
///
/// Binds: `?1` reseller id, `?2` range start, `?3` range end, `?4..` status aliases.
fn completed_orders_filter() -> String {
    let aliases = OrderStatus::Completed.aliases();
    let placeholders: Vec<String> = (0..aliases.len()).map(|i| format!("?{}", i + 4)).collect();

    format!(
        r#"
        FROM orders o
        JOIN resellers r ON r.catalog_token = o.catalog_token
        WHERE r.id = ?1
          AND r.is_active = 1
          AND (?2 IS NULL OR o.created_at >= ?2)
          AND (?3 IS NULL OR o.created_at < ?3)
          AND LOWER(TRIM(o.status)) IN ({})
        "#,
        placeholders.join(", ")
    )
}

/// Reads the completed orders attributed to `reseller_id` within `range`.
///
/// Runs on the given connection so it can take part in a transaction.
pub async fn fetch_completed_orders(
    conn: &mut SqliteConnection,
    reseller_id: &str,
    range: &DateRange,
) -> DbResult<OrderLedger> {
    let (start, end) = range_bounds(range);
    let filter = completed_orders_filter();

    let order_sql = format!("SELECT {} {} ORDER BY o.created_at, o.id", ORDER_COLUMNS, filter);
    let mut order_query = sqlx::query_as::<_, OrderRecord>(&order_sql)
        .bind(reseller_id)
        .bind(start)
        .bind(end);
    for alias in OrderStatus::Completed.aliases() {
        order_query = order_query.bind(*alias);
    }
    let order_records = order_query.fetch_all(&mut *conn).await?;

    let item_sql = format!(
        "SELECT {} FROM order_items i \
         JOIN ({} {}) sel ON sel.id = i.order_id \
         LEFT JOIN products p ON p.id = i.product_id \
         ORDER BY i.order_id, i.rowid",
        ITEM_COLUMNS, "SELECT o.id", filter
    );
    let mut item_query = sqlx::query_as::<_, OrderItemRecord>(&item_sql)
        .bind(reseller_id)
        .bind(start)
        .bind(end);
    for alias in OrderStatus::Completed.aliases() {
        item_query = item_query.bind(*alias);
    }
    let item_records = item_query.fetch_all(&mut *conn).await?;

    let mut rates = RateTable::new();
    let mut items_by_order: HashMap<String, Vec<OrderItem>> = HashMap::new();
    for record in item_records {
        if let Some(live) = record.live_rates() {
            rates.insert(record.product_id.clone(), live);
        }
        items_by_order
            .entry(record.order_id.clone())
            .or_default()
            .push(record.into_item());
    }

    let mut orders = Vec::with_capacity(order_records.len());
    for record in order_records {
        let order = Order::try_from(record)?;
        let items = items_by_order.remove(&order.id).unwrap_or_default();
        orders.push(OrderWithItems { order, items });
    }

    debug!(
        reseller_id = %reseller_id,
        start = ?range.start(),
        end = ?range.end(),
        orders = orders.len(),
        "Fetched completed orders"
    );

    Ok(OrderLedger { orders, rates })
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Completed orders attributed to a reseller within a range.
    pub async fn completed_orders(
        &self,
        reseller_id: &str,
        range: &DateRange,
    ) -> DbResult<OrderLedger> {
        let mut conn = self.pool.acquire().await?;
        fetch_completed_orders(&mut *conn, reseller_id, range).await
    }

    /// Persists an order and all of its items in one transaction.
    ///
    /// Either every row is written or none is.
    pub async fn create_order(&self, aggregate: &OrderWithItems) -> DbResult<()> {
        let order = &aggregate.order;
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, customer_name, customer_phone, catalog_token, total_amount,
                status, delivery_method, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&order.id)
        .bind(&order.customer_name)
        .bind(&order.customer_phone)
        .bind(&order.catalog_token)
        .bind(order.total_amount_sen)
        .bind(order.status.as_str())
        .bind(order.delivery_method)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        for item in &aggregate.items {
            sqlx::query(
                r#"
                INSERT INTO order_items (
                    id, order_id, product_id, product_name, product_price,
                    quantity, subtotal, product_commission_snapshot, product_points_snapshot
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(&item.id)
            .bind(&order.id)
            .bind(&item.product_id)
            .bind(&item.product_name)
            .bind(item.product_price_sen)
            .bind(item.quantity)
            .bind(item.subtotal_sen)
            .bind(item.commission_snapshot_sen)
            .bind(item.points_snapshot)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            order_id = %order.id,
            items = aggregate.items.len(),
            total = %order.total_amount(),
            token = ?order.catalog_token,
            "Order created"
        );

        Ok(())
    }

    /// Gets an order by ID, without items.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let record: Option<OrderRecord> =
            sqlx::query_as(&format!("SELECT {} FROM orders o WHERE o.id = ?1", ORDER_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        record.map(Order::try_from).transpose()
    }

    /// Gets an order with its items.
    pub async fn get_with_items(&self, id: &str) -> DbResult<Option<OrderWithItems>> {
        let Some(order) = self.get_by_id(id).await? else {
            return Ok(None);
        };

        let records: Vec<OrderItemRecord> = sqlx::query_as(&format!(
            "SELECT {} FROM order_items i \
             LEFT JOIN products p ON p.id = i.product_id \
             WHERE i.order_id = ?1 ORDER BY i.rowid",
            ITEM_COLUMNS
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(OrderWithItems {
            order,
            items: records.into_iter().map(OrderItemRecord::into_item).collect(),
        }))
    }

    /// Moves an order to `to`, but only if it is still in `from`.
    ///
    /// Matches `from` in either vocabulary and writes the canonical name.
    /// Returns `false` when the stored status no longer matches.
    pub async fn update_status_if(
        &self,
        id: &str,
        from: OrderStatus,
        to: OrderStatus,
    ) -> DbResult<bool> {
        let aliases = from.aliases();
        let placeholders: Vec<String> =
            (0..aliases.len()).map(|i| format!("?{}", i + 4)).collect();
        let sql = format!(
            "UPDATE orders SET status = ?2, updated_at = ?3 \
             WHERE id = ?1 AND LOWER(TRIM(status)) IN ({})",
            placeholders.join(", ")
        );

        let mut query = sqlx::query(&sql).bind(id).bind(to.as_str()).bind(Utc::now());
        for alias in aliases {
            query = query.bind(*alias);
        }
        let result = query.execute(&self.pool).await?;

        let updated = result.rows_affected() == 1;
        debug!(order_id = %id, %from, %to, updated, "Order status compare-and-set");
        Ok(updated)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
