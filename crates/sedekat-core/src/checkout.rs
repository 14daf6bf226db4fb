//! # Checkout
//!
//! Builds a complete order aggregate in memory so it can be persisted in one
//! transaction.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  OrderDraft (from catalog page)                                         │
//! │  ├── customer name / phone                                              │
//! │  ├── catalog_token (reseller link, optional)                            │
//! │  └── lines: [(product_id, qty), ...]                                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  OrderBuilder::build(products, now)                                     │
//! │  ├── validate customer fields and quantities                           │
//! │  ├── merge repeated lines for the same product                         │
//! │  ├── look up each product (must exist and be active)                   │
//! │  └── freeze name, price, commission and points into each item          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  OrderWithItems  ──► sedekat-db inserts order + items atomically       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{DeliveryMethod, Order, OrderItem, OrderStatus, OrderWithItems, Product};
use crate::validation::{
    normalize_catalog_token, validate_customer_name, validate_id, validate_item_count,
    validate_phone, validate_quantity,
};

// =============================================================================
// Draft
// =============================================================================

/// One requested line at checkout.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DraftLine {
    pub product_id: String,
    pub quantity: i64,
}

/// What the checkout form submits.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderDraft {
    pub customer_name: String,
    pub customer_phone: String,
    #[serde(default)]
    pub catalog_token: Option<String>,
    #[serde(default)]
    pub delivery_method: DeliveryMethod,
    pub lines: Vec<DraftLine>,
}

impl OrderDraft {
    /// Product ids referenced by the draft, deduplicated.
    pub fn product_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.lines.iter().map(|l| l.product_id.clone()).collect();
        ids.sort();
        ids.dedup();
        ids
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Turns an [`OrderDraft`] into an [`OrderWithItems`] with snapshots taken
/// from the product master.
#[derive(Debug)]
pub struct OrderBuilder {
    draft: OrderDraft,
}

impl OrderBuilder {
    pub fn new(draft: OrderDraft) -> Self {
        OrderBuilder { draft }
    }

    /// Validates the draft and freezes product data into the items.
    ///
    /// `products` must contain every product the draft references that still
    /// exists. Missing entries fail with `ProductNotFound`.
    pub fn build(
        self,
        products: &HashMap<String, Product>,
        now: DateTime<Utc>,
    ) -> CoreResult<OrderWithItems> {
        let draft = self.draft;

        let customer_name = validate_customer_name(&draft.customer_name)?;
        let customer_phone = validate_phone(&draft.customer_phone)?;
        let catalog_token = normalize_catalog_token(draft.catalog_token.as_deref())?;

        if draft.lines.is_empty() {
            return Err(CoreError::EmptyOrder);
        }

        // Merge repeated lines, keeping first-seen order.
        let mut merged: Vec<(String, i64)> = Vec::with_capacity(draft.lines.len());
        for line in &draft.lines {
            validate_id("product_id", &line.product_id)?;
            validate_quantity(line.quantity)?;
            match merged.iter_mut().find(|(id, _)| *id == line.product_id) {
                Some((_, qty)) => *qty += line.quantity,
                None => merged.push((line.product_id.clone(), line.quantity)),
            }
        }
        validate_item_count(merged.len())?;

        let order_id = Uuid::new_v4().to_string();
        let mut items = Vec::with_capacity(merged.len());
        let mut total = Money::zero();

        for (product_id, quantity) in merged {
            validate_quantity(quantity)?;

            let product = products
                .get(&product_id)
                .ok_or_else(|| CoreError::ProductNotFound(product_id.clone()))?;
            if !product.is_active {
                return Err(CoreError::ProductInactive(product_id));
            }

            let subtotal = product.price().multiply_quantity(quantity);
            total += subtotal;

            items.push(OrderItem {
                id: Uuid::new_v4().to_string(),
                order_id: order_id.clone(),
                product_id: product.id.clone(),
                product_name: product.name.clone(),
                product_price_sen: product.price_sen,
                quantity,
                subtotal_sen: subtotal.sen(),
                commission_snapshot_sen: product.commission_value_sen,
                points_snapshot: product.points_value,
            });
        }

        Ok(OrderWithItems {
            order: Order {
                id: order_id,
                customer_name,
                customer_phone,
                catalog_token,
                total_amount_sen: total.sen(),
                status: OrderStatus::Pending,
                delivery_method: draft.delivery_method,
                created_at: now,
                updated_at: now,
            },
            items,
        })
    }
}

/// Validates an admin status change on an order.
pub fn check_order_transition(
    order_id: &str,
    from: OrderStatus,
    to: OrderStatus,
) -> CoreResult<()> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(CoreError::InvalidOrderTransition {
            order_id: order_id.to_string(),
            from,
            to,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
