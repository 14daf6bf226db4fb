//! # Domain Types
//!
//! Core domain types of the reseller ledger.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Reseller     │   │     Order       │   │   OrderItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  product_id     │       │
//! │  │  catalog_token ─┼──►│  catalog_token  │◄──┤  quantity       │       │
//! │  │  is_active      │   │  status         │   │  commission_    │       │
//! │  └────────┬────────┘   └─────────────────┘   │    snapshot     │       │
//! │           │                                   │  points_snapshot│       │
//! │           │                                   └─────────────────┘       │
//! │           ▼                                                             │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │RewardRedemption │──►│RewardCatalog-   │                             │
//! │  │  status         │   │  Entry          │                             │
//! │  │  amount_redeemed│   │  reward_type    │                             │
//! │  └─────────────────┘   │  cost           │                             │
//! │                        └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Amount Units
//! Rows that hold "an amount of commission or points" (`RewardCatalogEntry::cost`,
//! `RewardRedemption::amount_redeemed`) store a bare `i64` whose unit follows
//! the row's [`RewardType`]: sen for commission, points for points. Use
//! [`LedgerAmount`] to carry such a value with its unit attached.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::CoreError;
use crate::money::Money;

// =============================================================================
// Points
// =============================================================================

/// Reward points, always whole numbers.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Points(i64);

impl Points {
    #[inline]
    pub const fn new(value: i64) -> Self {
        Points(value)
    }

    #[inline]
    pub const fn zero() -> Self {
        Points(0)
    }

    #[inline]
    pub const fn value(&self) -> i64 {
        self.0
    }

    /// Returns the value, or zero if it is negative.
    #[inline]
    pub const fn floor_zero(&self) -> Self {
        if self.0 < 0 {
            Points(0)
        } else {
            Points(self.0)
        }
    }
}

impl fmt::Display for Points {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} pts", self.0)
    }
}

impl Add for Points {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Points(self.0 + other.0)
    }
}

impl AddAssign for Points {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Points {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Points(self.0 - other.0)
    }
}

impl Mul<i64> for Points {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Points(self.0 * qty)
    }
}

impl Sum for Points {
    fn sum<I: Iterator<Item = Points>>(iter: I) -> Self {
        iter.fold(Points::zero(), Add::add)
    }
}

// =============================================================================
// Reward Type
// =============================================================================

/// Which balance a reward is paid from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RewardType {
    /// Paid from earned commission (amounts in sen).
    Commission,
    /// Paid from earned points.
    Points,
}

impl RewardType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            RewardType::Commission => "commission",
            RewardType::Points => "points",
        }
    }
}

impl fmt::Display for RewardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An amount tagged with the balance it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", content = "amount", rename_all = "snake_case")]
pub enum LedgerAmount {
    Commission(Money),
    Points(Points),
}

impl LedgerAmount {
    /// Interprets a raw stored amount according to its reward type.
    pub const fn from_raw(reward_type: RewardType, raw: i64) -> Self {
        match reward_type {
            RewardType::Commission => LedgerAmount::Commission(Money::from_sen(raw)),
            RewardType::Points => LedgerAmount::Points(Points::new(raw)),
        }
    }

    /// The raw stored value (sen or points).
    pub const fn raw(&self) -> i64 {
        match self {
            LedgerAmount::Commission(m) => m.sen(),
            LedgerAmount::Points(p) => p.value(),
        }
    }

    pub const fn reward_type(&self) -> RewardType {
        match self {
            LedgerAmount::Commission(_) => RewardType::Commission,
            LedgerAmount::Points(_) => RewardType::Points,
        }
    }
}

impl fmt::Display for LedgerAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerAmount::Commission(m) => m.fmt(f),
            LedgerAmount::Points(p) => p.fmt(f),
        }
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Fulfillment status of an order.
///
/// ## Two Vocabularies, One Enum
/// Rows written by older screens use Indonesian status names. Parsing accepts
/// both vocabularies (case-insensitive); writes always use [`OrderStatus::as_str`].
///
/// ```text
/// pending ──► confirmed ──► processing ──► ready ──► completed
///    │            │              │           │
///    └────────────┴──────────────┴───────────┴──────► cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Ready,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Ready,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    /// Canonical stored name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Processing => "processing",
            OrderStatus::Ready => "ready",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Every lowercase spelling found in stored rows for this status.
    pub const fn aliases(&self) -> &'static [&'static str] {
        match self {
            OrderStatus::Pending => &["pending", "menunggu"],
            OrderStatus::Confirmed => &["confirmed", "dikonfirmasi"],
            OrderStatus::Processing => &["processing", "diproses"],
            OrderStatus::Ready => &["ready", "siap"],
            OrderStatus::Completed => &["completed", "selesai"],
            OrderStatus::Cancelled => &["cancelled", "dibatalkan"],
        }
    }

    /// Position along the fulfillment pipeline. Cancelled has no position.
    const fn stage(&self) -> Option<u8> {
        match self {
            OrderStatus::Pending => Some(0),
            OrderStatus::Confirmed => Some(1),
            OrderStatus::Processing => Some(2),
            OrderStatus::Ready => Some(3),
            OrderStatus::Completed => Some(4),
            OrderStatus::Cancelled => None,
        }
    }

    /// Completed and cancelled orders never change again.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Whether an admin may move an order from `self` to `next`.
    ///
    /// Forward moves may skip stages; backward moves and no-op moves are refused.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match (self.stage(), next.stage()) {
            (_, None) => true,
            (Some(from), Some(to)) => to > from,
            (None, Some(_)) => false,
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_lowercase();
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.aliases().contains(&normalized.as_str()))
            .ok_or_else(|| CoreError::UnknownOrderStatus(raw.to_string()))
    }
}

// =============================================================================
// Redemption Status
// =============================================================================

/// Lifecycle of a reward redemption. Only `Approved` reduces a balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RedemptionStatus {
    Pending,
    Approved,
    Rejected,
}

impl RedemptionStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            RedemptionStatus::Pending => "pending",
            RedemptionStatus::Approved => "approved",
            RedemptionStatus::Rejected => "rejected",
        }
    }
}

impl Default for RedemptionStatus {
    fn default() -> Self {
        RedemptionStatus::Pending
    }
}

impl fmt::Display for RedemptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Delivery Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    /// Customer collects from the branch.
    Pickup,
    /// Shipped or delivered by courier.
    Delivery,
}

impl Default for DeliveryMethod {
    fn default() -> Self {
        DeliveryMethod::Pickup
    }
}

// =============================================================================
// Product
// =============================================================================

/// Catalog master record. Its commission/points values are only the
/// fallback for order items that carry no snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Selling price in sen.
    pub price_sen: i64,
    /// Commission per unit in sen.
    pub commission_value_sen: Option<i64>,
    /// Points per unit.
    pub points_value: Option<i64>,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_sen(self.price_sen)
    }

    /// The per-unit rates used when an order item lacks snapshots.
    pub fn rates(&self) -> ProductRates {
        ProductRates {
            commission_value: self.commission_value_sen.map(Money::from_sen),
            points_value: self.points_value.map(Points::new),
        }
    }
}

/// Current per-unit commission and points of a product.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProductRates {
    pub commission_value: Option<Money>,
    pub points_value: Option<Points>,
}

// =============================================================================
// Reseller
// =============================================================================

/// A mitra entitled to commission and points on orders placed through their
/// catalog link.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Reseller {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub address: Option<String>,
    pub branch_id: Option<String>,
    /// Commission rate in basis points, shown on the reseller profile.
    pub commission_rate_bps: i64,
    pub is_active: bool,
    /// Opaque token embedded in the reseller's catalog link.
    pub catalog_token: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Order
// =============================================================================

/// A customer purchase.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub customer_name: String,
    pub customer_phone: String,
    /// Token of the reseller catalog that produced this order, if any.
    pub catalog_token: Option<String>,
    pub total_amount_sen: i64,
    pub status: OrderStatus,
    pub delivery_method: DeliveryMethod,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_sen(self.total_amount_sen)
    }
}

/// A line item. Name, price and rates are frozen at checkout.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    /// Product name at time of order (frozen).
    pub product_name: String,
    /// Unit price in sen at time of order (frozen).
    pub product_price_sen: i64,
    pub quantity: i64,
    pub subtotal_sen: i64,
    /// Commission per unit in sen at time of order.
    pub commission_snapshot_sen: Option<i64>,
    /// Points per unit at time of order.
    pub points_snapshot: Option<i64>,
}

impl OrderItem {
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_sen(self.subtotal_sen)
    }

    #[inline]
    pub fn commission_snapshot(&self) -> Option<Money> {
        self.commission_snapshot_sen.map(Money::from_sen)
    }

    #[inline]
    pub fn points_snapshot(&self) -> Option<Points> {
        self.points_snapshot.map(Points::new)
    }
}

/// An order together with its line items.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

// =============================================================================
// Rewards
// =============================================================================

/// A redeemable reward.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RewardCatalogEntry {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub reward_type: RewardType,
    /// Sen for commission rewards, points for points rewards.
    pub cost: i64,
    pub is_active: bool,
}

impl RewardCatalogEntry {
    #[inline]
    pub fn cost_amount(&self) -> LedgerAmount {
        LedgerAmount::from_raw(self.reward_type, self.cost)
    }
}

/// A reseller's claim against a reward.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RewardRedemption {
    pub id: String,
    pub reseller_id: String,
    pub reward_id: Option<String>,
    pub reward_type: RewardType,
    /// Sen for commission rewards, points for points rewards.
    pub amount_redeemed: i64,
    pub reward_description: String,
    pub status: RedemptionStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub decided_at: Option<DateTime<Utc>>,
}

impl RewardRedemption {
    #[inline]
    pub fn amount(&self) -> LedgerAmount {
        LedgerAmount::from_raw(self.reward_type, self.amount_redeemed)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
