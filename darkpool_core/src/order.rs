use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub type OrderId = Uuid;
pub type AccountId = String;
pub type Price = Decimal;
pub type Quantity = Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Open,
    PartiallyFilled,
    Filled,
    Cancelled,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::Open => "open",
            OrderStatus::PartiallyFilled => "partially_filled",
            OrderStatus::Filled => "filled",
            OrderStatus::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

/// A resting or fully-specified limit order in the dark pool's book.
///
/// The book never publishes an `Order`'s contents outside the matching
/// engine task; every field here is only ever mutated by `MessageHandler`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user: AccountId,
    pub side: Side,
    pub price: Price,
    pub quantity: Quantity,
    pub filled: Quantity,
    pub status: OrderStatus,
    pub created_at: i64,
}

impl Order {
    pub fn new(id: OrderId, user: AccountId, side: Side, price: Price, quantity: Quantity, created_at: i64) -> Self {
        Self {
            id,
            user,
            side,
            price,
            quantity,
            filled: Decimal::ZERO,
            status: OrderStatus::Open,
            created_at,
        }
    }

    pub fn remaining(&self) -> Quantity {
        self.quantity - self.filled
    }

    pub fn is_resident(&self) -> bool {
        matches!(self.status, OrderStatus::Open | OrderStatus::PartiallyFilled)
    }

    /// Advances `filled` by `qty` and transitions status. Never called with
    /// `qty` greater than `remaining()` — the matcher enforces that bound.
    pub fn fill(&mut self, qty: Quantity) {
        self.filled += qty;
        self.status = if self.remaining().is_zero() {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        };
    }

    pub fn cancel(&mut self) {
        self.status = OrderStatus::Cancelled;
    }

    /// The asset and amount a resting order of this side reserves as liability.
    /// BUY reserves `price * remaining` of asset B; SELL reserves `remaining` of asset A.
    pub fn liability(&self) -> (Asset, Quantity) {
        match self.side {
            Side::Buy => (Asset::B, self.price * self.remaining()),
            Side::Sell => (Asset::A, self.remaining()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Asset {
    A,
    B,
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Asset::A => write!(f, "a"),
            Asset::B => write!(f, "b"),
        }
    }
}

impl std::str::FromStr for Asset {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "a" | "A" => Ok(Asset::A),
            "b" | "B" => Ok(Asset::B),
            _ => Err(()),
        }
    }
}
