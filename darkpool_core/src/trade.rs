use crate::order::{AccountId, OrderId, Price, Quantity};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An immutable record of a single match between a resting order and an
/// incoming one. Always transfers asset A from seller to buyer and asset B
/// from buyer to seller, priced at the resting (maker) order's price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub id: Uuid,
    pub buyer: AccountId,
    pub seller: AccountId,
    pub buy_order_id: OrderId,
    pub sell_order_id: OrderId,
    pub price: Price,
    pub quantity: Quantity,
    pub created_at: i64,
}

impl Trade {
    pub fn new(
        id: Uuid,
        buyer: AccountId,
        seller: AccountId,
        buy_order_id: OrderId,
        sell_order_id: OrderId,
        price: Price,
        quantity: Quantity,
        created_at: i64,
    ) -> Self {
        Self {
            id,
            buyer,
            seller,
            buy_order_id,
            sell_order_id,
            price,
            quantity,
            created_at,
        }
    }

    /// Asset A transferred (seller -> buyer). Equal to `quantity` by definition.
    pub fn amount_a(&self) -> Quantity {
        self.quantity
    }

    /// Asset B transferred (buyer -> seller). Equal to `price * quantity`.
    pub fn amount_b(&self) -> Quantity {
        self.price * self.quantity
    }
}
