use crate::order::{Order, OrderId, Price, Side};
use crate::trade::Trade;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap, VecDeque};
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
struct PriceLevel {
    orders: VecDeque<Order>,
    total_quantity: Decimal,
}

impl PriceLevel {
    fn push(&mut self, order: Order) {
        self.total_quantity += order.remaining();
        self.orders.push_back(order);
    }

    fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

/// Two-sided price-time priority index. Bids are kept in a `BTreeMap` keyed
/// by price and walked from the highest key down (best bid = highest price);
/// asks are walked from the lowest key up (best ask = lowest price). Within a
/// level, a `VecDeque` preserves insertion order, which is time priority
/// because `add` is only ever called from the single-writer engine loop.
///
/// `Book` is the sole mutator of its own state and exposes no side effects
/// beyond that state, matching the engine-loop-only access discipline described
/// for the matching/settlement pipeline.
#[derive(Debug, Default)]
pub struct Book {
    bids: BTreeMap<Price, PriceLevel>,
    asks: BTreeMap<Price, PriceLevel>,
    index: HashMap<OrderId, (Side, Price)>,
}

impl Book {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a resident order. Returns `Err` if `id` already exists.
    pub fn add(&mut self, order: Order) -> Result<(), OrderId> {
        if self.index.contains_key(&order.id) {
            return Err(order.id);
        }
        self.index.insert(order.id, (order.side, order.price));
        let levels = match order.side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        levels.entry(order.price).or_default().push(order);
        Ok(())
    }

    /// Removes and returns the order with `id`, or `None` if absent.
    pub fn remove(&mut self, id: OrderId) -> Option<Order> {
        let (side, price) = self.index.remove(&id)?;
        let levels = match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        let level = levels.get_mut(&price)?;
        let mut removed = None;
        let mut removed_qty = Decimal::ZERO;
        level.orders.retain(|o| {
            if o.id == id {
                removed_qty = o.remaining();
                removed = Some(o.clone());
                false
            } else {
                true
            }
        });
        level.total_quantity -= removed_qty;
        if level.is_empty() {
            levels.remove(&price);
        }
        removed
    }

    pub fn get(&self, id: OrderId) -> Option<&Order> {
        let (side, price) = self.index.get(&id)?;
        let levels = match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        };
        levels.get(price)?.orders.iter().find(|o| o.id == id)
    }

    pub fn quantity_at_price(&self, side: Side, price: Price) -> Decimal {
        let levels = match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        };
        levels.get(&price).map_or(Decimal::ZERO, |l| l.total_quantity)
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.bids.keys().next_back().copied()
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.asks.keys().next().copied()
    }

    pub fn order_count(&self) -> usize {
        self.index.len()
    }

    /// Crosses `incoming` against the opposing side in price-time priority,
    /// mutating resting orders' `filled` in place and dropping any that become
    /// fully filled. Returns the produced trades; `incoming` itself is left for
    /// the caller to residualize into the book or discard.
    ///
    /// This is the Matcher: a pure function of (book, incoming order) that the
    /// single-writer engine loop is the only caller of. It is intentionally an
    /// inherent method rather than a free function operating on borrowed
    /// iterators, since skip-without-removing self-match prevention needs
    /// index-level access into each price level's deque.
    pub fn match_incoming(&mut self, incoming: &mut Order, mut next_trade_id: impl FnMut() -> Uuid, now: i64) -> Vec<Trade> {
        match incoming.side {
            Side::Buy => self.match_against(incoming, &mut next_trade_id, now, Side::Sell),
            Side::Sell => self.match_against(incoming, &mut next_trade_id, now, Side::Buy),
        }
    }

    fn match_against(
        &mut self,
        incoming: &mut Order,
        next_trade_id: &mut impl FnMut() -> Uuid,
        now: i64,
        resting_side: Side,
    ) -> Vec<Trade> {
        let mut trades = Vec::new();
        let levels = match resting_side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };

        let crossable_prices: Vec<Price> = match resting_side {
            // incoming is a SELL crossing resting bids: highest price first.
            Side::Buy => levels
                .range(incoming.price..)
                .rev()
                .map(|(p, _)| *p)
                .collect(),
            // incoming is a BUY crossing resting asks: lowest price first.
            Side::Sell => levels
                .range(..=incoming.price)
                .map(|(p, _)| *p)
                .collect(),
        };

        let mut exhausted_prices = Vec::new();

        for price in crossable_prices {
            if incoming.remaining().is_zero() {
                break;
            }
            let Some(level) = levels.get_mut(&price) else { continue };

            let mut fully_filled_ids = Vec::new();
            for resting in level.orders.iter_mut() {
                if incoming.remaining().is_zero() {
                    break;
                }
                if resting.user == incoming.user {
                    continue;
                }
                let qty = incoming.remaining().min(resting.remaining());
                if qty.is_zero() {
                    continue;
                }

                let (buyer, seller, buy_id, sell_id) = match incoming.side {
                    Side::Buy => (incoming.user.clone(), resting.user.clone(), incoming.id, resting.id),
                    Side::Sell => (resting.user.clone(), incoming.user.clone(), resting.id, incoming.id),
                };
                trades.push(Trade::new(next_trade_id(), buyer, seller, buy_id, sell_id, price, qty, now));

                incoming.fill(qty);
                resting.fill(qty);
                level.total_quantity -= qty;
                if resting.remaining().is_zero() {
                    fully_filled_ids.push(resting.id);
                }
            }

            if !fully_filled_ids.is_empty() {
                level.orders.retain(|o| !fully_filled_ids.contains(&o.id));
                for id in fully_filled_ids {
                    self.index.remove(&id);
                }
            }
            if level.is_empty() {
                exhausted_prices.push(price);
            }
        }

        let levels = match resting_side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        for price in exhausted_prices {
            levels.remove(&price);
        }

        trades
    }
}
