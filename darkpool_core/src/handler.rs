use crate::action::Action;
use crate::book::Book;
use crate::error::EngineError;
use crate::ledger::Ledger;
use crate::message::{Message, MessagePayload};
use crate::message_store::MessageStore;
use crate::order::{Asset, Order, OrderId, Price, Side};
use crate::queues::QueueHandle;
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

/// Sole writer of `Ledger`, `Book`, and every non-terminal `Message` field.
/// Owns the whole pipeline for a single inbound `Message`: validate, mutate
/// ledger/book, settle any resulting trades, and enqueue the on-chain
/// `Action`s those trades or a withdrawal require. Runs as the one task
/// draining the message queue — there is never a second writer to race with.
pub struct MessageHandler {
    ledger: Ledger,
    book: Book,
    store: MessageStore,
    actions: QueueHandle<Action>,
}

impl MessageHandler {
    pub fn new(actions: QueueHandle<Action>) -> Self {
        Self {
            ledger: Ledger::new(),
            book: Book::new(),
            store: MessageStore::new(),
            actions,
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn book(&self) -> &Book {
        &self.book
    }

    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    /// Registers a newly-arrived message as PENDING so it is immediately
    /// visible to status lookups, ahead of whenever the queue drains it.
    pub fn intake(&mut self, message: Message) {
        self.store.add(message);
    }

    /// Processes one message to a terminal status and returns whatever
    /// `Action`s it produced (also pushed onto the action queue for
    /// `ActionHandler` to pick up).
    pub fn handle(&mut self, mut message: Message, now: i64) -> Vec<Action> {
        message.mark_processing();
        let outcome = match message.payload.clone() {
            MessagePayload::Deposit { asset, amount, .. } => self.handle_deposit(&message, asset, amount),
            MessagePayload::Order { side, price, quantity } => self.handle_order(&mut message, side, price, quantity),
            MessagePayload::Cancel { order_id } => self.handle_cancel(&message, order_id),
            MessagePayload::Withdraw { asset, amount } => self.handle_withdraw(&message, asset, amount, now),
        };

        let actions = match outcome {
            Ok(actions) => {
                message.accept(now);
                actions
            }
            Err(e) => {
                message.reject(e.to_string(), now);
                Vec::new()
            }
        };

        for action in &actions {
            let _ = self.actions.push(action.clone());
        }
        self.store.update(message);
        actions
    }

    fn handle_deposit(&mut self, message: &Message, asset: String, amount: String) -> Result<Vec<Action>, EngineError> {
        let asset = parse_asset(&asset)?;
        let amount = parse_decimal(&amount)?;
        self.ledger.deposit(&message.user, asset, amount)?;
        Ok(Vec::new())
    }

    fn handle_order(
        &mut self,
        message: &mut Message,
        side: String,
        price: String,
        quantity: String,
    ) -> Result<Vec<Action>, EngineError> {
        let side = parse_side(&side)?;
        let price = parse_decimal(&price)?;
        let quantity = parse_decimal(&quantity)?;
        if price <= Decimal::ZERO || quantity <= Decimal::ZERO {
            return Err(EngineError::Validation("price and quantity must be positive".into()));
        }
        if !self.ledger.exists(&message.user) {
            return Err(EngineError::AccountNotFound);
        }

        let order = Order::new(Uuid::new_v4(), message.user.clone(), side, price, quantity, message.created_at);
        let (liability_asset, liability_amt) = order.liability();
        self.ledger.allocate(&message.user, liability_asset, liability_amt)?;

        let mut incoming = order;
        let trades = self.book.match_incoming(&mut incoming, Uuid::new_v4, message.created_at);

        let mut actions = Vec::new();
        for trade in &trades {
            self.settle_trade(trade, &incoming)?;
            actions.push(Action::settlement(
                Uuid::new_v4(),
                trade.id,
                trade.buyer.clone(),
                trade.seller.clone(),
                trade.amount_a(),
                trade.amount_b(),
                message.created_at,
            ));
        }

        message.order_id = Some(incoming.id);
        message.trades_count = trades.len() as u32;

        if !incoming.remaining().is_zero() {
            self.book.add(incoming).expect("fresh uuid never collides");
        }

        Ok(actions)
    }

    /// Applies the balance effects of one trade. The buyer's liability was
    /// reserved at their own limit price, which may be worse than the
    /// resting price the trade actually executes at — the difference is
    /// released back to `available` before the exact owed amount is
    /// consumed.
    fn settle_trade(&mut self, trade: &crate::trade::Trade, incoming: &Order) -> Result<(), EngineError> {
        let buyer_order_price: Price = if trade.buy_order_id == incoming.id && incoming.side == Side::Buy {
            incoming.price
        } else {
            trade.price
        };
        let release_amt = (buyer_order_price - trade.price) * trade.quantity;
        if release_amt > Decimal::ZERO {
            self.ledger.release(&trade.buyer, Asset::B, release_amt)?;
        }
        self.ledger.consume_liability(&trade.buyer, Asset::B, trade.amount_b())?;
        self.ledger.credit(&trade.buyer, Asset::A, trade.amount_a());

        self.ledger.consume_liability(&trade.seller, Asset::A, trade.amount_a())?;
        self.ledger.credit(&trade.seller, Asset::B, trade.amount_b());
        Ok(())
    }

    fn handle_cancel(&mut self, message: &Message, order_id: String) -> Result<Vec<Action>, EngineError> {
        let order_id = OrderId::from_str(&order_id).map_err(|_| EngineError::Validation("invalid order id".into()))?;
        let existing = self.book.get(order_id).ok_or_else(|| EngineError::OrderNotFound(order_id.to_string()))?;
        if existing.user != message.user {
            return Err(EngineError::Ownership);
        }
        let mut removed = self.book.remove(order_id).expect("checked present above");
        removed.cancel();
        let (asset, amt) = removed.liability();
        self.ledger.release(&message.user, asset, amt)?;
        Ok(Vec::new())
    }

    fn handle_withdraw(&mut self, message: &Message, asset: String, amount: String, now: i64) -> Result<Vec<Action>, EngineError> {
        let asset = parse_asset(&asset)?;
        let amount = parse_decimal(&amount)?;
        if amount <= Decimal::ZERO {
            return Err(EngineError::Validation("withdrawal amount must be positive".into()));
        }
        self.ledger.withdraw(&message.user, asset, amount)?;
        let action = Action::withdrawal(Uuid::new_v4(), message.user.clone(), asset, amount, now);
        Ok(vec![action])
    }
}

fn parse_asset(s: &str) -> Result<Asset, EngineError> {
    Asset::from_str(s).map_err(|_| EngineError::Validation(format!("unknown asset: {s}")))
}

fn parse_side(s: &str) -> Result<Side, EngineError> {
    match s {
        "buy" => Ok(Side::Buy),
        "sell" => Ok(Side::Sell),
        other => Err(EngineError::Validation(format!("unknown side: {other}"))),
    }
}

fn parse_decimal(s: &str) -> Result<Decimal, EngineError> {
    Decimal::from_str(s).map_err(|_| EngineError::Validation(format!("invalid decimal: {s}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionKind;
    use crate::message::Message;
    use crate::queues::ActionQueue;

    fn handler() -> (MessageHandler, ActionQueue) {
        let queue = ActionQueue::new();
        let handle = queue.handle();
        (MessageHandler::new(handle), queue)
    }

    #[test]
    fn deposit_credits_available_balance() {
        let (mut h, _q) = handler();
        let msg = Message::deposit(Uuid::new_v4(), "alice".into(), Asset::A, Decimal::from(100), 1, "tx".into(), 0);
        h.intake(msg.clone());
        let actions = h.handle(msg, 0);
        assert!(actions.is_empty());
        assert_eq!(h.ledger().available("alice", Asset::A), Decimal::from(100));
    }

    #[test]
    fn order_without_funds_is_rejected() {
        let (mut h, _q) = handler();
        let msg = Message::order(Uuid::new_v4(), "alice".into(), Side::Buy, Decimal::from(10), Decimal::from(5), 0);
        h.intake(msg.clone());
        h.handle(msg.clone(), 0);
        let stored = h.store().get(msg.id).unwrap();
        assert_eq!(stored.status, crate::message::MessageStatus::Rejected);
    }

    #[test]
    fn crossing_orders_produce_settlement_action() {
        let (mut h, _q) = handler();
        let dep_a = Message::deposit(Uuid::new_v4(), "seller".into(), Asset::A, Decimal::from(100), 1, "tx1".into(), 0);
        h.intake(dep_a.clone());
        h.handle(dep_a, 0);
        let dep_b = Message::deposit(Uuid::new_v4(), "buyer".into(), Asset::B, Decimal::from(10_000), 1, "tx2".into(), 0);
        h.intake(dep_b.clone());
        h.handle(dep_b, 0);

        let sell = Message::order(Uuid::new_v4(), "seller".into(), Side::Sell, Decimal::from(10), Decimal::from(50), 1);
        h.intake(sell.clone());
        h.handle(sell, 1);

        let buy = Message::order(Uuid::new_v4(), "buyer".into(), Side::Buy, Decimal::from(10), Decimal::from(50), 2);
        h.intake(buy.clone());
        let actions = h.handle(buy, 2);

        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].kind(), ActionKind::Settlement);
        assert_eq!(h.ledger().available("buyer", Asset::A), Decimal::from(50));
        assert_eq!(h.ledger().available("seller", Asset::B), Decimal::from(500));
    }

    #[test]
    fn cancel_releases_liability() {
        let (mut h, _q) = handler();
        let dep = Message::deposit(Uuid::new_v4(), "alice".into(), Asset::A, Decimal::from(100), 1, "tx".into(), 0);
        h.intake(dep.clone());
        h.handle(dep, 0);

        let order_msg = Message::order(Uuid::new_v4(), "alice".into(), Side::Sell, Decimal::from(10), Decimal::from(50), 1);
        let order_msg_id = order_msg.id;
        h.intake(order_msg.clone());
        h.handle(order_msg, 1);
        let order_id = h.store().get(order_msg_id).unwrap().order_id.unwrap();

        let cancel = Message::cancel(Uuid::new_v4(), "alice".into(), order_id, 2);
        h.intake(cancel.clone());
        h.handle(cancel, 2);

        assert_eq!(h.ledger().available("alice", Asset::A), Decimal::from(100));
        assert_eq!(h.ledger().liability("alice", Asset::A), Decimal::ZERO);
    }

    #[test]
    fn withdraw_produces_withdrawal_action() {
        let (mut h, _q) = handler();
        let dep = Message::deposit(Uuid::new_v4(), "alice".into(), Asset::A, Decimal::from(100), 1, "tx".into(), 0);
        h.intake(dep.clone());
        h.handle(dep, 0);

        let withdraw = Message::withdraw(Uuid::new_v4(), "alice".into(), Asset::A, Decimal::from(40), 1);
        h.intake(withdraw.clone());
        let actions = h.handle(withdraw, 1);

        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].kind(), ActionKind::Withdrawal);
        assert_eq!(h.ledger().available("alice", Asset::A), Decimal::from(60));
    }
}
