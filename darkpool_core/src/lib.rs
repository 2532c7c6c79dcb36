//! In-memory matching and settlement engine for a custodial dark pool:
//! price-time-priority order book, per-user available/liability ledger, and
//! the single-writer message/action pipeline that connects them to chain
//! adapters defined in `chain`.

pub mod action;
pub mod action_handler;
pub mod book;
pub mod chain;
pub mod error;
pub mod handler;
pub mod ledger;
pub mod matcher;
pub mod message;
pub mod message_store;
pub mod order;
pub mod queues;
pub mod trade;

pub use action::{Action, ActionId, ActionKind, ActionPayload, ActionStatus};
pub use action_handler::ActionHandler;
pub use book::Book;
pub use chain::{DepositEvent, DepositEventSource, MessageIntake, TransactionSubmitter};
pub use error::EngineError;
pub use handler::MessageHandler;
pub use ledger::{Ledger, UserBalance};
pub use message::{Message, MessageId, MessageKind, MessagePayload, MessageStatus};
pub use message_store::MessageStore;
pub use order::{AccountId, Asset, Order, OrderId, Price, Quantity, Side};
pub use queues::{ActionQueue, MessageQueue, Queue, QueueHandle};
pub use trade::Trade;
