//! Thin, named wrapper around `Book::match_incoming` so the engine loop reads
//! as "Matcher produces trades against the Book" rather than a bare method
//! call — the matching algorithm itself lives on `Book` because crossing
//! orders requires index-level mutation of resting price levels.

use crate::book::Book;
use crate::order::Order;
use crate::trade::Trade;
use uuid::Uuid;

pub struct MatchOutcome {
    pub trades: Vec<Trade>,
    pub residual: Option<Order>,
}

/// Crosses `incoming` against `book`, returning the trades produced and, if
/// any quantity remains unfilled, the order to be inserted into the book.
pub fn match_order(book: &mut Book, mut incoming: Order, next_trade_id: impl FnMut() -> Uuid, now: i64) -> MatchOutcome {
    let trades = book.match_incoming(&mut incoming, next_trade_id, now);
    let residual = if incoming.remaining().is_zero() { None } else { Some(incoming) };
    MatchOutcome { trades, residual }
}
