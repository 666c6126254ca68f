//! A minimal in-memory matching engine.
//!
//! Enough book-keeping to exercise every accept and reject path the
//! sessions can take: it validates symbols, order ids and quantities and
//! tracks open quantity per order, but performs no price-time matching.

use std::collections::HashMap;

use gateway_core::{MatchError, MatchingEngine, Side};

#[derive(Debug, Clone, Copy)]
struct OpenOrder {
    symbol_id: u32,
    side: Side,
    price: u32,
    open_quantity: u64,
}

/// Validating order store implementing [`MatchingEngine`].
#[derive(Debug, Default)]
pub struct InMemoryEngine {
    symbols: HashMap<u32, [u8; 8]>,
    orders: HashMap<u64, OpenOrder>,
}

impl InMemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open quantity of a resting order, if present.
    pub fn open_quantity(&self, order_id: u64) -> Option<u64> {
        self.orders.get(&order_id).map(|o| o.open_quantity)
    }

    /// Resting price of an order, if present.
    pub fn order_price(&self, order_id: u64) -> Option<u32> {
        self.orders.get(&order_id).map(|o| o.price)
    }

    /// Registered name for a symbol id.
    pub fn symbol_name(&self, symbol_id: u32) -> Option<[u8; 8]> {
        self.symbols.get(&symbol_id).copied()
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    fn take_quantity(&mut self, order_id: u64, quantity: u64) -> Result<(), MatchError> {
        if quantity == 0 {
            return Err(MatchError::InvalidQuantity);
        }
        let order = self
            .orders
            .get_mut(&order_id)
            .ok_or(MatchError::OrderNotFound)?;
        order.open_quantity = order.open_quantity.saturating_sub(quantity);
        if order.open_quantity == 0 {
            self.orders.remove(&order_id);
        }
        Ok(())
    }
}

impl MatchingEngine for InMemoryEngine {
    fn add_symbol(&mut self, symbol_id: u32, name: [u8; 8]) -> Result<(), MatchError> {
        if self.symbols.contains_key(&symbol_id) {
            return Err(MatchError::DuplicateSymbol);
        }
        self.symbols.insert(symbol_id, name);
        Ok(())
    }

    fn add_limit_order(
        &mut self,
        order_id: u64,
        symbol_id: u32,
        side: Side,
        price: u32,
        quantity: u64,
    ) -> Result<(), MatchError> {
        if quantity == 0 {
            return Err(MatchError::InvalidQuantity);
        }
        if !self.symbols.contains_key(&symbol_id) {
            return Err(MatchError::SymbolNotFound);
        }
        if self.orders.contains_key(&order_id) {
            return Err(MatchError::DuplicateOrderId);
        }
        self.orders.insert(
            order_id,
            OpenOrder {
                symbol_id,
                side,
                price,
                open_quantity: quantity,
            },
        );
        Ok(())
    }

    fn add_market_order(
        &mut self,
        order_id: u64,
        symbol_id: u32,
        _side: Side,
        quantity: u64,
    ) -> Result<(), MatchError> {
        if quantity == 0 {
            return Err(MatchError::InvalidQuantity);
        }
        if !self.symbols.contains_key(&symbol_id) {
            return Err(MatchError::SymbolNotFound);
        }
        if self.orders.contains_key(&order_id) {
            return Err(MatchError::DuplicateOrderId);
        }
        // Market orders do not rest; accepted and immediately done.
        Ok(())
    }

    fn execute_order(&mut self, order_id: u64, quantity: u64) -> Result<(), MatchError> {
        self.take_quantity(order_id, quantity)
    }

    fn execute_order_at_price(
        &mut self,
        order_id: u64,
        quantity: u64,
        _price: u32,
    ) -> Result<(), MatchError> {
        self.take_quantity(order_id, quantity)
    }

    fn reduce_order(&mut self, order_id: u64, quantity: u64) -> Result<(), MatchError> {
        self.take_quantity(order_id, quantity)
    }

    fn delete_order(&mut self, order_id: u64) -> Result<(), MatchError> {
        self.orders
            .remove(&order_id)
            .map(|_| ())
            .ok_or(MatchError::OrderNotFound)
    }

    fn replace_order(
        &mut self,
        order_id: u64,
        new_order_id: u64,
        price: u32,
        quantity: u64,
    ) -> Result<(), MatchError> {
        if quantity == 0 {
            return Err(MatchError::InvalidQuantity);
        }
        if new_order_id != order_id && self.orders.contains_key(&new_order_id) {
            return Err(MatchError::DuplicateOrderId);
        }
        let existing = self
            .orders
            .remove(&order_id)
            .ok_or(MatchError::OrderNotFound)?;
        self.orders.insert(
            new_order_id,
            OpenOrder {
                symbol_id: existing.symbol_id,
                side: existing.side,
                price,
                open_quantity: quantity,
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_with_symbol() -> InMemoryEngine {
        let mut engine = InMemoryEngine::new();
        engine.add_symbol(1, *b"EUR_USD ").unwrap();
        engine
    }

    #[test]
    fn duplicate_symbol_is_rejected() {
        let mut engine = engine_with_symbol();
        assert_eq!(engine.symbol_name(1), Some(*b"EUR_USD "));
        assert_eq!(
            engine.add_symbol(1, *b"EUR_USD "),
            Err(MatchError::DuplicateSymbol)
        );
        assert_eq!(engine.symbol_name(2), None);
    }

    #[test]
    fn limit_order_validations() {
        let mut engine = engine_with_symbol();
        assert_eq!(
            engine.add_limit_order(1, 1, Side::Buy, 100, 0),
            Err(MatchError::InvalidQuantity)
        );
        assert_eq!(
            engine.add_limit_order(1, 99, Side::Buy, 100, 10),
            Err(MatchError::SymbolNotFound)
        );
        engine.add_limit_order(1, 1, Side::Buy, 100, 10).unwrap();
        assert_eq!(
            engine.add_limit_order(1, 1, Side::Buy, 100, 10),
            Err(MatchError::DuplicateOrderId)
        );
    }

    #[test]
    fn execution_consumes_quantity_and_removes_filled_orders() {
        let mut engine = engine_with_symbol();
        engine.add_limit_order(1, 1, Side::Sell, 100, 10).unwrap();
        engine.execute_order(1, 4).unwrap();
        assert_eq!(engine.open_quantity(1), Some(6));
        engine.execute_order_at_price(1, 6, 101).unwrap();
        assert_eq!(engine.open_quantity(1), None);
        assert_eq!(engine.execute_order(1, 1), Err(MatchError::OrderNotFound));
    }

    #[test]
    fn replace_moves_the_order_to_the_new_id() {
        let mut engine = engine_with_symbol();
        engine.add_limit_order(1, 1, Side::Buy, 100, 10).unwrap();
        assert_eq!(engine.order_price(1), Some(100));
        engine.replace_order(1, 2, 105, 8).unwrap();
        assert_eq!(engine.open_quantity(1), None);
        assert_eq!(engine.open_quantity(2), Some(8));
        assert_eq!(engine.order_price(2), Some(105));
        assert_eq!(
            engine.replace_order(1, 3, 105, 8),
            Err(MatchError::OrderNotFound)
        );
    }

    #[test]
    fn delete_unknown_order_is_rejected() {
        let mut engine = engine_with_symbol();
        assert_eq!(engine.delete_order(42), Err(MatchError::OrderNotFound));
    }

    #[test]
    fn market_order_does_not_rest() {
        let mut engine = engine_with_symbol();
        engine.add_market_order(1, 1, Side::Buy, 10).unwrap();
        assert_eq!(engine.order_count(), 0);
    }
}
