//! Price Level - A FIFO queue of orders at a single price point.
//!
//! The level owns its resting orders outright. Orders enter at the tail
//! and are consumed from the head, which gives strict time priority.

use std::collections::VecDeque;

use crate::order::{Order, Price, Qty};

/// A queue of resting orders at a specific price level.
///
/// A level kept in a book side is never empty: the side removes it as
/// soon as its last order is consumed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PriceLevel {
    price: Price,
    orders: VecDeque<Order>,
    /// Total quantity across all orders at this level
    total_qty: u64,
}

impl PriceLevel {
    /// Create a new empty price level
    #[inline]
    pub fn new(price: Price) -> Self {
        Self {
            price,
            orders: VecDeque::new(),
            total_qty: 0,
        }
    }

    #[inline]
    pub fn price(&self) -> Price {
        self.price
    }

    /// Returns true if there are no orders at this level
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Number of orders at this level
    #[inline]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Total resting quantity at this level
    #[inline]
    pub fn total_qty(&self) -> u64 {
        self.total_qty
    }

    /// The oldest order (first to match), if any.
    #[inline]
    pub fn front(&self) -> Option<&Order> {
        self.orders.front()
    }

    /// Orders in time priority, oldest first.
    pub fn orders(&self) -> impl Iterator<Item = &Order> + '_ {
        self.orders.iter()
    }

    /// Append an order to the tail of the queue (newest order).
    ///
    /// # Complexity
    /// Amortized O(1)
    #[inline]
    pub fn push_back(&mut self, order: Order) {
        debug_assert_eq!(order.price(), self.price);
        self.total_qty += u64::from(order.quantity());
        self.orders.push_back(order);
    }

    /// Remove and return the head order (oldest/highest priority).
    ///
    /// # Complexity
    /// O(1)
    #[inline]
    pub fn pop_front(&mut self) -> Option<Order> {
        let order = self.orders.pop_front()?;
        self.total_qty -= u64::from(order.quantity());
        Some(order)
    }

    /// Partially fill the head order in place. It keeps its queue position.
    ///
    /// `qty` must be strictly less than the head's remaining quantity.
    #[inline]
    pub(crate) fn reduce_front(&mut self, qty: Qty) {
        if let Some(head) = self.orders.front_mut() {
            head.reduce_quantity(qty);
            self.total_qty -= u64::from(qty);
        }
    }
}
