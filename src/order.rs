//! Order - The validated order entity handed to the matching engine.
//!
//! An order's identity (trader, price, side) never changes after
//! construction. Only its quantity shrinks as fills are applied.

use std::fmt;

/// Trader identifier (positive for a valid order)
pub type TraderId = u32;

/// Integer limit price (positive for a valid order)
pub type Price = u32;

/// Order quantity (positive for a valid order)
pub type Qty = u32;

/// Order side
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Side {
    /// Buy side (bids)
    Buy = b'B',
    /// Sell side (asks)
    Sell = b'S',
}

impl Side {
    /// Returns the opposite side
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// Single-letter wire code (`B` or `S`)
    #[inline]
    pub const fn code(self) -> char {
        match self {
            Side::Buy => 'B',
            Side::Sell => 'S',
        }
    }

    /// Parse a wire code. Anything other than `B` or `S` is not a side.
    #[inline]
    pub const fn from_code(code: char) -> Option<Self> {
        match code {
            'B' => Some(Side::Buy),
            'S' => Some(Side::Sell),
            _ => None,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// One order intent.
///
/// Validity is computed once in [`Order::new`] and frozen. Callers must
/// check [`Order::is_valid`] before the order touches any book state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Order {
    trader_id: TraderId,
    quantity: Qty,
    price: Price,
    side: Side,
    valid: bool,
}

impl Order {
    /// Create an order and freeze its validity flag.
    #[inline]
    pub const fn new(trader_id: TraderId, side: Side, quantity: Qty, price: Price) -> Self {
        Self {
            trader_id,
            quantity,
            price,
            side,
            valid: trader_id > 0 && quantity > 0 && price > 0,
        }
    }

    #[inline]
    pub const fn trader_id(&self) -> TraderId {
        self.trader_id
    }

    /// Remaining (unfilled) quantity
    #[inline]
    pub const fn quantity(&self) -> Qty {
        self.quantity
    }

    #[inline]
    pub const fn price(&self) -> Price {
        self.price
    }

    #[inline]
    pub const fn side(&self) -> Side {
        self.side
    }

    /// Validity as computed at construction
    #[inline]
    pub const fn is_valid(&self) -> bool {
        self.valid
    }

    /// Apply a partial fill of `qty`.
    ///
    /// Only the matching path calls this, and only with a quantity strictly
    /// smaller than the remaining one: a full fill consumes the order instead.
    #[inline]
    pub(crate) fn reduce_quantity(&mut self, qty: Qty) {
        debug_assert!(qty < self.quantity, "partial fill must leave quantity > 0");
        self.quantity -= qty;
    }
}

/// Renders the order in the input record format: `<trader> <side> <qty> <price>`.
impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.trader_id, self.side, self.quantity, self.price)
    }
}
