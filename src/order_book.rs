//! Order Book - Ordered price levels for one side of the book.
//!
//! A [`BookSide`] maps price to [`PriceLevel`] and always keeps its best
//! level first. Which end is "best" is fixed at compile time by a
//! [`PriceOrder`]; which container holds the levels is fixed by a
//! [`Backend`].

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;

use rustc_hash::FxHashMap;

use crate::order::{Order, Price, Side};
use crate::price_level::PriceLevel;

/// Key type a level container is ordered by.
pub trait LevelKey: Ord + Copy + Hash + fmt::Debug {}

impl<T: Ord + Copy + Hash + fmt::Debug> LevelKey for T {}

// ============================================================================
// Direction
// ============================================================================

/// Comparator direction of a book side.
///
/// Keys sort best-first: the smallest key is the best price.
pub trait PriceOrder {
    type Key: LevelKey;

    /// Side of the orders stored under this direction
    const SIDE: Side;

    fn key(price: Price) -> Self::Key;

    /// True if a level at `level_price` is at least as good as `limit`,
    /// i.e. an aggressor limited at `limit` may trade against it.
    #[inline]
    fn crosses(level_price: Price, limit: Price) -> bool {
        Self::key(level_price) <= Self::key(limit)
    }
}

/// Bids: highest price is best.
#[derive(Debug)]
pub enum Descending {}

impl PriceOrder for Descending {
    type Key = Reverse<Price>;
    const SIDE: Side = Side::Buy;

    #[inline]
    fn key(price: Price) -> Self::Key {
        Reverse(price)
    }
}

/// Asks: lowest price is best.
#[derive(Debug)]
pub enum Ascending {}

impl PriceOrder for Ascending {
    type Key = Price;
    const SIDE: Side = Side::Sell;

    #[inline]
    fn key(price: Price) -> Self::Key {
        price
    }
}

// ============================================================================
// Level containers
// ============================================================================

/// Ordered map from key to price level.
///
/// Lookup and insert are O(log n) or better; `first` is the best level.
pub trait LevelMap<K>: Default {
    fn len(&self) -> usize;

    fn first(&self) -> Option<&PriceLevel>;

    fn first_mut(&mut self) -> Option<&mut PriceLevel>;

    fn get(&self, key: &K) -> Option<&PriceLevel>;

    /// Level under `key`, created empty at `price` if absent.
    fn get_or_insert(&mut self, key: K, price: Price) -> &mut PriceLevel;

    fn remove(&mut self, key: &K) -> Option<PriceLevel>;

    /// All levels, best first.
    fn levels<'a>(&'a self) -> Box<dyn Iterator<Item = &'a PriceLevel> + 'a>;
}

impl<K: LevelKey> LevelMap<K> for BTreeMap<K, PriceLevel> {
    #[inline]
    fn len(&self) -> usize {
        BTreeMap::len(self)
    }

    #[inline]
    fn first(&self) -> Option<&PriceLevel> {
        self.first_key_value().map(|(_, level)| level)
    }

    #[inline]
    fn first_mut(&mut self) -> Option<&mut PriceLevel> {
        self.first_entry().map(|entry| entry.into_mut())
    }

    #[inline]
    fn get(&self, key: &K) -> Option<&PriceLevel> {
        BTreeMap::get(self, key)
    }

    #[inline]
    fn get_or_insert(&mut self, key: K, price: Price) -> &mut PriceLevel {
        self.entry(key).or_insert_with(|| PriceLevel::new(price))
    }

    #[inline]
    fn remove(&mut self, key: &K) -> Option<PriceLevel> {
        BTreeMap::remove(self, key)
    }

    fn levels<'a>(&'a self) -> Box<dyn Iterator<Item = &'a PriceLevel> + 'a> {
        Box::new(self.values())
    }
}

/// Levels stored in an FxHashMap with a separate ordered price index.
///
/// Hash lookup for level access, `BTreeSet` for best-first ordering.
pub struct HashedLevels<K> {
    levels: FxHashMap<K, PriceLevel>,
    index: BTreeSet<K>,
}

impl<K> Default for HashedLevels<K> {
    fn default() -> Self {
        Self {
            levels: FxHashMap::default(),
            index: BTreeSet::new(),
        }
    }
}

impl<K: LevelKey> LevelMap<K> for HashedLevels<K> {
    #[inline]
    fn len(&self) -> usize {
        self.levels.len()
    }

    #[inline]
    fn first(&self) -> Option<&PriceLevel> {
        self.index.first().and_then(|key| self.levels.get(key))
    }

    #[inline]
    fn first_mut(&mut self) -> Option<&mut PriceLevel> {
        let key = *self.index.first()?;
        self.levels.get_mut(&key)
    }

    #[inline]
    fn get(&self, key: &K) -> Option<&PriceLevel> {
        self.levels.get(key)
    }

    #[inline]
    fn get_or_insert(&mut self, key: K, price: Price) -> &mut PriceLevel {
        let index = &mut self.index;
        self.levels.entry(key).or_insert_with(|| {
            index.insert(key);
            PriceLevel::new(price)
        })
    }

    #[inline]
    fn remove(&mut self, key: &K) -> Option<PriceLevel> {
        let level = self.levels.remove(key)?;
        self.index.remove(key);
        Some(level)
    }

    fn levels<'a>(&'a self) -> Box<dyn Iterator<Item = &'a PriceLevel> + 'a> {
        let levels = &self.levels;
        Box::new(self.index.iter().filter_map(move |key| levels.get(key)))
    }
}

/// Family of level containers used by both sides of a book.
pub trait Backend {
    type Map<K: LevelKey>: LevelMap<K>;
}

/// `std::collections::BTreeMap` levels.
#[derive(Debug)]
pub enum BTreeBackend {}

impl Backend for BTreeBackend {
    type Map<K: LevelKey> = BTreeMap<K, PriceLevel>;
}

/// [`HashedLevels`] levels.
#[derive(Debug)]
pub enum HashedBackend {}

impl Backend for HashedBackend {
    type Map<K: LevelKey> = HashedLevels<K>;
}

// ============================================================================
// Book side
// ============================================================================

/// One side of the book: price levels ordered best-first by `O`.
pub struct BookSide<O: PriceOrder, B: Backend> {
    levels: B::Map<O::Key>,
    _order: PhantomData<O>,
}

/// Bid side (descending price)
pub type BidSide<B> = BookSide<Descending, B>;

/// Ask side (ascending price)
pub type AskSide<B> = BookSide<Ascending, B>;

impl<O: PriceOrder, B: Backend> BookSide<O, B> {
    pub fn new() -> Self {
        Self {
            levels: Default::default(),
            _order: PhantomData,
        }
    }

    /// Side of the orders this book side holds
    #[inline]
    pub fn side(&self) -> Side {
        O::SIDE
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.levels.len() == 0
    }

    /// Number of price levels
    #[inline]
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Best price on this side
    #[inline]
    pub fn best_price(&self) -> Option<Price> {
        self.levels.first().map(PriceLevel::price)
    }

    /// True if an opposing order limited at `limit` can trade with the best level.
    #[inline]
    pub fn crosses(&self, limit: Price) -> bool {
        self.best_price()
            .is_some_and(|best| O::crosses(best, limit))
    }

    #[inline]
    pub(crate) fn best_level_mut(&mut self) -> Option<&mut PriceLevel> {
        self.levels.first_mut()
    }

    /// Get a price level
    #[inline]
    pub fn level(&self, price: Price) -> Option<&PriceLevel> {
        self.levels.get(&O::key(price))
    }

    /// Levels best first.
    pub fn levels(&self) -> impl Iterator<Item = &PriceLevel> + '_ {
        self.levels.levels()
    }

    /// Append `order` to the tail of the level at its price, creating the
    /// level if absent.
    #[inline]
    pub fn rest(&mut self, order: Order) {
        debug_assert_eq!(order.side(), O::SIDE);
        debug_assert!(order.is_valid());
        let price = order.price();
        self.levels.get_or_insert(O::key(price), price).push_back(order);
    }

    /// Drop the level at `price`.
    #[inline]
    pub(crate) fn remove_level(&mut self, price: Price) -> Option<PriceLevel> {
        self.levels.remove(&O::key(price))
    }

    /// Get depth at a price level: (total quantity, order count)
    pub fn depth_at(&self, price: Price) -> (u64, usize) {
        self.level(price)
            .map(|l| (l.total_qty(), l.len()))
            .unwrap_or((0, 0))
    }

    /// Number of resting orders across all levels
    pub fn order_count(&self) -> usize {
        self.levels().map(PriceLevel::len).sum()
    }

    /// Resting quantity across all levels
    pub fn total_qty(&self) -> u64 {
        self.levels().map(PriceLevel::total_qty).sum()
    }
}

impl<O: PriceOrder, B: Backend> Default for BookSide<O, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: PriceOrder, B: Backend> fmt::Debug for BookSide<O, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BookSide")
            .field("side", &O::SIDE)
            .field("best", &self.best_price())
            .field("levels", &self.level_count())
            .field("orders", &self.order_count())
            .finish()
    }
}
