//! Reachability Table
//!
//! Subset-sum table with repetition. Row `r` covers the first `r` items of a price-ordered
//! catalog, column `c` a subtotal in minor units, and a cell is set when some multiset of those
//! items sums to exactly `c`.

use thiserror::Error;

/// Largest number of cells a table may hold.
pub const MAX_CELLS: usize = 1 << 28;

/// Errors raised while building a reachability table.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TableError {
    /// A zero price would allow unbounded repetition.
    #[error("item {item} has a zero price")]
    ZeroPrice {
        /// Position of the item in price order
        item: usize,
    },

    /// The table would hold more than [`MAX_CELLS`] cells.
    #[error("table of {rows} rows by {columns} columns is too large")]
    TooLarge {
        /// Number of rows requested
        rows: usize,
        /// Number of columns requested
        columns: usize,
    },

    /// Construction was stopped before all rows were built.
    #[error("table construction was interrupted")]
    Interrupted,
}

/// Immutable grid of `(item prefix, subtotal)` reachability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReachabilityTable {
    rows: usize,
    columns: usize,
    cells: Vec<bool>,
}

impl ReachabilityTable {
    /// Build the table for `target` over the given item prices.
    ///
    /// # Errors
    ///
    /// Returns a [`TableError`] if any price is zero or the table is too large.
    pub fn build(target: usize, prices: &[usize]) -> Result<Self, TableError> {
        Self::build_until(target, prices, || true)
    }

    /// Build the table, calling `keep_going` before each row and stopping when it returns `false`.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::Interrupted`] if `keep_going` stopped construction, otherwise as
    /// [`ReachabilityTable::build`].
    pub fn build_until(
        target: usize,
        prices: &[usize],
        mut keep_going: impl FnMut() -> bool,
    ) -> Result<Self, TableError> {
        if let Some(item) = prices.iter().position(|price| *price == 0) {
            return Err(TableError::ZeroPrice { item });
        }

        let rows = prices.len() + 1;
        let too_large = TableError::TooLarge {
            rows,
            columns: target.saturating_add(1),
        };

        let columns = target.checked_add(1).ok_or_else(|| too_large.clone())?;
        let len = rows
            .checked_mul(columns)
            .filter(|len| *len <= MAX_CELLS)
            .ok_or(too_large)?;

        let mut cells = vec![false; len];

        // Nothing but the empty multiset is reachable without items.
        if let Some(origin) = cells.first_mut() {
            *origin = true;
        }

        for (row, price) in (1..rows).zip(prices.iter().copied()) {
            if !keep_going() {
                return Err(TableError::Interrupted);
            }

            let (built, pending) = cells.split_at_mut(row * columns);

            let (Some(previous), Some(current)) = (
                built.rchunks_exact(columns).next(),
                pending.chunks_exact_mut(columns).next(),
            ) else {
                return Err(TableError::Interrupted);
            };

            for (subtotal, cell) in current.iter_mut().enumerate() {
                // Any number of the new item, on top of something the previous row reaches.
                *cell = (0..=subtotal / price).any(|count| {
                    previous
                        .get(subtotal - count * price)
                        .copied()
                        .unwrap_or(false)
                });
            }
        }

        Ok(Self {
            rows,
            columns,
            cells,
        })
    }

    /// Number of rows: one more than the number of items.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns: one more than the target.
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Target subtotal the table was built for.
    pub fn target(&self) -> usize {
        self.columns - 1
    }

    /// Whether the first `row` items can make exactly `subtotal`. Out-of-range cells are unreachable.
    pub fn is_reachable(&self, row: usize, subtotal: usize) -> bool {
        if row >= self.rows || subtotal >= self.columns {
            return false;
        }

        self.cells
            .get(row * self.columns + subtotal)
            .copied()
            .unwrap_or(false)
    }

    /// Whether all items together can make exactly the target.
    pub fn is_solvable(&self) -> bool {
        self.is_reachable(self.rows - 1, self.target())
    }
}
