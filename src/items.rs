//! Items

use rusty_money::{Money, iso::Currency};

pub mod catalog;

/// An item offered for sale, as supplied by the caller.
#[derive(Clone, Debug, PartialEq)]
pub struct Item<'a> {
    name: String,
    price: Money<'a, Currency>,
    category: String,
}

impl<'a> Item<'a> {
    /// Creates a new item with the given name, unit price and category
    pub fn new(
        name: impl Into<String>,
        price: Money<'a, Currency>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            price,
            category: category.into(),
        }
    }

    /// Returns the name of the item
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the unit price of the item
    pub fn price(&self) -> &Money<'a, Currency> {
        &self.price
    }

    /// Returns the category of the item
    pub fn category(&self) -> &str {
        &self.category
    }
}
