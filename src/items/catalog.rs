//! Catalog
//!
//! A validated, price-ordered view of the items in one request.

use rustc_hash::{FxHashMap, FxHashSet};
use rusty_money::iso::Currency;
use smallvec::SmallVec;
use thiserror::Error;

use crate::items::Item;

/// Errors raised while validating the items of a request.
#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    /// At least one item is required to search.
    #[error("at least one item is required")]
    NoItems,

    /// Item at the given input position has a blank name.
    #[error("item {0} has an empty name")]
    EmptyName(usize),

    /// Two items share a name.
    #[error("item name {0:?} is used more than once")]
    DuplicateName(String),

    /// Item price rounds to zero or less.
    #[error("item {name:?} must have a positive price, got {minor_units} minor units")]
    NonPositivePrice {
        /// Item name
        name: String,
        /// Price in minor units
        minor_units: i64,
    },

    /// Item priced in a different currency from the target.
    #[error("item {name:?} has currency {actual}, but the catalog uses {expected}")]
    CurrencyMismatch {
        /// Item name
        name: String,
        /// Catalog currency code
        expected: &'static str,
        /// Item currency code
        actual: &'static str,
    },
}

/// An item with its price in whole minor units and its category resolved to an index.
#[derive(Clone, Debug, PartialEq)]
pub struct CalculatedItem<'a> {
    item: Item<'a>,
    integer_price: u64,
    category: usize,
}

impl<'a> CalculatedItem<'a> {
    /// The item as supplied
    pub fn item(&self) -> &Item<'a> {
        &self.item
    }

    /// Unit price in minor units, always positive
    pub fn integer_price(&self) -> u64 {
        self.integer_price
    }

    /// Index into [`Catalog::categories`]
    pub fn category(&self) -> usize {
        self.category
    }
}

/// Items of one request, sorted by ascending price.
///
/// Items with equal prices keep their input order, which fixes the canonical order the
/// reachability table and the enumerator rely on.
#[derive(Clone, Debug)]
pub struct Catalog<'a> {
    items: SmallVec<[CalculatedItem<'a>; 16]>,
    categories: SmallVec<[String; 8]>,
    currency: &'a Currency,
}

impl<'a> Catalog<'a> {
    /// Validate and order the given items.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the list is empty, or any item has a blank or duplicate
    /// name, a non-positive price, or a currency other than `currency`.
    pub fn new(
        items: impl IntoIterator<Item = Item<'a>>,
        currency: &'a Currency,
    ) -> Result<Self, CatalogError> {
        let mut names = FxHashSet::default();
        let mut category_index: FxHashMap<String, usize> = FxHashMap::default();
        let mut categories: SmallVec<[String; 8]> = SmallVec::new();
        let mut calculated: SmallVec<[CalculatedItem<'a>; 16]> = SmallVec::new();

        for (idx, item) in items.into_iter().enumerate() {
            if item.name().trim().is_empty() {
                return Err(CatalogError::EmptyName(idx));
            }

            if !names.insert(item.name().to_string()) {
                return Err(CatalogError::DuplicateName(item.name().to_string()));
            }

            let item_currency = item.price().currency();

            if item_currency != currency {
                return Err(CatalogError::CurrencyMismatch {
                    name: item.name().to_string(),
                    expected: currency.iso_alpha_code,
                    actual: item_currency.iso_alpha_code,
                });
            }

            let minor_units = item.price().to_minor_units();

            let integer_price = u64::try_from(minor_units)
                .ok()
                .filter(|price| *price > 0)
                .ok_or_else(|| CatalogError::NonPositivePrice {
                    name: item.name().to_string(),
                    minor_units,
                })?;

            let next_index = categories.len();
            let category = *category_index
                .entry(item.category().to_string())
                .or_insert_with(|| {
                    categories.push(item.category().to_string());
                    next_index
                });

            calculated.push(CalculatedItem {
                item,
                integer_price,
                category,
            });
        }

        if calculated.is_empty() {
            return Err(CatalogError::NoItems);
        }

        calculated.sort_by_key(CalculatedItem::integer_price);

        Ok(Self {
            items: calculated,
            categories,
            currency,
        })
    }

    /// Iterate over the items in ascending price order.
    pub fn iter(&self) -> impl Iterator<Item = &CalculatedItem<'a>> {
        self.items.iter()
    }

    /// Get the item at a position in price order.
    pub fn get(&self, idx: usize) -> Option<&CalculatedItem<'a>> {
        self.items.get(idx)
    }

    /// Distinct categories, in order of first appearance in the input.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Number of distinct items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the catalog has no items. Always false for a validated catalog.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Currency of every price in the catalog.
    pub fn currency(&self) -> &'a Currency {
        self.currency
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{
        Money,
        iso::{GBP, USD},
    };
    use testresult::TestResult;

    use super::*;

    fn item(name: &str, minor: i64, category: &str) -> Item<'static> {
        Item::new(name, Money::from_minor(minor, USD), category)
    }

    #[test]
    fn items_are_sorted_by_ascending_price() -> TestResult {
        let catalog = Catalog::new(
            [
                item("Sandwich", 199, "Food"),
                item("Soda", 78, "Drinks"),
                item("Chips", 105, "Snacks"),
            ],
            USD,
        )?;

        let prices: Vec<u64> = catalog.iter().map(CalculatedItem::integer_price).collect();

        assert_eq!(prices, [78, 105, 199]);

        Ok(())
    }

    #[test]
    fn equal_prices_keep_input_order() -> TestResult {
        let catalog = Catalog::new(
            [
                item("Pear", 50, "Fruit"),
                item("Apple", 50, "Fruit"),
                item("Fig", 20, "Fruit"),
            ],
            USD,
        )?;

        let names: Vec<&str> = catalog.iter().map(|i| i.item().name()).collect();

        assert_eq!(names, ["Fig", "Pear", "Apple"]);

        Ok(())
    }

    #[test]
    fn categories_are_indexed_by_first_appearance() -> TestResult {
        let catalog = Catalog::new(
            [
                item("Soda", 78, "Drinks"),
                item("Chips", 105, "Snacks"),
                item("Juice", 150, "Drinks"),
            ],
            USD,
        )?;

        assert_eq!(catalog.categories(), ["Drinks", "Snacks"]);

        let juice = catalog.get(2).ok_or("missing juice")?;

        assert_eq!(juice.item().name(), "Juice");
        assert_eq!(juice.category(), 0);

        Ok(())
    }

    #[test]
    fn empty_catalog_is_rejected() {
        let result = Catalog::new(Vec::<Item<'static>>::new(), USD);

        assert_eq!(result.err(), Some(CatalogError::NoItems));
    }

    #[test]
    fn zero_price_is_rejected() {
        let result = Catalog::new([item("Free Sample", 0, "Food")], USD);

        assert_eq!(
            result.err(),
            Some(CatalogError::NonPositivePrice {
                name: "Free Sample".to_string(),
                minor_units: 0,
            })
        );
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let result = Catalog::new([item("Soda", 78, "Drinks"), item("Soda", 99, "Drinks")], USD);

        assert_eq!(
            result.err(),
            Some(CatalogError::DuplicateName("Soda".to_string()))
        );
    }

    #[test]
    fn blank_names_are_rejected() {
        let result = Catalog::new([item("Soda", 78, "Drinks"), item("  ", 99, "Drinks")], USD);

        assert_eq!(result.err(), Some(CatalogError::EmptyName(1)));
    }

    #[test]
    fn currency_mismatch_is_rejected() {
        let result = Catalog::new(
            [Item::new("Tea", Money::from_minor(150, GBP), "Drinks")],
            USD,
        );

        assert_eq!(
            result.err(),
            Some(CatalogError::CurrencyMismatch {
                name: "Tea".to_string(),
                expected: USD.iso_alpha_code,
                actual: GBP.iso_alpha_code,
            })
        );
    }
}
