//! Receipt

use std::{cmp::Reverse, io};

use rusty_money::{Money, MoneyError, iso::Currency};
use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    ansi,
    items::catalog::Catalog,
    pricing::{PricingError, TaxRate},
};

/// Errors that can occur when building a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Wrapper for money errors.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Error calculating the tax line.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Quantities do not line up with the catalog.
    #[error("expected {expected} quantities, got {actual}")]
    QuantityMismatch {
        /// Number of catalog items
        expected: usize,
        /// Number of quantities supplied
        actual: usize,
    },

    /// Line total overflowed.
    #[error("line total for {name:?} overflowed")]
    QuantityOverflow {
        /// Item name
        name: String,
    },

    /// IO error
    #[error("IO error")]
    IO,
}

/// One purchased item on a receipt.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem<'a> {
    name: String,
    category: String,
    quantity: u64,
    unit_price: Money<'a, Currency>,
    total_price: Money<'a, Currency>,
}

impl<'a> LineItem<'a> {
    /// Item name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Item category
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Number of units bought, always positive
    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    /// Price of one unit
    pub fn unit_price(&self) -> Money<'a, Currency> {
        self.unit_price
    }

    /// Price of every unit on the line
    pub fn total_price(&self) -> Money<'a, Currency> {
        self.total_price
    }
}

/// An exact solution laid out for display: purchased lines, then tax and total.
///
/// Lines are ordered by category, then by descending line total. The tax is rounded to the
/// nearest minor unit, so `subtotal + tax == total` holds exactly.
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt<'a> {
    lines: SmallVec<[LineItem<'a>; 8]>,
    subtotal: Money<'a, Currency>,
    tax_rate: TaxRate,
    tax: Money<'a, Currency>,
    total: Money<'a, Currency>,
}

impl<'a> Receipt<'a> {
    /// Build a receipt from one quantity per catalog item.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if the quantities do not match the catalog, or a line total or
    /// the tax overflows.
    pub fn from_quantities(
        catalog: &Catalog<'a>,
        quantities: &[usize],
        tax_rate: TaxRate,
    ) -> Result<Self, ReceiptError> {
        if quantities.len() != catalog.len() {
            return Err(ReceiptError::QuantityMismatch {
                expected: catalog.len(),
                actual: quantities.len(),
            });
        }

        let currency = catalog.currency();
        let mut lines: SmallVec<[LineItem<'a>; 8]> = SmallVec::new();

        for (calculated, &quantity) in catalog.iter().zip(quantities) {
            if quantity == 0 {
                continue;
            }

            let item = calculated.item();
            let overflow = || ReceiptError::QuantityOverflow {
                name: item.name().to_string(),
            };

            let quantity = u64::try_from(quantity).map_err(|_err| overflow())?;

            let total_minor = i64::try_from(quantity)
                .ok()
                .and_then(|quantity| item.price().to_minor_units().checked_mul(quantity))
                .ok_or_else(overflow)?;

            lines.push(LineItem {
                name: item.name().to_string(),
                category: item.category().to_string(),
                quantity,
                unit_price: *item.price(),
                total_price: Money::from_minor(total_minor, currency),
            });
        }

        lines.sort_by(|a, b| {
            a.category.cmp(&b.category).then_with(|| {
                Reverse(a.total_price.to_minor_units())
                    .cmp(&Reverse(b.total_price.to_minor_units()))
            })
        });

        let subtotal = lines
            .iter()
            .try_fold(Money::from_minor(0, currency), |sum, line| {
                sum.add(line.total_price)
            })?;

        let tax = tax_rate.tax_on(&subtotal)?;
        let total = subtotal.add(tax)?;

        Ok(Self {
            lines,
            subtotal,
            tax_rate,
            tax,
            total,
        })
    }

    /// Purchased lines, without the tax and total lines
    pub fn lines(&self) -> &[LineItem<'a>] {
        &self.lines
    }

    /// Sum of the line totals
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Tax rate applied to the subtotal
    pub fn tax_rate(&self) -> TaxRate {
        self.tax_rate
    }

    /// Label for the tax line, e.g. `Sales Tax 2.50%`
    pub fn tax_label(&self) -> String {
        self.tax_rate.label()
    }

    /// Tax on the subtotal
    pub fn tax(&self) -> Money<'a, Currency> {
        self.tax
    }

    /// Subtotal plus tax
    pub fn total(&self) -> Money<'a, Currency> {
        self.total
    }

    /// Currency used for all monetary values.
    pub fn currency(&self) -> &'a Currency {
        self.total.currency()
    }

    /// Prints the receipt as a table followed by the tax and total lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the receipt cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record(["", "Item", "Category", "Qty", "Unit Price", "Total"]);

        let mut category_boundary_rows: SmallVec<[usize; 8]> = SmallVec::new();
        let mut previous_category: Option<&str> = None;

        for (idx, line) in self.lines.iter().enumerate() {
            if previous_category.is_some_and(|category| category != line.category()) {
                // Header is row 0.
                category_boundary_rows.push(idx + 1);
            }

            previous_category = Some(line.category());

            builder.push_record([
                format!("#{:<3}", idx + 1),
                line.name.clone(),
                line.category.clone(),
                line.quantity.to_string(),
                line.unit_price.to_string(),
                line.total_price.to_string(),
            ]);
        }

        write_receipt_table(&mut out, builder, &category_boundary_rows)?;

        write_receipt_summary(&mut out, self)
    }
}

fn write_receipt_table(
    out: &mut impl io::Write,
    builder: Builder,
    category_boundary_rows: &[usize],
) -> Result<(), ReceiptError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    for &row in category_boundary_rows {
        theme.insert_horizontal_line(row, separator);
    }

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(3..6), Alignment::right());
    table.modify(Columns::new(2..3), ansi::dim());

    let table_str = ansi::dim_borders(&table.to_string());

    writeln!(out, "\n{table_str}").map_err(|_err| ReceiptError::IO)
}

fn write_receipt_summary(
    out: &mut impl io::Write,
    receipt: &Receipt<'_>,
) -> Result<(), ReceiptError> {
    let rows = [
        (" Subtotal:".to_string(), format!("{}  ", receipt.subtotal())),
        (format!(" {}:", receipt.tax_label()), format!("{}  ", receipt.tax())),
        (ansi::bold(" Total:"), ansi::bold(&format!("{}  ", receipt.total()))),
    ];

    let label_width = rows
        .iter()
        .map(|(label, _)| ansi::display_width(label))
        .max()
        .unwrap_or(0);

    let value_width = rows
        .iter()
        .map(|(_, value)| ansi::display_width(value))
        .max()
        .unwrap_or(0);

    for (label, value) in &rows {
        writeln!(
            out,
            "{}  {}",
            ansi::pad_left(label, label_width),
            ansi::pad_left(value, value_width)
        )
        .map_err(|_err| ReceiptError::IO)?;
    }

    writeln!(out).map_err(|_err| ReceiptError::IO)
}
