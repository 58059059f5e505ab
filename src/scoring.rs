//! Scoring
//!
//! Rates an exact solution by how evenly it uses the catalog. Higher is better.

use serde::Deserialize;
use smallvec::{SmallVec, smallvec};

use crate::items::catalog::Catalog;

pub mod ranking;

/// Minor units in one major unit, for every supported currency.
const MINOR_PER_MAJOR: u64 = 100;

/// Weights applied to each component of a score.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoreWeights {
    /// Weight of the share of catalog items used
    pub diversity: f64,

    /// Weight of how evenly spend is spread across categories
    pub price_balance: f64,

    /// Weight of how evenly item counts are spread across categories
    pub count_balance: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            diversity: 3.0,
            price_balance: 2.0,
            count_balance: 1.0,
        }
    }
}

/// Unweighted score components, each at most `1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    /// Distinct items used over distinct items in the catalog.
    pub diversity: f64,

    /// `1 - (max - min) / target` over per-category spend, with the spread in major units and
    /// the target in minor units. Stays close to `1`, so diversity and count balance decide most
    /// rankings.
    pub price_balance: f64,

    /// `1 - (max - min) / total` over per-category item counts.
    pub count_balance: f64,
}

impl ScoreBreakdown {
    /// Combine the components with the given weights.
    pub fn weighted(&self, weights: &ScoreWeights) -> f64 {
        weights.diversity * self.diversity
            + weights.price_balance * self.price_balance
            + weights.count_balance * self.count_balance
    }
}

/// Scores quantity vectors against one catalog and subtotal target.
#[derive(Debug, Clone)]
pub struct Scorer {
    /// `(price, category)` per item, in catalog order
    items: SmallVec<[(u64, usize); 16]>,
    categories: usize,
    target: u64,
    weights: ScoreWeights,
}

impl Scorer {
    /// Create a scorer for `catalog` and a subtotal target in minor units.
    pub fn new(catalog: &Catalog<'_>, target: u64, weights: ScoreWeights) -> Self {
        Self {
            items: catalog
                .iter()
                .map(|item| (item.integer_price(), item.category()))
                .collect(),
            categories: catalog.categories().len(),
            target,
            weights,
        }
    }

    /// Weighted score of a quantity vector.
    pub fn score(&self, quantities: &[usize]) -> f64 {
        self.breakdown(quantities).weighted(&self.weights)
    }

    /// Score components of a quantity vector, one quantity per catalog item.
    ///
    /// Every catalog category takes part in the balance components, so a category with nothing
    /// in it counts as zero spend and zero items. Components whose denominator is zero score `0`.
    pub fn breakdown(&self, quantities: &[usize]) -> ScoreBreakdown {
        let mut spend: SmallVec<[u64; 8]> = smallvec![0; self.categories];
        let mut counts: SmallVec<[u64; 8]> = smallvec![0; self.categories];
        let mut included = 0_usize;

        for (&(price, category), &quantity) in self.items.iter().zip(quantities) {
            if quantity == 0 {
                continue;
            }

            let quantity = u64::try_from(quantity).unwrap_or(u64::MAX);

            included += 1;

            if let Some(total) = spend.get_mut(category) {
                *total = total.saturating_add(price.saturating_mul(quantity));
            }

            if let Some(count) = counts.get_mut(category) {
                *count = count.saturating_add(quantity);
            }
        }

        let total_count = counts.iter().fold(0_u64, |acc, n| acc.saturating_add(*n));

        ScoreBreakdown {
            diversity: ratio(included as u64, self.items.len() as u64),
            price_balance: balance(&spend, self.target.saturating_mul(MINOR_PER_MAJOR)),
            count_balance: balance(&counts, total_count),
        }
    }
}

/// `1 - spread / denominator`, or `0` when the denominator is zero.
fn balance(values: &[u64], denominator: u64) -> f64 {
    let max = values.iter().copied().max().unwrap_or(0);
    let min = values.iter().copied().min().unwrap_or(0);

    if denominator == 0 {
        return 0.0;
    }

    1.0 - ratio(max - min, denominator)
}

#[expect(
    clippy::cast_precision_loss,
    reason = "scores only need to order solutions, not reproduce exact amounts"
)]
fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }

    numerator as f64 / denominator as f64
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::USD};
    use testresult::TestResult;

    use crate::items::Item;

    use super::*;

    const EPSILON: f64 = 1e-9;

    fn catalog() -> TestResult<Catalog<'static>> {
        // Price order: Soda (x, 78), Chips (y, 105), Cake (x, 150)
        Ok(Catalog::new(
            [
                Item::new("Soda", Money::from_minor(78, USD), "x"),
                Item::new("Chips", Money::from_minor(105, USD), "y"),
                Item::new("Cake", Money::from_minor(150, USD), "x"),
            ],
            USD,
        )?)
    }

    #[test]
    fn breakdown_of_balanced_solution() -> TestResult {
        let catalog = catalog()?;
        let scorer = Scorer::new(&catalog, 183, ScoreWeights::default());

        let breakdown = scorer.breakdown(&[1, 1, 0]);

        assert!((breakdown.diversity - 2.0 / 3.0).abs() < EPSILON);
        assert!((breakdown.price_balance - (1.0 - 0.27 / 183.0)).abs() < EPSILON);
        assert!((breakdown.count_balance - 1.0).abs() < EPSILON);

        Ok(())
    }

    #[test]
    fn ignored_category_depresses_balance() -> TestResult {
        let catalog = catalog()?;
        let scorer = Scorer::new(&catalog, 306, ScoreWeights::default());

        // Two sodas and one cake: category y is empty.
        let breakdown = scorer.breakdown(&[2, 0, 1]);

        assert!((breakdown.price_balance - (1.0 - 3.06 / 306.0)).abs() < EPSILON);
        assert!((breakdown.count_balance - 0.0).abs() < EPSILON);

        Ok(())
    }

    #[test]
    fn empty_solution_scores_zero() -> TestResult {
        let catalog = catalog()?;
        let scorer = Scorer::new(&catalog, 0, ScoreWeights::default());

        let breakdown = scorer.breakdown(&[0, 0, 0]);

        assert_eq!(
            breakdown,
            ScoreBreakdown {
                diversity: 0.0,
                price_balance: 0.0,
                count_balance: 0.0,
            }
        );

        Ok(())
    }

    #[test]
    fn weights_combine_components() {
        let breakdown = ScoreBreakdown {
            diversity: 0.5,
            price_balance: 0.25,
            count_balance: 1.0,
        };

        assert!((breakdown.weighted(&ScoreWeights::default()) - 3.0).abs() < EPSILON);

        let diversity_only = ScoreWeights {
            diversity: 1.0,
            price_balance: 0.0,
            count_balance: 0.0,
        };

        assert!((breakdown.weighted(&diversity_only) - 0.5).abs() < EPSILON);
    }

    #[test]
    fn even_counts_outrank_a_closer_spend_split() -> TestResult {
        let catalog = Catalog::new(
            [
                Item::new("A", Money::from_minor(10, USD), "x"),
                Item::new("B", Money::from_minor(50, USD), "y"),
            ],
            USD,
        )?;
        let scorer = Scorer::new(&catalog, 120, ScoreWeights::default());

        let even = scorer.score(&[2, 2]);
        let lopsided = scorer.score(&[7, 1]);
        let single = scorer.score(&[12, 0]);

        assert!((even - (3.0 + 2.0 * (1.0 - 0.8 / 120.0) + 1.0)).abs() < EPSILON);
        assert!((lopsided - (3.0 + 2.0 * (1.0 - 0.2 / 120.0) + 0.25)).abs() < EPSILON);
        assert!((single - (1.5 + 2.0 * (1.0 - 1.2 / 120.0))).abs() < EPSILON);
        assert!(even > lopsided && lopsided > single);

        Ok(())
    }

    #[test]
    fn score_prefers_using_more_of_the_catalog() -> TestResult {
        let catalog = catalog()?;
        let scorer = Scorer::new(&catalog, 333, ScoreWeights::default());

        let everything = scorer.score(&[1, 1, 1]);
        let sodas_only = scorer.score(&[4, 0, 0]);

        assert!(everything > sodas_only, "{everything} should beat {sodas_only}");

        Ok(())
    }
}
