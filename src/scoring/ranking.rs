//! Ranking
//!
//! Bounded best-of-K retention for results discovered in no particular order.

/// A value with the score it was ranked by.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<T> {
    /// Score, higher is better
    pub score: f64,

    /// Ranked value
    pub value: T,
}

/// Keeps the `capacity` highest-scoring values offered so far, best first.
///
/// Equal scores keep discovery order: a later value only displaces the current worst entry when
/// it scores strictly higher.
#[derive(Debug, Clone)]
pub struct Ranking<T> {
    capacity: usize,
    entries: Vec<Ranked<T>>,
}

impl<T> Ranking<T> {
    /// Create an empty ranking holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Position a value with `score` would take, or `None` if it would not be kept.
    fn position(&self, score: f64) -> Option<usize> {
        let position = self
            .entries
            .partition_point(|entry| entry.score.total_cmp(&score).is_ge());

        (position < self.capacity).then_some(position)
    }

    /// Whether a value with `score` would currently be kept.
    pub fn would_keep(&self, score: f64) -> bool {
        self.position(score).is_some()
    }

    /// Offer a value, returning whether it was kept.
    pub fn offer(&mut self, score: f64, value: T) -> bool {
        self.offer_with(score, || value)
    }

    /// Offer a value built only if it will be kept, returning whether it was.
    pub fn offer_with(&mut self, score: f64, value: impl FnOnce() -> T) -> bool {
        let Some(position) = self.position(score) else {
            return false;
        };

        self.entries.insert(
            position,
            Ranked {
                score,
                value: value(),
            },
        );
        self.entries.truncate(self.capacity);

        true
    }

    /// Lowest kept score, if any.
    pub fn worst_score(&self) -> Option<f64> {
        self.entries.last().map(|entry| entry.score)
    }

    /// Maximum number of entries kept.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of entries kept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing has been kept.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over kept entries, best first.
    pub fn iter(&self) -> impl Iterator<Item = &Ranked<T>> {
        self.entries.iter()
    }

    /// Consume the ranking, returning entries best first.
    pub fn into_vec(self) -> Vec<Ranked<T>> {
        self.entries
    }
}
