//! Tally
//!
//! Tally finds combinations of items whose tax-inclusive total lands exactly on a target, and
//! ranks them by how evenly they use the catalog.
//!
//! A request is turned into a pre-tax subtotal target in minor units, a reachability table is
//! built over the price-ordered items, and every exact combination is enumerated within a time
//! budget. The best-scoring combinations are kept and assembled into receipts.

mod ansi;
pub mod config;
pub mod fixtures;
pub mod items;
pub mod prelude;
pub mod pricing;
pub mod receipt;
pub mod scoring;
pub mod session;
pub mod solvers;
pub mod table;
pub mod wire;
