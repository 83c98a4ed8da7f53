//! Schema model: the entity/column data structures supplied as static input,
//! plus the baseline-normalization pass that fills in implied system columns.

mod model;
pub mod normalize;

pub use model::{Column, ForeignKey, Table};
