//! Structured document trees and their pretty-printers, one per artifact
//! format. Generators build trees from derived facts; the printers own all
//! text layout.

pub mod changelog;
pub mod java;
pub mod xml;
