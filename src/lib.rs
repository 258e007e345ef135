//! treecov: property-based test derivation from surrogate decision trees
//!
//! A decision tree trained on the same task as a target classifier splits
//! the input space into boxes, one per leaf. treecov turns every box into
//! property tests for the target model:
//!
//! - **Paths**: [`derive::TreeWalker`] lists each root-to-leaf path and
//!   [`derive::ConstraintMerger`] reduces it to one interval per feature
//! - **DTC**: one test per leaf drawing from the whole interval
//! - **BVA**: tests in thin bands on both sides of every threshold that
//!   bounds the leaf, each tagged with the class valid on its side
//! - **Pools**: features a path ignores draw from a few observed values
//!
//! Derived tests can be emitted as a Rust [`proptest`](https://docs.rs/proptest)
//! module ([`emit`]) or replayed against any [`experiment::Classifier`].

pub mod cli;
pub mod config;
pub mod dataset;
pub mod derive;
pub mod emit;
pub mod experiment;
pub mod tree;

pub use config::{Criterion, DeriveConfig};
pub use dataset::Dataset;
pub use derive::{derive, Derivation, DerivedTest, GenerationSpec};
pub use tree::{Tree, TreeExport};
pub use treecov_common::{Result, TreecovError};
