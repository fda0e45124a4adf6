#![deny(warnings)]
pub mod policy;

pub use policy::{HeuristicPolicy, Policy, PolicyContext, RandomPolicy};
