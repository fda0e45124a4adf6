#![deny(warnings)]
pub mod logging;
pub mod runner;
