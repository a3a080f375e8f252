//! Acquisition: turning host identifier lists and value batches into named channel readings

mod resolver;

pub use resolver::*;
