//! Command implementations for topkeys

pub mod generate;
pub mod scan;
pub mod segments;
