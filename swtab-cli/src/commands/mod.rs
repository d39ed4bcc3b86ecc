//! Command implementations for swtab CLI

pub mod rle_encode;
pub mod tabulate;
