//! Invoice register reports: monthly rollup and CSV export

pub mod export;
pub mod monthly;

pub use export::*;
pub use monthly::*;
