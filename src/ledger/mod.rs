//! Cash and bank books: voucher numbering and running balances

pub mod book;
pub mod voucher;

pub use book::*;
pub use voucher::*;
