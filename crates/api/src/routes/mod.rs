pub mod cache;
pub mod price;
