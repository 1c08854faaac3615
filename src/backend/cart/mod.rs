//! Cart Module
//!
//! Cart management under `/api/cart` and purchases under `/api/user`.

pub mod handlers;

pub use handlers::{add_to_cart, get_cart, purchase, purchases, remove_from_cart};
