//! Listings Module
//!
//! Items offered for sale: browsing, creation with an optional image, owner
//! updates and deletion.
//!
//! ```text
//! listings/
//! ├── mod.rs      - Module exports
//! ├── handlers.rs - /api/products handlers
//! └── images.rs   - Image validation and the image service client
//! ```

pub mod handlers;
pub mod images;

pub use handlers::{
    browse_listings, create_listing, delete_listing, get_listing, my_listings, update_listing,
};
pub use images::{ImageUpload, ImageUploader};
