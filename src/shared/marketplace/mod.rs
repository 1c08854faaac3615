//! Marketplace Module
//!
//! This module contains the data structures of the marketplace domain:
//!
//! - `Account` - A registered user, with embedded cart and purchase history
//! - `Listing` - An item offered for sale
//! - `CartEntry` / `PurchaseEntry` - Embedded account entries
//! - `Conversation` / `ChatMessage` - Buyer/seller chat about one listing
//!
//! # Usage
//!
//! ```rust
//! use ecofinds::shared::marketplace::{Account, Listing, Conversation, MessageState};
//! ```

pub mod account;
pub mod cart;
pub mod conversation;
pub mod listing;

pub use account::{
    normalize_email, Account, LoginRequest, Participant, Profile, RegisterRequest,
    UpdateProfileRequest,
};
pub use cart::{
    check_cart_addition, check_purchasable, AddToCartRequest, CartEntry, CartItem,
    PurchaseEntry, PurchaseItem, PurchaseRequest,
};
pub use conversation::{
    validate_content, ChatMessage, Conversation, ConversationView, LastMessage, MessageState,
    SendMessageRequest, StartChatRequest,
};
pub use listing::{
    Category, Listing, ListingForm, ListingParams, ListingQuery, ListingSummary, ListingUpdate,
    NewListing,
};
