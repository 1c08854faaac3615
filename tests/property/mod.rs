//! Property-based tests
//!
//! Uses proptest to generate random inputs and verify invariants of the
//! message state machine and the listing query.

mod listing_query_proptest;
mod message_state_proptest;
