//! Integration tests
//!
//! Drive the full router over an in-memory store. Postgres tests are
//! ignored unless `DATABASE_URL` points at a disposable database.

mod auth_test;
mod cart_test;
mod chat_test;
mod listings_test;
mod postgres_test;
