//! Test suite for EcoFinds
//!
//! This module organizes all tests

pub mod integration;
pub mod property;
