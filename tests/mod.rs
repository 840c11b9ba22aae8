//! Test suite for the S3 tracker sync core
//!
//! This module organizes all tests

pub mod integration;
pub mod property;
