//! Property-based tests
//!
//! Persistence round-trips and queue ordering under generated inputs

mod queue_proptest;
