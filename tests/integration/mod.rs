//! Integration tests
//!
//! Row store client over HTTP, the SQLite store, and the sync core end to end

mod row_client_test;
mod sqlite_store_test;
mod sync_flow_test;
