//! Integration test harness

mod api_tests;
mod store_tests;
