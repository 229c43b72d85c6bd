// Shared fixtures for the arbiter scenario tests.


pub use test_utils::*;
