/// User entity tests against an in-memory SQLite store
pub mod user_tests;
