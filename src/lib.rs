// Library root: re-exports all modules so integration tests and external
// consumers can access the crate's public API.

pub mod engine;
pub mod profile;
pub mod statline;
