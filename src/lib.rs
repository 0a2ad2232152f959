// Library module for hashwatch
// Re-exports modules for use in integration tests and front ends

pub mod config;
pub mod hash;
