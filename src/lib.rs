// ABOUTME: Library root for cirrus - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod cidr;
pub mod cloud;
pub mod cluster;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod hosts;
pub mod inventory;
pub mod output;
pub mod rules;
pub mod types;
pub mod workspace;
