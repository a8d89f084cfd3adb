//! Ostrich Feeder library crate — re-exports all modules for integration testing.
//!
//! The binary crate (`main.rs`) is the actual game entry point.
//! This library crate exposes the same modules so that `tests/` integration
//! tests can drive the simulation and its plugins without needing a
//! window or GPU.

pub mod shared;
pub mod config;
pub mod sim;
pub mod feeder;
pub mod pointer;
pub mod scene;
pub mod audio;
pub mod ui;
