//! City weather service library
//!
//! Exposes the forecast service, cache backends, upstream clients and HTTP
//! layer for the binary and for integration tests.

pub mod app;
pub mod cache;
pub mod chart;
pub mod cli;
pub mod controller;
pub mod data;
pub mod forecast;
pub mod http;
pub mod server;
