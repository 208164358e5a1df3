//! Route Server - hosts route editing sessions over HTTP.

pub mod api;
pub mod cache;
pub mod config;
pub mod geometry;
pub mod loops;
pub mod session;
pub mod state;
pub mod terrain;
