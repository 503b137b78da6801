//! Route Handlers

pub mod auth;
pub mod predict;
pub mod profile;
