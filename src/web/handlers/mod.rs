//! # Request Handlers

pub mod health;
pub mod submissions;
