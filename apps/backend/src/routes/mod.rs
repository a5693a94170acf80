//! HTTP route handlers

pub mod identity;
pub mod openings;
pub mod practice;
pub mod progress;
