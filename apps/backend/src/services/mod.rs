//! Application services between the routes and the database.

pub mod catalog;
pub mod practice;
