// src/handlers.rs

pub mod auth;
pub mod catalog;
pub mod dashboard;
pub mod functions;
pub mod profiles;
pub mod reports;
pub mod submissions;
