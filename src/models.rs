pub mod auth;
pub mod catalog;
pub mod dashboard;
pub mod profile;
pub mod recommendation;
pub mod submission;
