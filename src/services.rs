// src/services.rs

pub mod admin_service;
pub mod aggregation;
pub mod auth;
pub mod dashboard_service;
pub mod recommendation_service;
pub mod report_service;
pub mod status;
pub mod submission_service;
pub mod suggestions;
pub mod timeline;
