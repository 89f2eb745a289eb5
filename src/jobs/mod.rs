// src/jobs/mod.rs

pub mod handlers;
pub mod models;
pub mod routes;
pub mod validators;

pub use routes::jobs_routes;
