// src/candidates/mod.rs

pub mod handlers;
pub mod models;
pub mod pipeline;
pub mod privacy;
pub mod routes;
pub mod status;
pub mod validators;

#[cfg(test)]
mod tests;

pub use routes::candidates_routes;
