// src/auth/mod.rs

pub mod extractors;
pub mod models;

pub use extractors::AuthedUser;
pub use models::UserRole;
