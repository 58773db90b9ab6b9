//! Shared types for the MediConnect backend

pub mod error;

pub use error::{ApiError, Result};
