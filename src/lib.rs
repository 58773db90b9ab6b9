//! MediConnect - community platform API for doctors and patients
//!
//! A REST backend where doctors and patients share a feed, connect with
//! each other, exchange direct messages, and manage appointments.
//!
//! ## Services
//!
//! - **Entity store**: one trait, two backends (in-memory and Postgres)
//! - **Auth**: argon2 credentials with cookie sessions
//! - **Engagement**: posts, comments, and per-user like toggles
//! - **Connections**: request/accept/reject lifecycle between users
//! - **Appointments**: scheduled bookings with terminal completed/cancelled states

pub mod auth;
pub mod config;
pub mod model;
pub mod routes;
pub mod seed;
pub mod server;
pub mod services;
pub mod store;
pub mod types;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{ApiError, Result};
