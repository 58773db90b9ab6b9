//! Domain services layered over the entity store
//!
//! Routes stay thin: every ownership check and state-machine rule lives
//! here, against the injected [`EntityStore`](crate::store::EntityStore).

pub mod appointments;
pub mod connections;
pub mod engagement;
pub mod messages;

pub use appointments::AppointmentService;
pub use connections::ConnectionService;
pub use engagement::EngagementService;
pub use messages::MessageService;
