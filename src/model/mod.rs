//! Domain model shared by both storage backends

pub mod appointment;
pub mod connection;
pub mod message;
pub mod post;
pub mod topic;
pub mod user;

pub use appointment::{Appointment, AppointmentStatus, NewAppointment};
pub use connection::{Connection, ConnectionStatus, NewConnection};
pub use message::{Message, NewMessage};
pub use post::{Comment, LikeOutcome, NewComment, NewPost, Post, PostType};
pub use topic::{HealthTopic, NewHealthTopic};
pub use user::{
    DoctorProfile, DoctorWithProfile, NewDoctorProfile, NewPatientProfile, NewUser,
    PatientProfile, PatientWithProfile, Profile, Role, User,
};
