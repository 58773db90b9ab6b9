//! Entity storage abstraction
//!
//! One trait, two interchangeable backends: an in-memory store for
//! development and tests, and a Postgres store for real deployments. The
//! backend is chosen by startup configuration and injected as
//! `Arc<dyn EntityStore>`; nothing below the trait knows which one it is.
//!
//! Contract notes shared by both backends:
//! - creation assigns the id and createdAt server-side and applies
//!   defaults (post counters 0, connection pending, appointment scheduled,
//!   message unread) regardless of caller input
//! - reads return `Ok(None)` for absent ids; mutations return `NotFound`
//! - list operations have fixed orderings with id tiebreaks so both
//!   backends paginate identically

use async_trait::async_trait;

use crate::model::{
    Appointment, AppointmentStatus, Comment, Connection, ConnectionStatus, DoctorProfile,
    DoctorWithProfile, HealthTopic, LikeOutcome, Message, NewAppointment, NewComment,
    NewConnection, NewDoctorProfile, NewHealthTopic, NewMessage, NewPatientProfile, NewPost,
    NewUser, PatientProfile, PatientWithProfile, Post, Profile, User,
};
use crate::types::Result;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Storage contract covering every entity kind
#[async_trait]
pub trait EntityStore: Send + Sync {
    // Users
    async fn create_user(&self, new: NewUser) -> Result<User>;
    async fn user_by_id(&self, id: i32) -> Result<Option<User>>;
    async fn user_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn user_by_email(&self, email: &str) -> Result<Option<User>>;

    // Profiles
    async fn create_doctor_profile(&self, new: NewDoctorProfile) -> Result<DoctorProfile>;
    async fn create_patient_profile(&self, new: NewPatientProfile) -> Result<PatientProfile>;
    async fn doctor_profile_by_user_id(&self, user_id: i32) -> Result<Option<DoctorProfile>>;
    async fn patient_profile_by_user_id(&self, user_id: i32) -> Result<Option<PatientProfile>>;
    /// Role-discriminated profile lookup for a user id
    async fn profile_by_user_id(&self, user_id: i32) -> Result<Option<Profile>>;

    // Directory
    async fn doctors(&self) -> Result<Vec<DoctorWithProfile>>;
    async fn doctor_by_user_id(&self, user_id: i32) -> Result<Option<DoctorWithProfile>>;
    async fn patient_by_user_id(&self, user_id: i32) -> Result<Option<PatientWithProfile>>;

    // Posts
    async fn create_post(&self, new: NewPost) -> Result<Post>;
    async fn post_by_id(&self, id: i32) -> Result<Option<Post>>;
    /// All posts, newest first
    async fn all_posts(&self) -> Result<Vec<Post>>;
    /// One author's posts, newest first
    async fn posts_by_user_id(&self, user_id: i32) -> Result<Vec<Post>>;
    /// Per-user idempotent like toggle; the count never goes below zero
    async fn toggle_post_like(&self, post_id: i32, user_id: i32) -> Result<LikeOutcome>;

    // Comments
    /// Creates the comment and bumps the parent post's commentCount as one
    /// atomic step
    async fn create_comment(&self, new: NewComment) -> Result<Comment>;
    /// Comments on a post, oldest first
    async fn comments_by_post_id(&self, post_id: i32) -> Result<Vec<Comment>>;

    // Connections
    async fn create_connection(&self, new: NewConnection) -> Result<Connection>;
    async fn connection_by_id(&self, id: i32) -> Result<Option<Connection>>;
    /// The directed edge follower → following, if any
    async fn connection_between(
        &self,
        follower_id: i32,
        following_id: i32,
    ) -> Result<Option<Connection>>;
    /// Every edge where the user is on either side
    async fn connections_by_user_id(&self, user_id: i32) -> Result<Vec<Connection>>;
    async fn set_connection_status(&self, id: i32, status: ConnectionStatus)
        -> Result<Connection>;
    /// Re-request of a previously rejected edge: back to pending with a
    /// fresh createdAt
    async fn reopen_connection(&self, id: i32) -> Result<Connection>;

    // Messages
    async fn create_message(&self, new: NewMessage) -> Result<Message>;
    async fn message_by_id(&self, id: i32) -> Result<Option<Message>>;
    /// Messages where the user is sender or receiver, newest first
    async fn messages_by_user_id(&self, user_id: i32) -> Result<Vec<Message>>;
    async fn mark_message_read(&self, id: i32) -> Result<Message>;

    // Appointments
    async fn create_appointment(&self, new: NewAppointment) -> Result<Appointment>;
    async fn appointment_by_id(&self, id: i32) -> Result<Option<Appointment>>;
    /// A doctor's appointments, soonest first
    async fn appointments_by_doctor_id(&self, doctor_id: i32) -> Result<Vec<Appointment>>;
    /// A patient's appointments, soonest first
    async fn appointments_by_patient_id(&self, patient_id: i32) -> Result<Vec<Appointment>>;
    async fn set_appointment_status(
        &self,
        id: i32,
        status: AppointmentStatus,
    ) -> Result<Appointment>;

    // Health topics
    /// Active topics, most mentioned first
    async fn health_topics(&self) -> Result<Vec<HealthTopic>>;
    async fn create_health_topic(&self, new: NewHealthTopic) -> Result<HealthTopic>;
}
