//! Postgres entity store
//!
//! sqlx-backed implementation of the storage contract. Schema lives in
//! `migrations/` and is applied at connect time. Counter updates are
//! expressed as atomic `SET count = count + 1` statements, and the two
//! multi-statement writes (comment + counter, like pair + counter) run
//! inside transactions so a failed second statement rolls back the first.
//!
//! Rows are decoded into private row structs and converted to the domain
//! model; status and role columns travel as text and are parsed on the way
//! out (CHECK constraints keep them valid).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::FromRow;

use crate::model::{
    Appointment, AppointmentStatus, Comment, Connection, ConnectionStatus, DoctorProfile,
    DoctorWithProfile, HealthTopic, LikeOutcome, Message, NewAppointment, NewComment,
    NewConnection, NewDoctorProfile, NewHealthTopic, NewMessage, NewPatientProfile, NewPost,
    NewUser, PatientProfile, PatientWithProfile, Post, Profile, Role, User,
};
use crate::store::EntityStore;
use crate::types::{ApiError, Result};

/// Postgres backend over a connection pool
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect and bring the schema up to date
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn parse_column<T: std::str::FromStr>(value: &str, column: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| ApiError::Database(format!("Invalid {} value in row: {}", column, value)))
}

// Row types

#[derive(FromRow)]
struct UserRow {
    id: i32,
    username: String,
    password: String,
    name: String,
    email: String,
    bio: Option<String>,
    profile_image: Option<String>,
    cover_image: Option<String>,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = ApiError;

    fn try_from(row: UserRow) -> Result<Self> {
        let role: Role = parse_column(&row.role, "role")?;
        Ok(User {
            id: row.id,
            username: row.username,
            password: row.password,
            name: row.name,
            email: row.email,
            bio: row.bio,
            profile_image: row.profile_image,
            cover_image: row.cover_image,
            role,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct DoctorProfileRow {
    id: i32,
    user_id: i32,
    specialty: String,
    hospital: Option<String>,
    qualifications: Option<String>,
    experience: Option<i32>,
    verified: bool,
    rating: Option<f64>,
    review_count: i32,
}

impl From<DoctorProfileRow> for DoctorProfile {
    fn from(row: DoctorProfileRow) -> Self {
        DoctorProfile {
            id: row.id,
            user_id: row.user_id,
            specialty: row.specialty,
            hospital: row.hospital,
            qualifications: row.qualifications,
            experience: row.experience,
            verified: row.verified,
            rating: row.rating,
            review_count: row.review_count,
        }
    }
}

#[derive(FromRow)]
struct PatientProfileRow {
    id: i32,
    user_id: i32,
    conditions: Option<Vec<String>>,
}

impl From<PatientProfileRow> for PatientProfile {
    fn from(row: PatientProfileRow) -> Self {
        PatientProfile {
            id: row.id,
            user_id: row.user_id,
            conditions: row.conditions,
        }
    }
}

#[derive(FromRow)]
struct PostRow {
    id: i32,
    user_id: i32,
    content: String,
    image: Option<String>,
    is_anonymous: bool,
    post_type: Option<String>,
    related_conditions: Option<Vec<String>>,
    likes: i32,
    comment_count: i32,
    created_at: DateTime<Utc>,
}

impl TryFrom<PostRow> for Post {
    type Error = ApiError;

    fn try_from(row: PostRow) -> Result<Self> {
        let post_type = match row.post_type {
            Some(ref value) => Some(parse_column(value, "post_type")?),
            None => None,
        };
        Ok(Post {
            id: row.id,
            user_id: row.user_id,
            content: row.content,
            image: row.image,
            is_anonymous: row.is_anonymous,
            post_type,
            related_conditions: row.related_conditions,
            likes: row.likes,
            comment_count: row.comment_count,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct CommentRow {
    id: i32,
    post_id: i32,
    user_id: i32,
    content: String,
    likes: i32,
    created_at: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: row.id,
            post_id: row.post_id,
            user_id: row.user_id,
            content: row.content,
            likes: row.likes,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct ConnectionRow {
    id: i32,
    follower_id: i32,
    following_id: i32,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ConnectionRow> for Connection {
    type Error = ApiError;

    fn try_from(row: ConnectionRow) -> Result<Self> {
        let status: ConnectionStatus = parse_column(&row.status, "status")?;
        Ok(Connection {
            id: row.id,
            follower_id: row.follower_id,
            following_id: row.following_id,
            status,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct MessageRow {
    id: i32,
    sender_id: i32,
    receiver_id: i32,
    content: String,
    is_read: bool,
    created_at: DateTime<Utc>,
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Message {
            id: row.id,
            sender_id: row.sender_id,
            receiver_id: row.receiver_id,
            content: row.content,
            is_read: row.is_read,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct AppointmentRow {
    id: i32,
    doctor_id: i32,
    patient_id: i32,
    date: DateTime<Utc>,
    status: String,
    reason: Option<String>,
    notes: Option<String>,
    is_virtual: bool,
    location: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<AppointmentRow> for Appointment {
    type Error = ApiError;

    fn try_from(row: AppointmentRow) -> Result<Self> {
        let status: AppointmentStatus = parse_column(&row.status, "status")?;
        Ok(Appointment {
            id: row.id,
            doctor_id: row.doctor_id,
            patient_id: row.patient_id,
            date: row.date,
            status,
            reason: row.reason,
            notes: row.notes,
            is_virtual: row.is_virtual,
            location: row.location,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct HealthTopicRow {
    id: i32,
    title: String,
    count: i32,
    is_active: bool,
}

impl From<HealthTopicRow> for HealthTopic {
    fn from(row: HealthTopicRow) -> Self {
        HealthTopic {
            id: row.id,
            title: row.title,
            count: row.count,
            is_active: row.is_active,
        }
    }
}

/// Doctor directory join row: user columns plus p_-prefixed profile columns
#[derive(FromRow)]
struct DoctorJoinRow {
    id: i32,
    username: String,
    password: String,
    name: String,
    email: String,
    bio: Option<String>,
    profile_image: Option<String>,
    cover_image: Option<String>,
    role: String,
    created_at: DateTime<Utc>,
    p_id: i32,
    p_user_id: i32,
    specialty: String,
    hospital: Option<String>,
    qualifications: Option<String>,
    experience: Option<i32>,
    verified: bool,
    rating: Option<f64>,
    review_count: i32,
}

impl TryFrom<DoctorJoinRow> for DoctorWithProfile {
    type Error = ApiError;

    fn try_from(row: DoctorJoinRow) -> Result<Self> {
        let role: Role = parse_column(&row.role, "role")?;
        Ok(DoctorWithProfile {
            user: User {
                id: row.id,
                username: row.username,
                password: row.password,
                name: row.name,
                email: row.email,
                bio: row.bio,
                profile_image: row.profile_image,
                cover_image: row.cover_image,
                role,
                created_at: row.created_at,
            },
            profile: DoctorProfile {
                id: row.p_id,
                user_id: row.p_user_id,
                specialty: row.specialty,
                hospital: row.hospital,
                qualifications: row.qualifications,
                experience: row.experience,
                verified: row.verified,
                rating: row.rating,
                review_count: row.review_count,
            },
        })
    }
}

const DOCTOR_JOIN_COLUMNS: &str = "u.id, u.username, u.password, u.name, u.email, u.bio, \
     u.profile_image, u.cover_image, u.role, u.created_at, \
     p.id AS p_id, p.user_id AS p_user_id, p.specialty, p.hospital, \
     p.qualifications, p.experience, p.verified, p.rating, p.review_count";

#[async_trait]
impl EntityStore for PgStore {
    // Users

    async fn create_user(&self, new: NewUser) -> Result<User> {
        let row: UserRow = sqlx::query_as(
            "INSERT INTO users (username, password, name, email, bio, profile_image, cover_image, role) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(&new.username)
        .bind(&new.password)
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.bio)
        .bind(&new.profile_image)
        .bind(&new.cover_image)
        .bind(new.role.as_str())
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    async fn user_by_id(&self, id: i32) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.map(TryInto::try_into).transpose()
    }

    // Profiles

    async fn create_doctor_profile(&self, new: NewDoctorProfile) -> Result<DoctorProfile> {
        let row: DoctorProfileRow = sqlx::query_as(
            "INSERT INTO doctor_profiles \
             (user_id, specialty, hospital, qualifications, experience, verified, rating, review_count) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(new.user_id)
        .bind(&new.specialty)
        .bind(&new.hospital)
        .bind(&new.qualifications)
        .bind(new.experience)
        .bind(new.verified)
        .bind(new.rating)
        .bind(new.review_count)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn create_patient_profile(&self, new: NewPatientProfile) -> Result<PatientProfile> {
        let row: PatientProfileRow = sqlx::query_as(
            "INSERT INTO patient_profiles (user_id, conditions) VALUES ($1, $2) RETURNING *",
        )
        .bind(new.user_id)
        .bind(&new.conditions)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn doctor_profile_by_user_id(&self, user_id: i32) -> Result<Option<DoctorProfile>> {
        let row: Option<DoctorProfileRow> =
            sqlx::query_as("SELECT * FROM doctor_profiles WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(Into::into))
    }

    async fn patient_profile_by_user_id(&self, user_id: i32) -> Result<Option<PatientProfile>> {
        let row: Option<PatientProfileRow> =
            sqlx::query_as("SELECT * FROM patient_profiles WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(Into::into))
    }

    async fn profile_by_user_id(&self, user_id: i32) -> Result<Option<Profile>> {
        let Some(user) = self.user_by_id(user_id).await? else {
            return Ok(None);
        };
        match user.role {
            Role::Doctor => Ok(self
                .doctor_profile_by_user_id(user_id)
                .await?
                .map(Profile::Doctor)),
            Role::Patient => Ok(self
                .patient_profile_by_user_id(user_id)
                .await?
                .map(Profile::Patient)),
        }
    }

    // Directory

    async fn doctors(&self) -> Result<Vec<DoctorWithProfile>> {
        let rows: Vec<DoctorJoinRow> = sqlx::query_as(&format!(
            "SELECT {} FROM users u \
             JOIN doctor_profiles p ON p.user_id = u.id \
             WHERE u.role = 'doctor' ORDER BY u.id ASC",
            DOCTOR_JOIN_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn doctor_by_user_id(&self, user_id: i32) -> Result<Option<DoctorWithProfile>> {
        let row: Option<DoctorJoinRow> = sqlx::query_as(&format!(
            "SELECT {} FROM users u \
             JOIN doctor_profiles p ON p.user_id = u.id \
             WHERE u.id = $1 AND u.role = 'doctor'",
            DOCTOR_JOIN_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn patient_by_user_id(&self, user_id: i32) -> Result<Option<PatientWithProfile>> {
        let Some(user) = self.user_by_id(user_id).await? else {
            return Ok(None);
        };
        if user.role != Role::Patient {
            return Ok(None);
        }
        Ok(self
            .patient_profile_by_user_id(user_id)
            .await?
            .map(|profile| PatientWithProfile { user, profile }))
    }

    // Posts

    async fn create_post(&self, new: NewPost) -> Result<Post> {
        let row: PostRow = sqlx::query_as(
            "INSERT INTO posts (user_id, content, image, is_anonymous, post_type, related_conditions) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(new.user_id)
        .bind(&new.content)
        .bind(&new.image)
        .bind(new.is_anonymous)
        .bind(new.post_type.map(|t| t.as_str()))
        .bind(&new.related_conditions)
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    async fn post_by_id(&self, id: i32) -> Result<Option<Post>> {
        let row: Option<PostRow> = sqlx::query_as("SELECT * FROM posts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn all_posts(&self) -> Result<Vec<Post>> {
        let rows: Vec<PostRow> =
            sqlx::query_as("SELECT * FROM posts ORDER BY created_at DESC, id DESC")
                .fetch_all(&self.pool)
                .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn posts_by_user_id(&self, user_id: i32) -> Result<Vec<Post>> {
        let rows: Vec<PostRow> = sqlx::query_as(
            "SELECT * FROM posts WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn toggle_post_like(&self, post_id: i32, user_id: i32) -> Result<LikeOutcome> {
        let mut tx = self.pool.begin().await?;

        // Lock the post row so concurrent toggles serialize per post
        let post: Option<PostRow> =
            sqlx::query_as("SELECT * FROM posts WHERE id = $1 FOR UPDATE")
                .bind(post_id)
                .fetch_optional(&mut *tx)
                .await?;
        if post.is_none() {
            return Err(ApiError::NotFound("Post not found".to_string()));
        }

        let deleted = sqlx::query("DELETE FROM post_likes WHERE post_id = $1 AND user_id = $2")
            .bind(post_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let outcome = if deleted.rows_affected() > 0 {
            let row: PostRow = sqlx::query_as(
                "UPDATE posts SET likes = GREATEST(likes - 1, 0) WHERE id = $1 RETURNING *",
            )
            .bind(post_id)
            .fetch_one(&mut *tx)
            .await?;
            LikeOutcome {
                liked: false,
                likes: row.likes,
            }
        } else {
            sqlx::query("INSERT INTO post_likes (post_id, user_id) VALUES ($1, $2)")
                .bind(post_id)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
            let row: PostRow =
                sqlx::query_as("UPDATE posts SET likes = likes + 1 WHERE id = $1 RETURNING *")
                    .bind(post_id)
                    .fetch_one(&mut *tx)
                    .await?;
            LikeOutcome {
                liked: true,
                likes: row.likes,
            }
        };

        tx.commit().await?;
        Ok(outcome)
    }

    // Comments

    async fn create_comment(&self, new: NewComment) -> Result<Comment> {
        let mut tx = self.pool.begin().await?;

        let post: Option<(i32,)> = sqlx::query_as("SELECT id FROM posts WHERE id = $1 FOR UPDATE")
            .bind(new.post_id)
            .fetch_optional(&mut *tx)
            .await?;
        if post.is_none() {
            return Err(ApiError::NotFound("Post not found".to_string()));
        }

        let row: CommentRow = sqlx::query_as(
            "INSERT INTO comments (post_id, user_id, content) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(new.post_id)
        .bind(new.user_id)
        .bind(&new.content)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE posts SET comment_count = comment_count + 1 WHERE id = $1")
            .bind(new.post_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(row.into())
    }

    async fn comments_by_post_id(&self, post_id: i32) -> Result<Vec<Comment>> {
        let rows: Vec<CommentRow> = sqlx::query_as(
            "SELECT * FROM comments WHERE post_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    // Connections

    async fn create_connection(&self, new: NewConnection) -> Result<Connection> {
        let row: ConnectionRow = sqlx::query_as(
            "INSERT INTO connections (follower_id, following_id) VALUES ($1, $2) RETURNING *",
        )
        .bind(new.follower_id)
        .bind(new.following_id)
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    async fn connection_by_id(&self, id: i32) -> Result<Option<Connection>> {
        let row: Option<ConnectionRow> = sqlx::query_as("SELECT * FROM connections WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn connection_between(
        &self,
        follower_id: i32,
        following_id: i32,
    ) -> Result<Option<Connection>> {
        let row: Option<ConnectionRow> = sqlx::query_as(
            "SELECT * FROM connections WHERE follower_id = $1 AND following_id = $2 \
             ORDER BY id ASC LIMIT 1",
        )
        .bind(follower_id)
        .bind(following_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn connections_by_user_id(&self, user_id: i32) -> Result<Vec<Connection>> {
        let rows: Vec<ConnectionRow> = sqlx::query_as(
            "SELECT * FROM connections WHERE follower_id = $1 OR following_id = $1 \
             ORDER BY id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn set_connection_status(
        &self,
        id: i32,
        status: ConnectionStatus,
    ) -> Result<Connection> {
        let row: Option<ConnectionRow> =
            sqlx::query_as("UPDATE connections SET status = $2 WHERE id = $1 RETURNING *")
                .bind(id)
                .bind(status.as_str())
                .fetch_optional(&self.pool)
                .await?;
        row.ok_or_else(|| ApiError::NotFound("Connection not found".to_string()))?
            .try_into()
    }

    async fn reopen_connection(&self, id: i32) -> Result<Connection> {
        let row: Option<ConnectionRow> = sqlx::query_as(
            "UPDATE connections SET status = 'pending', created_at = now() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.ok_or_else(|| ApiError::NotFound("Connection not found".to_string()))?
            .try_into()
    }

    // Messages

    async fn create_message(&self, new: NewMessage) -> Result<Message> {
        let row: MessageRow = sqlx::query_as(
            "INSERT INTO messages (sender_id, receiver_id, content) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(new.sender_id)
        .bind(new.receiver_id)
        .bind(&new.content)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn message_by_id(&self, id: i32) -> Result<Option<Message>> {
        let row: Option<MessageRow> = sqlx::query_as("SELECT * FROM messages WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn messages_by_user_id(&self, user_id: i32) -> Result<Vec<Message>> {
        let rows: Vec<MessageRow> = sqlx::query_as(
            "SELECT * FROM messages WHERE sender_id = $1 OR receiver_id = $1 \
             ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn mark_message_read(&self, id: i32) -> Result<Message> {
        let row: Option<MessageRow> =
            sqlx::query_as("UPDATE messages SET is_read = TRUE WHERE id = $1 RETURNING *")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row
            .ok_or_else(|| ApiError::NotFound("Message not found".to_string()))?
            .into())
    }

    // Appointments

    async fn create_appointment(&self, new: NewAppointment) -> Result<Appointment> {
        let row: AppointmentRow = sqlx::query_as(
            "INSERT INTO appointments \
             (doctor_id, patient_id, date, reason, notes, is_virtual, location) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(new.doctor_id)
        .bind(new.patient_id)
        .bind(new.date)
        .bind(&new.reason)
        .bind(&new.notes)
        .bind(new.is_virtual)
        .bind(&new.location)
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    async fn appointment_by_id(&self, id: i32) -> Result<Option<Appointment>> {
        let row: Option<AppointmentRow> =
            sqlx::query_as("SELECT * FROM appointments WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn appointments_by_doctor_id(&self, doctor_id: i32) -> Result<Vec<Appointment>> {
        let rows: Vec<AppointmentRow> = sqlx::query_as(
            "SELECT * FROM appointments WHERE doctor_id = $1 ORDER BY date ASC, id ASC",
        )
        .bind(doctor_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn appointments_by_patient_id(&self, patient_id: i32) -> Result<Vec<Appointment>> {
        let rows: Vec<AppointmentRow> = sqlx::query_as(
            "SELECT * FROM appointments WHERE patient_id = $1 ORDER BY date ASC, id ASC",
        )
        .bind(patient_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn set_appointment_status(
        &self,
        id: i32,
        status: AppointmentStatus,
    ) -> Result<Appointment> {
        let row: Option<AppointmentRow> =
            sqlx::query_as("UPDATE appointments SET status = $2 WHERE id = $1 RETURNING *")
                .bind(id)
                .bind(status.as_str())
                .fetch_optional(&self.pool)
                .await?;
        row.ok_or_else(|| ApiError::NotFound("Appointment not found".to_string()))?
            .try_into()
    }

    // Health topics

    async fn health_topics(&self) -> Result<Vec<HealthTopic>> {
        let rows: Vec<HealthTopicRow> = sqlx::query_as(
            "SELECT * FROM health_topics WHERE is_active ORDER BY count DESC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create_health_topic(&self, new: NewHealthTopic) -> Result<HealthTopic> {
        let row: HealthTopicRow = sqlx::query_as(
            "INSERT INTO health_topics (title, count, is_active) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&new.title)
        .bind(new.count)
        .bind(new.is_active)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_row_conversion() {
        let row = UserRow {
            id: 1,
            username: "dr.sarah".to_string(),
            password: "hash".to_string(),
            name: "Dr. Sarah Johnson".to_string(),
            email: "sarah@mediconnect.com".to_string(),
            bio: None,
            profile_image: None,
            cover_image: None,
            role: "doctor".to_string(),
            created_at: Utc::now(),
        };
        let user: User = row.try_into().unwrap();
        assert_eq!(user.role, Role::Doctor);
    }

    #[test]
    fn test_bad_role_column_is_database_error() {
        let row = UserRow {
            id: 1,
            username: "x".to_string(),
            password: "hash".to_string(),
            name: "x".to_string(),
            email: "x@example.com".to_string(),
            bio: None,
            profile_image: None,
            cover_image: None,
            role: "wizard".to_string(),
            created_at: Utc::now(),
        };
        let err = User::try_from(row).unwrap_err();
        assert!(matches!(err, ApiError::Database(_)));
    }

    #[test]
    fn test_nullable_post_type_conversion() {
        let row = PostRow {
            id: 1,
            user_id: 1,
            content: "hello".to_string(),
            image: None,
            is_anonymous: false,
            post_type: None,
            related_conditions: None,
            likes: 0,
            comment_count: 0,
            created_at: Utc::now(),
        };
        let post: Post = row.try_into().unwrap();
        assert!(post.post_type.is_none());
    }
}
