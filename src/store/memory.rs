//! In-memory entity store
//!
//! DashMap tables keyed by serial id, with atomic counters handing out
//! ids from 1. State lives in process memory only and is gone on restart.
//! Read-modify-write updates (like toggles, comment counters) hold the
//! post's map entry for the duration of the update so concurrent calls
//! cannot lose increments.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::atomic::{AtomicI32, Ordering};

use crate::model::{
    Appointment, AppointmentStatus, Comment, Connection, ConnectionStatus, DoctorProfile,
    DoctorWithProfile, HealthTopic, LikeOutcome, Message, NewAppointment, NewComment,
    NewConnection, NewDoctorProfile, NewHealthTopic, NewMessage, NewPatientProfile, NewPost,
    NewUser, PatientProfile, PatientWithProfile, Post, Profile, Role, User,
};
use crate::store::EntityStore;
use crate::types::{ApiError, Result};

/// In-memory backend with concurrent access
pub struct MemoryStore {
    users: DashMap<i32, User>,
    doctor_profiles: DashMap<i32, DoctorProfile>,
    patient_profiles: DashMap<i32, PatientProfile>,
    posts: DashMap<i32, Post>,
    comments: DashMap<i32, Comment>,
    connections: DashMap<i32, Connection>,
    messages: DashMap<i32, Message>,
    appointments: DashMap<i32, Appointment>,
    health_topics: DashMap<i32, HealthTopic>,
    /// post id -> ids of users currently liking it
    post_likes: DashMap<i32, HashSet<i32>>,

    next_user_id: AtomicI32,
    next_doctor_profile_id: AtomicI32,
    next_patient_profile_id: AtomicI32,
    next_post_id: AtomicI32,
    next_comment_id: AtomicI32,
    next_connection_id: AtomicI32,
    next_message_id: AtomicI32,
    next_appointment_id: AtomicI32,
    next_health_topic_id: AtomicI32,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            doctor_profiles: DashMap::new(),
            patient_profiles: DashMap::new(),
            posts: DashMap::new(),
            comments: DashMap::new(),
            connections: DashMap::new(),
            messages: DashMap::new(),
            appointments: DashMap::new(),
            health_topics: DashMap::new(),
            post_likes: DashMap::new(),
            next_user_id: AtomicI32::new(1),
            next_doctor_profile_id: AtomicI32::new(1),
            next_patient_profile_id: AtomicI32::new(1),
            next_post_id: AtomicI32::new(1),
            next_comment_id: AtomicI32::new(1),
            next_connection_id: AtomicI32::new(1),
            next_message_id: AtomicI32::new(1),
            next_appointment_id: AtomicI32::new(1),
            next_health_topic_id: AtomicI32::new(1),
        }
    }

    fn next_id(counter: &AtomicI32) -> i32 {
        counter.fetch_add(1, Ordering::SeqCst)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    // Users

    async fn create_user(&self, new: NewUser) -> Result<User> {
        let id = Self::next_id(&self.next_user_id);
        let user = User {
            id,
            username: new.username,
            password: new.password,
            name: new.name,
            email: new.email,
            bio: new.bio,
            profile_image: new.profile_image,
            cover_image: new.cover_image,
            role: new.role,
            created_at: Utc::now(),
        };
        self.users.insert(id, user.clone());
        Ok(user)
    }

    async fn user_by_id(&self, id: i32) -> Result<Option<User>> {
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .iter()
            .find(|u| u.username == username)
            .map(|u| u.clone()))
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .iter()
            .find(|u| u.email == email)
            .map(|u| u.clone()))
    }

    // Profiles

    async fn create_doctor_profile(&self, new: NewDoctorProfile) -> Result<DoctorProfile> {
        let id = Self::next_id(&self.next_doctor_profile_id);
        let profile = DoctorProfile {
            id,
            user_id: new.user_id,
            specialty: new.specialty,
            hospital: new.hospital,
            qualifications: new.qualifications,
            experience: new.experience,
            verified: new.verified,
            rating: new.rating,
            review_count: new.review_count,
        };
        self.doctor_profiles.insert(id, profile.clone());
        Ok(profile)
    }

    async fn create_patient_profile(&self, new: NewPatientProfile) -> Result<PatientProfile> {
        let id = Self::next_id(&self.next_patient_profile_id);
        let profile = PatientProfile {
            id,
            user_id: new.user_id,
            conditions: new.conditions,
        };
        self.patient_profiles.insert(id, profile.clone());
        Ok(profile)
    }

    async fn doctor_profile_by_user_id(&self, user_id: i32) -> Result<Option<DoctorProfile>> {
        Ok(self
            .doctor_profiles
            .iter()
            .find(|p| p.user_id == user_id)
            .map(|p| p.clone()))
    }

    async fn patient_profile_by_user_id(&self, user_id: i32) -> Result<Option<PatientProfile>> {
        Ok(self
            .patient_profiles
            .iter()
            .find(|p| p.user_id == user_id)
            .map(|p| p.clone()))
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
        let mut doctors = Vec::new();
        let users: Vec<User> = self
            .users
            .iter()
            .filter(|u| u.role == Role::Doctor)
            .map(|u| u.clone())
            .collect();

        for user in users {
            if let Some(profile) = self.doctor_profile_by_user_id(user.id).await? {
                doctors.push(DoctorWithProfile { user, profile });
            }
        }

        doctors.sort_by_key(|d| d.user.id);
        Ok(doctors)
    }

    async fn doctor_by_user_id(&self, user_id: i32) -> Result<Option<DoctorWithProfile>> {
        let Some(user) = self.user_by_id(user_id).await? else {
            return Ok(None);
        };
        if user.role != Role::Doctor {
            return Ok(None);
        }
        Ok(self
            .doctor_profile_by_user_id(user_id)
            .await?
            .map(|profile| DoctorWithProfile { user, profile }))
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
        let id = Self::next_id(&self.next_post_id);
        let post = Post {
            id,
            user_id: new.user_id,
            content: new.content,
            image: new.image,
            is_anonymous: new.is_anonymous,
            post_type: new.post_type,
            related_conditions: new.related_conditions,
            likes: 0,
            comment_count: 0,
            created_at: Utc::now(),
        };
        self.posts.insert(id, post.clone());
        self.post_likes.insert(id, HashSet::new());
        Ok(post)
    }

    async fn post_by_id(&self, id: i32) -> Result<Option<Post>> {
        Ok(self.posts.get(&id).map(|p| p.clone()))
    }

    async fn all_posts(&self) -> Result<Vec<Post>> {
        let mut posts: Vec<Post> = self.posts.iter().map(|p| p.clone()).collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(posts)
    }

    async fn posts_by_user_id(&self, user_id: i32) -> Result<Vec<Post>> {
        let mut posts: Vec<Post> = self
            .posts
            .iter()
            .filter(|p| p.user_id == user_id)
            .map(|p| p.clone())
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(posts)
    }

    async fn toggle_post_like(&self, post_id: i32, user_id: i32) -> Result<LikeOutcome> {
        // Post entry lock held across the set update and counter change
        let mut post = self
            .posts
            .get_mut(&post_id)
            .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;
        let mut like_set = self.post_likes.entry(post_id).or_default();

        if like_set.contains(&user_id) {
            like_set.remove(&user_id);
            post.likes = (post.likes - 1).max(0);
            Ok(LikeOutcome {
                liked: false,
                likes: post.likes,
            })
        } else {
            like_set.insert(user_id);
            post.likes += 1;
            Ok(LikeOutcome {
                liked: true,
                likes: post.likes,
            })
        }
    }

    // Comments

    async fn create_comment(&self, new: NewComment) -> Result<Comment> {
        // Holding the post entry makes insert + counter bump one step
        let mut post = self
            .posts
            .get_mut(&new.post_id)
            .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

        let id = Self::next_id(&self.next_comment_id);
        let comment = Comment {
            id,
            post_id: new.post_id,
            user_id: new.user_id,
            content: new.content,
            likes: 0,
            created_at: Utc::now(),
        };
        self.comments.insert(id, comment.clone());
        post.comment_count += 1;
        Ok(comment)
    }

    async fn comments_by_post_id(&self, post_id: i32) -> Result<Vec<Comment>> {
        let mut comments: Vec<Comment> = self
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .map(|c| c.clone())
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(comments)
    }

    // Connections

    async fn create_connection(&self, new: NewConnection) -> Result<Connection> {
        let id = Self::next_id(&self.next_connection_id);
        let connection = Connection {
            id,
            follower_id: new.follower_id,
            following_id: new.following_id,
            status: ConnectionStatus::Pending,
            created_at: Utc::now(),
        };
        self.connections.insert(id, connection.clone());
        Ok(connection)
    }

    async fn connection_by_id(&self, id: i32) -> Result<Option<Connection>> {
        Ok(self.connections.get(&id).map(|c| c.clone()))
    }

    async fn connection_between(
        &self,
        follower_id: i32,
        following_id: i32,
    ) -> Result<Option<Connection>> {
        Ok(self
            .connections
            .iter()
            .filter(|c| c.follower_id == follower_id && c.following_id == following_id)
            .min_by_key(|c| c.id)
            .map(|c| c.clone()))
    }

    async fn connections_by_user_id(&self, user_id: i32) -> Result<Vec<Connection>> {
        let mut connections: Vec<Connection> = self
            .connections
            .iter()
            .filter(|c| c.follower_id == user_id || c.following_id == user_id)
            .map(|c| c.clone())
            .collect();
        connections.sort_by_key(|c| c.id);
        Ok(connections)
    }

    async fn set_connection_status(
        &self,
        id: i32,
        status: ConnectionStatus,
    ) -> Result<Connection> {
        let mut connection = self
            .connections
            .get_mut(&id)
            .ok_or_else(|| ApiError::NotFound("Connection not found".to_string()))?;
        connection.status = status;
        Ok(connection.clone())
    }

    async fn reopen_connection(&self, id: i32) -> Result<Connection> {
        let mut connection = self
            .connections
            .get_mut(&id)
            .ok_or_else(|| ApiError::NotFound("Connection not found".to_string()))?;
        connection.status = ConnectionStatus::Pending;
        connection.created_at = Utc::now();
        Ok(connection.clone())
    }

    // Messages

    async fn create_message(&self, new: NewMessage) -> Result<Message> {
        let id = Self::next_id(&self.next_message_id);
        let message = Message {
            id,
            sender_id: new.sender_id,
            receiver_id: new.receiver_id,
            content: new.content,
            is_read: false,
            created_at: Utc::now(),
        };
        self.messages.insert(id, message.clone());
        Ok(message)
    }

    async fn message_by_id(&self, id: i32) -> Result<Option<Message>> {
        Ok(self.messages.get(&id).map(|m| m.clone()))
    }

    async fn messages_by_user_id(&self, user_id: i32) -> Result<Vec<Message>> {
        let mut messages: Vec<Message> = self
            .messages
            .iter()
            .filter(|m| m.sender_id == user_id || m.receiver_id == user_id)
            .map(|m| m.clone())
            .collect();
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(messages)
    }

    async fn mark_message_read(&self, id: i32) -> Result<Message> {
        let mut message = self
            .messages
            .get_mut(&id)
            .ok_or_else(|| ApiError::NotFound("Message not found".to_string()))?;
        message.is_read = true;
        Ok(message.clone())
    }

    // Appointments

    async fn create_appointment(&self, new: NewAppointment) -> Result<Appointment> {
        let id = Self::next_id(&self.next_appointment_id);
        let appointment = Appointment {
            id,
            doctor_id: new.doctor_id,
            patient_id: new.patient_id,
            date: new.date,
            status: AppointmentStatus::Scheduled,
            reason: new.reason,
            notes: new.notes,
            is_virtual: new.is_virtual,
            location: new.location,
            created_at: Utc::now(),
        };
        self.appointments.insert(id, appointment.clone());
        Ok(appointment)
    }

    async fn appointment_by_id(&self, id: i32) -> Result<Option<Appointment>> {
        Ok(self.appointments.get(&id).map(|a| a.clone()))
    }

    async fn appointments_by_doctor_id(&self, doctor_id: i32) -> Result<Vec<Appointment>> {
        let mut appointments: Vec<Appointment> = self
            .appointments
            .iter()
            .filter(|a| a.doctor_id == doctor_id)
            .map(|a| a.clone())
            .collect();
        appointments.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        Ok(appointments)
    }

    async fn appointments_by_patient_id(&self, patient_id: i32) -> Result<Vec<Appointment>> {
        let mut appointments: Vec<Appointment> = self
            .appointments
            .iter()
            .filter(|a| a.patient_id == patient_id)
            .map(|a| a.clone())
            .collect();
        appointments.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        Ok(appointments)
    }

    async fn set_appointment_status(
        &self,
        id: i32,
        status: AppointmentStatus,
    ) -> Result<Appointment> {
        let mut appointment = self
            .appointments
            .get_mut(&id)
            .ok_or_else(|| ApiError::NotFound("Appointment not found".to_string()))?;
        appointment.status = status;
        Ok(appointment.clone())
    }

    // Health topics

    async fn health_topics(&self) -> Result<Vec<HealthTopic>> {
        let mut topics: Vec<HealthTopic> = self
            .health_topics
            .iter()
            .filter(|t| t.is_active)
            .map(|t| t.clone())
            .collect();
        topics.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.id.cmp(&b.id)));
        Ok(topics)
    }

    async fn create_health_topic(&self, new: NewHealthTopic) -> Result<HealthTopic> {
        let id = Self::next_id(&self.next_health_topic_id);
        let topic = HealthTopic {
            id,
            title: new.title,
            count: new.count,
            is_active: new.is_active,
        };
        self.health_topics.insert(id, topic.clone());
        Ok(topic)
    }
}
