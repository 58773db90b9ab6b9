//! End-to-end platform flow tests
//!
//! Drives the domain services over the in-memory backend the same way the
//! HTTP layer does, covering:
//! - Account registration, credential verification, and session lifecycle
//! - A doctor/patient journey across the feed, connections, messaging,
//!   and appointments
//! - Terminal appointment states staying terminal

use std::sync::Arc;

use chrono::{Duration, Utc};

use mediconnect::auth::{hash_password, verify_password, SessionStore};
use mediconnect::model::{
    AppointmentStatus, ConnectionStatus, NewAppointment, NewPost, NewUser, PostType, Role, User,
};
use mediconnect::services::{
    AppointmentService, ConnectionService, EngagementService, MessageService,
};
use mediconnect::store::{EntityStore, MemoryStore};
use mediconnect::types::ApiError;

// ============================================================
// Helpers
// ============================================================

/// Register an account the way the signup endpoint does: reject taken
/// usernames, hash the password, store the user.
async fn register(
    store: &Arc<dyn EntityStore>,
    username: &str,
    name: &str,
    email: &str,
    role: Role,
) -> User {
    assert!(
        store.user_by_username(username).await.unwrap().is_none(),
        "username {} should be free",
        username
    );

    let password = hash_password("correct horse battery").expect("Should hash password");
    store
        .create_user(NewUser {
            username: username.to_string(),
            password,
            name: name.to_string(),
            email: email.to_string(),
            bio: None,
            profile_image: None,
            cover_image: None,
            role,
        })
        .await
        .expect("Should create user")
}

fn text_post(user_id: i32, content: &str, post_type: PostType) -> NewPost {
    NewPost {
        user_id,
        content: content.to_string(),
        image: None,
        is_anonymous: false,
        post_type: Some(post_type),
        related_conditions: None,
    }
}

// ============================================================
// Registration and sessions
// ============================================================

#[tokio::test]
async fn registration_and_session_lifecycle() {
    let store: Arc<dyn EntityStore> = Arc::new(MemoryStore::new());
    let sessions = SessionStore::new(3600);

    let doctor = register(
        &store,
        "dr.adams",
        "Dr. Adams",
        "adams@clinic.example",
        Role::Doctor,
    )
    .await;

    // Stored credential is a hash that still verifies the original password
    let stored = store
        .user_by_username("dr.adams")
        .await
        .unwrap()
        .expect("Registered user should be findable");
    assert_ne!(stored.password, "correct horse battery");
    assert!(verify_password("correct horse battery", &stored.password).unwrap());
    assert!(!verify_password("wrong password", &stored.password).unwrap());

    // A second signup under the same username is refused at the lookup step
    assert!(store.user_by_username("dr.adams").await.unwrap().is_some());

    // Login mints a session that resolves back to the user until logout
    let session = sessions.create(doctor.id);
    let validated = sessions
        .validate(&session.session_id)
        .expect("Fresh session should validate");
    assert_eq!(validated.user_id, doctor.id);

    sessions.remove(&session.session_id);
    assert!(
        sessions.validate(&session.session_id).is_none(),
        "Logged-out session should stop validating"
    );
}

// ============================================================
// Doctor/patient journey
// ============================================================

#[tokio::test]
async fn doctor_and_patient_full_journey() {
    let store: Arc<dyn EntityStore> = Arc::new(MemoryStore::new());
    let engagement = EngagementService::new(Arc::clone(&store));
    let connections = ConnectionService::new(Arc::clone(&store));
    let messages = MessageService::new(Arc::clone(&store));
    let appointments = AppointmentService::new(Arc::clone(&store));

    let doctor = register(
        &store,
        "dr.lee",
        "Dr. Lee",
        "lee@clinic.example",
        Role::Doctor,
    )
    .await;
    let patient = register(&store, "sam", "Sam Poole", "sam@example.com", Role::Patient).await;

    // ---- Feed: the doctor posts, the patient engages ----
    let post = engagement
        .create_post(text_post(
            doctor.id,
            "Flu shots are available at the clinic all week.",
            PostType::Update,
        ))
        .await
        .expect("Should create post");
    assert_eq!(post.likes, 0);
    assert_eq!(post.comment_count, 0);

    let comment = engagement
        .add_comment(post.id, patient.id, "Do I need to book ahead?".to_string())
        .await
        .expect("Should add comment");
    assert_eq!(comment.post_id, post.id);

    let outcome = engagement
        .toggle_like(post.id, patient.id)
        .await
        .expect("Should toggle like");
    assert!(outcome.liked);
    assert_eq!(outcome.likes, 1);

    let refreshed = engagement.post(post.id).await.unwrap();
    assert_eq!(refreshed.comment_count, 1);
    assert_eq!(refreshed.likes, 1);

    // ---- Connection: patient requests, doctor accepts ----
    let request = connections
        .request(patient.id, doctor.id)
        .await
        .expect("Should open connection request");
    assert_eq!(request.status, ConnectionStatus::Pending);

    let accepted = connections
        .respond(doctor.id, request.id, "accepted")
        .await
        .expect("Recipient should be able to accept");
    assert_eq!(accepted.status, ConnectionStatus::Accepted);

    // ---- Messaging: patient writes, doctor reads ----
    let note = messages
        .send(
            patient.id,
            doctor.id,
            "Looking forward to the appointment.".to_string(),
        )
        .await
        .expect("Should send message");
    assert!(!note.is_read);

    let read = messages
        .mark_read(doctor.id, note.id)
        .await
        .expect("Receiver should mark the message read");
    assert!(read.is_read);

    // ---- Appointment: patient books, doctor completes ----
    let appointment = appointments
        .book(
            &patient,
            NewAppointment {
                doctor_id: doctor.id,
                patient_id: patient.id,
                date: Utc::now() + Duration::days(2),
                reason: Some("Flu shot".to_string()),
                notes: None,
                is_virtual: false,
                location: Some("Clinic room 4".to_string()),
            },
        )
        .await
        .expect("Patient should book own appointment");
    assert_eq!(appointment.status, AppointmentStatus::Scheduled);

    let done = appointments
        .update_status(&doctor, appointment.id, "completed")
        .await
        .expect("Doctor should complete the appointment");
    assert_eq!(done.status, AppointmentStatus::Completed);

    // Completed is terminal, so a later cancellation is refused
    let err = appointments
        .update_status(&patient, appointment.id, "cancelled")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)));
    let unchanged = store
        .appointment_by_id(appointment.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.status, AppointmentStatus::Completed);

    // Both sides see the same appointment list entry
    let doctor_view = appointments.list_for(&doctor).await.unwrap();
    let patient_view = appointments.list_for(&patient).await.unwrap();
    assert_eq!(doctor_view.len(), 1);
    assert_eq!(patient_view.len(), 1);
    assert_eq!(doctor_view[0].id, patient_view[0].id);
}
