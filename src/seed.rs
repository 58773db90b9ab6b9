//! Demo dataset loader
//!
//! Populates either backend through the [`EntityStore`] trait with the demo
//! community: three doctors, three patients, a handful of feed activity,
//! and the trending topic list. Connections, comments, and messages go
//! through the domain services so the seeded rows obey the same lifecycle
//! rules as live traffic.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::info;

use crate::auth::hash_password;
use crate::model::{
    NewAppointment, NewDoctorProfile, NewHealthTopic, NewPatientProfile, NewPost, NewUser,
    PostType, Role, User,
};
use crate::services::{ConnectionService, EngagementService, MessageService};
use crate::store::EntityStore;
use crate::types::Result;

/// Password for every demo account
const DEMO_PASSWORD: &str = "password123";

/// Load the demo dataset unless it is already present
///
/// Idempotency is keyed on the first demo username, so a restart against a
/// persistent backend will not double-seed.
pub async fn seed_demo_data(store: &Arc<dyn EntityStore>) -> Result<()> {
    if store.user_by_username("dr.sarah").await?.is_some() {
        info!("Demo data already present, skipping seed");
        return Ok(());
    }

    seed_health_topics(store).await?;
    let (doctors, patients) = seed_users(store).await?;
    seed_content(store, &doctors, &patients).await?;

    info!(
        "Seeded demo dataset ({} doctors, {} patients)",
        doctors.len(),
        patients.len()
    );
    Ok(())
}

async fn seed_health_topics(store: &Arc<dyn EntityStore>) -> Result<()> {
    let topics = [
        ("COVID-19 Booster Shots", 3200),
        ("Mental Health Awareness", 2800),
        ("Diabetes Management", 1900),
        ("Heart Disease Prevention", 1700),
        ("Women's Health Issues", 1500),
    ];

    for (title, count) in topics {
        store
            .create_health_topic(NewHealthTopic::with_count(title, count))
            .await?;
    }
    Ok(())
}

async fn seed_users(store: &Arc<dyn EntityStore>) -> Result<(Vec<User>, Vec<User>)> {
    let password = hash_password(DEMO_PASSWORD)?;

    let new_user = |username: &str, name: &str, email: &str, role: Role, bio: &str| NewUser {
        username: username.to_string(),
        password: password.clone(),
        name: name.to_string(),
        email: email.to_string(),
        bio: Some(bio.to_string()),
        profile_image: None,
        cover_image: None,
        role,
    };

    let sarah = store
        .create_user(new_user(
            "dr.sarah",
            "Dr. Sarah Johnson",
            "sarah@mediconnect.com",
            Role::Doctor,
            "Cardiologist with 15 years of experience specializing in heart disease prevention and treatment.",
        ))
        .await?;
    let michael = store
        .create_user(new_user(
            "dr.michael",
            "Dr. Michael Chen",
            "michael@mediconnect.com",
            Role::Doctor,
            "Pediatrician focused on early childhood development and preventative care.",
        ))
        .await?;
    let emma = store
        .create_user(new_user(
            "dr.emma",
            "Dr. Emma Rodriguez",
            "emma@mediconnect.com",
            Role::Doctor,
            "Neurologist specializing in stroke recovery and neurodegenerative disorders.",
        ))
        .await?;

    store
        .create_doctor_profile(NewDoctorProfile {
            user_id: sarah.id,
            specialty: "Cardiology".to_string(),
            hospital: Some("Memorial Hospital".to_string()),
            qualifications: Some("MD, PhD, FACC".to_string()),
            experience: Some(15),
            verified: true,
            rating: Some(4.8),
            review_count: 124,
        })
        .await?;
    store
        .create_doctor_profile(NewDoctorProfile {
            user_id: michael.id,
            specialty: "Pediatrics".to_string(),
            hospital: Some("Children's Medical Center".to_string()),
            qualifications: Some("MD, FAAP".to_string()),
            experience: Some(8),
            verified: true,
            rating: Some(4.9),
            review_count: 87,
        })
        .await?;
    store
        .create_doctor_profile(NewDoctorProfile {
            user_id: emma.id,
            specialty: "Neurology".to_string(),
            hospital: Some("University Medical Center".to_string()),
            qualifications: Some("MD, PhD".to_string()),
            experience: Some(12),
            verified: true,
            rating: Some(4.7),
            review_count: 92,
        })
        .await?;

    let john = store
        .create_user(new_user(
            "john_doe",
            "John Doe",
            "john@example.com",
            Role::Patient,
            "Looking for advice on managing chronic back pain and hypertension.",
        ))
        .await?;
    let alice = store
        .create_user(new_user(
            "alice_smith",
            "Alice Smith",
            "alice@example.com",
            Role::Patient,
            "Mother of two children with asthma, seeking to connect with pediatric specialists.",
        ))
        .await?;
    let robert = store
        .create_user(new_user(
            "robert_taylor",
            "Robert Taylor",
            "robert@example.com",
            Role::Patient,
            "Recently diagnosed with Type 2 diabetes, looking for lifestyle management tips.",
        ))
        .await?;

    store
        .create_patient_profile(NewPatientProfile {
            user_id: john.id,
            conditions: Some(vec![
                "Hypertension".to_string(),
                "Chronic Back Pain".to_string(),
            ]),
        })
        .await?;
    store
        .create_patient_profile(NewPatientProfile {
            user_id: alice.id,
            conditions: Some(vec!["Family History: Asthma".to_string()]),
        })
        .await?;
    store
        .create_patient_profile(NewPatientProfile {
            user_id: robert.id,
            conditions: Some(vec![
                "Type 2 Diabetes".to_string(),
                "High Cholesterol".to_string(),
            ]),
        })
        .await?;

    Ok((vec![sarah, michael, emma], vec![john, alice, robert]))
}

async fn seed_content(
    store: &Arc<dyn EntityStore>,
    doctors: &[User],
    patients: &[User],
) -> Result<()> {
    let (sarah, michael, emma) = (&doctors[0], &doctors[1], &doctors[2]);
    let (john, alice, robert) = (&patients[0], &patients[1], &patients[2]);

    let engagement = EngagementService::new(Arc::clone(store));
    let connections = ConnectionService::new(Arc::clone(store));
    let messages = MessageService::new(Arc::clone(store));

    let new_post = |user_id: i32, content: &str, post_type: PostType| NewPost {
        user_id,
        content: content.to_string(),
        image: None,
        is_anonymous: false,
        post_type: Some(post_type),
        related_conditions: None,
    };

    engagement
        .create_post(new_post(
            michael.id,
            "Parents: Remember that flu season is approaching! Make sure to schedule vaccinations for your children early to ensure they're protected before winter arrives.",
            PostType::Resource,
        ))
        .await?;
    engagement
        .create_post(new_post(
            sarah.id,
            "Just published a new research paper on preventative cardiology approaches in the International Journal of Cardiology. Happy to answer any questions!",
            PostType::Update,
        ))
        .await?;
    let yoga_question = engagement
        .create_post(new_post(
            john.id,
            "Has anyone tried yoga for chronic back pain? My doctor recommended it, and I'm curious about others' experiences.",
            PostType::Question,
        ))
        .await?;
    engagement
        .create_post(new_post(
            emma.id,
            "Exciting news! Our neurology department is starting a new stroke recovery support group that meets virtually every Thursday. Open to all patients and their families.",
            PostType::Update,
        ))
        .await?;

    engagement
        .add_comment(
            yoga_question.id,
            sarah.id,
            "While I'm not specialized in orthopedics, many of my cardiac patients have reported benefits from gentle yoga for various pain issues. Just make sure to start with a qualified instructor who understands your condition.".to_string(),
        )
        .await?;
    engagement
        .add_comment(
            yoga_question.id,
            alice.id,
            "I've been doing yoga for about 6 months now, and it's really helped with my lower back pain. I started with chair yoga and worked my way up. Definitely worth trying!".to_string(),
        )
        .await?;

    // Connections run through the lifecycle so status history is coherent
    let first = connections.request(john.id, sarah.id).await?;
    connections.respond(sarah.id, first.id, "accepted").await?;
    let second = connections.request(alice.id, michael.id).await?;
    connections.respond(michael.id, second.id, "accepted").await?;
    connections.request(robert.id, sarah.id).await?;

    let opening = messages
        .send(
            john.id,
            sarah.id,
            "Hello Dr. Johnson, I have a follow-up question about the medication you recommended last month.".to_string(),
        )
        .await?;
    messages.mark_read(sarah.id, opening.id).await?;
    let reply = messages
        .send(
            sarah.id,
            john.id,
            "Hi John, of course. What questions do you have about the medication?".to_string(),
        )
        .await?;
    messages.mark_read(john.id, reply.id).await?;
    messages
        .send(
            john.id,
            sarah.id,
            "I've noticed some mild dizziness in the mornings. Is this a common side effect?"
                .to_string(),
        )
        .await?;

    store
        .create_appointment(NewAppointment {
            doctor_id: sarah.id,
            patient_id: john.id,
            date: Utc::now() + Duration::days(7),
            reason: Some("Quarterly blood pressure check-up".to_string()),
            notes: Some("Bring medication list".to_string()),
            is_virtual: false,
            location: Some("Memorial Hospital, Room 302".to_string()),
        })
        .await?;
    store
        .create_appointment(NewAppointment {
            doctor_id: michael.id,
            patient_id: alice.id,
            date: Utc::now() + Duration::days(1),
            reason: Some("Annual check-up for children".to_string()),
            notes: Some("Both children will be present".to_string()),
            is_virtual: true,
            location: None,
        })
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ConnectionStatus;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn seed_builds_demo_community() {
        let store: Arc<dyn EntityStore> = Arc::new(MemoryStore::new());
        seed_demo_data(&store).await.unwrap();

        let doctors = store.doctors().await.unwrap();
        assert_eq!(doctors.len(), 3);
        assert!(doctors.iter().all(|d| d.profile.verified));

        let topics = store.health_topics().await.unwrap();
        assert_eq!(topics.len(), 5);
        assert_eq!(topics[0].title, "COVID-19 Booster Shots");

        let feed = store.all_posts().await.unwrap();
        assert_eq!(feed.len(), 4);

        // The yoga question carries both seeded comments
        let yoga = feed
            .iter()
            .find(|p| p.content.starts_with("Has anyone tried yoga"))
            .unwrap();
        assert_eq!(yoga.comment_count, 2);
        assert_eq!(
            store.comments_by_post_id(yoga.id).await.unwrap().len(),
            2
        );

        // John: one accepted connection, one read + one sent message thread
        let john = store.user_by_username("john_doe").await.unwrap().unwrap();
        let johns_connections = store.connections_by_user_id(john.id).await.unwrap();
        assert_eq!(johns_connections.len(), 1);
        assert_eq!(johns_connections[0].status, ConnectionStatus::Accepted);
        assert_eq!(store.messages_by_user_id(john.id).await.unwrap().len(), 3);

        // Sarah sees the pending request from Robert as well
        let sarah = store.user_by_username("dr.sarah").await.unwrap().unwrap();
        let sarahs_connections = store.connections_by_user_id(sarah.id).await.unwrap();
        assert_eq!(sarahs_connections.len(), 2);

        let appointments = store.appointments_by_doctor_id(sarah.id).await.unwrap();
        assert_eq!(appointments.len(), 1);
    }

    #[tokio::test]
    async fn seed_is_idempotent() {
        let store: Arc<dyn EntityStore> = Arc::new(MemoryStore::new());
        seed_demo_data(&store).await.unwrap();
        seed_demo_data(&store).await.unwrap();

        assert_eq!(store.doctors().await.unwrap().len(), 3);
        assert_eq!(store.health_topics().await.unwrap().len(), 5);
        assert_eq!(store.all_posts().await.unwrap().len(), 4);
    }
}
