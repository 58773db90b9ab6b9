//! Direct messages between connected users

use std::sync::Arc;

use crate::model::{Message, NewMessage};
use crate::store::EntityStore;
use crate::types::{ApiError, Result};

#[derive(Clone)]
pub struct MessageService {
    store: Arc<dyn EntityStore>,
}

impl MessageService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Send a message. The receiver must exist and the content must be
    /// non-empty after trimming.
    pub async fn send(&self, sender_id: i32, receiver_id: i32, content: String) -> Result<Message> {
        if content.trim().is_empty() {
            return Err(ApiError::BadRequest(
                "Message content cannot be empty".to_string(),
            ));
        }
        if self.store.user_by_id(receiver_id).await?.is_none() {
            return Err(ApiError::NotFound("Receiver not found".to_string()));
        }

        self.store
            .create_message(NewMessage {
                sender_id,
                receiver_id,
                content,
            })
            .await
    }

    /// All messages the user sent or received, newest first.
    pub async fn list_for(&self, user_id: i32) -> Result<Vec<Message>> {
        self.store.messages_by_user_id(user_id).await
    }

    /// Flag a message as read. Read receipts belong to the receiving side
    /// only.
    pub async fn mark_read(&self, caller_id: i32, message_id: i32) -> Result<Message> {
        let message = self
            .store
            .message_by_id(message_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Message not found".to_string()))?;

        if message.receiver_id != caller_id {
            return Err(ApiError::Forbidden(
                "Only the receiver can mark a message read".to_string(),
            ));
        }

        self.store.mark_message_read(message_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewUser, Role};
    use crate::store::MemoryStore;

    async fn service_with_users() -> (MessageService, i32, i32) {
        let store = Arc::new(MemoryStore::new());
        let doctor = store
            .create_user(NewUser {
                username: "drjones".to_string(),
                password: "hash".to_string(),
                name: "Dr. Jones".to_string(),
                email: "jones@example.com".to_string(),
                bio: None,
                profile_image: None,
                cover_image: None,
                role: Role::Doctor,
            })
            .await
            .unwrap();
        let patient = store
            .create_user(NewUser {
                username: "pat".to_string(),
                password: "hash".to_string(),
                name: "Pat Smith".to_string(),
                email: "pat@example.com".to_string(),
                bio: None,
                profile_image: None,
                cover_image: None,
                role: Role::Patient,
            })
            .await
            .unwrap();
        (MessageService::new(store), doctor.id, patient.id)
    }

    #[tokio::test]
    async fn send_and_list_both_sides() {
        let (svc, doctor, patient) = service_with_users().await;

        svc.send(patient, doctor, "Hello doctor".to_string())
            .await
            .unwrap();
        svc.send(doctor, patient, "Hello back".to_string())
            .await
            .unwrap();

        let for_patient = svc.list_for(patient).await.unwrap();
        let for_doctor = svc.list_for(doctor).await.unwrap();
        assert_eq!(for_patient.len(), 2);
        assert_eq!(for_doctor.len(), 2);

        // Newest first
        assert_eq!(for_patient[0].content, "Hello back");
    }

    #[tokio::test]
    async fn send_requires_known_receiver_and_content() {
        let (svc, _, patient) = service_with_users().await;

        let err = svc
            .send(patient, 999, "Anyone there?".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err = svc.send(patient, patient, "   ".to_string()).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn only_receiver_marks_read() {
        let (svc, doctor, patient) = service_with_users().await;

        let message = svc
            .send(patient, doctor, "Hello doctor".to_string())
            .await
            .unwrap();
        assert!(!message.is_read);

        let err = svc.mark_read(patient, message.id).await.unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));

        let read = svc.mark_read(doctor, message.id).await.unwrap();
        assert!(read.is_read);
    }

    #[tokio::test]
    async fn mark_read_unknown_message_is_not_found() {
        let (svc, doctor, _) = service_with_users().await;

        let err = svc.mark_read(doctor, 404).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
