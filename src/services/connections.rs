//! Connection lifecycle between doctors and patients
//!
//! A connection is a directed edge from the requesting user (follower) to
//! the receiving user (following). It starts `pending` and the recipient
//! resolves it to `accepted` or `rejected`. A rejected edge can be asked
//! again: the request reopens the same row instead of growing a duplicate.

use std::sync::Arc;

use crate::model::{Connection, ConnectionStatus, NewConnection};
use crate::store::EntityStore;
use crate::types::{ApiError, Result};

#[derive(Clone)]
pub struct ConnectionService {
    store: Arc<dyn EntityStore>,
}

impl ConnectionService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// File a connection request from `follower_id` to `following_id`.
    pub async fn request(&self, follower_id: i32, following_id: i32) -> Result<Connection> {
        if follower_id == following_id {
            return Err(ApiError::BadRequest(
                "Cannot connect with yourself".to_string(),
            ));
        }

        if self.store.user_by_id(following_id).await?.is_none() {
            return Err(ApiError::NotFound("User not found".to_string()));
        }

        match self
            .store
            .connection_between(follower_id, following_id)
            .await?
        {
            Some(existing) if existing.status == ConnectionStatus::Rejected => {
                // A rejected request may be asked again
                self.store.reopen_connection(existing.id).await
            }
            Some(_) => Err(ApiError::Conflict(
                "Connection request already exists".to_string(),
            )),
            None => {
                self.store
                    .create_connection(NewConnection {
                        follower_id,
                        following_id,
                    })
                    .await
            }
        }
    }

    /// Resolve a pending request. Only the recipient may do this, and only
    /// to `accepted` or `rejected`.
    pub async fn respond(
        &self,
        caller_id: i32,
        connection_id: i32,
        decision: &str,
    ) -> Result<Connection> {
        let decision = match decision {
            "accepted" => ConnectionStatus::Accepted,
            "rejected" => ConnectionStatus::Rejected,
            _ => return Err(ApiError::BadRequest("Invalid status".to_string())),
        };

        let connection = self
            .store
            .connection_by_id(connection_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Connection not found".to_string()))?;

        if connection.following_id != caller_id {
            return Err(ApiError::Forbidden(
                "Only the recipient can respond to a connection request".to_string(),
            ));
        }

        if connection.status != ConnectionStatus::Pending {
            return Err(ApiError::Conflict(format!(
                "Connection request already {}",
                connection.status.as_str()
            )));
        }

        self.store
            .set_connection_status(connection_id, decision)
            .await
    }

    /// All connections where the user sits on either side of the edge.
    pub async fn list_for(&self, user_id: i32) -> Result<Vec<Connection>> {
        self.store.connections_by_user_id(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewUser, Role};
    use crate::store::MemoryStore;

    async fn service_with_users() -> (ConnectionService, i32, i32) {
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
        (ConnectionService::new(store), doctor.id, patient.id)
    }

    #[tokio::test]
    async fn request_creates_pending_edge() {
        let (svc, doctor, patient) = service_with_users().await;

        let conn = svc.request(patient, doctor).await.unwrap();
        assert_eq!(conn.follower_id, patient);
        assert_eq!(conn.following_id, doctor);
        assert_eq!(conn.status, ConnectionStatus::Pending);
    }

    #[tokio::test]
    async fn self_request_is_rejected() {
        let (svc, _, patient) = service_with_users().await;

        let err = svc.request(patient, patient).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn request_to_unknown_user_is_not_found() {
        let (svc, _, patient) = service_with_users().await;

        let err = svc.request(patient, 999).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn duplicate_request_conflicts() {
        let (svc, doctor, patient) = service_with_users().await;

        svc.request(patient, doctor).await.unwrap();
        let err = svc.request(patient, doctor).await.unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[tokio::test]
    async fn accepted_edge_cannot_be_requested_again() {
        let (svc, doctor, patient) = service_with_users().await;

        let conn = svc.request(patient, doctor).await.unwrap();
        svc.respond(doctor, conn.id, "accepted").await.unwrap();

        let err = svc.request(patient, doctor).await.unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[tokio::test]
    async fn rejected_edge_reopens_as_pending() {
        let (svc, doctor, patient) = service_with_users().await;

        let conn = svc.request(patient, doctor).await.unwrap();
        svc.respond(doctor, conn.id, "rejected").await.unwrap();

        let reopened = svc.request(patient, doctor).await.unwrap();
        assert_eq!(reopened.id, conn.id);
        assert_eq!(reopened.status, ConnectionStatus::Pending);
        assert!(reopened.created_at >= conn.created_at);
    }

    #[tokio::test]
    async fn only_recipient_may_respond() {
        let (svc, doctor, patient) = service_with_users().await;

        let conn = svc.request(patient, doctor).await.unwrap();
        let err = svc.respond(patient, conn.id, "accepted").await.unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[tokio::test]
    async fn respond_requires_accept_or_reject() {
        let (svc, doctor, patient) = service_with_users().await;

        let conn = svc.request(patient, doctor).await.unwrap();
        let err = svc.respond(doctor, conn.id, "pending").await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn resolved_request_cannot_be_resolved_again() {
        let (svc, doctor, patient) = service_with_users().await;

        let conn = svc.request(patient, doctor).await.unwrap();
        svc.respond(doctor, conn.id, "accepted").await.unwrap();

        let err = svc.respond(doctor, conn.id, "rejected").await.unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[tokio::test]
    async fn list_for_sees_both_directions() {
        let (svc, doctor, patient) = service_with_users().await;

        let conn = svc.request(patient, doctor).await.unwrap();

        let for_patient = svc.list_for(patient).await.unwrap();
        let for_doctor = svc.list_for(doctor).await.unwrap();
        assert_eq!(for_patient.len(), 1);
        assert_eq!(for_doctor.len(), 1);
        assert_eq!(for_patient[0].id, conn.id);
    }
}
