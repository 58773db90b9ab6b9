//! User identity and role-specific profile records
//!
//! Every account is either a doctor or a patient. Each role carries a 1:1
//! profile extension keyed by user id; the two shapes are structurally
//! different, so reads that need one are typed by role.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::ApiError;

/// Account role, fixed at registration
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Doctor,
    Patient,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Doctor => "doctor",
            Role::Patient => "patient",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "doctor" => Ok(Role::Doctor),
            "patient" => Ok(Role::Patient),
            other => Err(ApiError::BadRequest(format!("Unknown role: {}", other))),
        }
    }
}

/// User account record
///
/// The password field holds the argon2 hash and is never serialized into
/// API responses.
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub name: String,
    pub email: String,
    pub bio: Option<String>,
    pub profile_image: Option<String>,
    pub cover_image: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Fields accepted when creating a user (password already hashed)
#[derive(Clone, Debug)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub name: String,
    pub email: String,
    pub bio: Option<String>,
    pub profile_image: Option<String>,
    pub cover_image: Option<String>,
    pub role: Role,
}

/// Doctor profile extension
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DoctorProfile {
    pub id: i32,
    pub user_id: i32,
    pub specialty: String,
    pub hospital: Option<String>,
    pub qualifications: Option<String>,
    /// Years of practice
    pub experience: Option<i32>,
    pub verified: bool,
    pub rating: Option<f64>,
    pub review_count: i32,
}

/// Patient profile extension
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PatientProfile {
    pub id: i32,
    pub user_id: i32,
    /// Condition labels the patient chose to share
    pub conditions: Option<Vec<String>>,
}

/// Fields accepted when creating a doctor profile
#[derive(Clone, Debug, Default)]
pub struct NewDoctorProfile {
    pub user_id: i32,
    pub specialty: String,
    pub hospital: Option<String>,
    pub qualifications: Option<String>,
    pub experience: Option<i32>,
    pub verified: bool,
    pub rating: Option<f64>,
    pub review_count: i32,
}

/// Fields accepted when creating a patient profile
#[derive(Clone, Debug, Default)]
pub struct NewPatientProfile {
    pub user_id: i32,
    pub conditions: Option<Vec<String>>,
}

/// Role-discriminated profile union
///
/// Matched exhaustively wherever doctor-vs-patient logic differs, instead
/// of branching on the role string.
#[derive(Serialize, Clone, Debug)]
#[serde(tag = "role", content = "profile", rename_all = "lowercase")]
pub enum Profile {
    Doctor(DoctorProfile),
    Patient(PatientProfile),
}

/// Doctor account joined with its profile for directory reads
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DoctorWithProfile {
    #[serde(flatten)]
    pub user: User,
    pub profile: DoctorProfile,
}

/// Patient account joined with its profile for directory reads
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PatientWithProfile {
    #[serde(flatten)]
    pub user: User,
    pub profile: PatientProfile,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        assert_eq!("doctor".parse::<Role>().unwrap(), Role::Doctor);
        assert_eq!("patient".parse::<Role>().unwrap(), Role::Patient);
        assert!("admin".parse::<Role>().is_err());
        assert_eq!(Role::Doctor.as_str(), "doctor");
    }

    #[test]
    fn test_password_never_serialized() {
        let user = User {
            id: 1,
            username: "dr.sarah".to_string(),
            password: "$argon2id$v=19$secret".to_string(),
            name: "Dr. Sarah Johnson".to_string(),
            email: "sarah@mediconnect.com".to_string(),
            bio: None,
            profile_image: None,
            cover_image: None,
            role: Role::Doctor,
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("argon2id"));
        assert!(json.contains("\"username\":\"dr.sarah\""));
        assert!(json.contains("\"createdAt\""));
    }

    #[test]
    fn test_profile_tagged_by_role() {
        let profile = Profile::Patient(PatientProfile {
            id: 1,
            user_id: 5,
            conditions: Some(vec!["Hypertension".to_string()]),
        });

        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["role"], "patient");
        assert_eq!(json["profile"]["userId"], 5);
    }
}
