use serde::{Deserialize, Serialize};

use super::review::Review;
use super::service::ServiceOffering;
use super::{require_some_change, Validate};
use crate::error::ApiError;
use crate::types::Role;

/// Profile document in `users`, keyed by the subject id.
/// A musician profile is listed publicly as a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(rename = "photoURL", default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub created_at: String,
}

impl UserProfile {
    /// Name shown next to records this subject owns
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.email)
    }

    pub fn is_musician(&self) -> bool {
        self.role == Role::Musician
    }
}

/// Fields a musician may change on their own resource profile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(rename = "photoURL", default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl Validate for ProfilePatch {
    fn validate(&self) -> Result<(), ApiError> {
        require_some_change(&[
            self.name.is_some(),
            self.location.is_some(),
            self.display_name.is_some(),
            self.photo_url.is_some(),
        ])?;
        // name is the resource search key; an empty one would drop out of listings
        if matches!(&self.name, Some(name) if name.trim().is_empty()) {
            return Err(ApiError::invalid_field("name", "Name cannot be blank"));
        }
        Ok(())
    }
}

/// Public resource view: the musician profile with its services and reviews
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDetail {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub services: Vec<ServiceOffering>,
    pub reviews: Vec<Review>,
    pub average_rating: Option<f64>,
}

impl ResourceDetail {
    pub fn new(profile: UserProfile, services: Vec<ServiceOffering>, reviews: Vec<Review>) -> Self {
        let average_rating = if reviews.is_empty() {
            None
        } else {
            let sum: i64 = reviews.iter().map(|r| r.rating as i64).sum();
            Some(sum as f64 / reviews.len() as f64)
        };
        Self { profile, services, reviews, average_rating }
    }
}
