pub mod appointment;
pub mod incident;
pub mod profile;
pub mod review;
pub mod service;
pub mod timestamp;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::pagination::Listing;

pub use appointment::{Appointment, AppointmentPatch, NewAppointment};
pub use incident::{Incident, IncidentPatch, NewIncident};
pub use profile::{ProfilePatch, UserProfile};
pub use review::{NewReview, Review};
pub use service::ServiceOffering;

/// Input checks that run before anything reaches the store
pub trait Validate {
    fn validate(&self) -> Result<(), ApiError>;
}

/// A record owned by one subject through its `userId` field
pub trait OwnedRecord: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Body accepted on create
    type New: Validate + Serialize + DeserializeOwned + Send;
    /// Body accepted on update; absent fields are left untouched
    type Patch: Validate + Serialize + DeserializeOwned + Send;

    const LISTING: Listing;
    /// Human name used in messages and logs
    const NOUN: &'static str;

    fn id(&self) -> &str;
    fn owner_id(&self) -> &str;
}

/// Admin list item: the record plus its owner's display name
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminEntry<T> {
    #[serde(flatten)]
    pub record: T,
    pub user_name: String,
}

pub(crate) fn require_text(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::invalid_field(field, "This field is required"));
    }
    Ok(())
}

pub(crate) fn require_some_change(fields: &[bool]) -> Result<(), ApiError> {
    if fields.iter().any(|present| *present) {
        Ok(())
    } else {
        Err(ApiError::validation_error("Update must change at least one field", None))
    }
}
