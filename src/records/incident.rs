use serde::{Deserialize, Serialize};

use super::{require_some_change, require_text, OwnedRecord, Validate};
use crate::error::ApiError;
use crate::pagination::Listing;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub user_id: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewIncident {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncidentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Validate for NewIncident {
    fn validate(&self) -> Result<(), ApiError> {
        require_text("title", &self.title)
    }
}

impl Validate for IncidentPatch {
    fn validate(&self) -> Result<(), ApiError> {
        require_some_change(&[self.title.is_some(), self.description.is_some()])?;
        match &self.title {
            Some(title) => require_text("title", title),
            None => Ok(()),
        }
    }
}

impl OwnedRecord for Incident {
    type New = NewIncident;
    type Patch = IncidentPatch;

    const LISTING: Listing = Listing::INCIDENTS;
    const NOUN: &'static str = "Incident";

    fn id(&self) -> &str {
        &self.id
    }

    fn owner_id(&self) -> &str {
        &self.user_id
    }
}
