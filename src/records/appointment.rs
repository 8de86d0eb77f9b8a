use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::{require_some_change, require_text, OwnedRecord, Validate};
use crate::error::ApiError;
use crate::pagination::Listing;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub musician: Option<String>,
    pub user_id: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAppointment {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub musician: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub musician: Option<String>,
}

fn check_date(date: Option<&str>) -> Result<(), ApiError> {
    match date {
        Some(d) if NaiveDate::parse_from_str(d, "%Y-%m-%d").is_err() => {
            Err(ApiError::invalid_field("date", "Expected a date as YYYY-MM-DD"))
        }
        _ => Ok(()),
    }
}

fn check_time(time: Option<&str>) -> Result<(), ApiError> {
    match time {
        Some(t) if NaiveTime::parse_from_str(t, "%H:%M").is_err() => {
            Err(ApiError::invalid_field("time", "Expected a time as HH:MM"))
        }
        _ => Ok(()),
    }
}

impl Validate for NewAppointment {
    fn validate(&self) -> Result<(), ApiError> {
        require_text("title", &self.title)?;
        check_date(self.date.as_deref())?;
        check_time(self.time.as_deref())
    }
}

impl Validate for AppointmentPatch {
    fn validate(&self) -> Result<(), ApiError> {
        require_some_change(&[
            self.title.is_some(),
            self.description.is_some(),
            self.date.is_some(),
            self.time.is_some(),
            self.musician.is_some(),
        ])?;
        if let Some(title) = &self.title {
            require_text("title", title)?;
        }
        check_date(self.date.as_deref())?;
        check_time(self.time.as_deref())
    }
}

impl OwnedRecord for Appointment {
    type New = NewAppointment;
    type Patch = AppointmentPatch;

    const LISTING: Listing = Listing::APPOINTMENTS;
    const NOUN: &'static str = "Appointment";

    fn id(&self) -> &str {
        &self.id
    }

    fn owner_id(&self) -> &str {
        &self.user_id
    }
}
