use serde::{Deserialize, Serialize};

use super::Validate;
use crate::error::ApiError;

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub musician_id: String,
    pub user_id: String,
    pub rating: i32,
    #[serde(default)]
    pub comment: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewReview {
    pub rating: i32,
    #[serde(default)]
    pub comment: String,
}

impl Validate for NewReview {
    fn validate(&self) -> Result<(), ApiError> {
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(ApiError::invalid_field(
                "rating",
                format!("Rating must be between {} and {}", MIN_RATING, MAX_RATING),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_bounds() {
        for (rating, ok) in [(0, false), (1, true), (5, true), (6, false)] {
            let review = NewReview { rating, comment: String::new() };
            assert_eq!(review.validate().is_ok(), ok, "rating {}", rating);
        }
    }
}
