use std::sync::Arc;
use tracing::info;

use crate::auth::{Access, IdentityProvider};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::pagination::{paginate, Listing, Page, PageRequest};
use crate::records::profile::ResourceDetail;
use crate::records::timestamp::next_created_at;
use crate::records::{NewReview, ProfilePatch, Review, ServiceOffering, UserProfile, Validate};
use crate::store::{to_fields, Direction, DocumentStore, Query};
use crate::types::{collections, fields, Role};

/// Musician profiles exposed as bookable resources, with their services and reviews
pub struct ResourceService {
    store: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityProvider>,
}

impl ResourceService {
    pub fn new(store: Arc<dyn DocumentStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { store, identity }
    }

    pub async fn list(&self, request: PageRequest) -> Result<Page<UserProfile>, ApiError> {
        let request = request.scoped(fields::ROLE, Role::Musician.as_str());
        let page = paginate(self.store.as_ref(), Listing::RESOURCES, &request).await?;
        Ok(page.try_map(|doc| doc.into_record())?)
    }

    async fn musician(&self, id: &str) -> Result<UserProfile, ApiError> {
        let profile: Option<UserProfile> = match self.store.get(collections::USERS, id).await? {
            Some(doc) => Some(doc.into_record()?),
            None => None,
        };
        profile
            .filter(UserProfile::is_musician)
            .ok_or_else(|| ApiError::not_found("Resource not found"))
    }

    pub async fn get(&self, id: &str) -> Result<ResourceDetail, ApiError> {
        let profile = self.musician(id).await?;
        let (services, reviews) = tokio::try_join!(self.fetch_services(id), self.fetch_reviews(id))?;
        Ok(ResourceDetail::new(profile, services, reviews))
    }

    /// The musician edits their own profile
    pub async fn update(&self, user: &AuthUser, id: &str, patch: ProfilePatch) -> Result<UserProfile, ApiError> {
        user.require(Access::Owner(id))?;
        self.musician(id).await?;
        patch.validate()?;

        let doc = self.store.update(collections::USERS, id, to_fields(&patch)?).await?;
        info!(id, "Updated resource profile");
        Ok(doc.into_record()?)
    }

    /// Removes the profile and the identity account behind it
    pub async fn delete(&self, user: &AuthUser, id: &str) -> Result<(), ApiError> {
        self.musician(id).await?;
        user.require(Access::OwnerOrElevated(id))?;

        self.store.delete(collections::USERS, id).await?;
        self.identity.delete_account(id).await?;
        info!(id, by = %user.subject, "Deleted resource");
        Ok(())
    }

    async fn fetch_services(&self, musician_id: &str) -> Result<Vec<ServiceOffering>, ApiError> {
        let query = Query::new(collections::SERVICES).where_eq(fields::MUSICIAN_ID, musician_id);
        let docs = self.store.query(&query).await?;
        Ok(docs.into_iter().map(|doc| doc.into_record()).collect::<Result<_, _>>()?)
    }

    async fn fetch_reviews(&self, musician_id: &str) -> Result<Vec<Review>, ApiError> {
        let query = Query::new(collections::REVIEWS)
            .where_eq(fields::MUSICIAN_ID, musician_id)
            .order_by(fields::CREATED_AT, Direction::Desc);
        let docs = self.store.query(&query).await?;
        Ok(docs.into_iter().map(|doc| doc.into_record()).collect::<Result<_, _>>()?)
    }

    pub async fn reviews(&self, musician_id: &str) -> Result<Vec<Review>, ApiError> {
        self.musician(musician_id).await?;
        self.fetch_reviews(musician_id).await
    }

    pub async fn add_review(&self, user: &AuthUser, musician_id: &str, input: NewReview) -> Result<Review, ApiError> {
        input.validate()?;
        self.musician(musician_id).await?;

        let mut document = to_fields(&input)?;
        document.insert(fields::MUSICIAN_ID.to_string(), musician_id.into());
        document.insert(fields::OWNER.to_string(), user.subject.clone().into());
        document.insert(fields::CREATED_AT.to_string(), next_created_at().into());

        let doc = self.store.add(collections::REVIEWS, document).await?;
        info!(musician_id, by = %user.subject, rating = input.rating, "Added review");
        Ok(doc.into_record()?)
    }
}
