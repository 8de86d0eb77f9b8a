//! Client-side mirror of one paginated list.
//!
//! Holds the items fetched so far plus the pagination state of the last page,
//! and applies local mutations after (or, for delete, before) the server call.

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{ApiClient, ClientError, ListQuery};
use crate::pagination::Page;
use crate::records::{AdminEntry, Appointment, Incident, Review, UserProfile};

/// Items a list store can locate by id
pub trait Identified {
    fn id(&self) -> &str;
}

impl Identified for Appointment {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for Incident {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for UserProfile {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for Review {
    fn id(&self) -> &str {
        &self.id
    }
}

impl<T: Identified> Identified for AdminEntry<T> {
    fn id(&self) -> &str {
        self.record.id()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub has_next_page: bool,
    pub next_page_token: Option<String>,
    pub total_items: u64,
    pub total_pages: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            has_next_page: false,
            next_page_token: None,
            total_items: 0,
            total_pages: 1,
        }
    }
}

impl Pagination {
    /// State described by one server page; absent totals fall back to the defaults
    pub fn of<T>(page: &Page<T>) -> Self {
        Self {
            has_next_page: page.has_next_page,
            next_page_token: page.next_page_token.clone(),
            total_items: page.total_items.unwrap_or(0),
            total_pages: page.total_pages.unwrap_or(1),
        }
    }
}

pub struct ListStore<T> {
    client: ApiClient,
    path: String,
    pub items: Vec<T>,
    pub pagination: Pagination,
    pub search_query: String,
    pub error: Option<String>,
    pub loading: bool,
}

impl<T> ListStore<T>
where
    T: Identified + DeserializeOwned,
{
    /// Store over the list endpoint at `path`; items live at `path/:id`
    pub fn new(client: ApiClient, path: impl Into<String>) -> Self {
        Self {
            client,
            path: path.into(),
            items: Vec::new(),
            pagination: Pagination::default(),
            search_query: String::new(),
            error: None,
            loading: false,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    /// Replace the items with the first page for the current search
    pub async fn fetch_first_page(&mut self, limit: usize) -> Result<(), ClientError> {
        let query = ListQuery::new(limit).search(&self.search_query);
        let page = self.fetch(query).await?;
        self.apply_page(page, false);
        Ok(())
    }

    /// Append the next page; returns `false` without a request when there is none
    pub async fn fetch_next_page(&mut self, limit: usize) -> Result<bool, ClientError> {
        let token = match (&self.pagination.next_page_token, self.pagination.has_next_page) {
            (Some(token), true) => token.clone(),
            _ => return Ok(false),
        };
        let query = ListQuery::new(limit).search(&self.search_query).page_token(Some(token));
        let page = self.fetch(query).await?;
        self.apply_page(page, true);
        Ok(true)
    }

    /// Server first; the created item is prepended on success
    pub async fn create<B: Serialize + ?Sized>(&mut self, body: &B) -> Result<&T, ClientError> {
        match self.client.create::<T, B>(&self.path, body).await {
            Ok(created) => {
                self.items.insert(0, created);
                self.pagination.total_items += 1;
                Ok(&self.items[0])
            }
            Err(e) => Err(self.record(e)),
        }
    }

    /// Server first; the local copy is replaced in place when present
    pub async fn update<B: Serialize + ?Sized>(&mut self, id: &str, body: &B) -> Result<(), ClientError> {
        let path = self.item_path(id);
        match self.client.update::<T, B>(&path, body).await {
            Ok(updated) => {
                if let Some(index) = self.position(id) {
                    self.items[index] = updated;
                }
                Ok(())
            }
            Err(e) => Err(self.record(e)),
        }
    }

    /// Optimistic: the item disappears immediately and comes back at its
    /// index if the server refuses
    pub async fn delete(&mut self, id: &str) -> Result<(), ClientError> {
        let removed = self.position(id).map(|index| (index, self.items.remove(index)));

        match self.client.delete(&self.item_path(id)).await {
            Ok(_) => {
                self.pagination.total_items = self.pagination.total_items.saturating_sub(1);
                Ok(())
            }
            Err(e) => {
                if let Some((index, item)) = removed {
                    self.items.insert(index.min(self.items.len()), item);
                }
                Err(self.record(e))
            }
        }
    }

    async fn fetch(&mut self, query: ListQuery) -> Result<Page<T>, ClientError> {
        self.loading = true;
        let result = self.client.list::<T>(&self.path, &query).await;
        self.loading = false;
        result.map_err(|e| self.record(e))
    }

    fn apply_page(&mut self, page: Page<T>, append: bool) {
        let mut pagination = Pagination::of(&page);
        if append {
            // Totals are carried forward when the server omits them
            pagination.total_items = page.total_items.unwrap_or(self.pagination.total_items);
            pagination.total_pages = page.total_pages.unwrap_or(self.pagination.total_pages);
            self.items.extend(page.items);
        } else {
            self.items = page.items;
        }
        self.pagination = pagination;
        self.error = None;
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    fn item_path(&self, id: &str) -> String {
        format!("{}/{}", self.path.trim_end_matches('/'), id)
    }

    fn record(&mut self, error: ClientError) -> ClientError {
        tracing::warn!("{} request failed: {}", self.path, error);
        self.error = Some(match &error {
            ClientError::Api { message, .. } => message.clone(),
            other => other.to_string(),
        });
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, serde::Deserialize)]
    struct Item {
        id: String,
    }

    impl Identified for Item {
        fn id(&self) -> &str {
            &self.id
        }
    }

    fn item(id: &str) -> Item {
        Item { id: id.to_string() }
    }

    fn store() -> ListStore<Item> {
        ListStore::new(ApiClient::new("http://localhost:9").unwrap(), "/appointments")
    }

    fn page(ids: &[&str], next: Option<&str>, totals: Option<(u64, u64)>) -> Page<Item> {
        Page {
            items: ids.iter().map(|id| item(id)).collect(),
            has_next_page: next.is_some(),
            next_page_token: next.map(str::to_string),
            total_items: totals.map(|t| t.0),
            total_pages: totals.map(|t| t.1),
        }
    }

    #[test]
    fn test_first_page_replaces_and_next_page_appends() {
        let mut store = store();
        store.items = vec![item("stale")];
        store.error = Some("old".into());

        store.apply_page(page(&["c", "b"], Some("tok"), Some((3, 2))), false);
        assert_eq!(store.items, vec![item("c"), item("b")]);
        assert_eq!(store.pagination.next_page_token.as_deref(), Some("tok"));
        assert!(store.error.is_none());

        store.apply_page(page(&["a"], None, None), true);
        assert_eq!(store.items, vec![item("c"), item("b"), item("a")]);
        assert!(!store.pagination.has_next_page);
        assert_eq!(store.pagination.total_items, 3);
        assert_eq!(store.pagination.total_pages, 2);
    }

    #[test]
    fn test_first_page_without_totals_resets_defaults() {
        let mut store = store();
        store.pagination.total_items = 9;
        store.apply_page(page(&[], None, None), false);
        assert_eq!(store.pagination, Pagination::default());
    }

    #[test]
    fn test_item_path() {
        let store = store();
        assert_eq!(store.item_path("abc"), "/appointments/abc");
    }

    #[tokio::test]
    async fn test_next_page_without_token_is_a_no_op() {
        let mut store = store();
        store.items = vec![item("a")];
        assert!(!store.fetch_next_page(3).await.unwrap());
        assert_eq!(store.items, vec![item("a")]);
    }

    #[tokio::test]
    async fn test_failed_delete_restores_item_at_its_index() {
        // Nothing listens on port 9, so the request fails at the transport
        let mut store = store();
        store.items = vec![item("a"), item("b"), item("c")];
        store.pagination.total_items = 3;

        assert!(store.delete("b").await.is_err());
        assert_eq!(store.items, vec![item("a"), item("b"), item("c")]);
        assert_eq!(store.pagination.total_items, 3);
        assert!(store.error.is_some());
    }
}
