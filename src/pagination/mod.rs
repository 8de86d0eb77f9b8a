pub mod cursor;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::store::{Direction, Document, DocumentStore, Query, StoreError};
use crate::types::{collections, fields};

pub use cursor::Cursor;

/// Upper bound appended to a search prefix: `[prefix, prefix + U+10FFFF)` is "starts with prefix"
pub const SEARCH_SENTINEL: char = '\u{10FFFF}';

/// A paginated collection and the field its search box matches against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Listing {
    pub collection: &'static str,
    pub search_field: &'static str,
}

impl Listing {
    pub const APPOINTMENTS: Listing = Listing { collection: collections::APPOINTMENTS, search_field: "title" };
    pub const INCIDENTS: Listing = Listing { collection: collections::INCIDENTS, search_field: "title" };
    pub const RESOURCES: Listing = Listing { collection: collections::USERS, search_field: "name" };
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: usize,
    pub page_token: Option<String>,
    pub search: Option<String>,
    /// Equality filters applied before search and cursor (owner, role)
    pub scope: Vec<(String, String)>,
    pub with_totals: bool,
}

impl PageRequest {
    pub fn new(limit: usize) -> Self {
        Self { limit, ..Default::default() }
    }

    pub fn page_token(mut self, token: Option<String>) -> Self {
        self.page_token = token;
        self
    }

    pub fn search(mut self, search: Option<String>) -> Self {
        self.search = search;
        self
    }

    pub fn scoped(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.scope.push((field.into(), value.into()));
        self
    }

    pub fn with_totals(mut self) -> Self {
        self.with_totals = true;
        self
    }

    /// Trimmed search prefix, `None` when blank
    pub fn search_prefix(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_next_page: bool,
    pub next_page_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_items: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u64>,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            has_next_page: self.has_next_page,
            next_page_token: self.next_page_token,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }

    pub fn try_map<U, E>(self, f: impl FnMut(T) -> Result<U, E>) -> Result<Page<U>, E> {
        Ok(Page {
            items: self.items.into_iter().map(f).collect::<Result<Vec<_>, E>>()?,
            has_next_page: self.has_next_page,
            next_page_token: self.next_page_token,
            total_items: self.total_items,
            total_pages: self.total_pages,
        })
    }
}

/// Fetch one page of `listing` for `request`.
///
/// Without a search term the page is newest first. With one, it is ordered by the
/// listing's search field and then by creation time, both ascending, restricted to
/// values starting with the term. One extra document is read to learn whether
/// another page exists. An unusable token is ignored and the first page returned.
pub async fn paginate(
    store: &dyn DocumentStore,
    listing: Listing,
    request: &PageRequest,
) -> Result<Page<Document>, StoreError> {
    let limit = request.limit.max(1);
    let prefix = request.search_prefix();
    let search_field = prefix.map(|_| listing.search_field);

    let mut query = Query::new(listing.collection);
    for (field, value) in &request.scope {
        query = query.where_eq(field.as_str(), value.as_str());
    }
    query = match prefix {
        Some(prefix) => query
            .where_gte(listing.search_field, prefix)
            .where_lt(listing.search_field, format!("{}{}", prefix, SEARCH_SENTINEL))
            .order_by(listing.search_field, Direction::Asc)
            .order_by(fields::CREATED_AT, Direction::Asc),
        None => query.order_by(fields::CREATED_AT, Direction::Desc),
    };

    let totals = if request.with_totals {
        let total = store.count(&query).await?;
        Some((total, total.div_ceil(limit as u64)))
    } else {
        None
    };

    if let Some(token) = request.page_token.as_deref() {
        match Cursor::decode(token, search_field) {
            Some(cursor) => query = query.start_after(cursor.into_values()),
            None => debug!(collection = listing.collection, "Ignoring unusable page token"),
        }
    }

    let mut docs = store.query(&query.limit(limit + 1)).await?;
    let has_next_page = docs.len() > limit;
    docs.truncate(limit);

    let next_page_token = if has_next_page {
        docs.last()
            .and_then(|doc| Cursor::from_document(doc, search_field))
            .map(|cursor| cursor.encode(listing.search_field))
    } else {
        None
    };

    Ok(Page {
        items: docs,
        has_next_page,
        next_page_token,
        total_items: totals.map(|(items, _)| items),
        total_pages: totals.map(|(_, pages)| pages),
    })
}
