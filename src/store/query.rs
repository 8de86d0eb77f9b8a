use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::{Document, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn to_sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }

    fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    Eq,
    Gte,
    Lt,
}

impl Op {
    pub fn to_sql(&self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Gte => ">=",
            Op::Lt => "<",
        }
    }

    fn matches(&self, ordering: Ordering) -> bool {
        match self {
            Op::Eq => ordering == Ordering::Equal,
            Op::Gte => ordering != Ordering::Less,
            Op::Lt => ordering == Ordering::Less,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub field: String,
    pub op: Op,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// Query over a single collection: conditions, compound ordering, an exclusive
/// `start_after` cursor over the ordering values, and a limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub collection: String,
    pub conditions: Vec<Condition>,
    pub order: Vec<OrderBy>,
    pub limit: Option<usize>,
    pub start_after: Option<Vec<String>>,
}

impl Query {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            conditions: vec![],
            order: vec![],
            limit: None,
            start_after: None,
        }
    }

    pub fn where_eq(self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.condition(field, Op::Eq, value)
    }

    pub fn where_gte(self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.condition(field, Op::Gte, value)
    }

    pub fn where_lt(self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.condition(field, Op::Lt, value)
    }

    fn condition(mut self, field: impl Into<String>, op: Op, value: impl Into<String>) -> Self {
        self.conditions.push(Condition { field: field.into(), op, value: value.into() });
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order.push(OrderBy { field: field.into(), direction });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Resume strictly after the given ordering values (one per leading order field)
    pub fn start_after(mut self, values: Vec<String>) -> Self {
        self.start_after = Some(values);
        self
    }

    /// Same conditions and ordering fields, without limit or cursor; used for counting.
    /// Documents missing an ordering field stay excluded, as they are from every page.
    pub fn unbounded(&self) -> Self {
        Self {
            collection: self.collection.clone(),
            conditions: self.conditions.clone(),
            order: self.order.clone(),
            limit: None,
            start_after: None,
        }
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        if !is_valid_identifier(&self.collection) {
            return Err(StoreError::InvalidQuery(format!("Invalid collection name: {}", self.collection)));
        }
        for field in self
            .conditions
            .iter()
            .map(|c| &c.field)
            .chain(self.order.iter().map(|o| &o.field))
        {
            if !is_valid_identifier(field) {
                return Err(StoreError::InvalidQuery(format!("Invalid field name: {}", field)));
            }
        }
        if let Some(cursor) = &self.start_after {
            if cursor.is_empty() || cursor.len() > self.order.len() {
                return Err(StoreError::InvalidQuery(format!(
                    "start_after takes 1..={} values, got {}",
                    self.order.len(),
                    cursor.len()
                )));
            }
        }
        Ok(())
    }

    /// Whether the document satisfies every condition and carries every ordering field
    pub fn matches(&self, doc: &Document) -> bool {
        let conditions_hold = self.conditions.iter().all(|c| match doc.text(&c.field) {
            Some(text) => c.op.matches(compare_text(&text, &c.value)),
            None => false,
        });
        conditions_hold && self.order.iter().all(|o| doc.text(&o.field).is_some())
    }

    /// Compare two documents under the query ordering, falling back to the id
    pub fn compare(&self, a: &Document, b: &Document) -> Ordering {
        for order in &self.order {
            let ordering = order.direction.apply(compare_opt(a.text(&order.field), b.text(&order.field)));
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        a.id.cmp(&b.id)
    }

    /// Whether the document sorts strictly after the `start_after` cursor
    pub fn is_after_cursor(&self, doc: &Document) -> bool {
        let Some(cursor) = &self.start_after else {
            return true;
        };
        for (order, bound) in self.order.iter().zip(cursor.iter()) {
            let value = doc.text(&order.field).unwrap_or_default();
            let ordering = order.direction.apply(compare_text(&value, bound));
            if ordering != Ordering::Equal {
                return ordering == Ordering::Greater;
            }
        }
        false
    }
}

/// Code point order; `str` ordering on UTF-8 bytes is code point order
pub fn compare_text(a: &str, b: &str) -> Ordering {
    a.cmp(b)
}

fn compare_opt(a: Option<String>, b: Option<String>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => compare_text(&a, &b),
        (a, b) => a.is_some().cmp(&b.is_some()),
    }
}

/// Collection and field names are interpolated into SQL, so keep them to `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(id: &str, title: &str, created_at: &str) -> Document {
        let fields = json!({ "title": title, "createdAt": created_at });
        Document::new(id, fields.as_object().cloned().unwrap_or_default())
    }

    #[test]
    fn validates_identifiers() {
        assert!(is_valid_identifier("createdAt"));
        assert!(is_valid_identifier("_private"));
        assert!(is_valid_identifier("photoURL"));
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("1field"));
        assert!(!is_valid_identifier("title'; DROP TABLE documents; --"));
    }

    #[test]
    fn rejects_cursor_longer_than_ordering() {
        let query = Query::new("appointments")
            .order_by("createdAt", Direction::Desc)
            .start_after(vec!["a".into(), "b".into()]);
        assert!(matches!(query.validate(), Err(StoreError::InvalidQuery(_))));
    }

    #[test]
    fn cursor_respects_direction() {
        let desc = Query::new("appointments")
            .order_by("createdAt", Direction::Desc)
            .start_after(vec!["2024-01-02".into()]);
        assert!(desc.is_after_cursor(&doc("a", "x", "2024-01-01")));
        assert!(!desc.is_after_cursor(&doc("b", "x", "2024-01-02")));
        assert!(!desc.is_after_cursor(&doc("c", "x", "2024-01-03")));

        let asc = Query::new("appointments")
            .order_by("title", Direction::Asc)
            .order_by("createdAt", Direction::Asc)
            .start_after(vec!["Beta".into(), "2024-01-02".into()]);
        assert!(asc.is_after_cursor(&doc("a", "Beta", "2024-01-03")));
        assert!(asc.is_after_cursor(&doc("b", "Gamma", "2024-01-01")));
        assert!(!asc.is_after_cursor(&doc("c", "Beta", "2024-01-02")));
        assert!(!asc.is_after_cursor(&doc("d", "Alpha", "2024-01-09")));
    }

    #[test]
    fn documents_missing_order_fields_do_not_match() {
        let query = Query::new("users").order_by("name", Direction::Asc);
        assert!(!query.matches(&doc("a", "x", "2024-01-01")));
    }
}
