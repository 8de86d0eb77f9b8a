use super::query::{is_valid_identifier, Direction, Query};
use super::StoreError;

/// Name of the single table backing every collection
pub const DOCUMENTS_TABLE: &str = "documents";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<String>,
}

/// Compiles a [`Query`] into parameterized SQL over the `documents` table.
/// Every value is bound as text and every comparison uses the "C" collation.
struct SqlBuilder {
    params: Vec<String>,
}

impl SqlBuilder {
    fn new() -> Self {
        Self { params: vec![] }
    }

    fn bind(&mut self, value: &str) -> String {
        self.params.push(value.to_string());
        format!("${}", self.params.len())
    }

    fn field(name: &str) -> Result<String, StoreError> {
        if !is_valid_identifier(name) {
            return Err(StoreError::InvalidQuery(format!("Invalid field name: {}", name)));
        }
        Ok(format!("(data->>'{}') COLLATE \"C\"", name))
    }

    fn where_clause(&mut self, query: &Query, with_cursor: bool) -> Result<String, StoreError> {
        let mut parts = vec![format!("collection = {}", self.bind(&query.collection))];

        for condition in &query.conditions {
            let column = Self::field(&condition.field)?;
            let param = self.bind(&condition.value);
            parts.push(format!("{} {} {}", column, condition.op.to_sql(), param));
        }

        for order in &query.order {
            parts.push(format!("data->>'{}' IS NOT NULL", order.field));
        }

        if with_cursor {
            if let Some(cursor) = &query.start_after {
                parts.push(self.cursor_clause(query, cursor)?);
            }
        }

        Ok(parts.join(" AND "))
    }

    // (f1 > v1) OR (f1 = v1 AND f2 > v2) OR ...
    fn cursor_clause(&mut self, query: &Query, cursor: &[String]) -> Result<String, StoreError> {
        let mut branches = vec![];
        for depth in 0..cursor.len() {
            let mut terms = vec![];
            for (order, value) in query.order.iter().zip(cursor.iter()).take(depth) {
                let column = Self::field(&order.field)?;
                terms.push(format!("{} = {}", column, self.bind(value)));
            }
            let order = &query.order[depth];
            let column = Self::field(&order.field)?;
            let op = match order.direction {
                Direction::Asc => ">",
                Direction::Desc => "<",
            };
            terms.push(format!("{} {} {}", column, op, self.bind(&cursor[depth])));
            branches.push(format!("({})", terms.join(" AND ")));
        }
        Ok(format!("({})", branches.join(" OR ")))
    }

    fn order_clause(query: &Query) -> Result<String, StoreError> {
        let mut parts = vec![];
        for order in &query.order {
            parts.push(format!("{} {}", Self::field(&order.field)?, order.direction.to_sql()));
        }
        parts.push("id COLLATE \"C\" ASC".to_string());
        Ok(format!("ORDER BY {}", parts.join(", ")))
    }
}

/// SELECT for [`super::DocumentStore::query`]
pub fn select(query: &Query) -> Result<SqlResult, StoreError> {
    query.validate()?;
    let mut builder = SqlBuilder::new();
    let where_clause = builder.where_clause(query, true)?;
    let order_clause = SqlBuilder::order_clause(query)?;
    let limit_clause = query.limit.map(|l| format!("LIMIT {}", l)).unwrap_or_default();

    let sql = [
        format!("SELECT id, data FROM {}", DOCUMENTS_TABLE),
        format!("WHERE {}", where_clause),
        order_clause,
        limit_clause,
    ]
    .into_iter()
    .filter(|s| !s.is_empty())
    .collect::<Vec<_>>()
    .join(" ");

    Ok(SqlResult { query: sql, params: builder.params })
}

/// COUNT for [`super::DocumentStore::count`]; limit and cursor are ignored
pub fn count(query: &Query) -> Result<SqlResult, StoreError> {
    let unbounded = query.unbounded();
    unbounded.validate()?;
    let mut builder = SqlBuilder::new();
    let where_clause = builder.where_clause(&unbounded, false)?;
    Ok(SqlResult {
        query: format!("SELECT COUNT(*) AS count FROM {} WHERE {}", DOCUMENTS_TABLE, where_clause),
        params: builder.params,
    })
}
