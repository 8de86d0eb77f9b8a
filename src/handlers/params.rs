use serde::Deserialize;
use tracing::warn;

use crate::config::PaginationConfig;
use crate::pagination::PageRequest;

/// Query string accepted by every list endpoint
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    /// Kept as text: anything that is not a positive integer falls back to the default
    pub limit: Option<String>,
    pub page_token: Option<String>,
    pub search: Option<String>,
}

impl ListParams {
    pub fn limit(&self, default_limit: usize, config: &PaginationConfig) -> usize {
        let requested = self
            .limit
            .as_deref()
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|limit| *limit > 0)
            .unwrap_or(default_limit);

        match config.max_limit {
            Some(max) if requested > max => {
                if config.debug_logging {
                    warn!("Limit {} exceeds max {}, capping to max", requested, max);
                }
                max
            }
            _ => requested,
        }
    }

    pub fn into_request(self, default_limit: usize, config: &PaginationConfig) -> PageRequest {
        PageRequest::new(self.limit(default_limit, config))
            .page_token(self.page_token.filter(|t| !t.trim().is_empty()))
            .search(self.search)
    }
}
