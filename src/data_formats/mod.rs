mod request;
mod response;
mod wrapper;

pub use request::*;
pub use response::*;
pub use wrapper::*;

use serde::{Deserialize, Serialize};

/// Shared limit/offset pagination parameters for listing endpoints.
#[derive(Deserialize, Serialize, Debug)]
pub struct ListQueryParams {
    #[serde(default = "get_default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

impl ListQueryParams {
    /// The requested page size, capped so a single request cannot pull
    /// the whole table.
    pub fn capped_limit(&self) -> u32 {
        self.limit.min(MAX_PAGE_SIZE)
    }
}

/// Recipe listings can additionally be filtered to one author.
#[derive(Deserialize, Serialize, Debug)]
pub struct RecipeListQueryParams {
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default = "get_default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

impl RecipeListQueryParams {
    pub fn capped_limit(&self) -> u32 {
        self.limit.min(MAX_PAGE_SIZE)
    }
}

const MAX_PAGE_SIZE: u32 = 100;

fn get_default_limit() -> u32 {
    20
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_page_requests_are_capped() {
        let params = ListQueryParams {
            limit: u32::MAX,
            offset: 0,
        };
        assert_eq!(params.capped_limit(), MAX_PAGE_SIZE);

        let params = ListQueryParams {
            limit: 20,
            offset: 0,
        };
        assert_eq!(params.capped_limit(), 20);
    }
}
