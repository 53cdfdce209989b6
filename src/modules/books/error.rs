use catalog_db::StoreError;
use catalog_http::error::AppError;
use serde_json::json;
use thiserror::Error;

use super::validation::ValidationError;

/// Failure of a catalog operation. Every variant is terminal for the request.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("book '{0}' not found")]
    NotFound(String),

    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Validation(err) => {
                let details = err
                    .violations()
                    .iter()
                    .map(|violation| json!(violation))
                    .collect();
                AppError::validation(details, "book failed validation")
            }
            not_found @ CatalogError::NotFound(_) => AppError::not_found(not_found.to_string()),
            CatalogError::Storage(err) => AppError::Internal(anyhow::Error::new(err)),
        }
    }
}
