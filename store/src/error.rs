use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to connect to {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("invalid identifier {0:?}: only ASCII letters, digits and '_' are allowed")]
    InvalidIdentifier(String),

    #[error("insert failed: {0}")]
    Insert(#[source] sqlx::Error),

    #[error("failed to reset collection {collection}: {source}")]
    Reset {
        collection: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("failed to create index on {field}: {source}")]
    Index {
        field: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("record encoding failed: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("store rejected operation: {0}")]
    Rejected(String),
}
