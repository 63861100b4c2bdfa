use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("tracked record not found: {0}/{1}")]
    NotFound(String, String),

    #[error("invalid settings value for {0}")]
    InvalidSettingsValue(String),

    /// The store is reachable but a caller (e.g. the Reconciler) has
    /// decided to treat it as unavailable, such as after a connection-class
    /// `Database` error. Callers falling back to an in-memory shadow on
    /// this variant should not distinguish it from `Database` — it exists
    /// so test doubles can simulate the condition without constructing a
    /// `sea_orm::DbErr`.
    #[error("store degraded: {0}")]
    Degraded(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
