/// Errors produced by the data layer.
///
/// Every public service operation translates driver failures into exactly one
/// of these three kinds at its boundary; no raw `sqlx::Error` escapes.
#[derive(Debug)]
pub enum DataError {
    /// A required single-row lookup matched nothing.
    NotFound(String),
    /// A write violated a uniqueness or integrity constraint.
    Conflict(String),
    /// Any other store-level failure, or an error in service bookkeeping.
    Service(Box<dyn std::error::Error + Send + Sync>),
}

impl DataError {
    /// Construct a `Service` variant from any error type.
    pub fn service(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        DataError::Service(Box::new(err))
    }

    /// Construct a `Service` variant from a message.
    pub fn service_msg(msg: impl Into<String>) -> Self {
        DataError::Service(msg.into().into())
    }

    /// HTTP-style status classification for the layer that consumes this
    /// core. The core itself never builds responses.
    pub fn status(&self) -> u16 {
        match self {
            DataError::NotFound(_) => 404,
            DataError::Conflict(_) => 409,
            DataError::Service(_) => 500,
        }
    }
}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::NotFound(msg) => write!(f, "Not found: {msg}"),
            DataError::Conflict(msg) => write!(f, "Conflict: {msg}"),
            DataError::Service(err) => write!(f, "Service error: {err}"),
        }
    }
}

impl std::error::Error for DataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DataError::Service(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

/// Extension trait for translating `sqlx::Error` into `DataError`.
///
/// Kept as an explicit call rather than a `From` impl so that `?` cannot
/// silently leak an untranslated driver error out of a service method.
pub trait SqlxErrorExt {
    fn into_data_error(self) -> DataError;
}

impl SqlxErrorExt for sqlx::Error {
    fn into_data_error(self) -> DataError {
        match self {
            sqlx::Error::RowNotFound => DataError::NotFound("no record found".into()),
            sqlx::Error::Database(db) => {
                if db.is_unique_violation()
                    || db.is_foreign_key_violation()
                    || db.is_check_violation()
                {
                    tracing::error!(error = %db, "database integrity error");
                    DataError::Conflict(db.message().to_string())
                } else {
                    tracing::error!(error = %db, "database error during operation");
                    DataError::service(sqlx::Error::Database(db))
                }
            }
            other => {
                tracing::error!(error = %other, "database error during operation");
                DataError::service(other)
            }
        }
    }
}

/// Convenience alias for data-layer results.
pub type DataResult<T> = Result<T, DataError>;
