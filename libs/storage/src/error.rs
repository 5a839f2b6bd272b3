use std::fmt;

#[derive(Debug)]
pub enum StoreError {
    /// No object stored under the requested key
    NotFound(String),
    /// The remote store rejected the operation for permission reasons
    AccessDenied(String),
    /// Transport failure, safe to retry
    Unavailable(anyhow::Error),
}

impl StoreError {
    pub(crate) fn from_opendal(key: &str, err: opendal::Error) -> Self {
        match err.kind() {
            opendal::ErrorKind::NotFound => StoreError::NotFound(key.to_string()),
            opendal::ErrorKind::PermissionDenied => StoreError::AccessDenied(key.to_string()),
            _ => StoreError::Unavailable(err.into()),
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound(key) => write!(f, "object not found: {}", key),
            StoreError::AccessDenied(key) => write!(f, "store access denied: {}", key),
            StoreError::Unavailable(err) => write!(f, "store unavailable: {}", err),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Unavailable(err) => err.source(),
            _ => None,
        }
    }
}
