//! Error type shared by the driver traits and the timing decorators.

/// Boxed error carried by [`Error::Driver`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for driver operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by drivers and by the timing layer.
///
/// Only [`Error::InvalidConfiguration`] originates in the timing layer itself. Every
/// other variant comes from an inner driver and is handed back to the caller exactly
/// as the driver returned it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid timer connection name {name:?}: expected \"<driver> <connection string>\"")]
    InvalidConfiguration { name: String },

    #[error("sql: unknown driver {0:?} (forgotten registration?)")]
    UnknownDriver(String),

    #[error("driver: bad connection")]
    BadConnection,

    #[error("sql: {0} is closed")]
    Closed(&'static str),

    #[error(transparent)]
    Driver(BoxError),
}

impl Error {
    /// Wrap an arbitrary driver failure.
    pub fn driver(err: impl Into<BoxError>) -> Self {
        Error::Driver(err.into())
    }

    /// Returns true if this error reports a malformed composite connection name.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::InvalidConfiguration { .. })
    }
}
