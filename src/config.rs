//! Configuration for [`TracingLogger`](crate::TracingLogger).

use std::time::Duration;

/// Controls what [`TracingLogger`](crate::TracingLogger) records for each timed call.
///
/// # Example
///
/// ```rust
/// use sql_timer::TracingConfig;
/// use std::time::Duration;
///
/// let config = TracingConfig::default()
///     .with_statement_logging(true)
///     .with_slow_query_threshold(Duration::from_millis(100));
/// ```
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Whether to include the SQL text in spans.
    /// Default: `false` (query text may embed literals you don't want in traces)
    pub log_statements: bool,

    /// Whether to include bound arguments in spans.
    /// Default: `false` (arguments often carry user data)
    pub log_parameters: bool,

    /// Calls slower than this are logged at WARN with `slow_query = true`.
    /// Default: 500ms
    pub slow_query_threshold: Duration,

    /// Longest statement text recorded, in bytes. Longer text is cut at a char boundary.
    /// Default: 2048
    pub max_statement_len: usize,

    /// Database name recorded as `db.name`.
    /// Default: `None`
    pub database_name: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            log_statements: false,
            log_parameters: false,
            slow_query_threshold: Duration::from_millis(500),
            max_statement_len: 2048,
            database_name: None,
        }
    }
}

impl TracingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable SQL text in spans.
    ///
    /// **Security Warning**: queries built by string concatenation carry their values in
    /// the text itself.
    pub fn with_statement_logging(mut self, enabled: bool) -> Self {
        self.log_statements = enabled;
        self
    }

    /// Enable or disable argument values in spans.
    ///
    /// **Security Warning**: only enable in development or controlled environments.
    pub fn with_parameter_logging(mut self, enabled: bool) -> Self {
        self.log_parameters = enabled;
        self
    }

    pub fn with_slow_query_threshold(mut self, threshold: Duration) -> Self {
        self.slow_query_threshold = threshold;
        self
    }

    pub fn with_max_statement_len(mut self, len: usize) -> Self {
        self.max_statement_len = len;
        self
    }

    pub fn with_database_name(mut self, name: impl Into<String>) -> Self {
        self.database_name = Some(name.into());
        self
    }

    /// Log statements and parameters, flag anything over 100ms.
    ///
    /// **Warning**: Do not use in production.
    pub fn development() -> Self {
        Self {
            log_statements: true,
            log_parameters: true,
            slow_query_threshold: Duration::from_millis(100),
            ..Self::default()
        }
    }

    /// No statements or parameters, flag anything over one second.
    pub fn production() -> Self {
        Self {
            slow_query_threshold: Duration::from_secs(1),
            ..Self::default()
        }
    }
}
