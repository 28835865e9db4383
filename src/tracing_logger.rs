//! A [`TimerLogger`] that reports timed calls through `tracing`.

use tracing::{field, Span};

use crate::config::TracingConfig;
use crate::driver::Value;
use crate::logger::{TimerInfo, TimerLogger};
use crate::parser::ParsedSql;

/// Turns each timed driver call into a `db.call` span with one event inside it.
///
/// Failed calls are logged at ERROR, calls slower than
/// [`TracingConfig::slow_query_threshold`] at WARN, and everything else at DEBUG. The
/// span is a child of whatever span is current on the calling task, so database calls
/// nest under request spans.
///
/// # Span Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `otel.name` | Method plus SQL summary, e.g. `stmt.Query SELECT users` |
/// | `db.method` | Driver operation, e.g. `conn.Prepare` |
/// | `db.operation` | SQL verb (when there is query text) |
/// | `db.sql.table` | Target table name (when detectable) |
/// | `db.statement` | SQL text (when enabled) |
/// | `db.parameters` | Bound arguments (when enabled) |
/// | `db.duration_ms` | Time spent in the driver |
/// | `otel.status_code` | "OK" or "ERROR" |
/// | `error.message` | Error details (on failure) |
#[derive(Debug, Clone, Default)]
pub struct TracingLogger {
    config: TracingConfig,
}

impl TracingLogger {
    pub fn new(config: TracingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TracingConfig {
        &self.config
    }

    fn create_span(&self, info: &TimerInfo<'_>) -> Span {
        let parsed = (!info.query.is_empty()).then(|| ParsedSql::parse(info.query));
        let otel_name = match &parsed {
            Some(parsed) => format!("{} {}", info.method, parsed.summary()),
            None => info.method.to_string(),
        };

        let span = tracing::info_span!(
            "db.call",
            otel.name = %otel_name,
            db.method = info.method.as_str(),
            db.operation = field::Empty,
            db.sql.table = field::Empty,
            db.statement = field::Empty,
            db.parameters = field::Empty,
            db.name = field::Empty,
            db.duration_ms = field::Empty,
            otel.status_code = field::Empty,
            error.message = field::Empty,
            slow_query = field::Empty,
        );

        if let Some(parsed) = &parsed {
            span.record("db.operation", parsed.operation.as_str());
            if let Some(table) = &parsed.table {
                span.record("db.sql.table", table.as_str());
            }
        }

        if let Some(db_name) = &self.config.database_name {
            span.record("db.name", db_name.as_str());
        }

        if self.config.log_statements && !info.query.is_empty() {
            span.record(
                "db.statement",
                truncate(info.query, self.config.max_statement_len),
            );
        }

        if self.config.log_parameters {
            if let Some(args) = info.args {
                span.record("db.parameters", format_parameters(args).as_str());
            }
        }

        span
    }

    fn record_result(&self, span: &Span, info: &TimerInfo<'_>) {
        let duration = info.duration();
        let duration_ms = duration.as_millis() as i64;
        span.record("db.duration_ms", duration_ms);

        let slow = duration > self.config.slow_query_threshold;
        if slow {
            span.record("slow_query", true);
        }

        match info.err {
            None => {
                span.record("otel.status_code", "OK");
            }
            Some(e) => {
                span.record("otel.status_code", "ERROR");
                span.record("error.message", e.to_string().as_str());
                tracing::error!(
                    parent: span,
                    error = %e,
                    duration_ms = duration_ms,
                    "Database call failed"
                );
            }
        }

        if slow {
            let threshold_ms = self.config.slow_query_threshold.as_millis() as i64;
            tracing::warn!(
                parent: span,
                duration_ms = duration_ms,
                threshold_ms = threshold_ms,
                "Slow database call detected"
            );
        } else if info.err.is_none() {
            tracing::debug!(parent: span, duration_ms = duration_ms, "Database call completed");
        }
    }
}

impl TimerLogger for TracingLogger {
    fn log(&self, info: TimerInfo<'_>) {
        let span = self.create_span(&info);
        self.record_result(&span, &info);
    }
}

/// Cut `sql` to at most `max` bytes without splitting a character.
fn truncate(sql: &str, max: usize) -> &str {
    if sql.len() <= max {
        return sql;
    }
    let mut end = max;
    while !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

fn format_parameters(args: &[Value]) -> String {
    let rendered: Vec<String> = args.iter().map(ToString::to_string).collect();
    format!("[{}]", rendered.join(", "))
}
