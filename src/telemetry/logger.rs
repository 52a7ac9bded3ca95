//! Logger Seam
//!
//! Leveled, structured log sink consumed by the cache, limiter and retry
//! executor. `TracingLogger` forwards to `tracing`; `NoopLogger` is the
//! stand-in when nothing is configured.

use std::fmt::{self, Display};

// == Level ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

// == Field ==
/// One key/value attribute attached to a log call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub key: &'static str,
    pub value: String,
}

impl Field {
    pub fn new(key: &'static str, value: impl Display) -> Self {
        Self {
            key,
            value: value.to_string(),
        }
    }
}

/// Shorthand for [`Field::new`].
pub fn field(key: &'static str, value: impl Display) -> Field {
    Field::new(key, value)
}

/// Renders fields as `key=value` pairs separated by spaces.
pub(crate) struct Fields<'a>(pub &'a [Field]);

impl Display for Fields<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}={}", field.key, field.value)?;
        }
        Ok(())
    }
}

// == Logger Trait ==
/// A structured log sink.
pub trait Logger: Send + Sync {
    fn log(&self, level: Level, message: &str, fields: &[Field]);

    fn debug(&self, message: &str, fields: &[Field]) {
        self.log(Level::Debug, message, fields);
    }

    fn info(&self, message: &str, fields: &[Field]) {
        self.log(Level::Info, message, fields);
    }

    fn warn(&self, message: &str, fields: &[Field]) {
        self.log(Level::Warn, message, fields);
    }

    fn error(&self, message: &str, fields: &[Field]) {
        self.log(Level::Error, message, fields);
    }
}

// == Noop Logger ==
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn log(&self, _level: Level, _message: &str, _fields: &[Field]) {}
}

// == Tracing Logger ==
/// Emits every call as a `tracing` event under the `infrakit` target.
///
/// Field names are only known at runtime, so they travel rendered in a
/// single `fields` attribute.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, level: Level, message: &str, fields: &[Field]) {
        let rendered = Fields(fields);
        match level {
            Level::Debug => tracing::debug!(target: "infrakit", fields = %rendered, "{}", message),
            Level::Info => tracing::info!(target: "infrakit", fields = %rendered, "{}", message),
            Level::Warn => tracing::warn!(target: "infrakit", fields = %rendered, "{}", message),
            Level::Error => tracing::error!(target: "infrakit", fields = %rendered, "{}", message),
        }
    }
}
