//! Telemetry Module
//!
//! Observability seams injected into every primitive. Nothing here installs
//! a subscriber; the binary does that.

mod logger;
mod tracer;

use std::fmt;
use std::sync::Arc;

pub use logger::{field, Field, Level, Logger, NoopLogger, TracingLogger};
pub use tracer::{NoopTracer, SpanHandle, Tracer, TracingTracer};

#[cfg(test)]
pub(crate) use logger::testing::RecordingLogger;
#[cfg(test)]
pub(crate) use tracer::testing::RecordingTracer;

// == Telemetry ==
/// Logger and tracer pair handed to each component.
///
/// The default is the no-op pair, so a component built without telemetry
/// stays silent.
#[derive(Clone)]
pub struct Telemetry {
    logger: Arc<dyn Logger>,
    tracer: Arc<dyn Tracer>,
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::noop()
    }
}

impl fmt::Debug for Telemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Telemetry").finish_non_exhaustive()
    }
}

impl Telemetry {
    pub fn noop() -> Self {
        Self {
            logger: Arc::new(NoopLogger),
            tracer: Arc::new(NoopTracer),
        }
    }

    /// Routes logs and spans into the `tracing` ecosystem.
    pub fn tracing() -> Self {
        Self {
            logger: Arc::new(TracingLogger),
            tracer: Arc::new(TracingTracer),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_tracer(mut self, tracer: Arc<dyn Tracer>) -> Self {
        self.tracer = tracer;
        self
    }

    pub fn logger(&self) -> &dyn Logger {
        self.logger.as_ref()
    }

    /// Opens a span on the configured tracer.
    pub fn span(&self, name: &'static str) -> Box<dyn SpanHandle> {
        self.tracer.start_span(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_logger_is_used() {
        let logger = Arc::new(RecordingLogger::default());
        let telemetry = Telemetry::default().with_logger(logger.clone());

        telemetry.logger().info("hello", &[field("k", "v")]);

        assert_eq!(logger.messages(Level::Info), vec!["hello".to_string()]);
    }

    #[test]
    fn test_custom_tracer_is_used() {
        let tracer = RecordingTracer::default();
        let telemetry = Telemetry::noop().with_tracer(Arc::new(tracer.clone()));

        telemetry.span("op").end();

        assert_eq!(tracer.events(), vec!["start:op", "end:op"]);
    }
}
