//! Tracer Seam
//!
//! Each public operation of the primitives opens a span through this trait.

use std::fmt::Display;

// == Span Handle ==
/// An open span. Dropping it without calling `end` also closes it.
pub trait SpanHandle: Send {
    fn set_attribute(&mut self, key: &'static str, value: String);

    fn record_error(&mut self, error: &dyn Display);

    fn end(self: Box<Self>);
}

// == Tracer Trait ==
pub trait Tracer: Send + Sync {
    fn start_span(&self, name: &'static str) -> Box<dyn SpanHandle>;
}

// == Noop ==
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracer;

#[derive(Debug)]
struct NoopSpan;

impl SpanHandle for NoopSpan {
    fn set_attribute(&mut self, _key: &'static str, _value: String) {}

    fn record_error(&mut self, _error: &dyn Display) {}

    fn end(self: Box<Self>) {}
}

impl Tracer for NoopTracer {
    fn start_span(&self, _name: &'static str) -> Box<dyn SpanHandle> {
        Box::new(NoopSpan)
    }
}

// == Tracing Backend ==
/// Maps spans onto `tracing` spans named `infrakit.op`.
///
/// Attributes are emitted as trace-level events parented to the span since
/// `tracing` fields must be declared up front.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTracer;

#[derive(Debug)]
struct TracingSpan {
    span: tracing::Span,
}

impl SpanHandle for TracingSpan {
    fn set_attribute(&mut self, key: &'static str, value: String) {
        tracing::trace!(parent: &self.span, attribute = key, value = %value);
    }

    fn record_error(&mut self, error: &dyn Display) {
        self.span.record("error", tracing::field::display(error));
    }

    fn end(self: Box<Self>) {}
}

impl Tracer for TracingTracer {
    fn start_span(&self, name: &'static str) -> Box<dyn SpanHandle> {
        let span = tracing::debug_span!(
            target: "infrakit",
            "infrakit.op",
            op = name,
            error = tracing::field::Empty
        );
        Box::new(TracingSpan { span })
    }
}
