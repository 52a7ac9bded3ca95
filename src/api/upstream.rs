//! Upstream Resolver
//!
//! The slow or flaky dependency that `/lookup` protects with the cache, the
//! rate limiter and retries.

use std::io;

/// Produces the value for a key.
pub trait Resolver: Send + Sync {
    fn resolve(&self, key: &str) -> io::Result<String>;
}

/// Derives the value from the key itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoResolver;

impl Resolver for EchoResolver {
    fn resolve(&self, key: &str) -> io::Result<String> {
        Ok(format!("value:{}", key))
    }
}

impl<F> Resolver for F
where
    F: Fn(&str) -> io::Result<String> + Send + Sync,
{
    fn resolve(&self, key: &str) -> io::Result<String> {
        self(key)
    }
}
