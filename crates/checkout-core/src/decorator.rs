//! Client Decorators
//!
//! Cross-cutting behaviour wrapped around a checkout client. The decorator
//! list comes from configuration; the first name becomes the outermost
//! wrapper.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::Instrument;

use crate::client::{CheckoutClient, StepOutcome};
use crate::error::{CheckoutError, Result};
use crate::view::CheckoutView;

/// Wraps a client into a decorated one
pub type DecoratorFactory =
    Arc<dyn Fn(Box<dyn CheckoutClient>) -> Box<dyn CheckoutClient> + Send + Sync>;

/// Registry of named decorators
#[derive(Clone)]
pub struct DecoratorRegistry {
    factories: HashMap<String, DecoratorFactory>,
}

impl Default for DecoratorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DecoratorRegistry {
    /// Registry with the built-in decorators
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register("tracing", |inner| Box::new(TracingDecorator::new(inner)));
        registry
    }

    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(Box<dyn CheckoutClient>) -> Box<dyn CheckoutClient> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    /// Wrap `client` with the named decorators, first name outermost
    pub fn decorate(
        &self,
        client: Box<dyn CheckoutClient>,
        names: &[String],
    ) -> Result<Box<dyn CheckoutClient>> {
        let factories = names
            .iter()
            .map(|name| {
                self.factories
                    .get(name)
                    .cloned()
                    .ok_or_else(|| CheckoutError::Config(format!("Unknown decorator: {name}")))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(factories
            .iter()
            .rev()
            .fold(client, |inner, factory| factory(inner)))
    }
}

/// Logs every capability call of the wrapped client with its duration
pub struct TracingDecorator {
    inner: Box<dyn CheckoutClient>,
}

impl TracingDecorator {
    pub fn new(inner: Box<dyn CheckoutClient>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl CheckoutClient for TracingDecorator {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn body(&self, view: &mut CheckoutView, uid: &str) -> Result<String> {
        let span = tracing::debug_span!("client.body", client = self.name(), uid);
        let start = Instant::now();
        let result = self.inner.body(view, uid).instrument(span).await;
        log_result(self.name(), "body", start, &result);
        result
    }

    async fn header(&self, view: &mut CheckoutView, uid: &str) -> Result<String> {
        let span = tracing::debug_span!("client.header", client = self.name(), uid);
        let start = Instant::now();
        let result = self.inner.header(view, uid).instrument(span).await;
        log_result(self.name(), "header", start, &result);
        result
    }

    async fn process(&self, view: &mut CheckoutView) -> Result<StepOutcome> {
        let span = tracing::debug_span!("client.process", client = self.name());
        let start = Instant::now();
        let result = self.inner.process(view).instrument(span).await;
        log_result(self.name(), "process", start, &result);
        result
    }

    async fn prepare_view_data(&self, view: &mut CheckoutView) -> Result<()> {
        let span = tracing::debug_span!("client.prepare_view_data", client = self.name());
        let start = Instant::now();
        let result = self.inner.prepare_view_data(view).instrument(span).await;
        log_result(self.name(), "prepare_view_data", start, &result);
        result
    }
}

fn log_result<T>(client: &str, op: &str, start: Instant, result: &Result<T>) {
    let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
    match result {
        Ok(_) => tracing::debug!(client, op, elapsed_ms, "client call finished"),
        Err(e) if e.is_user_facing() => {
            tracing::info!(client, op, elapsed_ms, error = %e, "client call rejected input");
        }
        Err(e) => tracing::error!(client, op, elapsed_ms, error = %e, "client call failed"),
    }
}
