//! Checkout Client Capability
//!
//! Every part of the checkout page (steps and their sub-parts) implements
//! [`CheckoutClient`]. Sub-parts are resolved by name through a
//! [`ClientRegistry`] when the page is assembled.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let mut registry = ClientRegistry::new();
//! registry.register("notice", |_config| Ok(Box::new(NoticeClient) as Box<dyn CheckoutClient>));
//!
//! let subparts = registry.create_all(&config.payment.subparts, &config)?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::CheckoutConfig;
use crate::error::{CheckoutError, Result};
use crate::view::CheckoutView;

/// Whether a step may let the customer advance
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    Complete,
    Incomplete,
}

impl StepOutcome {
    pub fn is_complete(self) -> bool {
        self == StepOutcome::Complete
    }

    /// Incomplete wins over complete
    pub fn and(self, other: StepOutcome) -> StepOutcome {
        if self.is_complete() { other } else { self }
    }
}

/// Capabilities shared by all checkout clients
#[async_trait]
pub trait CheckoutClient: Send + Sync {
    /// Client name used in configuration and logs
    fn name(&self) -> &str;

    /// HTML for the page body
    async fn body(&self, view: &mut CheckoutView, uid: &str) -> Result<String>;

    /// HTML for the page header
    async fn header(&self, view: &mut CheckoutView, uid: &str) -> Result<String>;

    /// Apply submitted input; only sets view values, produces no output
    async fn process(&self, view: &mut CheckoutView) -> Result<StepOutcome>;

    /// Stage the data templates need
    async fn prepare_view_data(&self, view: &mut CheckoutView) -> Result<()>;
}

/// Decide if a step produces output for the current request.
///
/// A step renders when it is the active one, or when both it and the active
/// step are part of the condensed one-page checkout.
pub fn step_visible(step: &str, active: Option<&str>, onepage: &[String]) -> bool {
    if active == Some(step) {
        return true;
    }

    let on_onepage = |name: &str| onepage.iter().any(|s| s == name);
    match active {
        Some(active) => on_onepage(step) && on_onepage(active),
        None => false,
    }
}

/// Concatenate the bodies of a list of clients
pub async fn render_bodies(
    clients: &[Box<dyn CheckoutClient>],
    view: &mut CheckoutView,
    uid: &str,
) -> Result<String> {
    let mut html = String::new();
    for client in clients {
        html.push_str(&client.body(view, uid).await?);
    }
    Ok(html)
}

/// Concatenate the headers of a list of clients
pub async fn render_headers(
    clients: &[Box<dyn CheckoutClient>],
    view: &mut CheckoutView,
    uid: &str,
) -> Result<String> {
    let mut html = String::new();
    for client in clients {
        html.push_str(&client.header(view, uid).await?);
    }
    Ok(html)
}

/// Constructor for a named client
pub type ClientFactory =
    Arc<dyn Fn(&CheckoutConfig) -> Result<Box<dyn CheckoutClient>> + Send + Sync>;

/// Registry of constructible clients
#[derive(Clone, Default)]
pub struct ClientRegistry {
    factories: HashMap<String, ClientFactory>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor under a name
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&CheckoutConfig) -> Result<Box<dyn CheckoutClient>> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Create a client by name
    pub fn create(&self, name: &str, config: &CheckoutConfig) -> Result<Box<dyn CheckoutClient>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| CheckoutError::Config(format!("Unknown checkout client: {name}")))?;
        factory(config)
    }

    /// Create clients in the given order
    pub fn create_all(
        &self,
        names: &[String],
        config: &CheckoutConfig,
    ) -> Result<Vec<Box<dyn CheckoutClient>>> {
        names.iter().map(|name| self.create(name, config)).collect()
    }
}
