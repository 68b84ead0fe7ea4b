//! Static Provider Registry
//!
//! Payment providers fixed at startup, kept in registration order.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use checkout_core::{Attributes, CheckoutError, ErrorMap, Result, ServiceType};

use crate::provider::{ConfiguredProvider, ProviderConfig};
use crate::service::{PaymentProvider, PaymentProviderService};

/// In-process registry of payment providers
pub struct StaticProviderService {
    providers: Vec<Arc<dyn PaymentProvider>>,
}

impl StaticProviderService {
    /// Build from providers; identifiers must be unique
    pub fn new(providers: Vec<Arc<dyn PaymentProvider>>) -> Result<Self> {
        let mut seen = HashSet::new();
        for provider in &providers {
            if !seen.insert(provider.id().to_string()) {
                return Err(CheckoutError::Config(format!(
                    "Duplicate payment provider: {}",
                    provider.id()
                )));
            }
        }

        Ok(Self { providers })
    }

    /// Build configured providers
    pub fn from_configs(configs: Vec<ProviderConfig>) -> Result<Self> {
        let providers = configs
            .into_iter()
            .map(|config| Arc::new(ConfiguredProvider::new(config)) as Arc<dyn PaymentProvider>)
            .collect();
        Self::new(providers)
    }

    /// Parse a JSON list of provider configs
    pub fn from_json(json: &str) -> Result<Self> {
        let configs: Vec<ProviderConfig> = serde_json::from_str(json)?;
        Self::from_configs(configs)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Provider identifiers in registry order
    pub fn ids(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.id()).collect()
    }
}

#[async_trait]
impl PaymentProviderService for StaticProviderService {
    async fn providers(&self, service_type: ServiceType) -> Result<Vec<Arc<dyn PaymentProvider>>> {
        match service_type {
            ServiceType::Payment => Ok(self.providers.clone()),
            ServiceType::Delivery => Ok(Vec::new()),
        }
    }

    async fn check_attributes(&self, provider_id: &str, attributes: &Attributes) -> Result<ErrorMap> {
        let provider = self.provider(ServiceType::Payment, provider_id).await?;
        provider.check_config_fe(attributes).await
    }
}
