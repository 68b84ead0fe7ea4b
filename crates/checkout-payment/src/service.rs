//! Collaborator Interfaces
//!
//! The payment step talks to the basket and to the payment providers only
//! through these traits. Implementations may perform I/O (remote
//! validation, price APIs); timeouts and retries are their concern.

use std::sync::Arc;

use async_trait::async_trait;

use checkout_core::{
    AttributeDefinition, Attributes, Basket, CheckoutError, ErrorMap, Price, Result,
    ServiceItem, ServiceType,
};

/// Owner of the basket of the current checkout session
#[async_trait]
pub trait BasketService: Send + Sync {
    /// Current basket state
    async fn get(&self) -> Result<Basket>;

    /// Remove all services of a type
    async fn delete_service(&self, service_type: ServiceType) -> Result<()>;

    /// Attach the service offered by `provider_id`, replacing any service of that type
    async fn add_service(
        &self,
        service_type: ServiceType,
        provider_id: &str,
        attributes: Attributes,
    ) -> Result<()>;
}

/// A configured payment method
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Identifier, unique within the registry
    fn id(&self) -> &str;

    /// Display data
    fn service_item(&self) -> ServiceItem;

    /// Whether the method can be used for this basket
    async fn is_available(&self, basket: &Basket) -> Result<bool>;

    /// Price of the method for this basket
    async fn calc_price(&self, basket: &Basket) -> Result<Price>;

    /// Attributes the customer has to enter, pre-filled for this basket
    async fn config_fe(&self, basket: &Basket) -> Result<Vec<AttributeDefinition>>;

    /// Check submitted attributes, returns attribute code to message
    async fn check_config_fe(&self, attributes: &Attributes) -> Result<ErrorMap>;
}

/// Registry of providers and entry point for attribute checks
#[async_trait]
pub trait PaymentProviderService: Send + Sync {
    /// Providers of a service type in registry order
    async fn providers(&self, service_type: ServiceType) -> Result<Vec<Arc<dyn PaymentProvider>>>;

    /// Check the attributes submitted for a provider, empty map means valid
    async fn check_attributes(&self, provider_id: &str, attributes: &Attributes) -> Result<ErrorMap>;

    /// Look up a single provider
    async fn provider(
        &self,
        service_type: ServiceType,
        provider_id: &str,
    ) -> Result<Arc<dyn PaymentProvider>> {
        self.providers(service_type)
            .await?
            .into_iter()
            .find(|p| p.id() == provider_id)
            .ok_or_else(|| CheckoutError::ProviderNotFound(provider_id.to_string()))
    }
}
