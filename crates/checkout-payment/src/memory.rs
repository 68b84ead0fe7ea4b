//! In-Memory Basket
//!
//! Basket service holding the basket of one checkout session in process
//! memory (for development and tests).

use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use checkout_core::{Attributes, Basket, BasketProduct, CheckoutError, OrderService, Result, ServiceType};

use crate::service::{BasketService, PaymentProviderService};

/// Basket kept behind a lock, services resolved through a provider registry
pub struct MemoryBasketService {
    basket: RwLock<Basket>,
    providers: Arc<dyn PaymentProviderService>,
}

impl MemoryBasketService {
    pub fn new(basket: Basket, providers: Arc<dyn PaymentProviderService>) -> Self {
        Self {
            basket: RwLock::new(basket),
            providers,
        }
    }

    /// Add a product line to the basket
    pub fn add_product(&self, product: BasketProduct) -> Result<()> {
        self.write(|basket| basket.add_product(product))?
    }

    fn read(&self) -> Result<Basket> {
        self.basket
            .read()
            .map(|basket| basket.clone())
            .map_err(|_| CheckoutError::Basket("basket lock poisoned".into()))
    }

    fn write<F, T>(&self, change: F) -> Result<T>
    where
        F: FnOnce(&mut Basket) -> T,
    {
        let mut basket = self
            .basket
            .write()
            .map_err(|_| CheckoutError::Basket("basket lock poisoned".into()))?;
        Ok(change(&mut basket))
    }
}

#[async_trait]
impl BasketService for MemoryBasketService {
    async fn get(&self) -> Result<Basket> {
        self.read()
    }

    async fn delete_service(&self, service_type: ServiceType) -> Result<()> {
        self.write(|basket| basket.delete_service(service_type))
    }

    async fn add_service(
        &self,
        service_type: ServiceType,
        provider_id: &str,
        attributes: Attributes,
    ) -> Result<()> {
        let snapshot = self.read()?;
        let provider = self.providers.provider(service_type, provider_id).await?;

        if !provider.is_available(&snapshot).await? {
            return Err(CheckoutError::Provider(format!(
                "Service \"{provider_id}\" is not available for this basket"
            )));
        }

        let item = provider.service_item();
        let price = provider.calc_price(&snapshot).await?;

        tracing::debug!(%service_type, provider_id, "attaching service to basket");

        self.write(|basket| {
            basket.set_service(OrderService {
                service_type,
                provider_id: provider_id.to_string(),
                code: item.code,
                label: item.label,
                attributes,
                price,
            });
        })
    }
}
