//! Domain Models
//!
//! Basket, service and price types shared by all checkout steps.
//! Uses `rust_decimal` for all monetary values.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CheckoutError, Result};

/// Attribute values submitted for one service, keyed by attribute code
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// Kind of non-product line item attached to a basket
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    Delivery,
    Payment,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Delivery => "delivery",
            ServiceType::Payment => "payment",
        }
    }
}

impl std::fmt::Display for ServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ServiceType {
    type Err = CheckoutError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "delivery" => Ok(ServiceType::Delivery),
            "payment" => Ok(ServiceType::Payment),
            other => Err(CheckoutError::Config(format!("Unknown service type: {other}"))),
        }
    }
}

/// A price as shown to the customer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Three letter currency code
    pub currency: String,

    /// Value of the item itself
    pub value: Decimal,

    /// Additional costs (shipping, payment fees)
    pub costs: Decimal,

    /// Granted rebate
    pub rebate: Decimal,

    /// Tax rate in percent
    pub tax_rate: Decimal,
}

impl Price {
    pub fn new(currency: impl Into<String>) -> Self {
        Self {
            currency: currency.into().to_uppercase(),
            value: Decimal::ZERO,
            costs: Decimal::ZERO,
            rebate: Decimal::ZERO,
            tax_rate: Decimal::ZERO,
        }
    }

    pub fn with_costs(mut self, costs: Decimal) -> Self {
        self.costs = costs;
        self
    }

    pub fn with_tax_rate(mut self, tax_rate: Decimal) -> Self {
        self.tax_rate = tax_rate;
        self
    }

    /// Amount the customer pays for this price
    pub fn total(&self) -> Decimal {
        self.value + self.costs - self.rebate
    }
}

/// Display data of a configured service (payment or delivery option)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceItem {
    /// Unique code within the service type
    pub code: String,

    /// Human readable label
    pub label: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub image: Option<String>,
}

impl ServiceItem {
    pub fn new(code: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            label: label.into(),
            description: None,
            image: None,
        }
    }
}

/// Value type of a front-end attribute
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AttributeType {
    String,
    Number,
    Boolean,
    Select { options: Vec<String> },
}

/// Schema of one attribute a customer enters for a service
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDefinition {
    /// Attribute code, used as key in submissions and error maps
    pub code: String,

    /// Human readable label
    pub label: String,

    #[serde(flatten)]
    pub kind: AttributeType,

    #[serde(default)]
    pub required: bool,

    /// Pre-filled value
    #[serde(default)]
    pub default: Option<serde_json::Value>,
}

impl AttributeDefinition {
    pub fn new(code: impl Into<String>, label: impl Into<String>, kind: AttributeType) -> Self {
        Self {
            code: code.into(),
            label: label.into(),
            kind,
            required: false,
            default: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, value: serde_json::Value) -> Self {
        self.default = Some(value);
        self
    }
}

/// A service attached to a basket
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderService {
    pub service_type: ServiceType,

    /// Provider identifier the service was chosen from
    pub provider_id: String,

    pub code: String,
    pub label: String,

    /// Attributes the customer entered
    pub attributes: Attributes,

    pub price: Price,
}

/// A product line in the basket
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasketProduct {
    pub code: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl BasketProduct {
    pub fn new(code: impl Into<String>, quantity: u32, unit_price: Decimal) -> Self {
        Self {
            code: code.into(),
            quantity,
            unit_price,
        }
    }

    /// Line total, `None` when it exceeds the decimal range
    pub fn checked_total(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(Decimal::from(self.quantity))
    }

    pub fn total(&self) -> Decimal {
        self.unit_price.saturating_mul(Decimal::from(self.quantity))
    }
}

/// The in-progress order of a checkout session
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Basket {
    pub id: Uuid,
    pub currency: String,
    pub products: Vec<BasketProduct>,
    services: BTreeMap<ServiceType, Vec<OrderService>>,
    pub updated_at: DateTime<Utc>,
}

impl Basket {
    pub fn new(currency: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            currency: currency.into().to_uppercase(),
            products: Vec::new(),
            services: BTreeMap::new(),
            updated_at: Utc::now(),
        }
    }

    /// Attached services keyed by type
    pub fn services(&self) -> &BTreeMap<ServiceType, Vec<OrderService>> {
        &self.services
    }

    /// Services of one type, empty if none attached
    pub fn services_of(&self, service_type: ServiceType) -> &[OrderService] {
        self.services
            .get(&service_type)
            .map_or(&[], Vec::as_slice)
    }

    pub fn has_service(&self, service_type: ServiceType) -> bool {
        !self.services_of(service_type).is_empty()
    }

    /// Attach a service, replacing any service of the same type
    pub fn set_service(&mut self, service: OrderService) {
        self.services.insert(service.service_type, vec![service]);
        self.touch();
    }

    /// Remove all services of a type
    pub fn delete_service(&mut self, service_type: ServiceType) {
        if self.services.remove(&service_type).is_some() {
            self.touch();
        }
    }

    /// Add a product line, merging quantities of the same code
    ///
    /// Rejected without touching the basket if the quantity or the basket
    /// value would overflow.
    pub fn add_product(&mut self, product: BasketProduct) -> Result<()> {
        let mut products = self.products.clone();

        if let Some(existing) = products.iter_mut().find(|p| p.code == product.code) {
            existing.quantity = existing
                .quantity
                .checked_add(product.quantity)
                .ok_or_else(|| CheckoutError::Basket(format!("Quantity of \"{}\" is too large", product.code)))?;
        } else {
            products.push(product);
        }

        if checked_subtotal(&products).is_none() {
            return Err(CheckoutError::Basket("Basket value is too large".into()));
        }

        self.products = products;
        self.touch();
        Ok(())
    }

    /// Sum of all product lines, services excluded
    pub fn subtotal(&self) -> Decimal {
        self.products
            .iter()
            .fold(Decimal::ZERO, |sum, p| sum.saturating_add(p.total()))
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

fn checked_subtotal(products: &[BasketProduct]) -> Option<Decimal> {
    products
        .iter()
        .try_fold(Decimal::ZERO, |sum, p| sum.checked_add(p.checked_total()?))
}
