//! Configured Payment Provider
//!
//! A provider whose costs, availability rules and customer attributes come
//! from a [`ProviderConfig`] record, e.g. loaded from a JSON file.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use checkout_core::{
    AttributeDefinition, AttributeType, Attributes, Basket, CheckoutError, ErrorMap, Price, Result,
    ServiceItem, ServiceType,
};

use crate::service::PaymentProvider;

/// Settings of one payment method
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider identifier, submitted as `c_paymentoption`
    pub id: String,

    pub label: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Fixed fee
    #[serde(default)]
    pub costs: Decimal,

    /// Fee in percent of the basket subtotal
    #[serde(default)]
    pub costs_percent: Decimal,

    #[serde(default)]
    pub tax_rate: Decimal,

    /// Minimum basket subtotal for the method to be offered
    #[serde(default)]
    pub min_total: Option<Decimal>,

    /// Maximum basket subtotal for the method to be offered
    #[serde(default)]
    pub max_total: Option<Decimal>,

    /// Accepted currencies, empty accepts all
    #[serde(default)]
    pub currencies: Vec<String>,

    /// Attributes the customer enters
    #[serde(default)]
    pub attributes: Vec<AttributeDefinition>,
}

impl ProviderConfig {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            description: None,
            costs: Decimal::ZERO,
            costs_percent: Decimal::ZERO,
            tax_rate: Decimal::ZERO,
            min_total: None,
            max_total: None,
            currencies: Vec::new(),
            attributes: Vec::new(),
        }
    }

    pub fn with_costs(mut self, costs: Decimal) -> Self {
        self.costs = costs;
        self
    }

    pub fn with_costs_percent(mut self, percent: Decimal) -> Self {
        self.costs_percent = percent;
        self
    }

    pub fn with_max_total(mut self, max: Decimal) -> Self {
        self.max_total = Some(max);
        self
    }

    pub fn with_min_total(mut self, min: Decimal) -> Self {
        self.min_total = Some(min);
        self
    }

    pub fn with_attribute(mut self, attribute: AttributeDefinition) -> Self {
        self.attributes.push(attribute);
        self
    }
}

/// Payment provider driven by a [`ProviderConfig`]
#[derive(Clone, Debug)]
pub struct ConfiguredProvider {
    config: ProviderConfig,
}

impl ConfiguredProvider {
    pub fn new(config: ProviderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn accepts_currency(&self, currency: &str) -> bool {
        self.config.currencies.is_empty()
            || self
                .config
                .currencies
                .iter()
                .any(|c| c.eq_ignore_ascii_case(currency))
    }
}

#[async_trait]
impl PaymentProvider for ConfiguredProvider {
    fn id(&self) -> &str {
        &self.config.id
    }

    fn service_item(&self) -> ServiceItem {
        let mut item = ServiceItem::new(&self.config.id, &self.config.label);
        item.description.clone_from(&self.config.description);
        item
    }

    async fn is_available(&self, basket: &Basket) -> Result<bool> {
        if !self.accepts_currency(&basket.currency) {
            return Ok(false);
        }

        let subtotal = basket.subtotal();
        let above_min = self.config.min_total.is_none_or(|min| subtotal >= min);
        let below_max = self.config.max_total.is_none_or(|max| subtotal <= max);

        Ok(above_min && below_max)
    }

    async fn calc_price(&self, basket: &Basket) -> Result<Price> {
        let costs = basket
            .subtotal()
            .checked_mul(self.config.costs_percent)
            .and_then(|c| c.checked_div(Decimal::ONE_HUNDRED))
            .and_then(|c| c.checked_add(self.config.costs))
            .ok_or_else(|| {
                CheckoutError::Provider(format!("Costs of \"{}\" exceed the decimal range", self.config.id))
            })?
            .round_dp(2);

        Ok(Price::new(&basket.currency)
            .with_costs(costs)
            .with_tax_rate(self.config.tax_rate))
    }

    async fn config_fe(&self, basket: &Basket) -> Result<Vec<AttributeDefinition>> {
        // Values entered earlier for this provider become the new defaults
        let entered = basket
            .services_of(ServiceType::Payment)
            .iter()
            .find(|s| s.provider_id == self.config.id)
            .map(|s| &s.attributes);

        let attributes = self
            .config
            .attributes
            .iter()
            .map(|def| match entered.and_then(|attrs| attrs.get(&def.code)) {
                Some(value) => def.clone().with_default(value.clone()),
                None => def.clone(),
            })
            .collect();

        Ok(attributes)
    }

    async fn check_config_fe(&self, attributes: &Attributes) -> Result<ErrorMap> {
        Ok(check_attributes(&self.config.attributes, attributes))
    }
}

/// Validate submitted values against attribute definitions.
///
/// Unknown submitted attributes are ignored.
pub fn check_attributes(definitions: &[AttributeDefinition], attributes: &Attributes) -> ErrorMap {
    let mut errors = ErrorMap::new();

    for def in definitions {
        let value = attributes.get(&def.code).filter(|v| !is_blank(v));

        let Some(value) = value else {
            if def.required {
                errors.insert(
                    def.code.clone(),
                    format!("Configuration for \"{}\" is missing", def.code),
                );
            }
            continue;
        };

        if let Some(message) = check_value(def, value) {
            errors.insert(def.code.clone(), message);
        }
    }

    errors
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn check_value(def: &AttributeDefinition, value: &Value) -> Option<String> {
    let valid = match (&def.kind, value) {
        (AttributeType::String, Value::String(_)) => true,
        (AttributeType::Number, Value::Number(_)) => true,
        (AttributeType::Number, Value::String(s)) => s.trim().parse::<Decimal>().is_ok(),
        (AttributeType::Boolean, Value::Bool(_)) => true,
        (AttributeType::Boolean, Value::String(s)) => {
            matches!(s.as_str(), "0" | "1" | "true" | "false")
        }
        (AttributeType::Select { options }, Value::String(s)) => {
            if !options.iter().any(|o| o == s) {
                return Some(format!("Invalid option for \"{}\"", def.code));
            }
            true
        }
        _ => false,
    };

    (!valid).then(|| format!("Invalid value for \"{}\"", def.code))
}
