//! Checkout Configuration
//!
//! Step layout, template paths and client composition. Loaded from
//! environment variables or deserialized from any serde source.

use serde::{Deserialize, Serialize};

use crate::error::{CheckoutError, Result};

pub const DEFAULT_PAYMENT_TEMPLATE_BODY: &str = "checkout/standard/payment-body-standard";
pub const DEFAULT_PAYMENT_TEMPLATE_HEADER: &str = "checkout/standard/payment-header-standard";

/// Configuration of the checkout page
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutConfig {
    /// Steps rendered together on a condensed one-page checkout
    #[serde(default)]
    pub onepage: Vec<String>,

    /// Payment step settings
    #[serde(default)]
    pub payment: StepConfig,
}

/// Composition and templates of a single checkout step
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepConfig {
    /// Sub-clients rendered inside the step, in output order
    #[serde(default)]
    pub subparts: Vec<String>,

    /// Decorators wrapped around the step, outermost first
    #[serde(default)]
    pub decorators: Vec<String>,

    #[serde(default = "default_template_body")]
    pub template_body: String,

    #[serde(default = "default_template_header")]
    pub template_header: String,
}

fn default_template_body() -> String { DEFAULT_PAYMENT_TEMPLATE_BODY.into() }
fn default_template_header() -> String { DEFAULT_PAYMENT_TEMPLATE_HEADER.into() }

impl Default for StepConfig {
    fn default() -> Self {
        Self {
            subparts: Vec::new(),
            decorators: Vec::new(),
            template_body: default_template_body(),
            template_header: default_template_header(),
        }
    }
}

impl CheckoutConfig {
    /// Load from `CHECKOUT_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("CHECKOUT_ONEPAGE") {
            config.onepage = split_list(&value);
        }
        if let Some(value) = lookup("CHECKOUT_PAYMENT_SUBPARTS") {
            config.payment.subparts = split_list(&value);
        }
        if let Some(value) = lookup("CHECKOUT_PAYMENT_DECORATORS") {
            config.payment.decorators = split_list(&value);
        }
        if let Some(value) = lookup("CHECKOUT_PAYMENT_TEMPLATE_BODY") {
            config.payment.template_body = non_empty("CHECKOUT_PAYMENT_TEMPLATE_BODY", value)?;
        }
        if let Some(value) = lookup("CHECKOUT_PAYMENT_TEMPLATE_HEADER") {
            config.payment.template_header = non_empty("CHECKOUT_PAYMENT_TEMPLATE_HEADER", value)?;
        }

        Ok(config)
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn non_empty(key: &str, value: String) -> Result<String> {
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(CheckoutError::Config(format!("{key} must not be empty")));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = CheckoutConfig::from_lookup(lookup(&[])).unwrap();
        assert!(config.onepage.is_empty());
        assert_eq!(config.payment.template_body, DEFAULT_PAYMENT_TEMPLATE_BODY);
        assert_eq!(config.payment.template_header, DEFAULT_PAYMENT_TEMPLATE_HEADER);
    }

    #[test]
    fn test_lists_from_env() {
        let config = CheckoutConfig::from_lookup(lookup(&[
            ("CHECKOUT_ONEPAGE", "address, delivery,payment,,"),
            ("CHECKOUT_PAYMENT_DECORATORS", "tracing"),
            ("CHECKOUT_PAYMENT_TEMPLATE_BODY", "checkout/standard/payment-body-myshop"),
        ]))
        .unwrap();

        assert_eq!(config.onepage, ["address", "delivery", "payment"]);
        assert_eq!(config.payment.decorators, ["tracing"]);
        assert_eq!(config.payment.template_body, "checkout/standard/payment-body-myshop");
    }

    #[test]
    fn test_empty_template_rejected() {
        let result = CheckoutConfig::from_lookup(lookup(&[("CHECKOUT_PAYMENT_TEMPLATE_HEADER", "  ")]));
        assert!(matches!(result, Err(CheckoutError::Config(_))));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: CheckoutConfig = serde_json::from_str(r#"{"onepage":["payment"]}"#).unwrap();
        assert_eq!(config.onepage, ["payment"]);
        assert_eq!(config.payment, StepConfig::default());
    }
}
