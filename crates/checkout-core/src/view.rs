//! Render Context
//!
//! Typed values exchanged between checkout clients during one request:
//! `process` and `prepare_view_data` write into it, templates read from it.

use serde::{Deserialize, Serialize};

use crate::error::ErrorMap;
use crate::model::{AttributeDefinition, Price, ServiceItem};
use crate::params::RequestParams;

/// A selectable payment option prepared for display
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaymentOption {
    /// Provider identifier, submitted back as `c_paymentoption`
    pub id: String,
    pub service: ServiceItem,
    pub price: Price,
    pub attributes: Vec<AttributeDefinition>,
}

/// View state of the checkout page for one request
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CheckoutView {
    /// Submitted request parameters
    #[serde(skip_serializing, default)]
    pub params: RequestParams,

    /// Step that must be shown to the customer
    pub standard_step_active: Option<String>,

    /// Errors collected by all steps
    pub standard_error_list: ErrorMap,

    /// Errors of the last validated payment option
    pub payment_error: ErrorMap,

    /// Available payment options in registry order
    pub payment_options: Vec<PaymentOption>,

    /// Concatenated output of the payment sub-clients
    pub payment_body: String,
    pub payment_header: String,
}

impl CheckoutView {
    pub fn new(params: RequestParams) -> Self {
        Self {
            params,
            ..Default::default()
        }
    }

    pub fn with_active_step(mut self, step: impl Into<String>) -> Self {
        self.standard_step_active = Some(step.into());
        self
    }

    pub fn active_step(&self) -> Option<&str> {
        self.standard_step_active.as_deref()
    }

    /// Add errors to the step error list, keeping messages already present
    pub fn merge_errors(&mut self, errors: &ErrorMap) {
        for (code, message) in errors {
            self.standard_error_list
                .entry(code.clone())
                .or_insert_with(|| message.clone());
        }
    }

    pub fn payment_option(&self, id: &str) -> Option<&PaymentOption> {
        self.payment_options.iter().find(|o| o.id == id)
    }

    /// Display items keyed by provider id
    pub fn payment_services(&self) -> impl Iterator<Item = (&str, &ServiceItem)> {
        self.payment_options.iter().map(|o| (o.id.as_str(), &o.service))
    }

    /// Prices keyed by provider id
    pub fn payment_service_prices(&self) -> impl Iterator<Item = (&str, &Price)> {
        self.payment_options.iter().map(|o| (o.id.as_str(), &o.price))
    }

    /// Attribute schemas keyed by provider id
    pub fn payment_service_attributes(
        &self,
    ) -> impl Iterator<Item = (&str, &[AttributeDefinition])> {
        self.payment_options
            .iter()
            .map(|o| (o.id.as_str(), o.attributes.as_slice()))
    }
}
