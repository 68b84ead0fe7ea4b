//! # checkout-payment
//!
//! Payment step of the storefront checkout.
//!
//! ```text
//! request ──▶ process ──▶ PaymentProviderService::check_attributes
//!                │                    │ ok
//!                │                    ▼
//!                │          BasketService::add_service
//!                ▼
//!        step-active flag ──▶ prepare_view_data ──▶ body / header
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use checkout_payment::{MemoryBasketService, PaymentStep, StaticProviderService};
//!
//! let providers = Arc::new(StaticProviderService::from_configs(configs)?);
//! let basket = Arc::new(MemoryBasketService::new(Basket::new("EUR"), providers.clone()));
//! let step = PaymentStep::new(config, basket, providers, renderer);
//!
//! let mut view = CheckoutView::new(params);
//! step.process(&mut view).await?;
//! step.prepare_view_data(&mut view).await?;
//! let html = step.body(&mut view, "").await?;
//! ```

mod memory;
mod provider;
mod registry;
mod service;
mod step;

pub use memory::MemoryBasketService;
pub use provider::{ConfiguredProvider, ProviderConfig, check_attributes};
pub use registry::StaticProviderService;
pub use service::{BasketService, PaymentProvider, PaymentProviderService};
pub use step::{PARAM_ATTRIBUTES, PARAM_OPTION, PaymentStep, STEP_NAME};
