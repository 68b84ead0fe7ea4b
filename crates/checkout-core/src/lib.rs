//! # checkout-core
//!
//! Building blocks shared by the clients of the storefront checkout page.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Decorators (config)                      │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │  CheckoutClient (step)  ──▶  sub-clients (config)      │  │
//! │  │      │ process / prepare_view_data                     │  │
//! │  │      ▼                                                 │  │
//! │  │  CheckoutView  ──▶  Renderer (template path)           │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Steps never look up collaborators by name at call time; they receive
//! typed handles when they are constructed.

pub mod client;
pub mod config;
pub mod decorator;
pub mod error;
pub mod model;
pub mod params;
pub mod render;
pub mod view;

pub use client::{CheckoutClient, ClientRegistry, StepOutcome, step_visible};
pub use config::{CheckoutConfig, StepConfig};
pub use decorator::{DecoratorRegistry, TracingDecorator};
pub use error::{CheckoutError, ErrorMap, Result};
pub use model::{
    AttributeDefinition, AttributeType, Attributes, Basket, BasketProduct, OrderService, Price,
    ServiceItem, ServiceType,
};
pub use params::RequestParams;
pub use render::{Renderer, TemplateRenderer};
pub use view::{CheckoutView, PaymentOption};
