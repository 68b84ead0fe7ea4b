//! Checkout payment HTTP server
//!
//! Axum-based server running the checkout payment step against a single
//! in-memory demo basket shared by all requests. Payment providers come from the JSON file named by
//! `CHECKOUT_PROVIDERS_FILE`, or a built-in set when unset.

mod handlers;
mod state;
mod templates;

use std::sync::Arc;

use anyhow::Context;
use axum::{Router, routing::{get, post}};
use rust_decimal_macros::dec;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use checkout_core::{
    AttributeDefinition, AttributeType, Basket, CheckoutConfig, ClientRegistry, DecoratorRegistry,
};
use checkout_payment::{MemoryBasketService, PaymentStep, ProviderConfig, StaticProviderService};

use crate::handlers::{add_product, get_basket, health_check, payment_options, payment_step};
use crate::state::AppState;

fn default_providers() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig::new("invoice", "Invoice").with_max_total(dec!(1000)),
        ProviderConfig::new("prepay", "Prepayment"),
        ProviderConfig::new("card", "Credit card")
            .with_costs(dec!(0.35))
            .with_costs_percent(dec!(1.4))
            .with_attribute(
                AttributeDefinition::new("cardNumber", "Card number", AttributeType::String).required(),
            )
            .with_attribute(AttributeDefinition::new(
                "brand",
                "Brand",
                AttributeType::Select { options: vec!["visa".into(), "mastercard".into()] },
            )),
        ProviderConfig::new("cod", "Cash on delivery")
            .with_costs(dec!(4.90))
            .with_max_total(dec!(500)),
    ]
}

fn load_providers() -> anyhow::Result<StaticProviderService> {
    match std::env::var("CHECKOUT_PROVIDERS_FILE") {
        Ok(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading payment providers from {path}"))?;
            Ok(StaticProviderService::from_json(&json)?)
        }
        Err(_) => Ok(StaticProviderService::from_configs(default_providers())?),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    let config = CheckoutConfig::from_env()?;
    tracing::info!(
        onepage = ?config.onepage,
        subparts = ?config.payment.subparts,
        decorators = ?config.payment.decorators,
        "checkout configuration loaded"
    );

    let providers = Arc::new(load_providers()?);
    tracing::info!("Registered {} payment providers:", providers.len());
    for id in providers.ids() {
        tracing::info!("  • {}", id);
    }

    let currency = std::env::var("CHECKOUT_CURRENCY").unwrap_or_else(|_| "EUR".into());
    let basket = Arc::new(MemoryBasketService::new(Basket::new(currency), providers.clone()));

    let payment = PaymentStep::new(
        config,
        basket.clone(),
        providers.clone(),
        Arc::new(templates::renderer()),
    )
    .assemble(&ClientRegistry::new(), &DecoratorRegistry::new())?;

    let state = AppState {
        payment: Arc::from(payment),
        basket,
        session: Arc::new(tokio::sync::Mutex::new(())),
        providers,
    };

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/basket", get(get_basket))
        .route("/basket/products", post(add_product))
        .route("/checkout/payment", post(payment_step))
        .route("/checkout/payment/options", get(payment_options))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("checkout server running on http://{}", addr);
    tracing::info!("  POST /basket/products          - Add a product");
    tracing::info!("  POST /checkout/payment         - Submit payment step");
    tracing::info!("  GET  /checkout/payment/options - Available payment options");

    axum::serve(listener, app).await?;

    Ok(())
}
