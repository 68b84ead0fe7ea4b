//! Payment step behaviour against in-memory collaborators.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use rust_decimal_macros::dec;
use serde_json::json;

use checkout_core::{
    AttributeDefinition, AttributeType, Attributes, Basket, BasketProduct, CheckoutClient,
    CheckoutConfig, CheckoutError, CheckoutView, ClientRegistry, DecoratorRegistry, ErrorMap,
    RequestParams, Result, ServiceType, StepOutcome, TemplateRenderer,
};
use checkout_payment::{
    BasketService, MemoryBasketService, PaymentProvider, PaymentProviderService, PaymentStep,
    ProviderConfig, StaticProviderService,
};

/// Counts calls before delegating to the wrapped basket
struct CountingBasket {
    inner: MemoryBasketService,
    calls: AtomicUsize,
    added: AtomicUsize,
}

#[async_trait]
impl BasketService for CountingBasket {
    async fn get(&self) -> Result<Basket> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get().await
    }

    async fn delete_service(&self, service_type: ServiceType) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.delete_service(service_type).await
    }

    async fn add_service(
        &self,
        service_type: ServiceType,
        provider_id: &str,
        attributes: Attributes,
    ) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.added.fetch_add(1, Ordering::SeqCst);
        self.inner.add_service(service_type, provider_id, attributes).await
    }
}

/// Counts calls before delegating to the wrapped registry
struct CountingProviders {
    inner: StaticProviderService,
    calls: AtomicUsize,
    checked: AtomicUsize,
}

#[async_trait]
impl PaymentProviderService for CountingProviders {
    async fn providers(&self, service_type: ServiceType) -> Result<Vec<Arc<dyn PaymentProvider>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.providers(service_type).await
    }

    async fn check_attributes(&self, provider_id: &str, attributes: &Attributes) -> Result<ErrorMap> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.checked.fetch_add(1, Ordering::SeqCst);
        self.inner.check_attributes(provider_id, attributes).await
    }
}

struct Fixture {
    basket: Arc<CountingBasket>,
    providers: Arc<CountingProviders>,
    step: PaymentStep,
}

impl Fixture {
    fn collaborator_calls(&self) -> usize {
        self.basket.calls.load(Ordering::SeqCst) + self.providers.calls.load(Ordering::SeqCst)
    }

    async fn payment_ids(&self) -> Vec<String> {
        self.basket
            .get()
            .await
            .unwrap()
            .services_of(ServiceType::Payment)
            .iter()
            .map(|s| s.provider_id.clone())
            .collect()
    }
}

fn default_providers() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig::new("invoice", "Invoice"),
        ProviderConfig::new("card", "Credit card")
            .with_costs(dec!(0.35))
            .with_attribute(
                AttributeDefinition::new("cardNumber", "Card number", AttributeType::String)
                    .required(),
            ),
        ProviderConfig::new("cod", "Cash on delivery")
            .with_costs(dec!(4.90))
            .with_max_total(dec!(100)),
    ]
}

fn renderer() -> Arc<TemplateRenderer> {
    Arc::new(
        TemplateRenderer::new()
            .with_template("checkout/standard/payment-body-standard", |view| {
                format!("<section class=\"payment\">{}</section>", view.payment_body)
            })
            .with_template("checkout/standard/payment-header-standard", |view| {
                format!("<meta name=\"payment\">{}", view.payment_header)
            }),
    )
}

fn fixture_with(config: CheckoutConfig, providers: Vec<ProviderConfig>, subtotal: rust_decimal::Decimal) -> Fixture {
    let registry = Arc::new(StaticProviderService::from_configs(providers.clone()).unwrap());
    let memory = MemoryBasketService::new(Basket::new("EUR"), registry);
    memory.add_product(BasketProduct::new("shirt", 1, subtotal)).unwrap();

    let basket = Arc::new(CountingBasket {
        inner: memory,
        calls: AtomicUsize::new(0),
        added: AtomicUsize::new(0),
    });
    let providers = Arc::new(CountingProviders {
        inner: StaticProviderService::from_configs(providers).unwrap(),
        calls: AtomicUsize::new(0),
        checked: AtomicUsize::new(0),
    });

    let step = PaymentStep::new(config, basket.clone(), providers.clone(), renderer());
    Fixture { basket, providers, step }
}

fn fixture() -> Fixture {
    fixture_with(CheckoutConfig::default(), default_providers(), dec!(150))
}

fn view(params: serde_json::Value) -> CheckoutView {
    CheckoutView::new(RequestParams::from_value(params))
}

#[tokio::test]
async fn hidden_step_renders_nothing_and_calls_nobody() {
    let fx = fixture();

    let mut v = view(json!({})).with_active_step("delivery");
    assert_eq!(fx.step.body(&mut v, "").await.unwrap(), "");
    assert_eq!(fx.step.header(&mut v, "").await.unwrap(), "");

    let mut v = view(json!({}));
    assert_eq!(fx.step.body(&mut v, "").await.unwrap(), "");

    assert_eq!(fx.collaborator_calls(), 0);
}

#[tokio::test]
async fn active_step_renders_templates() {
    let fx = fixture();

    let mut v = view(json!({})).with_active_step("payment");
    assert_eq!(fx.step.body(&mut v, "").await.unwrap(), "<section class=\"payment\"></section>");
    assert_eq!(fx.step.header(&mut v, "").await.unwrap(), "<meta name=\"payment\">");
}

#[tokio::test]
async fn onepage_renders_with_other_active_step() {
    let config = CheckoutConfig {
        onepage: vec!["delivery".into(), "payment".into()],
        ..Default::default()
    };
    let fx = fixture_with(config, default_providers(), dec!(20));

    let mut v = view(json!({})).with_active_step("delivery");
    assert!(fx.step.should_render(&v));
    assert!(!fx.step.body(&mut v, "").await.unwrap().is_empty());

    let v = view(json!({})).with_active_step("address");
    assert!(!fx.step.should_render(&v));
}

#[tokio::test]
async fn valid_choice_is_stored() {
    let fx = fixture();

    let mut v = view(json!({ "c_paymentoption": "invoice" }));
    let outcome = fx.step.process(&mut v).await.unwrap();

    assert_eq!(outcome, StepOutcome::Complete);
    assert_eq!(fx.payment_ids().await, ["invoice"]);
    assert!(v.standard_step_active.is_none());
    assert!(v.payment_error.is_empty());
}

#[tokio::test]
async fn new_choice_replaces_previous_one() {
    let fx = fixture();

    let mut v = view(json!({ "c_paymentoption": "invoice" }));
    fx.step.process(&mut v).await.unwrap();

    let mut v = view(json!({
        "c_paymentoption": "card",
        "c_payment": { "card": { "cardNumber": "4111111111111111" } }
    }));
    fx.step.process(&mut v).await.unwrap();

    let basket = fx.basket.get().await.unwrap();
    let services = basket.services_of(ServiceType::Payment);
    assert_eq!(services.len(), 1);
    assert_eq!(services[0].provider_id, "card");
    assert_eq!(services[0].attributes["cardNumber"], "4111111111111111");
}

#[tokio::test]
async fn invalid_choice_keeps_step_active() {
    let fx = fixture();

    let mut v = view(json!({ "c_paymentoption": "invoice" }));
    fx.step.process(&mut v).await.unwrap();

    let mut v = view(json!({ "c_paymentoption": "card", "c_payment": { "card": {} } }));
    let err = fx.step.process(&mut v).await.unwrap_err();

    assert!(err.is_user_facing());
    assert_eq!(err.to_string(), "Please recheck your payment choice");
    assert!(err.errors().is_some_and(|e| e.contains_key("cardNumber")));

    assert_eq!(v.active_step(), Some("payment"));
    assert!(v.payment_error.contains_key("cardNumber"));
    assert!(v.standard_error_list.contains_key("cardNumber"));
    assert!(fx.payment_ids().await.is_empty());
}

#[tokio::test]
async fn error_list_keeps_existing_messages() {
    let fx = fixture();

    let mut v = view(json!({ "c_paymentoption": "card" }));
    v.standard_error_list.insert("cardNumber".into(), "earlier".into());

    fx.step.process(&mut v).await.unwrap_err();
    assert_eq!(v.standard_error_list["cardNumber"], "earlier");
}

#[tokio::test]
async fn first_failing_id_aborts_remaining() {
    let fx = fixture();

    let mut v = view(json!({ "c_paymentoption": ["invoice", "card", "cod"] }));
    let err = fx.step.process(&mut v).await.unwrap_err();

    assert!(matches!(err, CheckoutError::Validation { .. }));
    assert_eq!(fx.providers.checked.load(Ordering::SeqCst), 2);
    assert_eq!(fx.basket.added.load(Ordering::SeqCst), 1);
    assert_eq!(fx.payment_ids().await, ["invoice"]);
}

#[tokio::test]
async fn system_fault_propagates_unchanged() {
    let fx = fixture();

    let mut v = view(json!({ "c_paymentoption": "bitcoin" }));
    let err = fx.step.process(&mut v).await.unwrap_err();

    assert!(matches!(err, CheckoutError::ProviderNotFound(ref id) if id == "bitcoin"));
    assert!(!err.is_user_facing());
    assert_eq!(v.active_step(), Some("payment"));
}

#[tokio::test]
async fn unavailable_choice_is_a_system_fault() {
    // cod is limited to baskets up to 100
    let fx = fixture();

    let mut v = view(json!({ "c_paymentoption": "cod" }));
    let err = fx.step.process(&mut v).await.unwrap_err();

    assert!(matches!(err, CheckoutError::Provider(_)));
    assert_eq!(v.active_step(), Some("payment"));
}

#[tokio::test]
async fn missing_choice_is_idempotent() {
    let fx = fixture();
    let before = fx.basket.get().await.unwrap();

    let mut first = view(json!({}));
    let first_outcome = fx.step.process(&mut first).await.unwrap();
    let mut second = view(json!({}));
    let second_outcome = fx.step.process(&mut second).await.unwrap();

    assert_eq!(fx.basket.get().await.unwrap(), before);
    assert_eq!(fx.basket.added.load(Ordering::SeqCst), 0);
    assert_eq!(first_outcome, StepOutcome::Incomplete);
    assert_eq!(first_outcome, second_outcome);
    assert_eq!(first.active_step(), Some("payment"));
    assert_eq!(first.active_step(), second.active_step());
}

#[tokio::test]
async fn earlier_active_step_is_kept() {
    let fx = fixture();

    let mut v = view(json!({})).with_active_step("address");
    let outcome = fx.step.process(&mut v).await.unwrap();

    assert_eq!(outcome, StepOutcome::Complete);
    assert_eq!(v.active_step(), Some("address"));
}

#[tokio::test]
async fn no_providers_never_forces_step() {
    let fx = fixture_with(CheckoutConfig::default(), Vec::new(), dec!(10));

    let mut v = view(json!({}));
    let outcome = fx.step.process(&mut v).await.unwrap();

    assert_eq!(outcome, StepOutcome::Complete);
    assert!(v.standard_step_active.is_none());
}

#[tokio::test]
async fn unavailable_providers_are_not_offered() {
    let fx = fixture();

    let mut v = view(json!({}));
    fx.step.prepare_view_data(&mut v).await.unwrap();

    let ids: Vec<&str> = v.payment_services().map(|(id, _)| id).collect();
    assert_eq!(ids, ["invoice", "card"]);

    let card = v.payment_option("card").unwrap();
    assert_eq!(card.price.costs, dec!(0.35));
    assert_eq!(card.attributes.len(), 1);
    assert_eq!(v.payment_service_prices().count(), 2);
    assert_eq!(v.payment_service_attributes().count(), 2);

    // preparing data never touches the basket contents
    assert!(fx.payment_ids().await.is_empty());
}

#[tokio::test]
async fn small_basket_offers_all_providers() {
    let fx = fixture_with(CheckoutConfig::default(), default_providers(), dec!(40));

    let mut v = view(json!({}));
    fx.step.prepare_view_data(&mut v).await.unwrap();

    let ids: Vec<&str> = v.payment_services().map(|(id, _)| id).collect();
    assert_eq!(ids, ["invoice", "card", "cod"]);
}

/// Sub-part that asks for a confirmation checkbox
struct TermsClient;

#[async_trait]
impl CheckoutClient for TermsClient {
    fn name(&self) -> &str {
        "terms"
    }

    async fn body(&self, _view: &mut CheckoutView, _uid: &str) -> Result<String> {
        Ok("<input name=\"c_terms\">".into())
    }

    async fn header(&self, _view: &mut CheckoutView, _uid: &str) -> Result<String> {
        Ok("<script src=\"terms.js\"></script>".into())
    }

    async fn process(&self, view: &mut CheckoutView) -> Result<StepOutcome> {
        if view.params.contains("c_terms") {
            Ok(StepOutcome::Complete)
        } else {
            Ok(StepOutcome::Incomplete)
        }
    }

    async fn prepare_view_data(&self, _view: &mut CheckoutView) -> Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn assembled_step_includes_subparts_and_decorators() {
    let mut config = CheckoutConfig::default();
    config.payment.subparts = vec!["terms".into()];
    config.payment.decorators = vec!["tracing".into()];

    let fx = fixture_with(config, default_providers(), dec!(20));

    let mut clients = ClientRegistry::new();
    clients.register("terms", |_| Ok(Box::new(TermsClient) as Box<dyn CheckoutClient>));

    let step = fx.step.assemble(&clients, &DecoratorRegistry::new()).unwrap();
    assert_eq!(step.name(), "payment");

    let mut v = view(json!({ "c_paymentoption": "invoice" })).with_active_step("payment");
    assert_eq!(step.process(&mut v).await.unwrap(), StepOutcome::Incomplete);

    let body = step.body(&mut v, "").await.unwrap();
    assert_eq!(body, "<section class=\"payment\"><input name=\"c_terms\"></section>");
    let header = step.header(&mut v, "").await.unwrap();
    assert!(header.ends_with("terms.js\"></script>"));
}

#[tokio::test]
async fn unknown_subpart_fails_assembly() {
    let mut config = CheckoutConfig::default();
    config.payment.subparts = vec!["missing".into()];
    let fx = fixture_with(config, default_providers(), dec!(20));

    let result = fx.step.assemble(&ClientRegistry::new(), &DecoratorRegistry::new());
    assert!(matches!(result, Err(CheckoutError::Config(_))));
}
