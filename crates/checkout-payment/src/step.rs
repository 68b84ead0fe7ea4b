//! Payment Step
//!
//! Checkout client responsible for the payment method choice:
//!
//! - decides whether the step is rendered at all,
//! - validates submitted choices and stores them in the basket,
//! - stages the available payment options with price and attributes.

use std::sync::Arc;

use async_trait::async_trait;

use checkout_core::client::{render_bodies, render_headers};
use checkout_core::{
    CheckoutClient, CheckoutConfig, CheckoutError, CheckoutView, ClientRegistry,
    DecoratorRegistry, PaymentOption, Renderer, Result, ServiceType, StepOutcome, step_visible,
};

use crate::service::{BasketService, PaymentProviderService};

/// Step name used for visibility and the step-active flag
pub const STEP_NAME: &str = "payment";

/// Parameter holding the chosen provider id(s)
pub const PARAM_OPTION: &str = "c_paymentoption";

/// Parameter prefix of the attributes entered per provider
pub const PARAM_ATTRIBUTES: &str = "c_payment";

const RECHECK_MESSAGE: &str = "Please recheck your payment choice";

/// The checkout payment step client
pub struct PaymentStep {
    config: CheckoutConfig,
    basket: Arc<dyn BasketService>,
    providers: Arc<dyn PaymentProviderService>,
    renderer: Arc<dyn Renderer>,
    subparts: Vec<Box<dyn CheckoutClient>>,
}

impl PaymentStep {
    pub fn new(
        config: CheckoutConfig,
        basket: Arc<dyn BasketService>,
        providers: Arc<dyn PaymentProviderService>,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        Self {
            config,
            basket,
            providers,
            renderer,
            subparts: Vec::new(),
        }
    }

    /// Sub-clients rendered and processed inside the step, in order
    pub fn with_subparts(mut self, subparts: Vec<Box<dyn CheckoutClient>>) -> Self {
        self.subparts = subparts;
        self
    }

    /// Build the step with its configured sub-clients and decorators
    pub fn assemble(
        self,
        clients: &ClientRegistry,
        decorators: &DecoratorRegistry,
    ) -> Result<Box<dyn CheckoutClient>> {
        let subparts = clients.create_all(&self.config.payment.subparts, &self.config)?;
        let names = self.config.payment.decorators.clone();
        decorators.decorate(Box::new(self.with_subparts(subparts)), &names)
    }

    /// Whether the step produces output for this view
    pub fn should_render(&self, view: &CheckoutView) -> bool {
        step_visible(STEP_NAME, view.active_step(), &self.config.onepage)
    }

    async fn apply_selection(&self, view: &mut CheckoutView) -> Result<StepOutcome> {
        if let Some(ids) = view.params.ids(PARAM_OPTION) {
            self.basket.delete_service(ServiceType::Payment).await?;

            for id in ids {
                let attributes = view.params.attributes(&format!("{PARAM_ATTRIBUTES}/{id}"));
                let errors = self.providers.check_attributes(&id, &attributes).await?;
                view.payment_error.clone_from(&errors);

                if !errors.is_empty() {
                    tracing::warn!(provider = %id, errors = errors.len(), "payment choice rejected");
                    view.merge_errors(&errors);
                    return Err(CheckoutError::validation(RECHECK_MESSAGE, errors));
                }

                self.basket
                    .add_service(ServiceType::Payment, &id, attributes)
                    .await?;
                tracing::info!(provider = %id, "payment choice stored");
            }
        }

        let mut outcome = StepOutcome::Complete;
        for subpart in &self.subparts {
            outcome = outcome.and(subpart.process(view).await?);
        }

        let basket = self.basket.get().await?;

        if view.standard_step_active.is_none()
            && !basket.has_service(ServiceType::Payment)
            && !self.providers.providers(ServiceType::Payment).await?.is_empty()
        {
            tracing::debug!("no payment service in basket, keeping payment step active");
            view.standard_step_active = Some(STEP_NAME.into());
            return Ok(StepOutcome::Incomplete);
        }

        Ok(outcome)
    }
}

#[async_trait]
impl CheckoutClient for PaymentStep {
    fn name(&self) -> &str {
        STEP_NAME
    }

    async fn body(&self, view: &mut CheckoutView, uid: &str) -> Result<String> {
        if !self.should_render(view) {
            return Ok(String::new());
        }

        view.payment_body = render_bodies(&self.subparts, view, uid).await?;
        self.renderer.render(&self.config.payment.template_body, view)
    }

    async fn header(&self, view: &mut CheckoutView, uid: &str) -> Result<String> {
        if !self.should_render(view) {
            return Ok(String::new());
        }

        view.payment_header = render_headers(&self.subparts, view, uid).await?;
        self.renderer.render(&self.config.payment.template_header, view)
    }

    async fn process(&self, view: &mut CheckoutView) -> Result<StepOutcome> {
        match self.apply_selection(view).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                view.standard_step_active = Some(STEP_NAME.into());
                if !err.is_user_facing() {
                    tracing::error!(error = %err, "processing payment step failed");
                }
                Err(err)
            }
        }
    }

    async fn prepare_view_data(&self, view: &mut CheckoutView) -> Result<()> {
        let basket = self.basket.get().await?;
        let mut options = Vec::new();

        for provider in self.providers.providers(ServiceType::Payment).await? {
            if !provider.is_available(&basket).await? {
                continue;
            }

            options.push(PaymentOption {
                id: provider.id().to_string(),
                service: provider.service_item(),
                price: provider.calc_price(&basket).await?,
                attributes: provider.config_fe(&basket).await?,
            });
        }

        tracing::debug!(available = options.len(), "payment options prepared");
        view.payment_options = options;

        for subpart in &self.subparts {
            subpart.prepare_view_data(view).await?;
        }

        Ok(())
    }
}
