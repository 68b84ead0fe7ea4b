//! HTTP Handlers

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use checkout_core::{
    Basket, BasketProduct, CheckoutError, CheckoutView, ErrorMap, PaymentOption, RequestParams,
    StepOutcome,
};
use checkout_payment::BasketService;

use crate::state::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub payment_providers: usize,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "ErrorMap::is_empty")]
    pub errors: ErrorMap,
}

#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    /// Submitted form values (`c_paymentoption`, `c_payment`, ...)
    #[serde(default)]
    pub params: serde_json::Value,

    /// Step the customer is currently on
    #[serde(default)]
    pub active_step: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub outcome: Option<StepOutcome>,
    pub active_step: Option<String>,
    pub errors: ErrorMap,
    pub header: String,
    pub body: String,
    pub view: CheckoutView,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(err: &CheckoutError) -> ApiError {
    let (status, code) = match err {
        CheckoutError::Validation { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_PAYMENT_CHOICE"),
        CheckoutError::ProviderNotFound(_) => (StatusCode::BAD_REQUEST, "UNKNOWN_PAYMENT_OPTION"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "CHECKOUT_ERROR"),
    };

    (
        status,
        Json(ErrorResponse {
            error: err.user_message(),
            code: code.into(),
            errors: err.errors().cloned().unwrap_or_default(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        payment_providers: state.providers.len(),
    })
}

/// Submit the payment step and render it again
pub async fn payment_step(
    State(state): State<AppState>,
    Json(payload): Json<PaymentRequest>,
) -> Result<(StatusCode, Json<PaymentResponse>), ApiError> {
    let _session = state.session.lock().await;

    // The flag stays unset while processing so it only reports a step the
    // client forces; the customer's current step applies afterwards.
    let mut view = CheckoutView::new(RequestParams::from_value(payload.params));
    let processed = state.payment.process(&mut view).await;

    if view.standard_step_active.is_none() {
        view.standard_step_active = payload.active_step;
    }

    let (status, outcome) = match processed {
        Ok(outcome) => (StatusCode::OK, Some(outcome)),
        // Invalid input redisplays the step with the messages
        Err(ref err) if err.is_user_facing() => (StatusCode::UNPROCESSABLE_ENTITY, None),
        Err(err) => {
            tracing::error!("Payment step error: {}", err);
            return Err(api_error(&err));
        }
    };

    let rendered = async {
        state.payment.prepare_view_data(&mut view).await?;
        let header = state.payment.header(&mut view, "").await?;
        let body = state.payment.body(&mut view, "").await?;
        Ok::<_, CheckoutError>((header, body))
    }
    .await;

    let (header, body) = rendered.map_err(|e| {
        tracing::error!("Rendering payment step failed: {}", e);
        api_error(&e)
    })?;

    Ok((
        status,
        Json(PaymentResponse {
            outcome,
            active_step: view.standard_step_active.clone(),
            errors: view.payment_error.clone(),
            header,
            body,
            view,
        }),
    ))
}

/// Payment options available for the current basket
pub async fn payment_options(
    State(state): State<AppState>,
) -> Result<Json<Vec<PaymentOption>>, ApiError> {
    let mut view = CheckoutView::default();
    state.payment.prepare_view_data(&mut view).await.map_err(|e| {
        tracing::error!("Preparing payment options failed: {}", e);
        api_error(&e)
    })?;

    Ok(Json(view.payment_options))
}

/// Current basket
pub async fn get_basket(State(state): State<AppState>) -> Result<Json<Basket>, ApiError> {
    state.basket.get().await.map(Json).map_err(|e| api_error(&e))
}

/// Add a product line to the basket
pub async fn add_product(
    State(state): State<AppState>,
    Json(product): Json<BasketProduct>,
) -> Result<Json<Basket>, ApiError> {
    let _session = state.session.lock().await;
    state.basket.add_product(product).map_err(|e| {
        tracing::warn!("Adding product failed: {}", e);
        api_error(&e)
    })?;
    state.basket.get().await.map(Json).map_err(|e| api_error(&e))
}
