//! Application State

use std::sync::Arc;

use tokio::sync::Mutex;

use checkout_core::CheckoutClient;
use checkout_payment::{MemoryBasketService, StaticProviderService};

/// Shared application state
///
/// The server runs a single demo checkout session: every request sees the
/// same basket. Requests that change it take `session` first, so one
/// payment submission never interleaves with another.
#[derive(Clone)]
pub struct AppState {
    /// Payment step with its sub-clients and decorators
    pub payment: Arc<dyn CheckoutClient>,

    /// Basket of the demo checkout session
    pub basket: Arc<MemoryBasketService>,

    /// Held while a request changes the basket
    pub session: Arc<Mutex<()>>,

    /// Registered payment providers
    pub providers: Arc<StaticProviderService>,
}
