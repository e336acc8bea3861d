//! Shared handler state.

use std::sync::Arc;

use cotlab_core::data::{DataError, PriceProvider, YahooProvider};
use cotlab_store::CotStore;

/// Builds a price provider on demand.
///
/// The Yahoo provider wraps a blocking HTTP client, which must be created and
/// dropped off the async runtime, so handlers call this inside `spawn_blocking`.
pub type PriceSource = Arc<dyn Fn() -> Result<Box<dyn PriceProvider>, DataError> + Send + Sync>;

pub fn yahoo_source() -> PriceSource {
    Arc::new(|| Ok(Box::new(YahooProvider::new()?) as Box<dyn PriceProvider>))
}

#[derive(Clone)]
pub struct AppState {
    pub store: CotStore,
    pub prices: PriceSource,
}

impl AppState {
    pub fn new(store: CotStore) -> Self {
        Self {
            store,
            prices: yahoo_source(),
        }
    }

    pub fn with_price_source(mut self, prices: PriceSource) -> Self {
        self.prices = prices;
        self
    }
}
