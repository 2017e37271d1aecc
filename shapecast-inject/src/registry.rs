//! The process-wide provider table and resolution entry point.

use crate::error::{InjectError, InjectResult};
use crate::provider::{FallbackResolver, FallbackUpdate, Provider, Resolution};
use shapecast_model::{Token, Value};
use std::sync::{Arc, OnceLock, RwLock};
use tracing::debug;

#[derive(Default)]
struct RegistryState {
    providers: Vec<Provider>,
    fallback: Option<Arc<dyn FallbackResolver>>,
}

static STATE: OnceLock<RwLock<RegistryState>> = OnceLock::new();

fn state() -> &'static RwLock<RegistryState> {
    STATE.get_or_init(|| RwLock::new(RegistryState::default()))
}

/// Reconfiguration arguments. Whichever part is supplied replaces the
/// current one; an omitted part retains its previous value. Pass an
/// empty provider list (or [`FallbackUpdate::Clear`]) to clear
/// explicitly.
#[derive(Debug, Default)]
pub struct ConfigureOptions {
    pub providers: Option<Vec<Provider>>,
    pub fallback: FallbackUpdate,
}

/// Replaces the supplied parts of the registry configuration.
pub fn configure(options: ConfigureOptions) {
    let mut guard = state().write().expect("inject registry poisoned");
    if let Some(providers) = options.providers {
        debug!(count = providers.len(), "replacing provider table");
        guard.providers = providers;
    }
    match options.fallback {
        FallbackUpdate::Keep => {}
        FallbackUpdate::Clear => guard.fallback = None,
        FallbackUpdate::Set(resolver) => guard.fallback = Some(resolver),
    }
}

/// Clears the provider table and the fallback resolver. Intended for
/// test isolation.
pub fn reset() {
    let mut guard = state().write().expect("inject registry poisoned");
    guard.providers.clear();
    guard.fallback = None;
}

/// Resolves a token to a value.
///
/// The first provider with a matching token wins. Static resolutions
/// return a clone of the value; factory resolutions invoke the factory
/// fresh — no caching, so repeated resolutions of a factory-backed
/// token may yield distinct results. When nothing matches and a
/// fallback resolver is configured, it is consulted; its `Some` result
/// is used. Otherwise the call fails, naming the token.
pub async fn resolve(token: &Token) -> InjectResult<Value> {
    let (resolution, fallback) = {
        let guard = state().read().expect("inject registry poisoned");
        (
            guard
                .providers
                .iter()
                .find(|p| p.token == *token)
                .map(|p| p.resolution.clone()),
            guard.fallback.clone(),
        )
    };

    if let Some(resolution) = resolution {
        return match resolution {
            Resolution::Static(value) => Ok(value),
            Resolution::Factory(factory) => {
                debug!(%token, "invoking provider factory");
                factory.produce().await
            }
        };
    }

    if let Some(fallback) = fallback {
        if let Some(value) = fallback.resolve(token).await {
            debug!(%token, "fallback resolver supplied value");
            return Ok(value);
        }
    }

    Err(InjectError::NotFound {
        token: token.to_string(),
    })
}
