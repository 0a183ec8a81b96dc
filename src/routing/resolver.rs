//! Endpoint lookup.
//!
//! # Responsibilities
//! - Store the configured endpoints
//! - Resolve a route name to its upstream location and method
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(1) lookup via HashMap
//! - Explicit `None` for unknown names; the caller turns it into a 404

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::config::EndpointConfig;

/// Maps proxy route names to upstream endpoints.
#[derive(Debug, Default)]
pub struct EndpointResolver {
    endpoints: HashMap<String, Arc<EndpointConfig>>,
}

impl EndpointResolver {
    pub fn from_config(endpoints: BTreeMap<String, EndpointConfig>) -> Self {
        Self {
            endpoints: endpoints
                .into_iter()
                .map(|(name, config)| (name, Arc::new(config)))
                .collect(),
        }
    }

    /// Look up an endpoint by the name used in the request path.
    pub fn resolve(&self, name: &str) -> Option<Arc<EndpointConfig>> {
        self.endpoints.get(name).cloned()
    }

    /// Sorted endpoint names, for startup logging.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.endpoints.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
