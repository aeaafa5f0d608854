//! Endpoint parameter metadata.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::Result;

/// Declared metadata for one endpoint parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Whether the endpoint requires this parameter.
    #[serde(default)]
    pub required: bool,
}

/// Declared parameters per endpoint, used to decide whether a missing
/// parameter should be checked at all.
pub trait EndpointCatalog: Send + Sync {
    /// The parameter table declared for `endpoint`, if the catalog knows
    /// the endpoint.
    fn parameters(&self, endpoint: &str) -> Option<&HashMap<SmolStr, ParameterSpec>>;
}

/// Catalog backed by a static map, built in code or loaded from a JSON
/// document of the shape `{endpoint: {parameter: {"required": bool}}}`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StaticCatalog {
    endpoints: HashMap<SmolStr, HashMap<SmolStr, ParameterSpec>>,
}

impl StaticCatalog {
    /// Creates an empty catalog. Every endpoint is unknown, so no
    /// parameter checks apply.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares an endpoint's parameters as `(name, required)` pairs.
    pub fn with_endpoint(
        mut self,
        endpoint: impl Into<SmolStr>,
        parameters: impl IntoIterator<Item = (&'static str, bool)>,
    ) -> Self {
        let table = parameters
            .into_iter()
            .map(|(name, required)| (SmolStr::new(name), ParameterSpec { required }))
            .collect();
        self.endpoints.insert(endpoint.into(), table);
        self
    }

    /// Loads a catalog from a JSON document.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let endpoints = serde_json::from_str(&raw)?;
        Ok(StaticCatalog { endpoints })
    }
}

impl EndpointCatalog for StaticCatalog {
    fn parameters(&self, endpoint: &str) -> Option<&HashMap<SmolStr, ParameterSpec>> {
        self.endpoints.get(endpoint)
    }
}
