//! Vendor backend construction from configuration.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::{ProviderError, VendorBackend, VendorRegistry};

pub const DEFAULT_VENDOR_TIMEOUT: Duration = Duration::from_secs(90);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VendorKind {
    /// Any server speaking the OpenAI chat completions protocol.
    OpenAiCompatible,
    Ollama,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorConfig {
    pub name: String,
    pub kind: VendorKind,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl VendorConfig {
    pub fn new(name: impl Into<String>, kind: VendorKind) -> Self {
        Self {
            name: name.into(),
            kind,
            base_url: None,
            api_key: None,
            timeout: DEFAULT_VENDOR_TIMEOUT,
        }
    }

    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::new("OpenAI", VendorKind::OpenAiCompatible).with_api_key(api_key)
    }

    pub fn ollama() -> Self {
        Self::new("Ollama", VendorKind::Ollama).with_timeout(Duration::from_secs(1200))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn trimmed_api_key(&self) -> Option<String> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
    }
}

pub fn build_backend(config: &VendorConfig) -> Result<Arc<dyn VendorBackend>, ProviderError> {
    if config.name.trim().is_empty() {
        return Err(ProviderError::invalid_request("vendor name must not be empty"));
    }

    let http = Client::builder()
        .timeout(config.timeout)
        .build()
        .map_err(|err| ProviderError::transport(err.to_string()))?;

    match config.kind {
        VendorKind::OpenAiCompatible => build_openai_backend(config, http),
        VendorKind::Ollama => build_ollama_backend(config, http),
    }
}

/// Builds every configured backend into a registry keyed by vendor name.
pub fn build_registry(vendors: &[VendorConfig]) -> Result<VendorRegistry, ProviderError> {
    let mut registry = VendorRegistry::new();
    for config in vendors {
        registry.register_shared(build_backend(config)?);
    }
    Ok(registry)
}

/// Builds every backend that can be built and returns the rest as `(vendor name, error)`.
pub fn build_available_registry(
    vendors: &[VendorConfig],
) -> (VendorRegistry, Vec<(String, ProviderError)>) {
    let mut registry = VendorRegistry::new();
    let mut failures = Vec::new();
    for config in vendors {
        match build_backend(config) {
            Ok(backend) => registry.register_shared(backend),
            Err(err) => failures.push((config.name.clone(), err)),
        }
    }
    (registry, failures)
}

pub async fn list_models_for(config: &VendorConfig) -> Result<Vec<String>, ProviderError> {
    let backend = build_backend(config)?;
    backend.list_models().await
}

#[cfg(feature = "provider-openai")]
fn build_openai_backend(
    config: &VendorConfig,
    http: Client,
) -> Result<Arc<dyn VendorBackend>, ProviderError> {
    use tprovider::adapters::openai::{
        OPENAI_BASE_URL, OpenAiAuth, OpenAiBackend, OpenAiHttpTransport,
    };

    let auth = match config.trimmed_api_key() {
        Some(key) => OpenAiAuth::api_key(key)?,
        None if config.base_url.is_some() => OpenAiAuth::Anonymous,
        None => {
            return Err(ProviderError::authentication(format!(
                "vendor {} requires an api key",
                config.name
            )));
        }
    };
    let base_url = config.base_url.as_deref().unwrap_or(OPENAI_BASE_URL);
    let transport = Arc::new(OpenAiHttpTransport::new(http).with_base_url(base_url));

    Ok(Arc::new(OpenAiBackend::new(
        config.name.clone(),
        auth,
        transport,
    )))
}

#[cfg(not(feature = "provider-openai"))]
fn build_openai_backend(
    _config: &VendorConfig,
    _http: Client,
) -> Result<Arc<dyn VendorBackend>, ProviderError> {
    Err(ProviderError::invalid_request(
        "provider-openai feature is not enabled on tapestry",
    ))
}

#[cfg(feature = "provider-ollama")]
fn build_ollama_backend(
    config: &VendorConfig,
    http: Client,
) -> Result<Arc<dyn VendorBackend>, ProviderError> {
    use tprovider::adapters::ollama::{OLLAMA_HOST_URL, OllamaBackend, OllamaHttpTransport};

    let host = config.base_url.as_deref().unwrap_or(OLLAMA_HOST_URL);
    let transport = Arc::new(OllamaHttpTransport::new(http).with_base_url(host));

    Ok(Arc::new(
        OllamaBackend::new(transport).with_name(config.name.clone()),
    ))
}

#[cfg(not(feature = "provider-ollama"))]
fn build_ollama_backend(
    _config: &VendorConfig,
    _http: Client,
) -> Result<Arc<dyn VendorBackend>, ProviderError> {
    Err(ProviderError::invalid_request(
        "provider-ollama feature is not enabled on tapestry",
    ))
}
