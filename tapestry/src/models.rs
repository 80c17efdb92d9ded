//! Models offered by every configured vendor, grouped by vendor, for default selection.
//!
//! ```rust
//! use tapestry::VendorsModels;
//!
//! let models = VendorsModels::new()
//!     .with_group("OpenAI", ["gpt-4o", "gpt-4o-mini"])
//!     .with_group("Ollama", ["llama3.2"]);
//!
//! assert_eq!(models.find_vendor_for_model("llama3.2"), Some("Ollama"));
//! assert_eq!(
//!     models.model_by_number(2).unwrap(),
//!     ("OpenAI".to_string(), "gpt-4o-mini".to_string())
//! );
//! ```

use crate::{ChatError, VendorRegistry};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorModels {
    pub vendor: String,
    pub models: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VendorsModels {
    groups: Vec<VendorModels>,
}

impl VendorsModels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lists models from every registered backend, in vendor-name order.
    ///
    /// A vendor whose listing fails is left out and logged.
    pub async fn collect(registry: &VendorRegistry) -> Self {
        let mut collected = Self::new();
        for key in registry.names() {
            let Some(backend) = registry.get(&key) else {
                continue;
            };
            match backend.list_models().await {
                Ok(models) => collected.add_group(backend.name(), models),
                Err(error) => tracing::warn!(
                    phase = "defaults",
                    event = "list_models_failed",
                    vendor = backend.name(),
                    error = %error
                ),
            }
        }
        collected
    }

    pub fn with_group<I, S>(mut self, vendor: impl Into<String>, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_group(vendor, models);
        self
    }

    pub fn add_group<I, S>(&mut self, vendor: impl Into<String>, models: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let models = models.into_iter().map(Into::into).collect::<Vec<_>>();
        if !models.is_empty() {
            self.groups.push(VendorModels {
                vendor: vendor.into(),
                models,
            });
        }
    }

    pub fn groups(&self) -> &[VendorModels] {
        &self.groups
    }

    pub fn all_models(&self) -> Vec<&str> {
        self.groups
            .iter()
            .flat_map(|group| group.models.iter().map(String::as_str))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Every vendor offering `model`, compared case-insensitively.
    pub fn find_vendors_for_model(&self, model: &str) -> Vec<&str> {
        let model = model.trim();
        self.groups
            .iter()
            .filter(|group| {
                group
                    .models
                    .iter()
                    .any(|offered| offered.eq_ignore_ascii_case(model))
            })
            .map(|group| group.vendor.as_str())
            .collect()
    }

    pub fn find_vendor_for_model(&self, model: &str) -> Option<&str> {
        self.find_vendors_for_model(model).into_iter().next()
    }

    /// Resolves a 1-based position across all groups, in listing order.
    pub fn model_by_number(&self, number: usize) -> Result<(String, String), ChatError> {
        let found = number.checked_sub(1).and_then(|index| {
            self.groups
                .iter()
                .flat_map(|group| group.models.iter().map(move |model| (group, model)))
                .nth(index)
        });

        found
            .map(|(group, model)| (group.vendor.clone(), model.clone()))
            .ok_or_else(|| {
                ChatError::validation(format!(
                    "model number {number} is out of range 1..={}",
                    self.all_models().len()
                ))
            })
    }

    /// Picks `(vendor, model)` from a model name or a listing number.
    ///
    /// A preferred vendor wins when it offers the model; otherwise the first vendor offering it
    /// is chosen.
    pub fn select(
        &self,
        selection: &str,
        preferred_vendor: Option<&str>,
    ) -> Result<(String, String), ChatError> {
        let selection = selection.trim();
        if let Ok(number) = selection.parse::<usize>() {
            return self.model_by_number(number);
        }

        let vendors = self.find_vendors_for_model(selection);
        let vendor = preferred_vendor
            .and_then(|preferred| {
                vendors
                    .iter()
                    .copied()
                    .find(|vendor| vendor.eq_ignore_ascii_case(preferred.trim()))
            })
            .or_else(|| vendors.first().copied())
            .ok_or_else(|| {
                ChatError::validation(format!(
                    "model {selection} is not offered by any configured vendor"
                ))
            })?;

        Ok((vendor.to_string(), selection.to_string()))
    }
}
