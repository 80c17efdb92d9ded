//! Shared utilities and strongly-typed common values for workspace crates.
//!
//! ```rust
//! use tcommon::{ChatOptions, SessionName, VariableMap};
//!
//! let session = SessionName::from("daily-notes");
//! let mut variables = VariableMap::new();
//! variables.insert("lang_code".to_string(), "fr".to_string());
//!
//! let options = ChatOptions::default().with_model("gpt-4o-mini").with_seed(7);
//! assert_eq!(session.as_str(), "daily-notes");
//! assert_eq!(options.seed, Some(7));
//! ```

pub mod future {
    //! Shared async future aliases.
    //!
    //! ```rust
    //! use tcommon::BoxFuture;
    //!
    //! fn str_len<'a>(value: &'a str) -> BoxFuture<'a, usize> {
    //!     Box::pin(async move { value.len() })
    //! }
    //!
    //! let _future = str_len("hello");
    //! ```

    use std::future::Future;
    use std::pin::Pin;

    pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
}

pub mod context {
    //! Template variables and the session name newtype.
    //!
    //! ```rust
    //! use tcommon::{SessionName, VariableMap};
    //!
    //! let name = SessionName::new("research");
    //! let mut variables = VariableMap::new();
    //! variables.insert("topic".to_string(), "rust".to_string());
    //!
    //! assert_eq!(name.to_string(), "research");
    //! assert_eq!(variables.get("topic").map(String::as_str), Some("rust"));
    //! ```

    use std::collections::BTreeMap;
    use std::fmt::{Display, Formatter};

    use serde::{Deserialize, Serialize};

    /// Free-form template bindings, ordered so rendered payloads are deterministic.
    pub type VariableMap = BTreeMap<String, String>;

    #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct SessionName(String);

    impl SessionName {
        pub fn new(value: impl Into<String>) -> Self {
            Self(value.into())
        }

        pub fn as_str(&self) -> &str {
            self.0.as_str()
        }
    }

    impl Display for SessionName {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            f.write_str(&self.0)
        }
    }

    impl From<String> for SessionName {
        fn from(value: String) -> Self {
            Self(value)
        }
    }

    impl From<&str> for SessionName {
        fn from(value: &str) -> Self {
            Self(value.to_string())
        }
    }
}

pub mod model {
    //! Per-request generation settings.
    //!
    //! `seed` is the only sampling control with explicit set/unset semantics: `None` means the
    //! vendor picks, which is not the same as seeding with zero.
    //!
    //! ```rust
    //! use tcommon::ChatOptions;
    //!
    //! let options = ChatOptions::default()
    //!     .with_temperature(0.2)
    //!     .with_context_length(8192)
    //!     .raw_mode();
    //!
    //! assert_eq!(options.temperature, 0.2);
    //! assert_eq!(options.model_context_length, Some(8192));
    //! assert!(options.raw);
    //! assert_eq!(options.seed, None);
    //! ```

    pub const DEFAULT_TEMPERATURE: f64 = 0.7;
    pub const DEFAULT_TOP_P: f64 = 0.9;

    #[derive(Debug, Clone, PartialEq)]
    pub struct ChatOptions {
        pub model: Option<String>,
        pub model_context_length: Option<u32>,
        pub temperature: f64,
        pub top_p: f64,
        pub presence_penalty: f64,
        pub frequency_penalty: f64,
        pub seed: Option<i64>,
        pub raw: bool,
    }

    impl Default for ChatOptions {
        fn default() -> Self {
            Self {
                model: None,
                model_context_length: None,
                temperature: DEFAULT_TEMPERATURE,
                top_p: DEFAULT_TOP_P,
                presence_penalty: 0.0,
                frequency_penalty: 0.0,
                seed: None,
                raw: false,
            }
        }
    }

    impl ChatOptions {
        pub fn with_model(mut self, model: impl Into<String>) -> Self {
            self.model = Some(model.into());
            self
        }

        pub fn with_context_length(mut self, length: u32) -> Self {
            self.model_context_length = Some(length);
            self
        }

        pub fn with_temperature(mut self, temperature: f64) -> Self {
            self.temperature = temperature;
            self
        }

        pub fn with_top_p(mut self, top_p: f64) -> Self {
            self.top_p = top_p;
            self
        }

        pub fn with_presence_penalty(mut self, penalty: f64) -> Self {
            self.presence_penalty = penalty;
            self
        }

        pub fn with_frequency_penalty(mut self, penalty: f64) -> Self {
            self.frequency_penalty = penalty;
            self
        }

        pub fn with_seed(mut self, seed: i64) -> Self {
            self.seed = Some(seed);
            self
        }

        pub fn with_raw(mut self, raw: bool) -> Self {
            self.raw = raw;
            self
        }

        pub fn raw_mode(self) -> Self {
            self.with_raw(true)
        }
    }
}

pub mod registry {
    //! Generic registry map wrapper used by runtime registries.
    //!
    //! ```rust
    //! use tcommon::Registry;
    //!
    //! let mut registry = Registry::new();
    //! registry.insert("alpha".to_string(), 1_u32);
    //!
    //! assert_eq!(registry.get("alpha"), Some(&1));
    //! assert!(registry.contains_key("alpha"));
    //! ```

    use std::borrow::Borrow;
    use std::collections::HashMap;
    use std::hash::Hash;

    #[derive(Debug, Clone)]
    pub struct Registry<K, V> {
        items: HashMap<K, V>,
    }

    impl<K, V> Default for Registry<K, V>
    where
        K: Eq + Hash,
    {
        fn default() -> Self {
            Self {
                items: HashMap::new(),
            }
        }
    }

    impl<K, V> Registry<K, V>
    where
        K: Eq + Hash,
    {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn insert(&mut self, key: K, value: V) -> Option<V> {
            self.items.insert(key, value)
        }

        pub fn get<Q>(&self, key: &Q) -> Option<&V>
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.get(key)
        }

        pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.remove(key)
        }

        pub fn contains_key<Q>(&self, key: &Q) -> bool
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.contains_key(key)
        }

        pub fn keys(&self) -> impl Iterator<Item = &K> {
            self.items.keys()
        }

        pub fn len(&self) -> usize {
            self.items.len()
        }

        pub fn is_empty(&self) -> bool {
            self.items.is_empty()
        }
    }
}

pub use context::{SessionName, VariableMap};
pub use future::BoxFuture;
pub use model::ChatOptions;
pub use registry::Registry;
