//! Vendor abstraction for chat completions: one trait, many backends.
//!
//! ```rust
//! use tprovider::{Message, ModelRequest, Role, VendorRegistry};
//!
//! let registry = VendorRegistry::new();
//! assert!(registry.get("ollama").is_none());
//!
//! let request = ModelRequest::new("llama3.2", vec![Message::new(Role::User, "hi")]);
//! assert!(request.is_raw());
//! ```

mod credentials;
mod error;
mod model;
mod provider;
mod registry;
mod stream;

pub mod adapters;
pub mod prelude;

pub use credentials::SecretString;
pub use error::{ProviderError, ProviderErrorKind};
pub use model::{
    GenerationControls, Message, ModelRequest, ModelRequestBuilder, Role, wire_messages,
};
pub use provider::{ProviderFuture, VendorBackend};
pub use registry::VendorRegistry;
pub use stream::{
    FRAGMENT_QUEUE_CAPACITY, Fragment, FragmentReceiver, FragmentSender, fragment_channel,
};
pub use tcommon::{BoxFuture, ChatOptions};
