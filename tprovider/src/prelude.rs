//! Common `tprovider` imports for downstream crates.

pub use crate::{
    Fragment, FragmentReceiver, FragmentSender, GenerationControls, Message, ModelRequest,
    ModelRequestBuilder, ProviderError, ProviderErrorKind, ProviderFuture, Role, SecretString,
    VendorBackend, VendorRegistry, fragment_channel, wire_messages,
};
pub use tcommon::{BoxFuture, ChatOptions};
