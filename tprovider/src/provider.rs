use std::future::Future;
use std::pin::Pin;

use crate::{FragmentSender, ModelRequest, ProviderError};

pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Capability set implemented once per AI vendor.
pub trait VendorBackend: Send + Sync {
    /// Name the backend is registered and selected under.
    fn name(&self) -> &str;

    /// Model identifiers offered by the vendor. Used for configuration, not per-call checks.
    fn list_models<'a>(&'a self) -> ProviderFuture<'a, Result<Vec<String>, ProviderError>>;

    /// Blocking completion: the full text or an error, never a partial result.
    fn send<'a>(&'a self, request: ModelRequest)
    -> ProviderFuture<'a, Result<String, ProviderError>>;

    /// Streams text fragments into `sender`.
    ///
    /// The sender is owned by the call, so the queue closes when the call returns on any
    /// path. Failures are returned, not enqueued; the caller decides how to surface them.
    fn send_stream<'a>(
        &'a self,
        request: ModelRequest,
        sender: FragmentSender,
    ) -> ProviderFuture<'a, Result<(), ProviderError>>;
}
