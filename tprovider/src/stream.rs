//! Ordered fragment queue between a streaming vendor call and its consumer.
//!
//! The queue holds at most one undelivered fragment, so a producer waits for the consumer
//! before it can read further from the vendor. Dropping the last [`FragmentSender`] closes
//! the queue.
//!
//! ```rust
//! use tprovider::{Fragment, fragment_channel};
//!
//! # tokio_test_block(async {
//! let (sender, mut receiver) = fragment_channel();
//! tokio::spawn(async move {
//!     sender.send_text("Hel").await.ok();
//!     sender.send_text("lo").await.ok();
//! });
//!
//! let mut text = String::new();
//! while let Some(Fragment::Text(part)) = receiver.recv().await {
//!     text.push_str(&part);
//! }
//! assert_eq!(text, "Hello");
//! # });
//! # fn tokio_test_block<F: std::future::Future<Output = ()>>(future: F) {
//! #     tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(future)
//! # }
//! ```

use tokio::sync::mpsc;

use crate::ProviderError;

pub const FRAGMENT_QUEUE_CAPACITY: usize = 1;

/// One unit of streamed output. `Error` is terminal: nothing follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Text(String),
    Error(ProviderError),
}

pub fn fragment_channel() -> (FragmentSender, FragmentReceiver) {
    let (sender, receiver) = mpsc::channel(FRAGMENT_QUEUE_CAPACITY);
    (
        FragmentSender { inner: sender },
        FragmentReceiver { inner: receiver },
    )
}

#[derive(Debug, Clone)]
pub struct FragmentSender {
    inner: mpsc::Sender<Fragment>,
}

impl FragmentSender {
    pub async fn send_text(&self, text: impl Into<String>) -> Result<(), ProviderError> {
        self.send(Fragment::Text(text.into())).await
    }

    pub async fn send_error(&self, error: ProviderError) -> Result<(), ProviderError> {
        self.send(Fragment::Error(error)).await
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    async fn send(&self, fragment: Fragment) -> Result<(), ProviderError> {
        self.inner
            .send(fragment)
            .await
            .map_err(|_| ProviderError::other("fragment consumer went away"))
    }
}

#[derive(Debug)]
pub struct FragmentReceiver {
    inner: mpsc::Receiver<Fragment>,
}

impl FragmentReceiver {
    /// Waits for the next fragment; `None` once every sender has been dropped.
    pub async fn recv(&mut self) -> Option<Fragment> {
        self.inner.recv().await
    }
}
