mod auth;
mod provider;
mod serde_api;
mod transport;
mod types;

pub use auth::OpenAiAuth;
pub use provider::{ANTHROPIC_BASE_URL, GROQ_BASE_URL, OPENAI_BASE_URL, OpenAiBackend};
pub use transport::{OpenAiChunkStream, OpenAiHttpTransport, OpenAiTransport};
pub use types::{OpenAiMessage, OpenAiRequest, OpenAiResponse, OpenAiRole, OpenAiSampling};
