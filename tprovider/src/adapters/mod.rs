#[cfg(any(feature = "provider-openai", feature = "provider-ollama"))]
mod lines;

#[cfg(feature = "provider-openai")]
pub mod openai;

#[cfg(feature = "provider-ollama")]
pub mod ollama;
