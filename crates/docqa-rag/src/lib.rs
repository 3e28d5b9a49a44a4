//! DocQA RAG - Retrieval-Augmented Generation pipeline
//!
//! Ingestion turns an uploaded PDF into embedded paragraph chunks. Answering
//! embeds the question, pulls the nearest chunks, wraps them in a grounded
//! prompt and sends it to the selected LLM backend (Gemini or Ollama).

pub mod backends;
pub mod llm;
pub mod pipeline;
pub mod prompt;
pub mod retriever;

pub use backends::AnswerBackends;
pub use llm::{build_http_client, GeminiClient, OllamaClient};
pub use pipeline::{Answer, RagPipeline};
pub use prompt::{build_prompt, PromptBuilder};
pub use retriever::{RetrievalResult, Retriever};
