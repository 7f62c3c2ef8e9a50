//! # uiprobe Element Index
//!
//! Semantic element retrieval:
//!
//! - [`SemanticElementRetriever`] - store/retrieve/update/remove UI elements by description
//! - [`QdrantElementIndex`] - Qdrant REST backend, [`InMemoryElementIndex`] - local backend
//! - [`SimpleHashEmbedding`] / [`OpenAiEmbeddingProvider`] - embedding models
//! - [`ElementLocator`] - semantic lookup with a template-matching fallback
//! - [`ElementToolProvider`] - the `element_search` and `element_locate` tools

pub mod embedding;
pub mod locator;
pub mod memory;
pub mod qdrant;
pub mod retriever;
pub mod tools;

pub use embedding::{OpenAiEmbeddingProvider, SimpleHashEmbedding, embedding_provider_from_config};
pub use locator::{ElementLocator, LocateMethod, LocateOutcome, Location, LocatorSettings};
pub use memory::InMemoryElementIndex;
pub use qdrant::QdrantElementIndex;
pub use retriever::SemanticElementRetriever;
pub use tools::{ElementLocateTool, ElementSearchTool, ElementToolProvider};
