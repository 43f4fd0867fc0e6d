//! Embedding generation for knowledge chunks.
//!
//! Provides provider-agnostic embedding generation behind the
//! [`EmbeddingProvider`] trait.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};
