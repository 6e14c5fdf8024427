// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for the key-value cache layer.

/// Errors that can occur when talking to a cache store or encoding payloads.
///
/// None of these fail a request on their own: the fetcher treats read errors
/// as misses and write errors as "value not cached".
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The backing store rejected or failed an operation.
    #[error("Cache store {store} failed during {operation}")]
    Store {
        /// Store backend name
        store: &'static str,
        /// Operation being performed ("get" or "set")
        operation: &'static str,
        /// The underlying error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A value could not be serialized for storage.
    #[error("Failed to encode cache payload for key {key}")]
    Encode {
        /// Cache key being written
        key: String,
        /// The underlying serialization error
        #[source]
        source: serde_json::Error,
    },

    /// A stored payload could not be decoded into the requested type.
    #[error("Failed to decode cache payload for key {key}")]
    Decode {
        /// Cache key being read
        key: String,
        /// The underlying deserialization error
        #[source]
        source: serde_json::Error,
    },

    /// The producer task panicked or was aborted before completing.
    #[error("Producer for key {key} did not complete")]
    ProducerAborted {
        /// Cache key whose producer was lost
        key: String,
    },
}

impl CacheError {
    /// Helper to create a `Store` error from any error type.
    pub fn store(
        store: &'static str,
        operation: &'static str,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        CacheError::Store {
            store,
            operation,
            source: Box::new(source),
        }
    }
}
