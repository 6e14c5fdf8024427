// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Uniform response body: `{ "<field>": [ ... ] }`.
///
/// Single-object resources use a one-element array; "not found" and
/// "unavailable" are an empty array.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope<T> {
    field: &'static str,
    items: Vec<T>,
}

impl<T> Envelope<T> {
    /// Envelope around `items`.
    pub fn new(field: &'static str, items: Vec<T>) -> Self {
        Self { field, items }
    }

    /// Zero or one item.
    pub fn optional(field: &'static str, item: Option<T>) -> Self {
        Self::new(field, item.into_iter().collect())
    }

    /// Exactly one item.
    pub fn single(field: &'static str, item: T) -> Self {
        Self::new(field, vec![item])
    }

    /// Field name
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// Items
    pub fn items(&self) -> &[T] {
        &self.items
    }
}

impl<T: Serialize> Serialize for Envelope<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.field, &self.items)?;
        map.end()
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_as_named_array() {
        let envelope = Envelope::optional("action", Some(json!({"method_name": "go"})));
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({ "action": [{ "method_name": "go" }] })
        );

        let empty: Envelope<u8> = Envelope::optional("contract", None);
        assert_eq!(serde_json::to_value(&empty).unwrap(), json!({ "contract": [] }));
    }
}
