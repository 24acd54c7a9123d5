// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Free-form key-value bags attached to elements and connections.
//!
//! Bags are plain JSON objects so that fields the engine does not model pass
//! through untouched. The helpers here pull typed values out of a bag without
//! ever failing: a value of the wrong shape stays in the bag and is logged.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// A free-form property bag.
pub type Properties = Map<String, Value>;

/// Typed access to a [`Properties`] bag.
pub trait PropertiesExt {
    /// Removes `key` and deserializes it as `T`.
    ///
    /// `null` counts as absent. If the value does not fit `T` it is put back
    /// untouched and `None` is returned.
    fn take_typed<T: DeserializeOwned>(&mut self, key: &str) -> Option<T>;

    /// Returns the value at `key` as a finite `f64`.
    fn get_f64(&self, key: &str) -> Option<f64>;

    /// Returns the value at `key` as a string slice.
    fn get_str(&self, key: &str) -> Option<&str>;
}

impl PropertiesExt for Properties {
    fn take_typed<T: DeserializeOwned>(&mut self, key: &str) -> Option<T> {
        let value = self.remove(key)?;
        if value.is_null() {
            return None;
        }
        match serde_json::from_value::<T>(value.clone()) {
            Ok(typed) => Some(typed),
            Err(err) => {
                tracing::warn!(key, %err, "property has unexpected shape, keeping it verbatim");
                self.insert(key.to_string(), value);
                None
            }
        }
    }

    fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key)
            .and_then(Value::as_f64)
            .filter(|v| v.is_finite())
    }

    fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bag(value: Value) -> Properties {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn take_typed_removes_matching_values() {
        let mut props = bag(json!({ "wavelength": 1550.0, "vendor": "acme" }));
        let wavelength: Option<f64> = props.take_typed("wavelength");
        assert_eq!(wavelength, Some(1550.0));
        assert!(!props.contains_key("wavelength"));
        assert_eq!(props.get_str("vendor"), Some("acme"));
    }

    #[test]
    fn take_typed_keeps_mismatched_values() {
        let mut props = bag(json!({ "insertionLoss": "lots" }));
        let loss: Option<f64> = props.take_typed("insertionLoss");
        assert_eq!(loss, None);
        assert_eq!(props.get_str("insertionLoss"), Some("lots"));
    }

    #[test]
    fn null_is_absent() {
        let mut props = bag(json!({ "model": null }));
        let model: Option<String> = props.take_typed("model");
        assert!(model.is_none());
        assert!(props.is_empty());
    }

    #[test]
    fn get_f64_accepts_integers() {
        let props = bag(json!({ "capacity": 48, "name": "x" }));
        assert_eq!(props.get_f64("capacity"), Some(48.0));
        assert_eq!(props.get_f64("name"), None);
        assert_eq!(props.get_f64("missing"), None);
    }
}
