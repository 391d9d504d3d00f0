//! JSON-patch diff and apply.
//!
//! Thin wrappers around the `json-patch` crate (RFC 6902, including `test`
//! and array-index operations). Patches are the wire form of `Updated`
//! events: each one, applied to the prior reconstructed state, yields the
//! next state.
//!
//! Diffs are not guaranteed minimal, but are empty exactly when the inputs
//! are structurally equal - callers rely on that to reject no-op updates.

pub use json_patch::Patch;
use serde_json::Value;
use thiserror::Error;

/// Errors from parsing or applying a patch document.
#[derive(Error, Debug)]
pub enum PatchError {
    /// The payload is not a well-formed RFC 6902 document.
    #[error("malformed patch document: {0}")]
    Malformed(String),

    /// A `test`/`replace`/`remove` target was absent or mismatched.
    #[error("patch failed to apply: {0}")]
    Apply(String),
}

/// Compute a patch such that `apply(a, diff(a, b)) == b`.
///
/// # Examples
///
/// ```
/// use serde_json::json;
///
/// let a = json!({"name": "alice"});
/// let b = json!({"name": "bob"});
/// let patch = crudstore_core::patch::diff(&a, &b);
/// assert!(!patch.0.is_empty());
/// assert!(crudstore_core::patch::diff(&a, &a).0.is_empty());
/// ```
#[must_use]
pub fn diff(a: &Value, b: &Value) -> Patch {
    json_patch::diff(a, b)
}

/// Apply a patch to a value, returning the patched value.
///
/// # Errors
///
/// Returns [`PatchError::Apply`] if any operation's target is absent or
/// mismatched; the input is consumed either way.
pub fn apply(value: Value, patch: &Patch) -> Result<Value, PatchError> {
    let mut doc = value;
    json_patch::patch(&mut doc, patch).map_err(|e| PatchError::Apply(e.to_string()))?;
    Ok(doc)
}

/// Parse a patch from its JSON text form (an array of operations).
///
/// # Errors
///
/// Returns [`PatchError::Malformed`] when the text is not a JSON-patch
/// document.
pub fn parse(text: &str) -> Result<Patch, PatchError> {
    serde_json::from_str(text).map_err(|e| PatchError::Malformed(e.to_string()))
}

/// Serialize a patch to its JSON text wire form.
///
/// # Errors
///
/// Returns [`PatchError::Malformed`] if serialization fails (does not happen
/// for patches produced by [`diff`]).
pub fn to_text(patch: &Patch) -> Result<String, PatchError> {
    serde_json::to_string(patch).map_err(|e| PatchError::Malformed(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn diff_then_apply_reconstructs_target() {
        let a = json!({"name": "alice", "tags": ["x", "y"], "age": 30});
        let b = json!({"name": "bob", "tags": ["x"], "city": "berlin"});

        let patch = diff(&a, &b);
        let patched = apply(a, &patch).unwrap();
        assert_eq!(patched, b);
    }

    #[test]
    fn equal_values_produce_empty_patch() {
        let v = json!({"nested": {"a": [1, 2, 3]}});
        assert!(diff(&v, &v.clone()).0.is_empty());
    }

    #[test]
    fn differing_values_produce_non_empty_patch() {
        let patch = diff(&json!({"a": 1}), &json!({"a": 2}));
        assert!(!patch.0.is_empty());
    }

    #[test]
    fn patch_text_round_trip() {
        let patch = diff(&json!({"a": 1}), &json!({"b": 2}));
        let text = to_text(&patch).unwrap();
        let reparsed = parse(&text).unwrap();
        assert_eq!(apply(json!({"a": 1}), &reparsed).unwrap(), json!({"b": 2}));
    }

    #[test]
    fn apply_fails_on_missing_target() {
        let patch = parse(r#"[{"op": "remove", "path": "/missing"}]"#).unwrap();
        let err = apply(json!({}), &patch).unwrap_err();
        assert!(matches!(err, PatchError::Apply(_)));
    }

    #[test]
    fn apply_fails_on_mismatched_test() {
        let patch = parse(r#"[{"op": "test", "path": "/a", "value": 2}]"#).unwrap();
        assert!(apply(json!({"a": 1}), &patch).is_err());
    }

    #[test]
    fn parse_rejects_malformed_documents() {
        assert!(matches!(parse("not json"), Err(PatchError::Malformed(_))));
        assert!(matches!(
            parse(r#"{"op": "add"}"#),
            Err(PatchError::Malformed(_))
        ));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn arb_json() -> impl Strategy<Value = Value> {
            let leaf = prop_oneof![
                Just(Value::Null),
                any::<bool>().prop_map(Value::Bool),
                any::<i64>().prop_map(Value::from),
                "[a-z]{0,8}".prop_map(Value::String),
            ];
            leaf.prop_recursive(3, 16, 4, |inner| {
                prop_oneof![
                    prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                    prop::collection::hash_map("[a-z]{1,4}", inner, 0..4)
                        .prop_map(|m| Value::Object(m.into_iter().collect())),
                ]
            })
        }

        proptest! {
            #[test]
            fn diff_apply_reaches_the_target(a in arb_json(), b in arb_json()) {
                let patch = diff(&a, &b);
                let patched = apply(a, &patch).unwrap();
                prop_assert_eq!(patched, b);
            }

            #[test]
            fn patch_is_empty_iff_inputs_match(a in arb_json(), b in arb_json()) {
                let patch = diff(&a, &b);
                prop_assert_eq!(patch.0.is_empty(), a == b);
            }
        }
    }
}
