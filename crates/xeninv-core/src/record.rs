//! Raw record access helpers
//!
//! Records arrive as untyped attribute maps; the attribute set is governed by
//! the upstream XenAPI schema, not by this crate.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;

/// Raw attribute mapping for one remote object
pub type Record = Map<String, Value>;

/// Object identifier -> record, as returned by the boundary fetcher.
///
/// Ordered map so that iteration (and therefore last-write-wins on key
/// collisions) is deterministic.
pub type RecordMap = BTreeMap<String, Record>;

/// One full API snapshot: everything the synthesizer consumes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Pool records
    #[serde(default)]
    pub pools: RecordMap,
    /// Host records
    #[serde(default)]
    pub hosts: RecordMap,
    /// VM records
    #[serde(default)]
    pub vms: RecordMap,
}

/// Look up a required attribute on a record
pub(crate) fn require<'a>(
    record: &'a Record,
    object: &str,
    attribute: &str,
) -> Result<&'a Value, CoreError> {
    record
        .get(attribute)
        .ok_or_else(|| CoreError::missing(object, attribute))
}

/// Look up a required string attribute on a record
pub(crate) fn require_str<'a>(
    record: &'a Record,
    object: &str,
    attribute: &str,
) -> Result<&'a str, CoreError> {
    require(record, object, attribute)?
        .as_str()
        .ok_or_else(|| CoreError::missing(object, attribute))
}

/// Truthiness in the upstream sense: absent, null, false, zero, empty string
/// and empty containers are all falsey.
pub(crate) fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_require_missing_attribute() {
        let rec = record(json!({ "uuid": "u1" }));
        let err = require(&rec, "host", "name_label").unwrap_err();
        assert!(err.to_string().contains("name_label"));
        assert!(err.to_string().contains("host"));
    }

    #[test]
    fn test_is_truthy() {
        assert!(is_truthy(Some(&json!({ "0": "eth0" }))));
        assert!(is_truthy(Some(&json!(["a"]))));
        assert!(is_truthy(Some(&json!("x"))));
        assert!(is_truthy(Some(&json!(1))));
        assert!(!is_truthy(Some(&json!({}))));
        assert!(!is_truthy(Some(&json!([]))));
        assert!(!is_truthy(Some(&json!(""))));
        assert!(!is_truthy(Some(&json!(0))));
        assert!(!is_truthy(Some(&Value::Null)));
        assert!(!is_truthy(None));
    }
}
