// Copyright © The gittuf-rs Contributors
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

//! Canonical signing bytes for root and rule-file metadata.
//!
//! Documents are defined with `serde` for ergonomic field access, but the
//! bytes that get hashed and signed must not depend on `serde_json`'s
//! formatting: field order, numeric representation and escaping all have to
//! be stable across implementations. This module bridges a document's
//! `serde_json::Value` view over to [`gittuf_canonical::json::Value`], whose
//! [`Canonical`] impl is the one actually used for signing.

use gittuf_canonical::{
    json::{Number as CNumber, ToCjson, Value as CValue},
    Canonical, Cstring,
};
use serde::Serialize;

use crate::error::{Error, Result};

/// The canonical signing bytes for `value`.
pub fn canonical_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let json = serde_json::to_value(value).map_err(|e| Error::Decode(e.to_string()))?;
    let canonical = to_canonical(&json)?;
    canonical
        .canonical_form()
        .map_err(|e: std::convert::Infallible| match e {})
}

fn to_canonical(value: &serde_json::Value) -> Result<CValue> {
    match value {
        serde_json::Value::Null => Ok(CValue::Null),
        serde_json::Value::Bool(b) => Ok(CValue::Bool(*b)),
        serde_json::Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                Ok(CValue::Number(CNumber::U64(u)))
            } else if let Some(i) = n.as_i64() {
                Ok(CValue::Number(CNumber::I64(i)))
            } else {
                Err(Error::Decode(format!(
                    "number '{n}' is not representable in canonical form"
                )))
            }
        },
        serde_json::Value::String(s) => Ok(CValue::String(Cstring::from(s.as_str()))),
        serde_json::Value::Array(items) => {
            let items = items
                .iter()
                .map(to_canonical)
                .collect::<Result<Vec<_>>>()?;
            Ok(items
                .into_iter()
                .collect::<gittuf_canonical::json::Array>()
                .into_cjson())
        },
        serde_json::Value::Object(map) => {
            let mut out = gittuf_canonical::json::Map::new();
            for (k, v) in map {
                out.insert(Cstring::from(k.as_str()), to_canonical(v)?);
            }
            Ok(out.into_cjson())
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_bytes_sort_object_keys() {
        let value = serde_json::json!({ "b": 1, "a": 2 });
        let bytes = canonical_bytes(&value).unwrap();
        assert_eq!(std::str::from_utf8(&bytes).unwrap(), r#"{"a":2,"b":1}"#);
    }

    #[test]
    fn canonical_bytes_are_deterministic_across_calls() {
        let value = serde_json::json!({ "name": "root", "nested": { "z": 1, "a": [1, 2, 3] } });
        assert_eq!(
            canonical_bytes(&value).unwrap(),
            canonical_bytes(&value).unwrap()
        );
    }
}
