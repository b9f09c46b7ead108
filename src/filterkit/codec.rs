//! Query-string codec.
//!
//! Every active filter becomes one `fieldId=JSON(value)` query parameter,
//! percent-encoded; inactive filters are simply absent, so shareable links
//! stay minimal and "absent" never needs a sentinel.
//!
//! Decoding is deliberately forgiving: a parameter that is not valid JSON is
//! taken as a plain string (hand-typed `search=alpha` works), a parameter
//! for an unknown field id rides along untouched as a
//! [`FilterValue::Raw`] passthrough, and a parameter whose value fails the
//! field's type check is dropped silently. Decode never fails.

use log::warn;
use serde_json::Value;

use crate::schema::FieldRegistry;
use crate::value::{FilterValue, FilterValueSet};

/// One query parameter discarded during decode, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedParam {
    pub key: String,
    pub reason: String,
}

/// Outcome of [`decode`]: the resulting value set plus any parameters that
/// were skipped. Hosts that surface warnings can render `dropped`;
/// everything else can ignore it.
#[derive(Debug, Default)]
pub struct DecodeReport {
    pub values: FilterValueSet,
    pub dropped: Vec<DroppedParam>,
}

/// Serialize the value set into a query string (no leading `?`).
///
/// Iteration order of the set is sorted by field id, so the output is
/// deterministic for a given set.
pub fn encode(values: &FilterValueSet) -> String {
    let mut parts = Vec::with_capacity(values.len());
    for (id, value) in values.iter() {
        if value.is_empty() {
            continue;
        }
        let Ok(text) = serde_json::to_string(&value.to_query_value()) else {
            continue;
        };
        parts.push(format!(
            "{}={}",
            urlencoding::encode(id),
            urlencoding::encode(&text)
        ));
    }
    parts.join("&")
}

/// Parse a query string (with or without a leading `?`) against the module's
/// field registry.
pub fn decode(registry: &FieldRegistry, query: &str) -> DecodeReport {
    let mut report = DecodeReport::default();

    for pair in query.trim_start_matches('?').split('&') {
        if pair.is_empty() {
            continue;
        }
        let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));

        let key = match urlencoding::decode(raw_key) {
            Ok(key) => key.into_owned(),
            Err(_) => {
                report.dropped.push(DroppedParam {
                    key: raw_key.to_string(),
                    reason: "key is not valid UTF-8".to_string(),
                });
                continue;
            }
        };
        let text = match urlencoding::decode(raw_value) {
            Ok(text) => text.into_owned(),
            Err(_) => {
                report.dropped.push(DroppedParam {
                    key,
                    reason: "value is not valid UTF-8".to_string(),
                });
                continue;
            }
        };

        // Bad JSON falls back to the literal string, supporting plain
        // scalar params typed by hand.
        let parsed: Value =
            serde_json::from_str(&text).unwrap_or_else(|_| Value::String(text.clone()));

        match registry.get(&key) {
            Some(field) => match FilterValue::coerce(&field.field_type, &parsed) {
                Some(value) => report.values.insert(key, value),
                None => {
                    warn!(
                        "dropping query param '{}' for module '{}': value does not fit field type",
                        key,
                        registry.module()
                    );
                    report.dropped.push(DroppedParam {
                        key,
                        reason: "value does not fit the field's type".to_string(),
                    });
                }
            },
            // Unknown ids are preserved so the round trip keeps foreign
            // params intact; nothing downstream interprets them.
            None => report.values.insert(key, FilterValue::Raw(parsed)),
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDescriptor, FieldOption, FieldType};
    use serde_json::json;

    fn deals_registry() -> FieldRegistry {
        FieldRegistry::new(
            "deals",
            vec![
                FieldDescriptor::new("search", "Search", FieldType::TextSearch),
                FieldDescriptor::new(
                    "status",
                    "Status",
                    FieldType::MultiSelect {
                        options: vec![
                            FieldOption::new("active", "Active"),
                            FieldOption::new("pending", "Pending"),
                        ],
                    },
                ),
                FieldDescriptor::new("size", "Deal size", FieldType::NumericRange),
                FieldDescriptor::new("escrow", "Escrow only", FieldType::Boolean),
            ],
        )
        .unwrap()
    }

    #[test]
    fn round_trip_preserves_typed_sets() {
        let registry = deals_registry();
        let set: FilterValueSet = [
            (
                "status".to_string(),
                FilterValue::Multi(vec!["active".into(), "pending".into()]),
            ),
            ("search".to_string(), FilterValue::Text("alpha".into())),
            ("size".to_string(), FilterValue::NumberRange(10.0, 20.0)),
            ("escrow".to_string(), FilterValue::Toggle(true)),
        ]
        .into_iter()
        .collect();

        let report = decode(&registry, &encode(&set));
        assert!(report.dropped.is_empty());
        assert_eq!(report.values, set);
    }

    #[test]
    fn decodes_shared_link() {
        let registry = deals_registry();
        let query = r#"status=["active","pending"]&search="alpha""#;
        let report = decode(&registry, query);

        assert_eq!(
            report.values.get("status"),
            Some(&FilterValue::Multi(vec!["active".into(), "pending".into()]))
        );
        assert_eq!(
            report.values.get("search"),
            Some(&FilterValue::Text("alpha".into()))
        );
        assert_eq!(report.values.active_count(), 2);
    }

    #[test]
    fn bad_json_falls_back_to_literal_string() {
        let registry = deals_registry();
        let report = decode(&registry, "search=alpha");
        assert_eq!(
            report.values.get("search"),
            Some(&FilterValue::Text("alpha".into()))
        );
        assert!(report.dropped.is_empty());
    }

    #[test]
    fn unknown_keys_are_preserved_not_fatal() {
        let registry = deals_registry();
        let query = r#"utm_source="newsletter"&search="alpha""#;
        let report = decode(&registry, query);

        assert_eq!(
            report.values.get("search"),
            Some(&FilterValue::Text("alpha".into()))
        );
        assert_eq!(
            report.values.get("utm_source"),
            Some(&FilterValue::Raw(json!("newsletter")))
        );

        // And the passthrough survives a re-encode.
        let again = decode(&registry, &encode(&report.values));
        assert_eq!(again.values, report.values);
    }

    #[test]
    fn invalid_known_value_is_dropped_and_reported() {
        let registry = deals_registry();
        let report = decode(&registry, r#"status=["bogus"]&escrow=true"#);

        assert!(report.values.get("status").is_none());
        assert_eq!(report.values.get("escrow"), Some(&FilterValue::Toggle(true)));
        assert_eq!(report.dropped.len(), 1);
        assert_eq!(report.dropped[0].key, "status");
    }

    #[test]
    fn empty_and_prefixed_queries() {
        let registry = deals_registry();
        assert!(decode(&registry, "").values.is_empty());
        assert!(decode(&registry, "?").values.is_empty());

        let report = decode(&registry, r#"?search="alpha""#);
        assert_eq!(report.values.active_count(), 1);
    }

    #[test]
    fn inactive_fields_are_omitted_from_encoding() {
        let mut set = FilterValueSet::new();
        set.insert("search", FilterValue::Text("alpha".into()));
        set.insert("status", FilterValue::Multi(vec![]));

        let encoded = encode(&set);
        assert!(encoded.contains("search"));
        assert!(!encoded.contains("status"));
    }

    #[test]
    fn encoding_is_percent_escaped() {
        let mut set = FilterValueSet::new();
        set.insert("search", FilterValue::Text("otc desk & escrow".into()));
        let encoded = encode(&set);
        assert!(!encoded.contains(' '));
        assert_eq!(encoded.matches('&').count(), 0);

        let registry = deals_registry();
        let report = decode(&registry, &encoded);
        assert_eq!(
            report.values.get("search"),
            Some(&FilterValue::Text("otc desk & escrow".into()))
        );
    }
}
