//! Filter values and the per-module value set.
//!
//! [`FilterValue`] is the typed runtime representation of one field's current
//! selection, mirroring the [`FieldType`](crate::schema::FieldType) variants.
//! The extra [`FilterValue::Raw`] variant carries query parameters that have
//! no matching field descriptor, so unrecognized keys survive an
//! encode/decode round trip without the core ever interpreting them.
//!
//! [`FilterValueSet`] maps field id to value. Absence means "filter
//! inactive"; inserting a value equal to the field's empty representation
//! removes the key, so absence and emptiness never coexist.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::schema::FieldType;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One field's current value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterValue {
    /// Free-text search term.
    Text(String),
    /// Selected option of a single-select field.
    Choice(String),
    /// Selected options of a multi-select field.
    Multi(Vec<String>),
    /// Boolean toggle.
    Toggle(bool),
    /// Inclusive `[low, high]` numeric interval.
    NumberRange(f64, f64),
    /// Inclusive `[start, end]` date interval.
    DateRange(NaiveDate, NaiveDate),
    /// Star rating, `1..=max`.
    Rating(u8),
    /// Passthrough for parameters outside the field registry.
    Raw(Value),
}

impl FilterValue {
    /// Whether this value is the field's "empty" representation.
    ///
    /// Empty values are equivalent to the filter being absent: storing one
    /// clears the field instead.
    pub fn is_empty(&self) -> bool {
        match self {
            FilterValue::Text(s) | FilterValue::Choice(s) => s.is_empty(),
            FilterValue::Multi(items) => items.is_empty(),
            FilterValue::Raw(value) => match value {
                Value::Null => true,
                Value::String(s) => s.is_empty(),
                Value::Array(items) => items.is_empty(),
                _ => false,
            },
            _ => false,
        }
    }

    /// Project the value into its query-string JSON form.
    pub fn to_query_value(&self) -> Value {
        match self {
            FilterValue::Text(s) | FilterValue::Choice(s) => Value::String(s.clone()),
            FilterValue::Multi(items) => json!(items),
            FilterValue::Toggle(b) => Value::Bool(*b),
            FilterValue::NumberRange(low, high) => json!([low, high]),
            FilterValue::DateRange(start, end) => json!([
                start.format(DATE_FORMAT).to_string(),
                end.format(DATE_FORMAT).to_string(),
            ]),
            FilterValue::Rating(n) => json!(n),
            FilterValue::Raw(value) => value.clone(),
        }
    }

    /// Build a typed value from query-string JSON, directed by the field's
    /// declared type. Returns `None` when the raw value does not fit the
    /// type (wrong shape, option not in the list, inverted range, rating
    /// out of bounds).
    pub fn coerce(field_type: &FieldType, raw: &Value) -> Option<FilterValue> {
        let value = match field_type {
            FieldType::TextSearch => FilterValue::Text(raw.as_str()?.to_string()),
            FieldType::SingleSelect { .. } => FilterValue::Choice(raw.as_str()?.to_string()),
            FieldType::MultiSelect { .. } => {
                let items = raw
                    .as_array()?
                    .iter()
                    .map(|v| v.as_str().map(String::from))
                    .collect::<Option<Vec<String>>>()?;
                FilterValue::Multi(items)
            }
            FieldType::Boolean => FilterValue::Toggle(raw.as_bool()?),
            FieldType::NumericRange => {
                let bounds = raw.as_array()?;
                if bounds.len() != 2 {
                    return None;
                }
                FilterValue::NumberRange(bounds[0].as_f64()?, bounds[1].as_f64()?)
            }
            FieldType::DateRange => {
                let bounds = raw.as_array()?;
                if bounds.len() != 2 {
                    return None;
                }
                let start = NaiveDate::parse_from_str(bounds[0].as_str()?, DATE_FORMAT).ok()?;
                let end = NaiveDate::parse_from_str(bounds[1].as_str()?, DATE_FORMAT).ok()?;
                FilterValue::DateRange(start, end)
            }
            FieldType::Rating { .. } => FilterValue::Rating(u8::try_from(raw.as_u64()?).ok()?),
        };
        (value.is_empty() || value.matches_type(field_type)).then_some(value)
    }

    /// Whether this value satisfies the field's declared type and
    /// validation rules. `Raw` never matches a declared type.
    pub fn matches_type(&self, field_type: &FieldType) -> bool {
        match (self, field_type) {
            (FilterValue::Text(_), FieldType::TextSearch) => true,
            (FilterValue::Choice(choice), FieldType::SingleSelect { options }) => {
                options.is_empty() || options.iter().any(|o| o.value == *choice)
            }
            (FilterValue::Multi(items), FieldType::MultiSelect { options }) => {
                options.is_empty()
                    || items
                        .iter()
                        .all(|item| options.iter().any(|o| o.value == *item))
            }
            (FilterValue::Toggle(_), FieldType::Boolean) => true,
            (FilterValue::NumberRange(low, high), FieldType::NumericRange) => low <= high,
            (FilterValue::DateRange(start, end), FieldType::DateRange) => start <= end,
            (FilterValue::Rating(n), FieldType::Rating { max }) => (1..=*max).contains(n),
            _ => false,
        }
    }

    /// Numeric view for dependency comparisons. Only scalar numeric values
    /// qualify; ranges and text do not.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FilterValue::Rating(n) => Some(f64::from(*n)),
            FilterValue::Raw(Value::Number(n)) => n.as_f64(),
            _ => None,
        }
    }

    /// List-membership check for `contains` dependencies. True only when
    /// this value is a list including `needle`.
    pub fn list_includes(&self, needle: &Value) -> bool {
        match self {
            FilterValue::Multi(items) => needle
                .as_str()
                .is_some_and(|s| items.iter().any(|item| item == s)),
            FilterValue::Raw(Value::Array(items)) => items.contains(needle),
            _ => false,
        }
    }
}

/// The complete current selection across all fields of one module.
///
/// Keys are field ids; iteration order is the sorted key order, which keeps
/// the encoded query string deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterValueSet {
    entries: BTreeMap<String, FilterValue>,
}

impl FilterValueSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value. An empty value removes the key instead, so the
    /// active-filter count stays honest.
    pub fn insert(&mut self, id: impl Into<String>, value: FilterValue) {
        let id = id.into();
        if value.is_empty() {
            self.entries.remove(&id);
        } else {
            self.entries.insert(id, value);
        }
    }

    pub fn get(&self, id: &str) -> Option<&FilterValue> {
        self.entries.get(id)
    }

    /// Remove a value; returns whether the key was present.
    pub fn remove(&mut self, id: &str) -> bool {
        self.entries.remove(id).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FilterValue)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of active filters, for display ("N filters active").
    ///
    /// Counts entries whose value is non-empty. With values stored through
    /// [`insert`](Self::insert) this equals `len`, but sets built by
    /// deserialization may carry empty values, so the count re-checks.
    pub fn active_count(&self) -> usize {
        self.entries.values().filter(|v| !v.is_empty()).count()
    }
}

impl FromIterator<(String, FilterValue)> for FilterValueSet {
    fn from_iter<T: IntoIterator<Item = (String, FilterValue)>>(iter: T) -> Self {
        let mut set = Self::new();
        for (id, value) in iter {
            set.insert(id, value);
        }
        set
    }
}
