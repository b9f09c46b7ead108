//! Field schema definitions and registry.
//!
//! A module (e.g. "deals", "knowledge") declares its filterable fields once,
//! at startup, as a list of [`FieldDescriptor`]s. Descriptors are immutable
//! after registration; everything downstream (value coercion, the query-string
//! codec, the dependency resolver) is driven by this declaration.
//!
//! Schemas can be built in code through the builder API or loaded from a JSON
//! document (see [`FieldRegistry::from_json`]).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{FilterError, Result};

/// The kind of value a field accepts.
///
/// Each variant carries only the data relevant to it: select fields carry
/// their option list, rating fields their maximum score. The serialized
/// names match the schema-document vocabulary (`text-search`,
/// `single-select`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum FieldType {
    /// Free-text search box.
    TextSearch,

    /// Exactly one choice from a closed option list.
    SingleSelect {
        #[serde(default)]
        options: Vec<FieldOption>,
    },

    /// Any number of choices from a closed option list.
    MultiSelect {
        #[serde(default)]
        options: Vec<FieldOption>,
    },

    /// A plain on/off toggle.
    Boolean,

    /// An inclusive `[low, high]` numeric interval.
    NumericRange,

    /// An inclusive `[start, end]` date interval (ISO `YYYY-MM-DD`).
    DateRange,

    /// A 1..=max star rating.
    Rating {
        #[serde(default = "default_rating_max")]
        max: u8,
    },
}

fn default_rating_max() -> u8 {
    5
}

/// One entry in a select field's option list.
///
/// `count` is an optional result-count hint ("Active (12)") supplied by the
/// host; it plays no role in validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub value: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

impl FieldOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            count: None,
        }
    }

    pub fn with_count(mut self, count: u64) -> Self {
        self.count = Some(count);
        self
    }
}

/// How a dependency's referenced value is compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyCondition {
    /// Strict value equality.
    Equals,
    /// Strict value inequality.
    NotEquals,
    /// The referenced value is a list and includes the comparison value.
    /// List membership only; substring matching on text fields is not
    /// supported.
    Contains,
    /// Numeric comparison; non-numeric referenced values evaluate false.
    GreaterThan,
    /// Numeric comparison; non-numeric referenced values evaluate false.
    LessThan,
    /// The referenced field has a non-empty value.
    Exists,
}

/// What a satisfied dependency condition does to the dependent field.
///
/// `Hide` and `Disable` invert the condition: the field is eligible while
/// the condition is false. `Show`/`Hide` are mirror images of the same
/// boolean, not independent states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyEffect {
    Show,
    Hide,
    Enable,
    Disable,
}

/// A rule making one field's eligibility conditional on another field's
/// current value. A field with several dependencies is eligible only when
/// all of them hold (conjunction).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dependency {
    pub on_field: String,
    pub condition: DependencyCondition,
    /// Comparison operand as it would appear in the query string.
    /// Unused by `exists`.
    #[serde(default)]
    pub comparison: Value,
    pub effect: DependencyEffect,
}

impl Dependency {
    pub fn new(
        on_field: impl Into<String>,
        condition: DependencyCondition,
        comparison: Value,
        effect: DependencyEffect,
    ) -> Self {
        Self {
            on_field: on_field.into(),
            condition,
            comparison,
            effect,
        }
    }

    /// Convenience: show the field while the condition holds.
    pub fn show_when(
        on_field: impl Into<String>,
        condition: DependencyCondition,
        comparison: Value,
    ) -> Self {
        Self::new(on_field, condition, comparison, DependencyEffect::Show)
    }

    /// Convenience: hide the field while the condition holds.
    pub fn hide_when(
        on_field: impl Into<String>,
        condition: DependencyCondition,
        comparison: Value,
    ) -> Self {
        Self::new(on_field, condition, comparison, DependencyEffect::Hide)
    }

    /// Convenience: show the field while the referenced field is non-empty.
    pub fn requires(on_field: impl Into<String>) -> Self {
        Self::new(
            on_field,
            DependencyCondition::Exists,
            Value::Null,
            DependencyEffect::Show,
        )
    }
}

/// Default-visibility grouping for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldCategory {
    /// Rendered up front.
    #[default]
    Primary,
    /// Collapsed behind an "advanced" disclosure by default.
    Advanced,
}

/// Declaration of a single filterable field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Unique key within the owning module; becomes the query parameter name.
    pub id: String,

    /// Human-readable name for rendering.
    pub label: String,

    #[serde(flatten)]
    pub field_type: FieldType,

    #[serde(default)]
    pub category: FieldCategory,

    /// Display ordering; ties are broken by declaration order.
    #[serde(default)]
    pub sort_order: i32,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<Dependency>,
}

impl FieldDescriptor {
    pub fn new(id: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            field_type,
            category: FieldCategory::default(),
            sort_order: 0,
            dependencies: Vec::new(),
        }
    }

    pub fn category(mut self, category: FieldCategory) -> Self {
        self.category = category;
        self
    }

    pub fn sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = sort_order;
        self
    }

    pub fn depends_on(mut self, dependency: Dependency) -> Self {
        self.dependencies.push(dependency);
        self
    }
}

/// All declared fields for one module.
///
/// The registry is the single source of truth for which query parameters
/// are recognized and how their values are validated. Construction rejects
/// duplicate ids; everything else about a registry is read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldRegistry {
    module: String,
    fields: Vec<FieldDescriptor>,
}

impl FieldRegistry {
    pub fn new(module: impl Into<String>, fields: Vec<FieldDescriptor>) -> Result<Self> {
        for (i, field) in fields.iter().enumerate() {
            if fields[..i].iter().any(|f| f.id == field.id) {
                return Err(FilterError::DuplicateField(field.id.clone()));
            }
        }
        Ok(Self {
            module: module.into(),
            fields,
        })
    }

    /// Parse a JSON schema document (`{"module": ..., "fields": [...]}`).
    pub fn from_json(text: &str) -> Result<Self> {
        let parsed: FieldRegistry = serde_json::from_str(text)?;
        // Re-validate: serde bypasses the duplicate-id check in `new`.
        Self::new(parsed.module, parsed.fields)
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn get(&self, id: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter()
    }

    /// Fields in display order: by `sort_order`, declaration order on ties.
    pub fn sorted(&self) -> Vec<&FieldDescriptor> {
        let mut fields: Vec<&FieldDescriptor> = self.fields.iter().collect();
        fields.sort_by_key(|f| f.sort_order);
        fields
    }

    pub fn in_category(&self, category: FieldCategory) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(move |f| f.category == category)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
