//! Dependency resolution.
//!
//! Computes which fields are currently eligible to render and accept input,
//! given the declared dependency rules and the current values. This is a
//! pure function over its inputs; the store recomputes it after every
//! change rather than caching anything.

use std::collections::BTreeSet;

use crate::schema::{
    Dependency, DependencyCondition, DependencyEffect, FieldDescriptor, FieldRegistry,
};
use crate::value::{FilterValue, FilterValueSet};

/// Ids of the fields currently eligible to render/accept input.
///
/// A field with no dependencies is always eligible. A field with several
/// dependencies is eligible only when every one of them holds — the rules
/// combine as a conjunction, never a disjunction.
pub fn visible_fields(registry: &FieldRegistry, values: &FilterValueSet) -> BTreeSet<String> {
    registry
        .iter()
        .filter(|field| field_eligible(registry, field, values))
        .map(|field| field.id.clone())
        .collect()
}

/// Evaluate a single field's dependency conjunction.
pub fn field_eligible(
    registry: &FieldRegistry,
    field: &FieldDescriptor,
    values: &FilterValueSet,
) -> bool {
    field.dependencies.iter().all(|dependency| {
        let holds = condition_holds(registry, dependency, values);
        match dependency.effect {
            DependencyEffect::Show | DependencyEffect::Enable => holds,
            // Hide/disable invert: eligible while the condition is false.
            DependencyEffect::Hide | DependencyEffect::Disable => !holds,
        }
    })
}

fn condition_holds(
    registry: &FieldRegistry,
    dependency: &Dependency,
    values: &FilterValueSet,
) -> bool {
    // A dependency on an undeclared field evaluates against an absent
    // value; passthrough params never participate.
    let referenced: Option<&FilterValue> = if registry.contains(&dependency.on_field) {
        values.get(&dependency.on_field)
    } else {
        None
    };

    match dependency.condition {
        DependencyCondition::Equals => {
            referenced.is_some_and(|v| v.to_query_value() == dependency.comparison)
        }
        DependencyCondition::NotEquals => {
            referenced.is_none_or(|v| v.to_query_value() != dependency.comparison)
        }
        DependencyCondition::Contains => {
            referenced.is_some_and(|v| v.list_includes(&dependency.comparison))
        }
        DependencyCondition::GreaterThan => compare(referenced, dependency, |a, b| a > b),
        DependencyCondition::LessThan => compare(referenced, dependency, |a, b| a < b),
        DependencyCondition::Exists => referenced.is_some_and(|v| !v.is_empty()),
    }
}

fn compare(
    referenced: Option<&FilterValue>,
    dependency: &Dependency,
    ordering: impl Fn(f64, f64) -> bool,
) -> bool {
    let (Some(actual), Some(expected)) = (
        referenced.and_then(FilterValue::as_number),
        dependency.comparison.as_f64(),
    ) else {
        return false;
    };
    ordering(actual, expected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDescriptor, FieldOption, FieldType};
    use serde_json::json;

    fn registry_with(fields: Vec<FieldDescriptor>) -> FieldRegistry {
        FieldRegistry::new("deals", fields).unwrap()
    }

    fn base_fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::new(
                "asset",
                "Asset",
                FieldType::SingleSelect {
                    options: vec![
                        FieldOption::new("btc", "Bitcoin"),
                        FieldOption::new("eth", "Ethereum"),
                    ],
                },
            ),
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
            FieldDescriptor::new("rating", "Rating", FieldType::Rating { max: 5 }),
        ]
    }

    fn values(entries: &[(&str, FilterValue)]) -> FilterValueSet {
        entries
            .iter()
            .map(|(id, v)| (id.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn field_without_dependencies_is_always_visible() {
        let registry = registry_with(base_fields());
        let visible = visible_fields(&registry, &FilterValueSet::new());
        assert!(visible.contains("asset"));
        assert!(visible.contains("status"));
        assert!(visible.contains("rating"));
    }

    #[test]
    fn equals_show_toggles_with_referenced_value() {
        let mut fields = base_fields();
        fields.push(
            FieldDescriptor::new("custody", "Custody", FieldType::Boolean).depends_on(
                Dependency::show_when("asset", DependencyCondition::Equals, json!("btc")),
            ),
        );
        let registry = registry_with(fields);

        let hidden = visible_fields(
            &registry,
            &values(&[("asset", FilterValue::Choice("eth".into()))]),
        );
        assert!(!hidden.contains("custody"));

        let shown = visible_fields(
            &registry,
            &values(&[("asset", FilterValue::Choice("btc".into()))]),
        );
        assert!(shown.contains("custody"));
    }

    #[test]
    fn two_show_dependencies_are_a_conjunction() {
        let mut fields = base_fields();
        fields.push(
            FieldDescriptor::new("premium", "Premium", FieldType::Boolean)
                .depends_on(Dependency::show_when(
                    "asset",
                    DependencyCondition::Equals,
                    json!("btc"),
                ))
                .depends_on(Dependency::show_when(
                    "status",
                    DependencyCondition::Contains,
                    json!("active"),
                )),
        );
        let registry = registry_with(fields);

        let both = values(&[
            ("asset", FilterValue::Choice("btc".into())),
            ("status", FilterValue::Multi(vec!["active".into()])),
        ]);
        assert!(visible_fields(&registry, &both).contains("premium"));

        let first_only = values(&[("asset", FilterValue::Choice("btc".into()))]);
        assert!(!visible_fields(&registry, &first_only).contains("premium"));

        let second_only = values(&[("status", FilterValue::Multi(vec!["active".into()]))]);
        assert!(!visible_fields(&registry, &second_only).contains("premium"));
    }

    #[test]
    fn hide_inverts_the_condition() {
        let mut fields = base_fields();
        fields.push(
            FieldDescriptor::new("otc_notes", "OTC notes", FieldType::TextSearch).depends_on(
                Dependency::hide_when("asset", DependencyCondition::Equals, json!("eth")),
            ),
        );
        let registry = registry_with(fields);

        assert!(visible_fields(&registry, &FilterValueSet::new()).contains("otc_notes"));
        let eth = values(&[("asset", FilterValue::Choice("eth".into()))]);
        assert!(!visible_fields(&registry, &eth).contains("otc_notes"));
    }

    #[test]
    fn numeric_comparisons_require_numbers() {
        let mut fields = base_fields();
        fields.push(
            FieldDescriptor::new("vip", "VIP", FieldType::Boolean).depends_on(
                Dependency::show_when("rating", DependencyCondition::GreaterThan, json!(3)),
            ),
        );
        let registry = registry_with(fields);

        assert!(visible_fields(&registry, &values(&[("rating", FilterValue::Rating(4))]))
            .contains("vip"));
        assert!(!visible_fields(&registry, &values(&[("rating", FilterValue::Rating(3))]))
            .contains("vip"));
        // Absent and non-numeric referenced values both evaluate false.
        assert!(!visible_fields(&registry, &FilterValueSet::new()).contains("vip"));
        assert!(!visible_fields(
            &registry,
            &values(&[("asset", FilterValue::Choice("btc".into()))])
        )
        .contains("vip"));
    }

    #[test]
    fn exists_requires_a_non_empty_value() {
        let mut fields = base_fields();
        fields.push(
            FieldDescriptor::new("within", "Within", FieldType::Boolean)
                .depends_on(Dependency::requires("status")),
        );
        let registry = registry_with(fields);

        assert!(!visible_fields(&registry, &FilterValueSet::new()).contains("within"));
        let set = values(&[("status", FilterValue::Multi(vec!["active".into()]))]);
        assert!(visible_fields(&registry, &set).contains("within"));
    }

    #[test]
    fn not_equals_holds_when_referenced_field_is_absent() {
        let mut fields = base_fields();
        fields.push(
            FieldDescriptor::new("fallback", "Fallback", FieldType::Boolean).depends_on(
                Dependency::show_when("asset", DependencyCondition::NotEquals, json!("btc")),
            ),
        );
        let registry = registry_with(fields);

        assert!(visible_fields(&registry, &FilterValueSet::new()).contains("fallback"));
        let btc = values(&[("asset", FilterValue::Choice("btc".into()))]);
        assert!(!visible_fields(&registry, &btc).contains("fallback"));
    }

    #[test]
    fn dependency_on_undeclared_field_evaluates_as_absent() {
        let mut fields = base_fields();
        fields.push(
            FieldDescriptor::new("ghost", "Ghost", FieldType::Boolean).depends_on(
                Dependency::show_when("no_such_field", DependencyCondition::Exists, json!(null)),
            ),
        );
        let registry = registry_with(fields);

        // Even a passthrough value under that key must not satisfy it.
        let set = values(&[("no_such_field", FilterValue::Raw(json!("x")))]);
        assert!(!visible_fields(&registry, &set).contains("ghost"));
    }

    #[test]
    fn disable_behaves_like_hide_for_eligibility() {
        let mut fields = base_fields();
        fields.push(
            FieldDescriptor::new("locked", "Locked", FieldType::Boolean).depends_on(
                Dependency::new(
                    "asset",
                    DependencyCondition::Exists,
                    json!(null),
                    DependencyEffect::Disable,
                ),
            ),
        );
        let registry = registry_with(fields);

        assert!(visible_fields(&registry, &FilterValueSet::new()).contains("locked"));
        let set = values(&[("asset", FilterValue::Choice("btc".into()))]);
        assert!(!visible_fields(&registry, &set).contains("locked"));
    }
}
