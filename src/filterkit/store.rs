//! The filter value store.
//!
//! [`FilterStore`] owns the live [`FilterValueSet`] for one module and keeps
//! two downstream surfaces in sync on every committed mutation, in order:
//!
//! 1. the injected [`Location`] gets the re-encoded query string, and
//! 2. registered observers get the full current set (not a diff).
//!
//! The store is a pure, synchronous state machine: no batching, no async
//! scheduling, no internal concurrency. Mutations apply in call order within
//! the calling stack frame. Because the mutation commits before observers
//! run, a panicking observer cannot leave the store inconsistent.
//!
//! The store is constructor-injected everywhere it is consumed; nothing in
//! this crate assumes a global singleton.

use std::collections::BTreeSet;

use log::{debug, warn};
use uuid::Uuid;

use crate::codec;
use crate::error::{FilterError, Result};
use crate::location::Location;
use crate::presets::Preset;
use crate::schema::FieldRegistry;
use crate::value::{FilterValue, FilterValueSet};
use crate::visibility;

/// Handle returned by [`FilterStore::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type Observer = Box<dyn FnMut(&FilterValueSet)>;

/// Filter state for one module, generic over the host's location port.
pub struct FilterStore<L: Location> {
    registry: FieldRegistry,
    values: FilterValueSet,
    location: L,
    loaded_preset: Option<Uuid>,
    observers: Vec<(ObserverId, Observer)>,
    next_observer: u64,
}

impl<L: Location> FilterStore<L> {
    /// Build a store hydrated from the location's current query string.
    ///
    /// Values that fail their field's type check are dropped; unknown
    /// parameters ride along as passthrough. The normalized encoding is
    /// written straight back so the location and the store start congruent.
    /// No observers can exist yet, so hydration does not notify.
    pub fn new(registry: FieldRegistry, location: L) -> Self {
        let report = codec::decode(&registry, &location.read());
        for dropped in &report.dropped {
            warn!(
                "hydration skipped query param '{}': {}",
                dropped.key, dropped.reason
            );
        }
        let mut store = Self {
            registry,
            values: report.values,
            location,
            loaded_preset: None,
            observers: Vec::new(),
            next_observer: 0,
        };
        store.location.write(&codec::encode(&store.values));
        store
    }

    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    pub fn location(&self) -> &L {
        &self.location
    }

    /// Current values, borrowed.
    pub fn values(&self) -> &FilterValueSet {
        &self.values
    }

    /// Deep copy of the current values.
    pub fn snapshot(&self) -> FilterValueSet {
        self.values.clone()
    }

    /// Number of active filters, for display only.
    pub fn active_count(&self) -> usize {
        self.values.active_count()
    }

    /// Ids of fields currently eligible to render/accept input.
    pub fn visible_fields(&self) -> BTreeSet<String> {
        visibility::visible_fields(&self.registry, &self.values)
    }

    /// Preset last loaded into this store, if `clear_all` has not reset it.
    pub fn loaded_preset(&self) -> Option<Uuid> {
        self.loaded_preset
    }

    /// Set one field's value. Returns whether the edit was accepted.
    ///
    /// An unknown field id or a value that fails the field's type check is
    /// rejected (`false`); the prior value stays in place. A value equal to
    /// the field's empty representation clears the field instead, exactly
    /// like [`clear_value`](Self::clear_value).
    pub fn set_value(&mut self, field_id: &str, value: FilterValue) -> bool {
        let Some(field) = self.registry.get(field_id) else {
            warn!("set_value: unknown field '{}'", field_id);
            return false;
        };
        if value.is_empty() {
            self.clear_value(field_id);
            return true;
        }
        if !value.matches_type(&field.field_type) {
            warn!("set_value: value rejected by field '{}'", field_id);
            return false;
        }
        debug!("set_value: {} on module '{}'", field_id, self.registry.module());
        self.values.insert(field_id.to_string(), value);
        self.commit();
        true
    }

    /// Deactivate one field. Returns whether a value was present. Clearing
    /// an absent field is a no-op and does not notify.
    pub fn clear_value(&mut self, field_id: &str) -> bool {
        if self.values.remove(field_id) {
            self.commit();
            true
        } else {
            false
        }
    }

    /// Reset to the empty set and drop the loaded-preset reference, so a
    /// cleared store never silently reapplies a preset. Idempotent with
    /// respect to state; each call still commits and notifies.
    pub fn clear_all(&mut self) {
        self.values.clear();
        self.loaded_preset = None;
        self.commit();
    }

    /// Apply a batch of edits atomically: every update is validated first,
    /// and a single failure leaves the store untouched. Empty values clear
    /// their field. One commit (and one notification) covers the batch.
    pub fn apply_many(
        &mut self,
        updates: impl IntoIterator<Item = (String, FilterValue)>,
    ) -> Result<()> {
        let updates: Vec<(String, FilterValue)> = updates.into_iter().collect();
        for (field_id, value) in &updates {
            let Some(field) = self.registry.get(field_id) else {
                return Err(FilterError::UnknownField(field_id.clone()));
            };
            if !value.is_empty() && !value.matches_type(&field.field_type) {
                return Err(FilterError::Validation {
                    field: field_id.clone(),
                });
            }
        }
        for (field_id, value) in updates {
            self.values.insert(field_id, value);
        }
        self.commit();
        Ok(())
    }

    /// Bulk-replace the current values with a copy of the preset's
    /// snapshot. Entries for fields this module does not declare, or whose
    /// value no longer fits the field, are skipped with a warning rather
    /// than failing the load.
    pub fn load_preset(&mut self, preset: &Preset) {
        let mut next = FilterValueSet::new();
        for (field_id, value) in preset.filters.iter() {
            match self.registry.get(field_id) {
                Some(field) if value.matches_type(&field.field_type) => {
                    next.insert(field_id.clone(), value.clone());
                }
                _ => warn!(
                    "preset '{}': skipping entry '{}' not valid for module '{}'",
                    preset.name,
                    field_id,
                    self.registry.module()
                ),
            }
        }
        self.values = next;
        self.loaded_preset = Some(preset.id);
        self.commit();
    }

    /// Register a change observer. Observers run synchronously after every
    /// committed mutation, receiving the full current set; consumers that
    /// need deltas diff against their own last-seen copy.
    pub fn subscribe(&mut self, observer: impl FnMut(&FilterValueSet) + 'static) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Drop an observer registration. Returns whether it was present.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer_id, _)| *observer_id != id);
        self.observers.len() != before
    }

    // The mutation has already been applied when this runs: first the
    // location is rewritten, then observers fire.
    fn commit(&mut self) {
        self.location.write(&codec::encode(&self.values));
        for (_, observer) in self.observers.iter_mut() {
            observer(&self.values);
        }
    }
}
