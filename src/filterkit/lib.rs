//! # filterkit
//!
//! filterkit is a **UI-agnostic filter-state engine**. It owns everything
//! about a module's filters except rendering them: the declared field
//! schema, the live value set, the shareable query-string representation,
//! field-to-field dependency rules, named presets, and change fan-out.
//! Hosts bring their own widgets, router, and data fetching.
//!
//! ## The pieces
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Host UI / CLI (main.rs for the bundled binary)             │
//! │  - Renders fields, routes the real location, fetches data   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  FilterStore<L: Location> (store.rs)                        │
//! │  - Owns the live FilterValueSet for one module              │
//! │  - Every committed mutation: re-encode → location,          │
//! │    then notify observers with the full set                  │
//! └─────────────────────────────────────────────────────────────┘
//!        │                 │                  │
//!        ▼                 ▼                  ▼
//! ┌──────────────┐ ┌───────────────┐ ┌──────────────────────────┐
//! │ codec.rs     │ │ visibility.rs │ │ presets.rs               │
//! │ query-string │ │ dependency    │ │ named snapshots,         │
//! │ encode/decode│ │ conjunctions  │ │ value-copy in and out    │
//! └──────────────┘ └───────────────┘ └──────────────────────────┘
//!        │                 │
//!        └────────┬────────┘
//!                 ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  schema.rs — FieldRegistry: the declared fields, their      │
//! │  types, options, categories and dependency rules            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key invariant: location congruence
//!
//! At all times the encoded query string and the value set agree: every
//! non-empty value appears as one `fieldId=JSON(value)` parameter, absent
//! parameters mean inactive filters, and values that fail a field's
//! validation exist in neither. The location itself is abstracted behind
//! the tiny [`location::Location`] port so the core runs without a browser
//! or router; [`location::MemoryLocation`] is enough for tests and
//! headless hosts.
//!
//! ## Synchronous by design
//!
//! Everything completes within the calling stack frame: no timers, no
//! background work, no internal locking. Mutations apply in call order and
//! observers fire synchronously after each commit. Asynchronous concerns
//! (persisting presets remotely, debouncing data fetches) belong to the
//! host, layered strictly outside this core.
//!
//! ## Module overview
//!
//! - [`schema`]: field declarations and the per-module registry
//! - [`value`]: typed filter values and the value set
//! - [`codec`]: query-string encode/decode
//! - [`visibility`]: the dependency resolver
//! - [`presets`]: named snapshots and their manager
//! - [`store`]: the synchronous state machine tying it together
//! - [`location`]: the query-string port
//! - [`error`]: error types

pub mod codec;
pub mod error;
pub mod location;
pub mod presets;
pub mod schema;
pub mod store;
pub mod value;
pub mod visibility;
