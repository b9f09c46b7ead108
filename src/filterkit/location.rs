//! The location port.
//!
//! The store keeps the query string of "the current location" congruent with
//! its values, but it never talks to a browser or router directly. Hosts
//! inject anything that can read and write a query string; [`MemoryLocation`]
//! is the in-process implementation used by tests and headless integrators.

/// A host-addressable query string, as a string-in/string-out dependency.
pub trait Location {
    /// Current query string (with or without a leading `?`).
    fn read(&self) -> String;

    /// Replace the query string. Called synchronously on every committed
    /// store mutation; must not block.
    fn write(&mut self, query: &str);
}

/// Plain in-memory location.
#[derive(Debug, Clone, Default)]
pub struct MemoryLocation {
    query: String,
}

impl MemoryLocation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }
}

impl Location for MemoryLocation {
    fn read(&self) -> String {
        self.query.clone()
    }

    fn write(&mut self, query: &str) {
        self.query = query.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_location_reads_back_writes() {
        let mut location = MemoryLocation::with_query("a=1");
        assert_eq!(location.read(), "a=1");
        location.write("b=2");
        assert_eq!(location.query(), "b=2");
    }
}
