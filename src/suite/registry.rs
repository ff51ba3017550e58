//! Test registry
//!
//! Append-only, name-unique, insertion-ordered collection of test entries.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::deferred::{DeferredResult, IntoDeferred};
use crate::error::DuplicateName;

type TestBody = dyn Fn() -> DeferredResult + Send + Sync;

/// A named test unit
#[derive(Clone)]
pub struct TestEntry {
    name: String,
    body: Arc<TestBody>,
}

impl TestEntry {
    pub fn new<F, R>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: IntoDeferred,
    {
        Self {
            name: name.into(),
            body: Arc::new(move || body().into_deferred()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Call the body. Faults are not caught here.
    pub fn invoke(&self) -> DeferredResult {
        (self.body)()
    }
}

impl fmt::Debug for TestEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestEntry")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Registry open for appends
#[derive(Debug, Default)]
pub struct TestRegistry {
    entries: Vec<TestEntry>,
    names: HashSet<String>,
}

impl TestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a test body under a unique name
    pub fn add<F, R>(&mut self, name: impl Into<String>, body: F) -> Result<(), DuplicateName>
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: IntoDeferred,
    {
        self.insert(TestEntry::new(name, body))
    }

    /// Append a prepared entry. The existing entry wins on a name clash.
    pub fn insert(&mut self, entry: TestEntry) -> Result<(), DuplicateName> {
        if !self.names.insert(entry.name.clone()) {
            return Err(DuplicateName(entry.name));
        }
        self.entries.push(entry);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names in registration order
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.name.clone()).collect()
    }

    /// Close the registry for good
    pub fn seal(self) -> SealedRegistry {
        SealedRegistry {
            entries: self.entries.into(),
        }
    }
}

/// Read-only registry, produced once the suite is ready
#[derive(Clone, Debug)]
pub struct SealedRegistry {
    entries: Arc<[TestEntry]>,
}

impl SealedRegistry {
    /// Stable view of all entries in registration order
    pub fn snapshot(&self) -> Arc<[TestEntry]> {
        Arc::clone(&self.entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.name.clone()).collect()
    }
}
