//! Pattern Library: named phase vectors kept for re-cueing
//!
//! Insertion order is display order. Names are unique: storing an existing
//! name is a no-op, never an overwrite. Nothing here outlives the session.

use std::sync::Arc;

/// Immutable (name, phase vector) pair
#[derive(Debug, Clone, PartialEq)]
pub struct StoredPattern {
    name: String,
    phases: Arc<[f64]>,
}

impl StoredPattern {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phases(&self) -> &[f64] {
        &self.phases
    }

    /// Shared handle to the stored phases, no copy
    pub fn share(&self) -> Arc<[f64]> {
        Arc::clone(&self.phases)
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PatternLibrary {
    patterns: Vec<StoredPattern>,
}

impl PatternLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a deep copy of `phases` under `name`.
    ///
    /// Returns `false` (and changes nothing) when the name is already taken.
    pub fn store(&mut self, name: &str, phases: &[f64]) -> bool {
        if self.contains(name) {
            return false;
        }
        self.patterns.push(StoredPattern {
            name: name.to_string(),
            phases: Arc::from(phases),
        });
        true
    }

    pub fn list(&self) -> &[StoredPattern] {
        &self.patterns
    }

    pub fn get(&self, index: usize) -> Option<&StoredPattern> {
        self.patterns.get(index)
    }

    pub fn find(&self, name: &str) -> Option<usize> {
        self.patterns.iter().position(|p| p.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    pub fn clear(&mut self) {
        self.patterns.clear();
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_and_enumerate_in_order() {
        let mut library = PatternLibrary::new();
        assert!(library.store("Cross", &[0.0, 1.0]));
        assert!(library.store("Circle", &[2.0, 3.0]));

        let names: Vec<&str> = library.list().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["Cross", "Circle"]);
        assert_eq!(library.get(1).unwrap().phases(), &[2.0, 3.0]);
        assert!(library.get(2).is_none());
    }

    #[test]
    fn test_duplicate_name_is_noop() {
        let mut library = PatternLibrary::new();
        assert!(library.store("X", &[1.0]));
        assert!(!library.store("X", &[9.0]));

        assert_eq!(library.len(), 1);
        assert_eq!(library.list()[0].name(), "X");
        // first write wins
        assert_eq!(library.list()[0].phases(), &[1.0]);
    }

    #[test]
    fn test_store_takes_deep_copy() {
        let mut library = PatternLibrary::new();
        let mut source = vec![0.5, 0.5, 0.5];
        library.store("buffer", &source);
        source[0] = 3.0;
        assert_eq!(library.get(0).unwrap().phases(), &[0.5, 0.5, 0.5]);
    }

    #[test]
    fn test_clear_empties_library() {
        let mut library = PatternLibrary::new();
        library.store("a", &[0.0]);
        library.store("b", &[0.0]);
        library.clear();
        assert!(library.list().is_empty());
        assert!(library.is_empty());
        // names are free again
        assert!(library.store("a", &[1.0]));
    }

    #[test]
    fn test_find_by_name() {
        let mut library = PatternLibrary::new();
        library.store("first", &[0.0]);
        library.store("second", &[0.0]);
        assert_eq!(library.find("second"), Some(1));
        assert_eq!(library.find("third"), None);
    }
}
