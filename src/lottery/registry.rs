use std::collections::HashSet;

/// Ordered, duplicate-free list of participant names. The name is the key;
/// comparisons are exact and case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParticipantRegistry {
    names: Vec<String>,
}

impl ParticipantRegistry {
    /// Build a registry from stored names, dropping blanks and repeats.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = Self::default();
        registry.replace_all(names);
        registry
    }

    /// Trim and append `name`. Returns `false` (and changes nothing) when the
    /// trimmed name is empty or already present.
    pub fn add(&mut self, name: &str) -> bool {
        let trimmed = name.trim();
        if trimmed.is_empty() || self.contains(trimmed) {
            return false;
        }
        self.names.push(trimmed.to_string());
        true
    }

    /// Remove `name` if present.
    pub fn remove(&mut self, name: &str) -> bool {
        match self.names.iter().position(|existing| existing == name) {
            Some(idx) => {
                self.names.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Discard the current list and install `names`, deduplicated in
    /// first-occurrence order.
    pub fn replace_all<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        self.names = names
            .into_iter()
            .filter_map(|name| {
                let trimmed = name.as_ref().trim();
                if trimmed.is_empty() || !seen.insert(trimmed.to_string()) {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            })
            .collect();
    }

    pub fn clear(&mut self) {
        self.names.clear();
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|existing| existing == name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_trims_and_ignores_blank_or_duplicate_names() {
        let mut registry = ParticipantRegistry::default();
        assert!(registry.add("  Ana "));
        assert!(!registry.add("Ana"));
        assert!(!registry.add("   "));
        assert!(registry.add("ana"));
        assert_eq!(registry.names(), ["Ana", "ana"]);
    }

    #[test]
    fn interleaved_add_remove_keeps_first_insertion_order() {
        let mut registry = ParticipantRegistry::default();
        for name in ["A", "B", "C", "D"] {
            registry.add(name);
        }
        assert!(registry.remove("B"));
        assert!(!registry.remove("B"));
        registry.add("A");
        registry.add("E");
        registry.add("B");
        assert_eq!(registry.names(), ["A", "C", "D", "E", "B"]);
    }

    #[test]
    fn random_add_remove_sequences_keep_names_unique_and_ordered() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};
        use std::collections::HashMap;

        let pool = ["Ana", "Bob", "Cy", "Dewi", "Eko", " Ana", "Bob ", "  "];
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut registry = ParticipantRegistry::default();
            // Insertion stamp of each name currently present.
            let mut stamps: HashMap<String, usize> = HashMap::new();

            for step in 0..200 {
                let name = pool[rng.random_range(0..pool.len())];
                if rng.random_bool(0.6) {
                    let trimmed = name.trim();
                    let added = registry.add(name);
                    assert_eq!(
                        added,
                        !trimmed.is_empty() && !stamps.contains_key(trimmed)
                    );
                    if added {
                        stamps.insert(trimmed.to_string(), step);
                    }
                } else {
                    let removed = registry.remove(name);
                    assert_eq!(removed, stamps.remove(name).is_some());
                }

                let unique: HashSet<&String> = registry.names().iter().collect();
                assert_eq!(unique.len(), registry.len());
                assert_eq!(registry.len(), stamps.len());
                let order: Vec<usize> = registry.names().iter().map(|n| stamps[n]).collect();
                assert!(order.windows(2).all(|pair| pair[0] < pair[1]));
            }
        }
    }

    #[test]
    fn replace_all_deduplicates_in_first_occurrence_order() {
        let mut registry = ParticipantRegistry::from_names(["Old"]);
        registry.replace_all(["Bob", "Ana", " Bob", "", "Cy", "Ana"]);
        assert_eq!(registry.names(), ["Bob", "Ana", "Cy"]);
    }
}
