//! Medication list for the drug-interaction checker

use serde::{Deserialize, Serialize};

/// Ordered list of distinct medication names
///
/// Names are trimmed on insert; a name that is already present (exact
/// match after trimming) is not added twice.
///
/// # Examples
///
/// ```
/// use healthai::medications::MedicationList;
///
/// let mut list = MedicationList::new();
/// assert!(list.add("aspirin"));
/// assert!(!list.add(" aspirin "));
/// assert!(!list.is_ready());
/// assert!(list.add("warfarin"));
/// assert!(list.is_ready());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationList {
    names: Vec<String>,
}

impl MedicationList {
    /// Fewest medications an interaction check needs
    pub const MIN_FOR_CHECK: usize = 2;

    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from raw names, dropping blanks and duplicates
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::new();
        for name in names {
            list.add(name.as_ref());
        }
        list
    }

    /// Add a medication; returns false when it was blank or already listed
    pub fn add(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.contains(name) {
            return false;
        }
        self.names.push(name.to_string());
        true
    }

    /// Remove the medication at `index`
    pub fn remove(&mut self, index: usize) -> Option<String> {
        if index < self.names.len() {
            Some(self.names.remove(index))
        } else {
            None
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        let name = name.trim();
        self.names.iter().any(|n| n == name)
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

    /// Whether enough medications are listed to run a check
    pub fn is_ready(&self) -> bool {
        self.names.len() >= Self::MIN_FOR_CHECK
    }

    pub fn clear(&mut self) {
        self.names.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_add_is_noop() {
        let mut list = MedicationList::new();
        assert!(list.add("ibuprofen"));
        assert!(!list.add("ibuprofen"));
        assert_eq!(list.names(), &["ibuprofen".to_string()]);
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let mut list = MedicationList::new();
        list.add("Ibuprofen");
        assert!(list.add("ibuprofen"));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_blank_names_are_ignored() {
        let mut list = MedicationList::new();
        assert!(!list.add(""));
        assert!(!list.add("   "));
        assert!(list.is_empty());
    }

    #[test]
    fn test_remove_by_index() {
        let mut list = MedicationList::from_names(["a", "b", "c"]);
        assert_eq!(list.remove(1), Some("b".to_string()));
        assert_eq!(list.names(), &["a".to_string(), "c".to_string()]);
        assert_eq!(list.remove(5), None);
    }

    #[test]
    fn test_from_names_dedups_and_keeps_order() {
        let list = MedicationList::from_names(vec!["metformin", " lisinopril", "metformin", ""]);
        assert_eq!(
            list.names(),
            &["metformin".to_string(), "lisinopril".to_string()]
        );
        assert!(list.is_ready());
    }

    #[test]
    fn test_clear() {
        let mut list = MedicationList::from_names(["a", "b"]);
        list.clear();
        assert!(!list.is_ready());
        assert!(list.is_empty());
    }
}
