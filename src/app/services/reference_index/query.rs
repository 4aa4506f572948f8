//! Reference point lookup and search functionality

use super::ReferenceIndex;
use crate::models::{ReferenceRecord, normalize_code};

impl ReferenceIndex {
    /// All records, sorted by composite key
    pub fn records(&self) -> Vec<&ReferenceRecord> {
        let mut records: Vec<_> = self.records.iter().collect();
        records.sort_by(|a, b| a.0.cmp(b.0));
        records.into_iter().map(|(_, record)| record).collect()
    }

    /// Find records by primary and/or secondary code
    ///
    /// Each filter is an exact, case-insensitive match; `None` matches any
    /// value. With both filters `None` every record is returned.
    ///
    /// # Examples
    /// ```
    /// # use jbw_viewer::app::services::reference_index::ReferenceIndex;
    /// # use jbw_viewer::models::ReferenceRecord;
    /// let index = ReferenceIndex::from_records(vec![ReferenceRecord {
    ///     primary: "597120".to_string(),
    ///     secondary: "BA".to_string(),
    ///     label: "Site A".to_string(),
    ///     x: 600000.0,
    ///     y: 6700000.0,
    /// }]);
    /// assert_eq!(index.search(Some("597120"), None).len(), 1);
    /// assert_eq!(index.search(None, Some("ba")).len(), 1);
    /// ```
    pub fn search(&self, primary: Option<&str>, secondary: Option<&str>) -> Vec<&ReferenceRecord> {
        let primary = primary.map(normalize_code);
        let secondary = secondary.map(normalize_code);

        let mut matches: Vec<_> = self
            .records
            .iter()
            .filter(|(key, _)| primary.as_ref().is_none_or(|p| *p == key.primary))
            .filter(|(key, _)| secondary.as_ref().is_none_or(|s| *s == key.secondary))
            .collect();

        matches.sort_by(|a, b| a.0.cmp(b.0));
        matches.into_iter().map(|(_, record)| record).collect()
    }

    /// Find records whose label contains `pattern` (case-insensitive)
    pub fn find_by_label(&self, pattern: &str) -> Vec<&ReferenceRecord> {
        let pattern = pattern.to_lowercase();
        let mut matches: Vec<_> = self
            .records
            .values()
            .filter(|record| record.label.to_lowercase().contains(&pattern))
            .collect();

        matches.sort_by_key(|record| record.key());
        matches
    }
}
