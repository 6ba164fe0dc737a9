// =============================================================================
// RawTable — loosely-shaped, column-oriented data as a source returns it
// =============================================================================
//
// Column names are whatever the upstream provider chose ("Close",
// "close_AAPL", "Adj Close", ...).  Missing cells are `None`; NaN cells are
// kept as-is and treated as missing by the validator.
// =============================================================================

use chrono::{DateTime, Utc};

use crate::errors::SourceError;

/// A single named column of optional values.
#[derive(Debug, Clone, PartialEq)]
pub struct RawColumn {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// Timestamp index plus named columns, all of equal length.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    index: Vec<DateTime<Utc>>,
    columns: Vec<RawColumn>,
}

impl RawTable {
    pub fn new(index: Vec<DateTime<Utc>>) -> Self {
        Self {
            index,
            columns: Vec::new(),
        }
    }

    /// Append a column, rejecting one whose length differs from the index.
    pub fn push_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<Option<f64>>,
    ) -> Result<(), SourceError> {
        let name = name.into();
        if values.len() != self.index.len() {
            return Err(SourceError::Malformed(format!(
                "column '{name}' has {} values, index has {}",
                values.len(),
                self.index.len()
            )));
        }
        self.columns.push(RawColumn { name, values });
        Ok(())
    }

    /// Builder-style [`push_column`](Self::push_column).
    pub fn with_column(
        mut self,
        name: impl Into<String>,
        values: Vec<Option<f64>>,
    ) -> Result<Self, SourceError> {
        self.push_column(name, values)?;
        Ok(self)
    }

    pub(crate) fn push_column_unchecked(&mut self, name: &str, values: Vec<Option<f64>>) {
        debug_assert_eq!(values.len(), self.index.len());
        self.columns.push(RawColumn {
            name: name.to_string(),
            values,
        });
    }

    pub fn index(&self) -> &[DateTime<Utc>] {
        &self.index
    }

    pub fn columns(&self) -> &[RawColumn] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Locate the column for a canonical field (`"close"`, `"high"`, ...).
    ///
    /// Matches any column whose name case-insensitively contains `field`.
    /// Among several matches an unadjusted column is preferred (so `Close`
    /// beats `Adj Close`); otherwise the first in column order wins.
    pub fn find_column(&self, field: &str) -> Option<&RawColumn> {
        let needle = field.to_lowercase();
        let matches: Vec<&RawColumn> = self
            .columns
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&needle))
            .collect();

        matches
            .iter()
            .find(|c| !c.name.to_lowercase().contains("adj"))
            .or_else(|| matches.first())
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn index(n: usize) -> Vec<DateTime<Utc>> {
        (0..n)
            .map(|i| Utc.timestamp_opt(1_700_000_000 + i as i64 * 86_400, 0).unwrap())
            .collect()
    }

    #[test]
    fn push_column_rejects_length_mismatch() {
        let mut table = RawTable::new(index(3));
        let err = table.push_column("Close", vec![Some(1.0)]).unwrap_err();
        assert!(matches!(err, SourceError::Malformed(_)));
        assert!(table.columns().is_empty());
    }

    #[test]
    fn find_column_is_case_insensitive_and_handles_compound_names() {
        let table = RawTable::new(index(1))
            .with_column("AAPL_Open", vec![Some(1.0)])
            .unwrap()
            .with_column("CLOSE_AAPL", vec![Some(2.0)])
            .unwrap();
        assert_eq!(table.find_column("close").unwrap().name, "CLOSE_AAPL");
        assert_eq!(table.find_column("open").unwrap().name, "AAPL_Open");
        assert!(table.find_column("volume").is_none());
    }

    #[test]
    fn find_column_prefers_unadjusted_close() {
        let table = RawTable::new(index(1))
            .with_column("Adj Close", vec![Some(1.0)])
            .unwrap()
            .with_column("Close", vec![Some(2.0)])
            .unwrap();
        assert_eq!(table.find_column("close").unwrap().name, "Close");

        let adjusted_only = RawTable::new(index(1))
            .with_column("Adj Close", vec![Some(1.0)])
            .unwrap();
        assert_eq!(adjusted_only.find_column("close").unwrap().name, "Adj Close");
    }
}
