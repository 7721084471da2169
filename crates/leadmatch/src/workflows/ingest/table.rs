use std::collections::{BTreeMap, HashSet};

/// Rectangular string table shared by every tabular source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Pads short rows and truncates long ones to the header width.
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    /// Builds a table from keyed records; columns appear in first-seen order.
    pub fn from_records(records: &[BTreeMap<String, String>]) -> Self {
        let mut seen = HashSet::new();
        let mut headers = Vec::new();
        for record in records {
            for key in record.keys() {
                if seen.insert(key.as_str()) {
                    headers.push(key.clone());
                }
            }
        }

        let mut table = Self::new(headers);
        for record in records {
            let row = table
                .headers
                .iter()
                .map(|header| record.get(header).cloned().unwrap_or_default())
                .collect();
            table.rows.push(row);
        }
        table
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
