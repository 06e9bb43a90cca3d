use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

/// Name of the field at `index`: `field_0`, `field_1`, ...
pub fn field_name(index: usize) -> String {
    format!("field_{index}")
}

/// Field layout shared by every record of a run.
///
/// Names are computed once and shared between workers; building a record only
/// clones them.
#[derive(Clone, Debug)]
pub struct RecordShape {
    field_names: Arc<[String]>,
}

impl RecordShape {
    pub fn new(field_count: usize) -> Self {
        Self {
            field_names: (0..field_count).map(field_name).collect(),
        }
    }

    pub fn field_count(&self) -> usize {
        self.field_names.len()
    }

    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }

    /// Builds a record where every field holds `value`.
    pub fn build(&self, value: i64) -> Record {
        Record {
            fields: self
                .field_names
                .iter()
                .map(|name| (name.clone(), value))
                .collect(),
        }
    }
}

/// One document submitted to the store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, i64>,
}

impl Record {
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<i64> {
        self.fields.get(field).copied()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, i64)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
