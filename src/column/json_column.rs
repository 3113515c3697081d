use serde_json::{Map, Value};

use crate::{
    column::{Column, DeleteState},
    common::{Result, StorageError},
    types::LogicalType,
    util::path_segments,
};

/// Flattened layout: one nullable typed column per path, positionally aligned.
#[derive(Debug, Clone, PartialEq)]
struct FlatFields {
    paths: Vec<String>,
    types: Vec<LogicalType>,
    fields: Vec<Column>,
}

/// Column of JSON documents.
///
/// Rows are held either raw (one `serde_json::Value` each) or flattened into
/// typed sub-columns, one per path. A flattened column still answers
/// `get_json` by reassembling the document from its fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsonColumn {
    values: Vec<Value>,
    flat: Option<FlatFields>,
    delete_state: DeleteState,
}

impl JsonColumn {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values(values: Vec<Value>) -> Self {
        Self { values, ..Self::default() }
    }

    pub fn is_flat(&self) -> bool {
        self.flat.is_some()
    }

    pub fn size(&self) -> usize {
        match &self.flat {
            Some(flat) => flat.fields.first().map(Column::size).unwrap_or(0),
            None => self.values.len(),
        }
    }

    pub fn delete_state(&self) -> DeleteState {
        self.delete_state
    }

    pub fn set_delete_state(&mut self, state: DeleteState) {
        self.delete_state = state;
    }

    /// Switch to (or keep) the flattened layout for `paths`/`types`.
    ///
    /// Calling it again with the same shape is a no-op, so readers call it
    /// on every batch.
    pub fn init_flat_columns(&mut self, paths: &[String], types: &[LogicalType]) {
        debug_assert_eq!(paths.len(), types.len());
        if let Some(flat) = &self.flat {
            if flat.paths == paths && flat.types == types {
                return;
            }
        }
        debug_assert_eq!(self.size(), 0, "reshaping a json column that already holds rows");
        self.values.clear();
        self.flat = Some(FlatFields {
            paths: paths.to_vec(),
            types: types.to_vec(),
            fields: types.iter().map(|ty| Column::create(*ty, true)).collect(),
        });
    }

    pub fn flat_paths(&self) -> &[String] {
        self.flat.as_ref().map(|f| f.paths.as_slice()).unwrap_or_default()
    }

    pub fn flat_types(&self) -> &[LogicalType] {
        self.flat.as_ref().map(|f| f.types.as_slice()).unwrap_or_default()
    }

    pub fn get_flat_field(&self, index: usize) -> Option<&Column> {
        self.flat.as_ref().and_then(|f| f.fields.get(index))
    }

    pub fn get_flat_field_mut(&mut self, index: usize) -> Result<&mut Column> {
        self.flat
            .as_mut()
            .and_then(|f| f.fields.get_mut(index))
            .ok_or_else(|| StorageError::Internal(format!("json column has no flat field {index}")))
    }

    pub fn get_flat_fields_mut(&mut self) -> Result<&mut [Column]> {
        self.flat
            .as_mut()
            .map(|f| f.fields.as_mut_slice())
            .ok_or_else(|| StorageError::Internal("json column is not flattened".into()))
    }

    pub fn push_json(&mut self, value: Value) -> Result<()> {
        if self.is_flat() {
            return StorageError::NotSupported("raw document into a flattened json column".into())
                .err();
        }
        self.values.push(value);
        Ok(())
    }

    pub fn push_default(&mut self, count: usize) {
        match &mut self.flat {
            Some(flat) => flat.fields.iter_mut().for_each(|field| field.append_default(count)),
            None => self.values.extend(std::iter::repeat_n(Value::Null, count)),
        }
    }

    /// Raw rows (empty once flattened).
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn append(&mut self, src: &JsonColumn, offset: usize, count: usize) -> Result<()> {
        match (&mut self.flat, &src.flat) {
            (None, None) => {
                self.values.extend_from_slice(&src.values[offset..offset + count]);
                Ok(())
            }
            (Some(dst), Some(s)) if dst.paths == s.paths && dst.types == s.types => {
                for (field, from) in dst.fields.iter_mut().zip(&s.fields) {
                    field.append(from, offset, count)?;
                }
                Ok(())
            }
            _ => StorageError::NotSupported("append between json columns of different layouts".into())
                .err(),
        }
    }

    /// The document of `row`. Flattened rows are rebuilt from their fields,
    /// nesting dotted paths and leaving out null fields.
    pub fn get_json(&self, row: usize) -> Option<Value> {
        let Some(flat) = &self.flat else {
            return self.values.get(row).cloned();
        };
        if row >= self.size() {
            return None;
        }
        let mut doc = Map::new();
        for (path, field) in flat.paths.iter().zip(&flat.fields) {
            if let Some(value) = field.get(row) {
                Self::insert_at_path(&mut doc, &path_segments(path), value.to_json());
            }
        }
        Some(Value::Object(doc))
    }

    fn insert_at_path(doc: &mut Map<String, Value>, segments: &[String], value: Value) {
        let Some((last, parents)) = segments.split_last() else {
            return;
        };
        let mut node = doc;
        for segment in parents {
            let entry = node.entry(segment.clone()).or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            let Value::Object(next) = entry else {
                return;
            };
            node = next;
        }
        node.insert(last.clone(), value);
    }
}
