use serde_json::Value;

use crate::{
    column::Column,
    common::{Result, StorageError},
    exprs::cast_datum,
    types::{Datum, JsonPrimitive, LogicalType},
};

/// Split a flattened field path (`a.b.c`, optionally prefixed with `$.`)
/// into object keys. A bare `$` is the document root.
pub fn path_segments(path: &str) -> Vec<String> {
    let path = match path.strip_prefix('$') {
        Some(rest) if rest.is_empty() || rest.starts_with('.') => rest,
        _ => path,
    };
    path.split('.').filter(|s| !s.is_empty()).map(str::to_string).collect()
}

/// Extracts a fixed list of typed fields out of raw JSON documents.
///
/// For every row and every path: a null outer row, a missing key, a JSON
/// null or a value that does not convert to the field type all produce a
/// null in that field. Conversion never fails a batch.
#[derive(Debug, Clone)]
pub struct JsonFlattener {
    segments: Vec<Vec<String>>,
    types: Vec<LogicalType>,
}

impl JsonFlattener {
    pub fn new(paths: &[String], types: &[LogicalType]) -> Self {
        debug_assert_eq!(paths.len(), types.len());
        Self {
            segments: paths.iter().map(|p| path_segments(p)).collect(),
            types: types.to_vec(),
        }
    }

    /// Append one row per input row to each of `fields`.
    ///
    /// `input` is a raw JSON column, nullable or not.
    pub fn flatten(&self, input: &Column, fields: &mut [Column]) -> Result<()> {
        if fields.len() != self.types.len() {
            return StorageError::Internal(format!(
                "flattener expects {} fields, got {}",
                self.types.len(),
                fields.len()
            ))
            .err();
        }

        let (json, nulls) = match input {
            Column::Json(json) => (json, None),
            Column::Nullable(nullable) => match nullable.data_column().as_json() {
                Some(json) => (json, Some(nullable)),
                None => return StorageError::InvalidArgument("flatten input is not json".into()).err(),
            },
            _ => return StorageError::InvalidArgument("flatten input is not json".into()).err(),
        };
        if json.is_flat() {
            return StorageError::NotSupported("flatten an already flattened json column".into()).err();
        }

        for (row, doc) in json.values().iter().enumerate() {
            let doc = match nulls {
                Some(n) if n.is_null(row) => None,
                _ => Some(doc),
            };
            for (index, field) in fields.iter_mut().enumerate() {
                let value = doc
                    .and_then(|d| Self::find(d, &self.segments[index]))
                    .and_then(|v| Self::extract(v, self.types[index]));
                field.append_datum(value)?;
            }
        }
        tracing::trace!(rows = json.size(), fields = fields.len(), "flattened json batch");
        Ok(())
    }

    fn find<'a>(doc: &'a Value, segments: &[String]) -> Option<&'a Value> {
        segments.iter().try_fold(doc, |node, key| node.as_object()?.get(key))
    }

    fn extract(value: &Value, ty: LogicalType) -> Option<Datum> {
        if !JsonPrimitive::of_value(value).may_convert_to(ty) {
            return None;
        }
        cast_datum(&Datum::Json(value.clone()), ty)
    }
}
