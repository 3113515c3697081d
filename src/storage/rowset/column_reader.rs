use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::{
    column::ColumnAccessPath,
    common::{Result, StorageError},
    storage::{
        ColumnIterator, ColumnPredicate, CompoundNodeType, Ordinal, RowId, ScalarColumnIterator,
        SparseRange, ZoneMapDetail, create_json_dynamic_flat_iterator, create_json_flat_iterator,
    },
    types::{Datum, LogicalType},
};

pub const DEFAULT_ROWS_PER_PAGE: usize = 1024;

#[derive(Debug)]
struct DataPage {
    first_ordinal: Ordinal,
    values: Vec<Option<Datum>>,
    zone_map: ZoneMapDetail,
}

impl DataPage {
    fn row_range(&self) -> std::ops::Range<RowId> {
        self.first_ordinal as RowId..(self.first_ordinal + self.values.len() as Ordinal) as RowId
    }
}

/// Immutable, paged data of one column of a segment.
///
/// A JSON column is stored in one of two ways: raw documents in its own
/// pages, or flattened at write time into one sub-reader per path plus an
/// optional null-mask sub-reader. `new_json_iterator` picks the matching
/// read strategy.
#[derive(Debug)]
pub struct ColumnReader {
    ty: LogicalType,
    nullable: bool,
    num_rows: Ordinal,
    pages: Vec<DataPage>,
    null_reader: Option<Arc<ColumnReader>>,
    flat_readers: IndexMap<String, Arc<ColumnReader>>,
}

impl ColumnReader {
    pub fn from_values(
        ty: LogicalType,
        nullable: bool,
        values: Vec<Option<Datum>>,
        rows_per_page: usize,
    ) -> Result<Arc<Self>> {
        if rows_per_page == 0 {
            return StorageError::InvalidArgument("rows per page must be positive".into()).err();
        }
        for (ordinal, value) in values.iter().enumerate() {
            match value {
                None if !nullable => {
                    return StorageError::Corruption(format!(
                        "null at ordinal {ordinal} of non-nullable {ty} column"
                    ))
                    .err();
                }
                Some(v) if v.logical_type() != ty => {
                    return StorageError::Corruption(format!(
                        "{} value at ordinal {ordinal} of {ty} column",
                        v.logical_type()
                    ))
                    .err();
                }
                _ => {}
            }
        }

        let pages = values
            .chunks(rows_per_page)
            .enumerate()
            .map(|(index, chunk)| DataPage {
                first_ordinal: (index * rows_per_page) as Ordinal,
                values: chunk.to_vec(),
                zone_map: ZoneMapDetail::build(chunk),
            })
            .collect();

        Ok(Arc::new(Self {
            ty,
            nullable,
            num_rows: values.len() as Ordinal,
            pages,
            null_reader: None,
            flat_readers: IndexMap::new(),
        }))
    }

    /// A column of raw JSON documents.
    pub fn from_json_documents(docs: Vec<Option<Value>>, nullable: bool, rows_per_page: usize) -> Result<Arc<Self>> {
        let values = docs.into_iter().map(|doc| doc.map(Datum::Json)).collect();
        Self::from_values(LogicalType::Json, nullable, values, rows_per_page)
    }

    /// A JSON column flattened at write time.
    ///
    /// `null_reader` (non-nullable BOOLEAN, true = null document) is present
    /// exactly when the JSON column is nullable. Every sub-reader must have
    /// the same number of rows.
    pub fn new_flat_json(
        null_reader: Option<Arc<ColumnReader>>,
        fields: Vec<(String, Arc<ColumnReader>)>,
    ) -> Result<Arc<Self>> {
        if let Some(nulls) = &null_reader {
            if nulls.ty != LogicalType::Boolean || nulls.nullable {
                return StorageError::InvalidArgument("null reader must be a non-nullable BOOLEAN column".into())
                    .err();
            }
        }
        let num_rows = match (&null_reader, fields.first()) {
            (Some(nulls), _) => nulls.num_rows,
            (None, Some((_, first))) => first.num_rows,
            (None, None) => 0,
        };
        if let Some((path, _)) = fields.iter().find(|(_, reader)| reader.num_rows != num_rows) {
            return StorageError::Corruption(format!(
                "flattened field {path} does not have {num_rows} rows"
            ))
            .err();
        }

        Ok(Arc::new(Self {
            ty: LogicalType::Json,
            nullable: null_reader.is_some(),
            num_rows,
            pages: Vec::new(),
            null_reader,
            flat_readers: fields.into_iter().collect(),
        }))
    }

    pub fn logical_type(&self) -> LogicalType {
        self.ty
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn num_rows(&self) -> Ordinal {
        self.num_rows
    }

    /// Whether the column was flattened at write time.
    pub fn is_flat_json(&self) -> bool {
        !self.flat_readers.is_empty()
    }

    pub fn null_reader(&self) -> Option<&Arc<ColumnReader>> {
        self.null_reader.as_ref()
    }

    pub fn flat_reader(&self, path: &str) -> Option<&Arc<ColumnReader>> {
        self.flat_readers.get(path)
    }

    /// Page index and value stored at `ordinal`.
    pub(crate) fn read(&self, ordinal: Ordinal) -> Option<(usize, &Option<Datum>)> {
        let index = self.pages.partition_point(|p| p.first_ordinal <= ordinal).checked_sub(1)?;
        let page = &self.pages[index];
        page.values.get((ordinal - page.first_ordinal) as usize).map(|v| (index, v))
    }

    fn page_ranges(&self, keep: impl Fn(&ZoneMapDetail) -> bool) -> SparseRange {
        let mut ranges = SparseRange::new();
        for page in self.pages.iter().filter(|page| keep(&page.zone_map)) {
            ranges.add(page.row_range());
        }
        ranges
    }

    /// Ranges of the pages that may hold rows matching `predicates`.
    ///
    /// Each predicate yields its own ranges; `And` intersects them, `Or`
    /// unions them. Pages fully covered by `del_predicate` are dropped.
    pub fn zone_map_filter(
        &self,
        predicates: &[ColumnPredicate],
        del_predicate: Option<&ColumnPredicate>,
        pred_relation: CompoundNodeType,
    ) -> SparseRange {
        let live = self.page_ranges(|zm| !del_predicate.is_some_and(|del| del.zone_map_fully_satisfied(zm)));
        let mut per_predicate = predicates.iter().map(|p| self.page_ranges(|zm| p.zone_map_filter(zm)));
        let Some(first) = per_predicate.next() else {
            return live;
        };
        let matched = per_predicate.fold(first, |acc, ranges| match pred_relation {
            CompoundNodeType::And => acc.intersection(&ranges),
            CompoundNodeType::Or => acc.union(&ranges),
        });
        matched.intersection(&live)
    }

    /// Pages where some, but not all, rows may satisfy `del_predicate`.
    pub fn delete_partial_satisfied_pages(&self, del_predicate: &ColumnPredicate) -> Vec<usize> {
        self.pages
            .iter()
            .enumerate()
            .filter(|(_, page)| {
                del_predicate.zone_map_filter(&page.zone_map)
                    && !del_predicate.zone_map_fully_satisfied(&page.zone_map)
            })
            .map(|(index, _)| index)
            .collect()
    }

    pub fn new_iterator(self: &Arc<Self>) -> ScalarColumnIterator {
        ScalarColumnIterator::new(Arc::clone(self))
    }

    /// Open a JSON column for reading `paths` as `target_types`.
    ///
    /// Write-time flattened columns get the static iterator over their
    /// sub-readers; raw JSON columns get the dynamic iterator.
    pub fn new_json_iterator(
        self: &Arc<Self>,
        paths: Vec<String>,
        target_types: Vec<LogicalType>,
        access_path: ColumnAccessPath,
    ) -> Result<Box<dyn ColumnIterator>> {
        if self.ty != LogicalType::Json {
            return StorageError::NotSupported(format!("json iterator over a {} column", self.ty)).err();
        }
        if paths.is_empty() {
            return StorageError::InvalidArgument("json iterator needs at least one path".into()).err();
        }
        if paths.len() != target_types.len() {
            return StorageError::InvalidArgument(format!(
                "{} paths but {} target types",
                paths.len(),
                target_types.len()
            ))
            .err();
        }

        if !self.is_flat_json() {
            return create_json_dynamic_flat_iterator(Box::new(self.new_iterator()), paths, target_types, access_path);
        }

        let null_iter = self
            .null_reader
            .as_ref()
            .map(|reader| Box::new(reader.new_iterator()) as Box<dyn ColumnIterator>);
        let mut field_iters: Vec<Box<dyn ColumnIterator>> = Vec::with_capacity(paths.len());
        let mut source_types = Vec::with_capacity(paths.len());
        for path in &paths {
            let reader = self.flat_readers.get(path).ok_or_else(|| {
                StorageError::InvalidArgument(format!("path {path} is not flattened in this column"))
            })?;
            source_types.push(reader.logical_type());
            field_iters.push(Box::new(reader.new_iterator()));
        }
        create_json_flat_iterator(
            Arc::clone(self),
            null_iter,
            field_iters,
            paths,
            target_types,
            source_types,
            access_path,
        )
    }
}
