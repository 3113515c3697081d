use crate::{
    column::{Column, ColumnAccessPath},
    common::{Result, StorageError},
    storage::{
        ColumnIterator, ColumnIteratorOptions, ColumnPredicate, CompoundNodeType, Ordinal, RowId, SharedStatistics,
        SparseRange,
    },
    types::LogicalType,
    util::{JsonFlattener, ScopedRawTimer},
};

/// Reads a raw JSON column and flattens every batch on the fly.
pub struct JsonDynamicFlatIterator {
    json_iter: Box<dyn ColumnIterator>,
    flat_paths: Vec<String>,
    target_types: Vec<LogicalType>,
    access_path: ColumnAccessPath,
    flattener: Option<JsonFlattener>,
    stats: Option<SharedStatistics>,
}

impl JsonDynamicFlatIterator {
    fn flat_json(&self, raw: &Column, dst: &mut Column) -> Result<()> {
        let flattener = self
            .flattener
            .as_ref()
            .ok_or_else(|| StorageError::Internal("dynamic flat json iterator used before init".into()))?;
        let _timer = self
            .stats
            .as_ref()
            .map(|stats| ScopedRawTimer::new(stats, |s, ns| s.json_flatten_ns += ns));

        if let Column::Nullable(out) = dst {
            let Column::Nullable(input) = raw else {
                return StorageError::Internal("raw json batch lost its null mask".into()).err();
            };
            out.null_column_mut().append(input.null_column(), 0, input.size())?;
            out.set_has_null(out.has_null() || input.has_null());
        }

        let json = dst
            .json_data_mut()
            .ok_or_else(|| StorageError::Internal("flat json destination is not a json column".into()))?;
        json.init_flat_columns(&self.flat_paths, &self.target_types);
        flattener.flatten(raw, json.get_flat_fields_mut()?)?;
        tracing::trace!(rows = raw.size(), path = %self.access_path.absolute_path(), "dynamic flat json batch");
        Ok(())
    }
}

impl ColumnIterator for JsonDynamicFlatIterator {
    fn init(&mut self, opts: &ColumnIteratorOptions) -> Result<()> {
        opts.stats.borrow_mut().record_dynamic_json_hit(&self.access_path.absolute_path());
        self.flattener = Some(JsonFlattener::new(&self.flat_paths, &self.target_types));
        self.stats = Some(opts.stats.clone());
        tracing::debug!(
            path = %self.access_path.absolute_path(),
            fields = self.flat_paths.len(),
            "initialized dynamic flat json iterator"
        );
        self.json_iter.init(opts)
    }

    fn next_batch(&mut self, n: &mut usize, dst: &mut Column) -> Result<()> {
        let mut raw = dst.clone_empty();
        self.json_iter.next_batch(n, &mut raw)?;
        dst.set_delete_state(raw.delete_state());
        self.flat_json(&raw, dst)
    }

    fn next_batch_range(&mut self, range: &SparseRange, dst: &mut Column) -> Result<()> {
        let mut raw = dst.clone_empty();
        self.json_iter.next_batch_range(range, &mut raw)?;
        dst.set_delete_state(raw.delete_state());
        self.flat_json(&raw, dst)
    }

    fn seek_to_first(&mut self) -> Result<()> {
        self.json_iter.seek_to_first()
    }

    fn seek_to_ordinal(&mut self, ord: Ordinal) -> Result<()> {
        self.json_iter.seek_to_ordinal(ord)
    }

    fn get_current_ordinal(&self) -> Ordinal {
        self.json_iter.get_current_ordinal()
    }

    fn num_rows(&self) -> Ordinal {
        self.json_iter.num_rows()
    }

    fn get_row_ranges_by_zone_map(
        &mut self,
        predicates: &[ColumnPredicate],
        del_predicate: Option<&ColumnPredicate>,
        pred_relation: CompoundNodeType,
    ) -> Result<SparseRange> {
        self.json_iter.get_row_ranges_by_zone_map(predicates, del_predicate, pred_relation)
    }

    fn fetch_values_by_rowid(&mut self, rowids: &[RowId], dst: &mut Column) -> Result<()> {
        let mut raw = dst.clone_empty();
        self.json_iter.fetch_values_by_rowid(rowids, &mut raw)?;
        dst.set_delete_state(raw.delete_state());
        self.flat_json(&raw, dst)
    }
}

/// Build the iterator that flattens the raw JSON read by `json_iter`.
/// At least one path is required.
pub fn create_json_dynamic_flat_iterator(
    json_iter: Box<dyn ColumnIterator>,
    paths: Vec<String>,
    target_types: Vec<LogicalType>,
    access_path: ColumnAccessPath,
) -> Result<Box<dyn ColumnIterator>> {
    if paths.is_empty() {
        return StorageError::InvalidArgument("dynamic flat json iterator needs at least one path".into()).err();
    }
    debug_assert_eq!(paths.len(), target_types.len());
    Ok(Box::new(JsonDynamicFlatIterator {
        json_iter,
        flat_paths: paths,
        target_types,
        access_path,
        flattener: None,
        stats: None,
    }))
}
