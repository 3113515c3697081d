use std::sync::Arc;

use crate::{
    column::{Chunk, Column, ColumnAccessPath},
    common::{Result, StorageError},
    exprs::{CastExpr, ColumnRef, VectorizedCastExprFactory},
    storage::{
        ColumnIterator, ColumnIteratorOptions, ColumnPredicate, ColumnReader, CompoundNodeType, Ordinal, RowId,
        SparseRange,
    },
    types::LogicalType,
};

/// Cast of one flattened field whose stored type differs from the requested one.
#[derive(Debug)]
struct FieldCast {
    expr: CastExpr,
    // empty nullable column of the stored type; cloned for every batch
    source: Column,
}

/// Per-field casts, positionally aligned with the field iterators.
/// `None` means the field is read as stored.
#[derive(Debug, Default)]
struct CastArena {
    fields: Vec<Option<FieldCast>>,
}

impl CastArena {
    fn get(&self, index: usize) -> Option<&FieldCast> {
        self.fields.get(index).and_then(Option::as_ref)
    }

    fn num_casts(&self) -> usize {
        self.fields.iter().flatten().count()
    }
}

/// Reads a JSON column that was flattened when written.
///
/// Every request fans out to the null-mask iterator (nullable columns only)
/// and to one iterator per requested path; their output is reassembled into
/// the flattened fields of the destination JSON column.
pub struct JsonFlatColumnIterator {
    reader: Arc<ColumnReader>,
    null_iter: Option<Box<dyn ColumnIterator>>,
    flat_iters: Vec<Box<dyn ColumnIterator>>,
    flat_paths: Vec<String>,
    target_types: Vec<LogicalType>,
    source_types: Vec<LogicalType>,
    access_path: ColumnAccessPath,
    casts: CastArena,
}

impl JsonFlatColumnIterator {
    /// Run `read` against the null iterator and every field iterator, placing
    /// the results into `dst`. Fields whose type differs are read into a
    /// staging column and cast.
    fn read_and_cast<F>(&mut self, dst: &mut Column, mut read: F) -> Result<()>
    where
        F: FnMut(&mut dyn ColumnIterator, &mut Column) -> Result<()>,
    {
        debug_assert_eq!(
            self.null_iter.is_some(),
            dst.is_nullable(),
            "null iterator must match the nullability of the destination"
        );

        if let Some(null_iter) = self.null_iter.as_mut() {
            let nullable = dst
                .as_nullable_mut()
                .ok_or_else(|| StorageError::Internal("nullable json column read into a non-nullable column".into()))?;
            read(null_iter.as_mut(), nullable.null_column_mut())?;
            nullable.update_has_null();
        }

        let json = dst
            .json_data_mut()
            .ok_or_else(|| StorageError::Internal("flat json destination is not a json column".into()))?;
        json.init_flat_columns(&self.flat_paths, &self.target_types);

        for (index, iter) in self.flat_iters.iter_mut().enumerate() {
            let field = json.get_flat_field_mut(index)?;
            match self.casts.get(index) {
                None => read(iter.as_mut(), field)?,
                Some(cast) => {
                    let mut source = cast.source.clone_empty();
                    read(iter.as_mut(), &mut source)?;
                    field.set_delete_state(source.delete_state());
                    let mut chunk = Chunk::new();
                    chunk.append_column(source, cast.expr.child().slot_id);
                    cast.expr.evaluate_checked(&chunk)?.append_to(field, chunk.num_rows())?;
                }
            }
            debug_assert_eq!(
                json.get_flat_field(index).map(Column::size),
                json.get_flat_field(0).map(Column::size),
                "flat field {index} drifted from the json column size"
            );
        }
        Ok(())
    }
}

impl ColumnIterator for JsonFlatColumnIterator {
    fn init(&mut self, opts: &ColumnIteratorOptions) -> Result<()> {
        if let Some(null_iter) = self.null_iter.as_mut() {
            null_iter.init(opts)?;
        }
        for iter in self.flat_iters.iter_mut() {
            iter.init(opts)?;
        }

        opts.stats.borrow_mut().record_flat_json_hit(&self.access_path.absolute_path());

        let mut fields = Vec::with_capacity(self.source_types.len());
        for (index, (source, target)) in self.source_types.iter().zip(&self.target_types).enumerate() {
            if source == target {
                fields.push(None);
                continue;
            }
            let expr =
                VectorizedCastExprFactory::from_type(*source, *target, ColumnRef::new(index, *source), opts.cast_mode)?;
            fields.push(Some(FieldCast { expr, source: Column::create(*source, true) }));
        }
        self.casts = CastArena { fields };

        tracing::debug!(
            path = %self.access_path.absolute_path(),
            fields = self.flat_paths.len(),
            casts = self.casts.num_casts(),
            nullable = self.null_iter.is_some(),
            "initialized flat json iterator"
        );
        Ok(())
    }

    fn next_batch(&mut self, n: &mut usize, dst: &mut Column) -> Result<()> {
        let requested = *n;
        let mut read_rows = 0;
        self.read_and_cast(dst, |iter, column| {
            let mut rows = requested;
            iter.next_batch(&mut rows, column)?;
            read_rows = rows;
            Ok(())
        })?;
        *n = read_rows;
        tracing::trace!(requested, rows = read_rows, "flat json batch");
        Ok(())
    }

    fn next_batch_range(&mut self, range: &SparseRange, dst: &mut Column) -> Result<()> {
        self.read_and_cast(dst, |iter, column| iter.next_batch_range(range, column))
    }

    fn seek_to_first(&mut self) -> Result<()> {
        if let Some(null_iter) = self.null_iter.as_mut() {
            null_iter.seek_to_first()?;
        }
        for iter in self.flat_iters.iter_mut() {
            iter.seek_to_first()?;
        }
        Ok(())
    }

    fn seek_to_ordinal(&mut self, ord: Ordinal) -> Result<()> {
        if let Some(null_iter) = self.null_iter.as_mut() {
            null_iter.seek_to_ordinal(ord)?;
        }
        for iter in self.flat_iters.iter_mut() {
            iter.seek_to_ordinal(ord)?;
        }
        Ok(())
    }

    fn get_current_ordinal(&self) -> Ordinal {
        self.flat_iters.first().map_or(0, |iter| iter.get_current_ordinal())
    }

    fn num_rows(&self) -> Ordinal {
        self.flat_iters.first().map_or(0, |iter| iter.num_rows())
    }

    /// Flattened columns are never pruned: the whole column is returned
    /// whatever the predicates.
    fn get_row_ranges_by_zone_map(
        &mut self,
        _predicates: &[ColumnPredicate],
        _del_predicate: Option<&ColumnPredicate>,
        _pred_relation: CompoundNodeType,
    ) -> Result<SparseRange> {
        let rows = RowId::try_from(self.reader.num_rows()).map_err(|_| {
            StorageError::Internal(format!("{} rows do not fit a row id", self.reader.num_rows()))
        })?;
        Ok(SparseRange::from_range(0, rows))
    }

    fn fetch_values_by_rowid(&mut self, rowids: &[RowId], dst: &mut Column) -> Result<()> {
        self.read_and_cast(dst, |iter, column| iter.fetch_values_by_rowid(rowids, column))
    }
}

/// Build the iterator over a write-time flattened JSON column.
///
/// `field_iters`, `paths`, `target_types` and `source_types` are positional:
/// entry `i` of each describes the same field. `null_iter` is given exactly
/// when the column is nullable. At least one field is required.
pub fn create_json_flat_iterator(
    reader: Arc<ColumnReader>,
    null_iter: Option<Box<dyn ColumnIterator>>,
    field_iters: Vec<Box<dyn ColumnIterator>>,
    paths: Vec<String>,
    target_types: Vec<LogicalType>,
    source_types: Vec<LogicalType>,
    access_path: ColumnAccessPath,
) -> Result<Box<dyn ColumnIterator>> {
    if field_iters.is_empty() {
        return StorageError::InvalidArgument("flat json iterator needs at least one field".into()).err();
    }
    debug_assert_eq!(field_iters.len(), paths.len());
    debug_assert_eq!(paths.len(), target_types.len());
    debug_assert_eq!(target_types.len(), source_types.len());
    Ok(Box::new(JsonFlatColumnIterator {
        reader,
        null_iter,
        flat_iters: field_iters,
        flat_paths: paths,
        target_types,
        source_types,
        access_path,
        casts: CastArena::default(),
    }))
}
