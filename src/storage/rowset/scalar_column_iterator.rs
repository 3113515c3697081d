use std::{collections::HashSet, sync::Arc};

use crate::{
    column::{Column, DeleteState},
    common::{Result, StorageError},
    storage::{
        ColumnIterator, ColumnIteratorOptions, ColumnPredicate, ColumnReader, CompoundNodeType, Ordinal, RowId,
        SparseRange,
    },
};

/// Iterator over the values of a single `ColumnReader`.
#[derive(Debug)]
pub struct ScalarColumnIterator {
    reader: Arc<ColumnReader>,
    current_ordinal: Ordinal,
    // pages where only some rows match the last delete predicate
    delete_partial_pages: HashSet<usize>,
}

impl ScalarColumnIterator {
    pub fn new(reader: Arc<ColumnReader>) -> Self {
        Self { reader, current_ordinal: 0, delete_partial_pages: HashSet::new() }
    }

    pub fn reader(&self) -> &Arc<ColumnReader> {
        &self.reader
    }

    fn append_row(&self, ordinal: Ordinal, dst: &mut Column) -> Result<bool> {
        let (page, value) = self.reader.read(ordinal).ok_or_else(|| {
            StorageError::EndOfFile(format!("ordinal {ordinal} past {} rows", self.reader.num_rows()))
        })?;
        dst.append_datum(value.clone())?;
        Ok(self.delete_partial_pages.contains(&page))
    }

    /// Read up to `count` rows from the current ordinal, returning how many were read.
    fn read_rows(&mut self, count: usize, dst: &mut Column) -> Result<usize> {
        let available = self.reader.num_rows().saturating_sub(self.current_ordinal);
        let rows = (count as Ordinal).min(available);
        let mut partial = false;
        for ordinal in self.current_ordinal..self.current_ordinal + rows {
            partial |= self.append_row(ordinal, dst)?;
        }
        self.current_ordinal += rows;
        if partial {
            dst.set_delete_state(DeleteState::PartialSatisfied);
        }
        Ok(rows as usize)
    }
}

impl ColumnIterator for ScalarColumnIterator {
    fn init(&mut self, _opts: &ColumnIteratorOptions) -> Result<()> {
        tracing::trace!(rows = self.reader.num_rows(), ty = %self.reader.logical_type(), "scalar iterator ready");
        Ok(())
    }

    fn next_batch(&mut self, n: &mut usize, dst: &mut Column) -> Result<()> {
        *n = self.read_rows(*n, dst)?;
        Ok(())
    }

    fn next_batch_range(&mut self, range: &SparseRange, dst: &mut Column) -> Result<()> {
        for r in range.ranges() {
            self.seek_to_ordinal(r.start as Ordinal)?;
            let wanted = (r.end - r.start) as usize;
            let read = self.read_rows(wanted, dst)?;
            if read < wanted {
                return StorageError::EndOfFile(format!(
                    "range {}..{} past {} rows",
                    r.start,
                    r.end,
                    self.reader.num_rows()
                ))
                .err();
            }
        }
        Ok(())
    }

    fn seek_to_first(&mut self) -> Result<()> {
        self.current_ordinal = 0;
        Ok(())
    }

    fn seek_to_ordinal(&mut self, ord: Ordinal) -> Result<()> {
        if ord > self.reader.num_rows() {
            return StorageError::InvalidArgument(format!(
                "seek to ordinal {ord} past {} rows",
                self.reader.num_rows()
            ))
            .err();
        }
        self.current_ordinal = ord;
        Ok(())
    }

    fn get_current_ordinal(&self) -> Ordinal {
        self.current_ordinal
    }

    fn num_rows(&self) -> Ordinal {
        self.reader.num_rows()
    }

    fn get_row_ranges_by_zone_map(
        &mut self,
        predicates: &[ColumnPredicate],
        del_predicate: Option<&ColumnPredicate>,
        pred_relation: CompoundNodeType,
    ) -> Result<SparseRange> {
        self.delete_partial_pages = del_predicate
            .map(|del| self.reader.delete_partial_satisfied_pages(del).into_iter().collect())
            .unwrap_or_default();
        Ok(self.reader.zone_map_filter(predicates, del_predicate, pred_relation))
    }

    fn fetch_values_by_rowid(&mut self, rowids: &[RowId], dst: &mut Column) -> Result<()> {
        if let Some(bad) = rowids.iter().find(|id| **id as Ordinal >= self.reader.num_rows()) {
            return StorageError::InvalidArgument(format!(
                "row id {bad} out of range for {} rows",
                self.reader.num_rows()
            ))
            .err();
        }
        let mut partial = false;
        for id in rowids {
            partial |= self.append_row(*id as Ordinal, dst)?;
        }
        if partial {
            dst.set_delete_state(DeleteState::PartialSatisfied);
        }
        if let Some(last) = rowids.last() {
            self.current_ordinal = *last as Ordinal + 1;
        }
        Ok(())
    }
}
