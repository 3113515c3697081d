use crate::{
    column::Column,
    common::Result,
    storage::{ColumnIteratorOptions, ColumnPredicate, CompoundNodeType, Ordinal, RowId, SparseRange},
};

/// Read contract shared by every column iterator of a segment.
///
/// An iterator is driven by a single thread. `init` must succeed before any
/// other call. Read primitives append to `dst`; on error the content of
/// `dst` is unspecified and the caller must drop it.
pub trait ColumnIterator {
    fn init(&mut self, opts: &ColumnIteratorOptions) -> Result<()>;

    /// Read up to `*n` rows from the current ordinal. `*n` is updated with
    /// the number of rows actually read (0 at end of data).
    fn next_batch(&mut self, n: &mut usize, dst: &mut Column) -> Result<()>;

    /// Read every row covered by `range`, in order.
    fn next_batch_range(&mut self, range: &SparseRange, dst: &mut Column) -> Result<()>;

    fn seek_to_first(&mut self) -> Result<()>;

    fn seek_to_ordinal(&mut self, ord: Ordinal) -> Result<()>;

    fn get_current_ordinal(&self) -> Ordinal;

    fn num_rows(&self) -> Ordinal;

    /// Row ranges that may satisfy `predicates` according to zone maps.
    ///
    /// Pages that fully satisfy `del_predicate` are excluded; iterators may
    /// remember pages that partially satisfy it so later reads can mark the
    /// delete state of the rows they produce.
    fn get_row_ranges_by_zone_map(
        &mut self,
        predicates: &[ColumnPredicate],
        del_predicate: Option<&ColumnPredicate>,
        pred_relation: CompoundNodeType,
    ) -> Result<SparseRange>;

    fn fetch_values_by_rowid(&mut self, rowids: &[RowId], dst: &mut Column) -> Result<()>;
}
