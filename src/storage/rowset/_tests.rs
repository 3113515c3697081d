#[cfg(test)]
pub mod fixtures {
    use std::sync::Arc;

    use serde_json::{Value, json};

    use crate::{
        column::{Column, ColumnAccessPath},
        common::{Result, StorageError},
        storage::{
            ColumnIterator, ColumnIteratorOptions, ColumnPredicate, ColumnReader, CompoundNodeType, Ordinal, RowId,
            SparseRange,
        },
        types::{Datum, LogicalType},
    };

    pub const ROWS_PER_PAGE: usize = 4;

    pub fn paths(p: &[&str]) -> Vec<String> {
        p.iter().map(|s| s.to_string()).collect()
    }

    pub fn access_path() -> ColumnAccessPath {
        ColumnAccessPath::new("payload")
    }

    pub fn tinyint_reader(values: &[Option<i8>]) -> Arc<ColumnReader> {
        let values = values.iter().map(|v| v.map(Datum::TinyInt)).collect();
        ColumnReader::from_values(LogicalType::TinyInt, true, values, ROWS_PER_PAGE).unwrap()
    }

    pub fn varchar_reader(values: &[Option<&str>]) -> Arc<ColumnReader> {
        let values = values.iter().map(|v| v.map(|s| Datum::Varchar(s.to_string()))).collect();
        ColumnReader::from_values(LogicalType::Varchar, true, values, ROWS_PER_PAGE).unwrap()
    }

    pub fn null_reader(mask: &[bool]) -> Arc<ColumnReader> {
        let values = mask.iter().map(|null| Some(Datum::Boolean(*null))).collect();
        ColumnReader::from_values(LogicalType::Boolean, false, values, ROWS_PER_PAGE).unwrap()
    }

    pub fn field_a() -> Arc<ColumnReader> {
        tinyint_reader(&[Some(1), None, Some(3), Some(4), Some(5), Some(6)])
    }

    pub fn field_b() -> Arc<ColumnReader> {
        varchar_reader(&[Some("x"), None, Some("z"), None, Some("w"), Some("v")])
    }

    /// Nullable JSON column flattened at write time into `a` (TINYINT) and
    /// `b` (VARCHAR). Row 1 is a null document.
    pub fn flat_reader() -> Arc<ColumnReader> {
        ColumnReader::new_flat_json(
            Some(null_reader(&[false, true, false, false, false, false])),
            vec![("a".into(), field_a()), ("b".into(), field_b())],
        )
        .unwrap()
    }

    pub fn raw_documents() -> Vec<Option<Value>> {
        vec![
            Some(json!({"a": 1, "b": "x"})),
            None,
            Some(json!({"a": 3, "b": "z"})),
            Some(json!({"a": 4})),
            Some(json!({"a": 5, "b": "w"})),
            Some(json!({"a": 6, "b": "v"})),
        ]
    }

    /// The same rows as `flat_reader`, stored as raw documents.
    pub fn raw_reader() -> Arc<ColumnReader> {
        ColumnReader::from_json_documents(raw_documents(), true, ROWS_PER_PAGE).unwrap()
    }

    pub fn open(
        reader: &Arc<ColumnReader>,
        targets: &[LogicalType],
        opts: &ColumnIteratorOptions,
    ) -> Box<dyn ColumnIterator> {
        let mut iter = reader.new_json_iterator(paths(&["a", "b"]), targets.to_vec(), access_path()).unwrap();
        iter.init(opts).unwrap();
        iter
    }

    pub fn json_destination(nullable: bool) -> Column {
        Column::create(LogicalType::Json, nullable)
    }

    pub fn field(dst: &Column, index: usize) -> &Column {
        dst.json_data().and_then(|json| json.get_flat_field(index)).unwrap()
    }

    pub fn field_values(dst: &Column, index: usize) -> Vec<Option<Datum>> {
        let column = field(dst, index);
        (0..column.size()).map(|row| column.get(row)).collect()
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum FailOn {
        Never,
        Init,
        Read,
        Seek,
    }

    /// Iterator that fails with `Corruption("injected")` on one kind of call.
    pub struct FailingIterator {
        pub fail_on: FailOn,
        pub rows: Ordinal,
    }

    impl FailingIterator {
        pub fn boxed(fail_on: FailOn) -> Box<dyn ColumnIterator> {
            Box::new(Self { fail_on, rows: 6 })
        }

        fn check(&self, op: FailOn) -> Result<()> {
            if self.fail_on == op {
                return StorageError::Corruption("injected".into()).err();
            }
            Ok(())
        }
    }

    impl ColumnIterator for FailingIterator {
        fn init(&mut self, _opts: &ColumnIteratorOptions) -> Result<()> {
            self.check(FailOn::Init)
        }

        fn next_batch(&mut self, n: &mut usize, dst: &mut Column) -> Result<()> {
            self.check(FailOn::Read)?;
            dst.append_default(*n);
            Ok(())
        }

        fn next_batch_range(&mut self, range: &SparseRange, dst: &mut Column) -> Result<()> {
            self.check(FailOn::Read)?;
            dst.append_default(range.span_size());
            Ok(())
        }

        fn seek_to_first(&mut self) -> Result<()> {
            self.check(FailOn::Seek)
        }

        fn seek_to_ordinal(&mut self, _ord: Ordinal) -> Result<()> {
            self.check(FailOn::Seek)
        }

        fn get_current_ordinal(&self) -> Ordinal {
            0
        }

        fn num_rows(&self) -> Ordinal {
            self.rows
        }

        fn get_row_ranges_by_zone_map(
            &mut self,
            _predicates: &[ColumnPredicate],
            _del_predicate: Option<&ColumnPredicate>,
            _pred_relation: CompoundNodeType,
        ) -> Result<SparseRange> {
            Ok(SparseRange::from_range(0, self.rows as RowId))
        }

        fn fetch_values_by_rowid(&mut self, rowids: &[RowId], dst: &mut Column) -> Result<()> {
            self.check(FailOn::Read)?;
            dst.append_default(rowids.len());
            Ok(())
        }
    }
}

#[cfg(test)]
mod static_flat_tests {
    use super::fixtures::*;
    use crate::{
        column::{Column, DeleteState},
        common::StorageError,
        storage::{
            ColumnIterator, ColumnIteratorOptions, ColumnPredicate, CompoundNodeType, ReaderStatistics, SparseRange,
            create_json_flat_iterator,
        },
        types::{Datum, LogicalType},
    };
    use serde_json::json;

    const WIDENED: [LogicalType; 2] = [LogicalType::BigInt, LogicalType::Varchar];
    const STORED: [LogicalType; 2] = [LogicalType::TinyInt, LogicalType::Varchar];

    fn bigints(values: &[Option<i64>]) -> Vec<Option<Datum>> {
        values.iter().map(|v| v.map(Datum::BigInt)).collect()
    }

    #[test]
    fn batches_keep_every_field_aligned() {
        let opts = ColumnIteratorOptions::default();
        let mut iter = open(&flat_reader(), &WIDENED, &opts);

        let mut dst = json_destination(true);
        let mut n = 4;
        iter.next_batch(&mut n, &mut dst).unwrap();
        assert_eq!(n, 4);
        assert_eq!(dst.size(), 4);
        assert_eq!(dst.json_data().unwrap().size(), 4);
        assert_eq!(field(&dst, 0).size(), 4);
        assert_eq!(field(&dst, 1).size(), 4);

        let mut tail = json_destination(true);
        let mut n = 4;
        iter.next_batch(&mut n, &mut tail).unwrap();
        assert_eq!(n, 2);
        assert_eq!(tail.size(), 2);
        assert_eq!(field(&tail, 1).size(), 2);

        let mut n = 4;
        iter.next_batch(&mut n, &mut json_destination(true)).unwrap();
        assert_eq!(n, 0);
    }

    #[test]
    fn null_mask_follows_the_null_iterator() {
        let opts = ColumnIteratorOptions::default();
        let mut iter = open(&flat_reader(), &STORED, &opts);

        let mut dst = json_destination(true);
        let mut n = 2;
        iter.next_batch(&mut n, &mut dst).unwrap();
        let nullable = dst.as_nullable().unwrap();
        assert!(nullable.has_null());
        assert!(!nullable.is_null(0));
        assert!(nullable.is_null(1));
        assert_eq!(dst.get(1), None);
        assert_eq!(dst.get(0), Some(Datum::Json(json!({"a": 1, "b": "x"}))));

        let mut dst = json_destination(true);
        let mut n = 4;
        iter.next_batch(&mut n, &mut dst).unwrap();
        assert!(!dst.as_nullable().unwrap().has_null());
    }

    #[test]
    fn non_nullable_column_reads_into_plain_json() {
        let reader = crate::storage::ColumnReader::new_flat_json(None, vec![("a".into(), field_a())]).unwrap();
        let mut iter = reader
            .new_json_iterator(paths(&["a"]), vec![LogicalType::TinyInt], access_path())
            .unwrap();
        iter.init(&ColumnIteratorOptions::default()).unwrap();

        let mut dst = json_destination(false);
        let mut n = 3;
        iter.next_batch(&mut n, &mut dst).unwrap();
        assert_eq!(n, 3);
        assert!(!dst.is_nullable());
        assert_eq!(field_values(&dst, 0), vec![Some(Datum::TinyInt(1)), None, Some(Datum::TinyInt(3))]);
    }

    #[test]
    fn identity_types_read_as_stored() {
        let opts = ColumnIteratorOptions::default();
        let mut iter = open(&flat_reader(), &STORED, &opts);
        let mut dst = json_destination(true);
        let mut n = 6;
        iter.next_batch(&mut n, &mut dst).unwrap();

        for (index, reader) in [field_a(), field_b()].iter().enumerate() {
            let mut direct_iter = reader.new_iterator();
            direct_iter.init(&opts).unwrap();
            let mut direct = Column::create(reader.logical_type(), true);
            let mut rows = 6;
            direct_iter.next_batch(&mut rows, &mut direct).unwrap();
            assert_eq!(field(&dst, index), &direct);
        }
    }

    #[test]
    fn widened_field_is_cast() {
        let opts = ColumnIteratorOptions::default();
        let mut iter = open(&flat_reader(), &WIDENED, &opts);
        let mut dst = json_destination(true);
        let mut n = 3;
        iter.next_batch(&mut n, &mut dst).unwrap();
        assert_eq!(field_values(&dst, 0), bigints(&[Some(1), None, Some(3)]));
        assert_eq!(field_values(&dst, 1)[0], Some(Datum::Varchar("x".into())));
    }

    #[test]
    fn tinyint_to_bigint_cast_over_plain_fields() {
        let values = tinyint_reader(&[Some(1), Some(2), Some(3)]);
        let nulls = tinyint_reader(&[None, None, None]);
        let reader =
            crate::storage::ColumnReader::new_flat_json(None, vec![("v".into(), values.clone()), ("n".into(), nulls.clone())])
                .unwrap();
        let mut iter = create_json_flat_iterator(
            reader,
            None,
            vec![Box::new(values.new_iterator()) as Box<dyn ColumnIterator>, Box::new(nulls.new_iterator())],
            paths(&["v", "n"]),
            vec![LogicalType::BigInt, LogicalType::BigInt],
            vec![LogicalType::TinyInt, LogicalType::TinyInt],
            access_path(),
        )
        .unwrap();
        iter.init(&ColumnIteratorOptions::default()).unwrap();

        let mut dst = json_destination(false);
        let mut n = 3;
        iter.next_batch(&mut n, &mut dst).unwrap();
        assert_eq!(field_values(&dst, 0), bigints(&[Some(1), Some(2), Some(3)]));
        assert_eq!(field_values(&dst, 1), bigints(&[None, None, None]));
    }

    #[test]
    fn strict_mode_fails_on_unconvertible_values() {
        let text = varchar_reader(&[Some("12"), Some("abc")]);
        let reader = crate::storage::ColumnReader::new_flat_json(None, vec![("n".into(), text.clone())]).unwrap();
        let build = || {
            create_json_flat_iterator(
                reader.clone(),
                None,
                vec![Box::new(text.new_iterator()) as Box<dyn ColumnIterator>],
                paths(&["n"]),
                vec![LogicalType::Int],
                vec![LogicalType::Varchar],
                access_path(),
            )
            .unwrap()
        };

        let stats = ReaderStatistics::shared();
        let mut lenient = build();
        lenient.init(&ColumnIteratorOptions::lenient(&stats)).unwrap();
        let mut dst = json_destination(false);
        let mut n = 2;
        lenient.next_batch(&mut n, &mut dst).unwrap();
        assert_eq!(field_values(&dst, 0), vec![Some(Datum::Int(12)), None]);

        let mut strict = build();
        strict.init(&ColumnIteratorOptions::strict(&stats)).unwrap();
        let mut n = 2;
        let result = strict.next_batch(&mut n, &mut json_destination(false));
        assert!(matches!(result, Err(StorageError::CastFailed(_))));
    }

    #[test]
    fn unsupported_cast_fails_init() {
        let dates = crate::storage::ColumnReader::from_values(
            LogicalType::Date,
            true,
            vec![None],
            ROWS_PER_PAGE,
        )
        .unwrap();
        let reader = crate::storage::ColumnReader::new_flat_json(None, vec![("d".into(), dates.clone())]).unwrap();
        let mut iter = reader
            .new_json_iterator(paths(&["d"]), vec![LogicalType::Int], access_path())
            .unwrap();
        let result = iter.init(&ColumnIteratorOptions::default());
        assert!(matches!(result, Err(StorageError::NotSupported(_))));
    }

    #[test]
    fn zone_map_never_prunes() {
        let opts = ColumnIteratorOptions::default();
        let mut iter = open(&flat_reader(), &WIDENED, &opts);
        let ranges = iter
            .get_row_ranges_by_zone_map(
                &[ColumnPredicate::Eq(Datum::Int(100))],
                Some(&ColumnPredicate::NotNull),
                CompoundNodeType::And,
            )
            .unwrap();
        assert_eq!(ranges, SparseRange::from_range(0, 6));
    }

    #[test]
    fn seek_positions_every_sub_iterator() {
        let opts = ColumnIteratorOptions::default();
        let mut iter = open(&flat_reader(), &WIDENED, &opts);
        assert_eq!(iter.num_rows(), 6);
        iter.seek_to_ordinal(3).unwrap();
        assert_eq!(iter.get_current_ordinal(), 3);

        let mut dst = json_destination(true);
        let mut n = 2;
        iter.next_batch(&mut n, &mut dst).unwrap();
        assert_eq!(field_values(&dst, 0), bigints(&[Some(4), Some(5)]));
        assert_eq!(dst.as_nullable().unwrap().null_column().size(), 2);

        iter.seek_to_first().unwrap();
        assert_eq!(iter.get_current_ordinal(), 0);
    }

    #[test]
    fn range_and_rowid_reads() {
        let opts = ColumnIteratorOptions::default();
        let mut iter = open(&flat_reader(), &WIDENED, &opts);

        let mut range = SparseRange::from_range(0, 2);
        range.add(4..6);
        let mut dst = json_destination(true);
        iter.next_batch_range(&range, &mut dst).unwrap();
        assert_eq!(dst.size(), 4);
        assert_eq!(field_values(&dst, 0), bigints(&[Some(1), None, Some(5), Some(6)]));
        assert!(dst.as_nullable().unwrap().is_null(1));

        let mut dst = json_destination(true);
        iter.fetch_values_by_rowid(&[5, 2], &mut dst).unwrap();
        assert_eq!(field_values(&dst, 0), bigints(&[Some(6), Some(3)]));
        assert_eq!(field_values(&dst, 1), vec![Some(Datum::Varchar("v".into())), Some(Datum::Varchar("z".into()))]);
        assert!(!dst.as_nullable().unwrap().has_null());
    }

    #[test]
    fn hits_are_counted_per_init() {
        let stats = ReaderStatistics::shared();
        let opts = ColumnIteratorOptions::with_stats(&stats);
        let reader = flat_reader();
        open(&reader, &WIDENED, &opts);
        open(&reader, &STORED, &opts);

        let mut other = reader
            .new_json_iterator(paths(&["a"]), vec![LogicalType::TinyInt], access_path().child("a"))
            .unwrap();
        other.init(&opts).unwrap();

        let stats = stats.borrow();
        assert_eq!(stats.flat_json_hit_count("payload"), 2);
        assert_eq!(stats.flat_json_hit_count("payload.a"), 1);
        assert_eq!(stats.dynamic_json_hit_count("payload"), 0);
    }

    #[test]
    fn sub_iterator_failures_propagate_unchanged() {
        let reader = flat_reader();
        let stats = ReaderStatistics::shared();
        let opts = ColumnIteratorOptions::with_stats(&stats);
        let build = |fail_on: FailOn| {
            create_json_flat_iterator(
                reader.clone(),
                Some(Box::new(null_reader(&[false; 6]).new_iterator()) as Box<dyn ColumnIterator>),
                vec![Box::new(field_a().new_iterator()) as Box<dyn ColumnIterator>, FailingIterator::boxed(fail_on)],
                paths(&["a", "b"]),
                STORED.to_vec(),
                STORED.to_vec(),
                access_path(),
            )
            .unwrap()
        };
        let injected = StorageError::Corruption("injected".into());

        let mut iter = build(FailOn::Init);
        assert_eq!(iter.init(&opts).err(), Some(injected.clone()));
        assert_eq!(stats.borrow().flat_json_hit_count("payload"), 0);

        let mut iter = build(FailOn::Read);
        iter.init(&opts).unwrap();
        let mut n = 2;
        assert_eq!(iter.next_batch(&mut n, &mut json_destination(true)).err(), Some(injected.clone()));
        assert_eq!(
            iter.fetch_values_by_rowid(&[0], &mut json_destination(true)).err(),
            Some(injected.clone())
        );

        let mut iter = build(FailOn::Seek);
        iter.init(&opts).unwrap();
        assert_eq!(iter.seek_to_ordinal(1).err(), Some(injected));
    }

    #[test]
    fn delete_state_reaches_cast_fields() {
        let a = field_a();
        let mut a_iter = a.new_iterator();
        // first page holds 1..=4 with a null: partially deleted by `a < 3`
        a_iter
            .get_row_ranges_by_zone_map(&[], Some(&ColumnPredicate::Lt(Datum::TinyInt(3))), CompoundNodeType::And)
            .unwrap();
        let reader = crate::storage::ColumnReader::new_flat_json(None, vec![("a".into(), a.clone())]).unwrap();
        let mut iter = create_json_flat_iterator(
            reader,
            None,
            vec![Box::new(a_iter) as Box<dyn ColumnIterator>],
            paths(&["a"]),
            vec![LogicalType::BigInt],
            vec![LogicalType::TinyInt],
            access_path(),
        )
        .unwrap();
        iter.init(&ColumnIteratorOptions::default()).unwrap();

        let mut dst = json_destination(false);
        let mut n = 2;
        iter.next_batch(&mut n, &mut dst).unwrap();
        assert_eq!(field(&dst, 0).delete_state(), DeleteState::PartialSatisfied);
    }
}

#[cfg(test)]
mod dynamic_flat_tests {
    use super::fixtures::*;
    use crate::{
        column::{Column, DeleteState, JsonColumn},
        common::StorageError,
        storage::{
            ColumnIterator, ColumnIteratorOptions, ColumnPredicate, CompoundNodeType, ReaderStatistics, SparseRange,
            create_json_dynamic_flat_iterator,
        },
        types::{Datum, LogicalType},
    };
    use serde_json::json;

    const TARGETS: [LogicalType; 2] = [LogicalType::Int, LogicalType::Varchar];

    fn ints(values: &[Option<i32>]) -> Vec<Option<Datum>> {
        values.iter().map(|v| v.map(Datum::Int)).collect()
    }

    /// Raw iterator over in-memory documents, already initialized.
    struct DocsIterator {
        docs: Vec<serde_json::Value>,
        pos: usize,
    }

    impl ColumnIterator for DocsIterator {
        fn init(&mut self, _opts: &ColumnIteratorOptions) -> crate::common::Result<()> {
            Ok(())
        }

        fn next_batch(&mut self, n: &mut usize, dst: &mut Column) -> crate::common::Result<()> {
            let end = (self.pos + *n).min(self.docs.len());
            for doc in &self.docs[self.pos..end] {
                dst.append_datum(Some(Datum::Json(doc.clone())))?;
            }
            *n = end - self.pos;
            self.pos = end;
            Ok(())
        }

        fn next_batch_range(&mut self, _range: &SparseRange, _dst: &mut Column) -> crate::common::Result<()> {
            Ok(())
        }

        fn seek_to_first(&mut self) -> crate::common::Result<()> {
            self.pos = 0;
            Ok(())
        }

        fn seek_to_ordinal(&mut self, ord: u64) -> crate::common::Result<()> {
            self.pos = ord as usize;
            Ok(())
        }

        fn get_current_ordinal(&self) -> u64 {
            self.pos as u64
        }

        fn num_rows(&self) -> u64 {
            self.docs.len() as u64
        }

        fn get_row_ranges_by_zone_map(
            &mut self,
            _predicates: &[ColumnPredicate],
            _del_predicate: Option<&ColumnPredicate>,
            _pred_relation: CompoundNodeType,
        ) -> crate::common::Result<SparseRange> {
            Ok(SparseRange::from_range(0, self.docs.len() as u32))
        }

        fn fetch_values_by_rowid(&mut self, _rowids: &[u32], _dst: &mut Column) -> crate::common::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn fields_are_extracted_by_position() {
        let docs = DocsIterator { docs: vec![json!({"a": 1, "b": "x"}), json!({"a": 1})], pos: 0 };
        let mut iter =
            create_json_dynamic_flat_iterator(Box::new(docs), paths(&["a", "b"]), TARGETS.to_vec(), access_path())
                .unwrap();
        iter.init(&ColumnIteratorOptions::default()).unwrap();

        let mut dst = json_destination(false);
        let mut n = 2;
        iter.next_batch(&mut n, &mut dst).unwrap();
        assert_eq!(n, 2);
        assert_eq!(field_values(&dst, 0), ints(&[Some(1), Some(1)]));
        assert_eq!(field_values(&dst, 1), vec![Some(Datum::Varchar("x".into())), None]);
        assert_eq!(dst.get(1), Some(Datum::Json(json!({"a": 1}))));
    }

    #[test]
    fn nullable_batches_carry_the_raw_null_mask() {
        let opts = ColumnIteratorOptions::default();
        let mut iter = open(&raw_reader(), &TARGETS, &opts);

        let mut dst = json_destination(true);
        let mut n = 4;
        iter.next_batch(&mut n, &mut dst).unwrap();
        assert_eq!(n, 4);
        assert_eq!(dst.size(), 4);
        assert_eq!(field(&dst, 0).size(), 4);
        let nullable = dst.as_nullable().unwrap();
        assert!(nullable.has_null());
        assert!(nullable.is_null(1));
        assert_eq!(field_values(&dst, 0), ints(&[Some(1), None, Some(3), Some(4)]));
        assert_eq!(field_values(&dst, 1)[3], None);

        let mut n = 4;
        let mut tail = json_destination(true);
        iter.next_batch(&mut n, &mut tail).unwrap();
        assert_eq!(n, 2);
        assert!(!tail.as_nullable().unwrap().has_null());
    }

    #[test]
    fn zone_map_is_the_raw_iterators() {
        let opts = ColumnIteratorOptions::default();
        let mut iter = open(&raw_reader(), &TARGETS, &opts);
        let mut raw = raw_reader().new_iterator();

        let predicates = [ColumnPredicate::IsNull];
        let ours = iter.get_row_ranges_by_zone_map(&predicates, None, CompoundNodeType::And).unwrap();
        let theirs = raw.get_row_ranges_by_zone_map(&predicates, None, CompoundNodeType::And).unwrap();
        assert_eq!(ours, theirs);
        assert_eq!(ours.ranges(), &[0..4]);
    }

    #[test]
    fn seek_and_ordinals_pass_through() {
        let opts = ColumnIteratorOptions::default();
        let mut iter = open(&raw_reader(), &TARGETS, &opts);
        assert_eq!(iter.num_rows(), 6);
        iter.seek_to_ordinal(3).unwrap();
        assert_eq!(iter.get_current_ordinal(), 3);

        let mut dst = json_destination(true);
        let mut n = 1;
        iter.next_batch(&mut n, &mut dst).unwrap();
        assert_eq!(field_values(&dst, 0), ints(&[Some(4)]));
        assert_eq!(iter.get_current_ordinal(), 4);

        assert!(iter.seek_to_ordinal(7).is_err());
        iter.seek_to_first().unwrap();
        assert_eq!(iter.get_current_ordinal(), 0);
    }

    #[test]
    fn range_and_rowid_reads() {
        let opts = ColumnIteratorOptions::default();
        let mut iter = open(&raw_reader(), &TARGETS, &opts);

        let mut range = SparseRange::from_range(1, 2);
        range.add(4..6);
        let mut dst = json_destination(true);
        iter.next_batch_range(&range, &mut dst).unwrap();
        assert_eq!(field_values(&dst, 0), ints(&[None, Some(5), Some(6)]));
        assert!(dst.as_nullable().unwrap().is_null(0));

        let mut dst = json_destination(true);
        iter.fetch_values_by_rowid(&[5, 0], &mut dst).unwrap();
        assert_eq!(field_values(&dst, 0), ints(&[Some(6), Some(1)]));
        assert_eq!(field_values(&dst, 1), vec![Some(Datum::Varchar("v".into())), Some(Datum::Varchar("x".into()))]);
    }

    #[test]
    fn hits_and_flatten_time_are_recorded() {
        let stats = ReaderStatistics::shared();
        let opts = ColumnIteratorOptions::with_stats(&stats);
        let reader = raw_reader();
        open(&reader, &TARGETS, &opts);
        let mut iter = open(&reader, &TARGETS, &opts);

        assert_eq!(stats.borrow().json_flatten_ns, 0);
        let mut n = 6;
        iter.next_batch(&mut n, &mut json_destination(true)).unwrap();

        let stats = stats.borrow();
        assert_eq!(stats.dynamic_json_hit_count("payload"), 2);
        assert_eq!(stats.flat_json_hit_count("payload"), 0);
        assert!(stats.json_flatten_ns > 0);
    }

    #[test]
    fn flatten_time_is_recorded_when_flattening_fails() {
        let stats = ReaderStatistics::shared();
        let opts = ColumnIteratorOptions::with_stats(&stats);
        let mut iter = create_json_dynamic_flat_iterator(
            FailingIterator::boxed(FailOn::Never),
            paths(&["a"]),
            vec![LogicalType::Int],
            access_path(),
        )
        .unwrap();
        iter.init(&opts).unwrap();

        // an INT column cannot hold flattened fields
        let mut dst = Column::create(LogicalType::Int, true);
        let mut n = 2;
        assert!(matches!(iter.next_batch(&mut n, &mut dst), Err(StorageError::Internal(_))));
        assert!(stats.borrow().json_flatten_ns > 0);
    }

    #[test]
    fn empty_path_list_is_rejected() {
        let result = create_json_dynamic_flat_iterator(
            FailingIterator::boxed(FailOn::Never),
            vec![],
            vec![],
            access_path(),
        );
        assert!(matches!(result, Err(StorageError::InvalidArgument(_))));
    }

    #[test]
    fn raw_iterator_failures_propagate_unchanged() {
        let injected = StorageError::Corruption("injected".into());
        let opts = ColumnIteratorOptions::default();

        let mut iter = create_json_dynamic_flat_iterator(
            FailingIterator::boxed(FailOn::Init),
            paths(&["a"]),
            vec![LogicalType::Int],
            access_path(),
        )
        .unwrap();
        assert_eq!(iter.init(&opts).err(), Some(injected.clone()));

        let mut iter = create_json_dynamic_flat_iterator(
            FailingIterator::boxed(FailOn::Read),
            paths(&["a"]),
            vec![LogicalType::Int],
            access_path(),
        )
        .unwrap();
        iter.init(&opts).unwrap();
        let mut n = 1;
        assert_eq!(iter.next_batch(&mut n, &mut json_destination(true)).err(), Some(injected.clone()));
        let range = SparseRange::from_range(0, 1);
        assert_eq!(iter.next_batch_range(&range, &mut json_destination(true)).err(), Some(injected));
    }

    #[test]
    fn read_before_init_is_an_error() {
        let docs = DocsIterator { docs: vec![json!({"a": 1})], pos: 0 };
        let mut iter =
            create_json_dynamic_flat_iterator(Box::new(docs), paths(&["a"]), vec![LogicalType::Int], access_path())
                .unwrap();
        let mut n = 1;
        assert!(matches!(
            iter.next_batch(&mut n, &mut Column::Json(JsonColumn::new())),
            Err(StorageError::Internal(_))
        ));
    }

    #[test]
    fn delete_state_follows_the_raw_batch() {
        let opts = ColumnIteratorOptions::default();
        let mut iter = open(&raw_reader(), &TARGETS, &opts);
        // first page mixes null and non-null documents
        iter.get_row_ranges_by_zone_map(&[], Some(&ColumnPredicate::IsNull), CompoundNodeType::And)
            .unwrap();

        let mut dst = json_destination(true);
        let mut n = 4;
        iter.next_batch(&mut n, &mut dst).unwrap();
        assert_eq!(dst.delete_state(), DeleteState::PartialSatisfied);

        let mut dst = json_destination(true);
        let mut n = 2;
        iter.next_batch(&mut n, &mut dst).unwrap();
        assert_eq!(dst.delete_state(), DeleteState::NotSatisfied);
    }
}

#[cfg(test)]
mod selection_tests {
    use super::fixtures::*;
    use crate::{
        common::StorageError,
        storage::{ColumnIteratorOptions, ColumnReader, ReaderStatistics},
        types::{Datum, LogicalType},
    };

    #[test]
    fn both_layouts_produce_the_same_fields() {
        let targets = [LogicalType::BigInt, LogicalType::Varchar];
        let stats = ReaderStatistics::shared();
        let opts = ColumnIteratorOptions::with_stats(&stats);

        let mut flat = open(&flat_reader(), &targets, &opts);
        let mut raw = open(&raw_reader(), &targets, &opts);
        let mut from_flat = json_destination(true);
        let mut from_raw = json_destination(true);
        let (mut n1, mut n2) = (6, 6);
        flat.next_batch(&mut n1, &mut from_flat).unwrap();
        raw.next_batch(&mut n2, &mut from_raw).unwrap();

        assert_eq!(n1, n2);
        for index in 0..2 {
            assert_eq!(field_values(&from_flat, index), field_values(&from_raw, index));
        }
        assert_eq!(field_values(&from_raw, 0)[5], Some(Datum::BigInt(6)));

        let stats = stats.borrow();
        assert_eq!(stats.flat_json_hit_count("payload"), 1);
        assert_eq!(stats.dynamic_json_hit_count("payload"), 1);
    }

    #[test]
    fn both_layouts_reject_an_empty_path_list() {
        for reader in [flat_reader(), raw_reader()] {
            let result = reader.new_json_iterator(vec![], vec![], access_path());
            assert!(matches!(result, Err(StorageError::InvalidArgument(_))));
        }
    }

    #[test]
    fn unknown_path_in_flattened_column() {
        let result = flat_reader().new_json_iterator(paths(&["a", "zzz"]), vec![LogicalType::Int; 2], access_path());
        assert!(matches!(result, Err(StorageError::InvalidArgument(_))));
    }

    #[test]
    fn flat_reader_rejects_bad_null_reader() {
        let not_boolean = tinyint_reader(&[Some(1)]);
        assert!(ColumnReader::new_flat_json(Some(not_boolean), vec![]).is_err());
    }
}
