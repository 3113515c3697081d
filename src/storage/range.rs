use std::ops::Range;

/// Row position inside a segment, as used by row-id fetches and ranges.
pub type RowId = u32;
/// Row position as tracked by iterators.
pub type Ordinal = u64;

/// Set of half-open row-id ranges, kept sorted and merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SparseRange {
    ranges: Vec<Range<RowId>>,
}

impl SparseRange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_range(begin: RowId, end: RowId) -> Self {
        let mut range = Self::new();
        range.add(begin..end);
        range
    }

    /// Insert `range`, merging it with overlapping or touching ranges.
    pub fn add(&mut self, range: Range<RowId>) {
        if range.is_empty() {
            return;
        }
        let mut merged = range;
        let mut placed = false;
        let mut out = Vec::with_capacity(self.ranges.len() + 1);
        for r in self.ranges.drain(..) {
            if r.end < merged.start {
                out.push(r);
            } else if merged.end < r.start {
                if !placed {
                    out.push(merged.clone());
                    placed = true;
                }
                out.push(r);
            } else {
                merged = merged.start.min(r.start)..merged.end.max(r.end);
            }
        }
        if !placed {
            out.push(merged);
        }
        self.ranges = out;
    }

    pub fn ranges(&self) -> &[Range<RowId>] {
        &self.ranges
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Number of rows covered.
    pub fn span_size(&self) -> usize {
        self.ranges.iter().map(|r| (r.end - r.start) as usize).sum()
    }

    pub fn intersection(&self, other: &SparseRange) -> SparseRange {
        let mut out = SparseRange::new();
        let (mut i, mut j) = (0, 0);
        while i < self.ranges.len() && j < other.ranges.len() {
            let (a, b) = (&self.ranges[i], &other.ranges[j]);
            let start = a.start.max(b.start);
            let end = a.end.min(b.end);
            if start < end {
                out.ranges.push(start..end);
            }
            if a.end < b.end {
                i += 1;
            } else {
                j += 1;
            }
        }
        out
    }

    pub fn union(&self, other: &SparseRange) -> SparseRange {
        let mut out = self.clone();
        for r in &other.ranges {
            out.add(r.clone());
        }
        out
    }
}
