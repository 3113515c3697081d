use std::cmp::Ordering;

use crate::types::Datum;

/// How the per-predicate row ranges of one column are combined.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CompoundNodeType {
    #[default]
    And,
    Or,
}

/// Min/max summary of one page of a column.
///
/// `min`/`max` are `None` when the page has no non-null value or holds
/// values without an order (JSON).
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ZoneMapDetail {
    pub min: Option<Datum>,
    pub max: Option<Datum>,
    pub has_null: bool,
    pub has_not_null: bool,
}

impl ZoneMapDetail {
    pub fn build<'a>(values: impl IntoIterator<Item = &'a Option<Datum>>) -> Self {
        let mut zone_map = ZoneMapDetail::default();
        let mut ordered = true;
        for value in values {
            let Some(v) = value else {
                zone_map.has_null = true;
                continue;
            };
            zone_map.has_not_null = true;
            if !ordered {
                continue;
            }
            match (&zone_map.min, &zone_map.max) {
                (Some(min), Some(max)) => match (v.compare(min), v.compare(max)) {
                    (Some(lo), Some(hi)) => {
                        if lo == Ordering::Less {
                            zone_map.min = Some(v.clone());
                        }
                        if hi == Ordering::Greater {
                            zone_map.max = Some(v.clone());
                        }
                    }
                    _ => ordered = false,
                },
                _ => {
                    // the first value only bounds the page if it orders against itself
                    if v.compare(v).is_some() {
                        zone_map.min = Some(v.clone());
                        zone_map.max = Some(v.clone());
                    } else {
                        ordered = false;
                    }
                }
            }
        }
        if !ordered {
            zone_map.min = None;
            zone_map.max = None;
        }
        zone_map
    }
}

/// A single-column predicate that zone maps can evaluate.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnPredicate {
    Eq(Datum),
    Ne(Datum),
    Lt(Datum),
    Le(Datum),
    Gt(Datum),
    Ge(Datum),
    IsNull,
    NotNull,
}

impl ColumnPredicate {
    /// Whether a page summarized by `zone_map` may contain a matching row.
    /// Unknown bounds or incomparable values keep the page.
    pub fn zone_map_filter(&self, zone_map: &ZoneMapDetail) -> bool {
        match self {
            ColumnPredicate::IsNull => return zone_map.has_null,
            ColumnPredicate::NotNull => return zone_map.has_not_null,
            _ if !zone_map.has_not_null => return false,
            _ => {}
        }
        let (Some(min), Some(max)) = (&zone_map.min, &zone_map.max) else {
            return true;
        };
        let test = |value: &Datum, bound: &Datum, accept: fn(Ordering) -> bool| {
            bound.compare(value).is_none_or(accept)
        };
        match self {
            ColumnPredicate::Eq(v) => test(v, max, Ordering::is_ge) && test(v, min, Ordering::is_le),
            ColumnPredicate::Ne(v) => !(min.compare(v) == Some(Ordering::Equal) && max.compare(v) == Some(Ordering::Equal)),
            ColumnPredicate::Lt(v) => test(v, min, Ordering::is_lt),
            ColumnPredicate::Le(v) => test(v, min, Ordering::is_le),
            ColumnPredicate::Gt(v) => test(v, max, Ordering::is_gt),
            ColumnPredicate::Ge(v) => test(v, max, Ordering::is_ge),
            ColumnPredicate::IsNull | ColumnPredicate::NotNull => true,
        }
    }

    /// Whether every row of the page matches. Used for delete predicates:
    /// such pages hold only deleted rows.
    pub fn zone_map_fully_satisfied(&self, zone_map: &ZoneMapDetail) -> bool {
        match self {
            ColumnPredicate::IsNull => return zone_map.has_null && !zone_map.has_not_null,
            ColumnPredicate::NotNull => return !zone_map.has_null && zone_map.has_not_null,
            _ if zone_map.has_null || !zone_map.has_not_null => return false,
            _ => {}
        }
        let (Some(min), Some(max)) = (&zone_map.min, &zone_map.max) else {
            return false;
        };
        let test = |bound: &Datum, value: &Datum, accept: fn(Ordering) -> bool| {
            bound.compare(value).is_some_and(accept)
        };
        match self {
            ColumnPredicate::Eq(v) => test(min, v, Ordering::is_eq) && test(max, v, Ordering::is_eq),
            ColumnPredicate::Ne(v) => test(max, v, Ordering::is_lt) || test(min, v, Ordering::is_gt),
            ColumnPredicate::Lt(v) => test(max, v, Ordering::is_lt),
            ColumnPredicate::Le(v) => test(max, v, Ordering::is_le),
            ColumnPredicate::Gt(v) => test(min, v, Ordering::is_gt),
            ColumnPredicate::Ge(v) => test(min, v, Ordering::is_ge),
            ColumnPredicate::IsNull | ColumnPredicate::NotNull => false,
        }
    }
}
