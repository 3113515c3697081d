use crate::{exprs::CastMode, storage::SharedStatistics};

/// Options handed to `ColumnIterator::init`.
///
/// - `stats` is the caller's statistics context; iterators record hit
///   counters and timings into it.
/// - `cast_mode` controls how casts of schema-drifted fields treat values
///   that do not fit the requested type.
#[derive(Debug, Clone, Default)]
pub struct ColumnIteratorOptions {
    /// Statistics context owned by the caller
    pub stats: SharedStatistics,
    /// Behaviour of field casts on unrepresentable values
    pub cast_mode: CastMode,
}

impl ColumnIteratorOptions {
    /// Default options with a fresh statistics context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options recording into an existing statistics context.
    pub fn with_stats(stats: &SharedStatistics) -> Self {
        Self { stats: stats.clone(), cast_mode: CastMode::default() }
    }

    /// Convenience: fail reads on values a cast cannot represent.
    pub fn strict(stats: &SharedStatistics) -> Self {
        Self { stats: stats.clone(), cast_mode: CastMode::Strict }
    }

    /// Convenience: turn values a cast cannot represent into nulls.
    pub fn lenient(stats: &SharedStatistics) -> Self {
        Self { stats: stats.clone(), cast_mode: CastMode::Lenient }
    }
}
