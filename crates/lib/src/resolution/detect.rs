//! Three-way conflict detection against a common base.

/// Whether two values written against a common base need merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conflict {
    /// The values agree, or only one side changed relative to the base.
    NoConflict,
    /// Both sides changed the base differently.
    Conflict,
}

impl Conflict {
    pub fn is_conflict(self) -> bool {
        self == Conflict::Conflict
    }
}

/// Classify `v1` and `v2` relative to their optional common `base`.
///
/// Without a base, any difference between the values is a conflict.
pub fn detect_conflict(base: Option<&[u8]>, v1: &[u8], v2: &[u8]) -> Conflict {
    if v1 == v2 {
        return Conflict::NoConflict;
    }
    match base {
        Some(base) if base == v1 || base == v2 => Conflict::NoConflict,
        _ => Conflict::Conflict,
    }
}
