//! Helpers shared by the post store backends.

use smallvec::SmallVec;

/// Join image references into the single stored `img` column value.
#[must_use]
pub fn join_image_refs(refs: &[String]) -> String {
    refs.join(",")
}

/// Split a stored `img` column value back into references. Blank segments
/// from malformed lists are dropped rather than rejected.
#[must_use]
pub fn split_image_refs(raw: &str) -> SmallVec<[String; 4]> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(std::string::ToString::to_string)
        .collect()
}
