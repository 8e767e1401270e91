//! Line-of-code estimation.
//!
//! Two strategies are available (see [`crate::config::LocMode`]):
//!   • histogram: total language bytes divided by an average line width
//!   • exact: newline-delimited segment count over raw file contents
//!
//! Neither is a real source-line count; both are estimates.

use crate::github::{FileLeaf, LeafKind};

/// Average bytes per line used by the histogram estimate.
pub const AVG_BYTES_PER_LINE: u64 = 50;

/// Estimate lines from a language byte histogram, rounded to nearest.
pub fn estimate_from_histogram(histogram: &[(String, u64)]) -> u64 {
    let bytes = histogram
        .iter()
        .fold(0u64, |acc, (_, b)| acc.saturating_add(*b));
    bytes_to_lines(bytes)
}

fn bytes_to_lines(bytes: u64) -> u64 {
    // Half-up rounding, same as rounding bytes / 50 to the nearest integer.
    bytes.saturating_add(AVG_BYTES_PER_LINE / 2) / AVG_BYTES_PER_LINE
}

/// Number of newline-delimited segments. An unterminated last line still
/// counts, and empty content is one empty segment.
pub fn count_lines(content: &str) -> u64 {
    content.split('\n').count() as u64
}

/// Case-sensitive substring match against any excluded pattern.
pub fn is_excluded(path: &str, patterns: &[String]) -> bool {
    patterns.iter().any(|p| path.contains(p.as_str()))
}

/// Blob leaves whose contents should be fetched and counted.
pub fn countable_leaves<'a>(
    tree: &'a [FileLeaf],
    patterns: &'a [String],
) -> impl Iterator<Item = &'a FileLeaf> + 'a {
    tree.iter()
        .filter(move |leaf| leaf.kind == LeafKind::Blob && !is_excluded(&leaf.path, patterns))
}
