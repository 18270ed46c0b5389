//! Page-count arithmetic: the page limit, the zero-pad width, and the
//! partition of the sequence into consecutive N-sized groups.
//!
//! Everything here is a pure function over counts, so the partial-batch
//! handling is testable without rendering a single page.

use crate::config::DEFAULT_PAGE_GROUPS;
use std::ops::Range;
use tracing::info;

/// One N-tuple of consecutive pages, identified by its zero-based index.
///
/// Holds the index range of its pages within the shared
/// [`PageSequence`](crate::pipeline::render::PageSequence) rather than the
/// pixel data itself; the worker that consumes the group borrows the pages
/// read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageGroup {
    /// Zero-based group index, also the output-file index.
    pub index: usize,
    /// Indices of this group's pages within the page sequence.
    pub pages: Range<usize>,
}

/// Compute the page limit for a post-skip sequence of `len` pages.
///
/// With `all_pages`, every page that fits a whole group:
/// `len - (len mod n)`. Otherwise the fixed default of
/// [`DEFAULT_PAGE_GROUPS`] groups. Always a multiple of `n`.
pub fn page_limit(len: usize, all_pages: bool, n: usize) -> usize {
    if all_pages {
        len - (len % n)
    } else {
        n * DEFAULT_PAGE_GROUPS
    }
}

/// Zero-pad width for output indices: the digit count of the group count
/// `page_limit / n`.
///
/// The largest index is `page_limit / n - 1`, so this width always keeps
/// filenames sorting lexicographically in group-index order.
pub fn pad_width(page_limit: usize, n: usize) -> usize {
    (page_limit / n).to_string().len()
}

/// Partition a sequence of `len` pages into consecutive groups of exactly
/// `n`, in original page order.
///
/// Because the sequence was already truncated to a multiple-of-`n` limit, a
/// short trailing chunk only arises when the true page count fell below the
/// limit. That case is not data corruption: the unpaired pages are dropped
/// with an informational notice and planning continues.
pub fn plan_groups(len: usize, n: usize) -> Vec<PageGroup> {
    let mut groups = Vec::with_capacity(len / n);
    let mut index = 0;
    let mut start = 0;
    while start < len {
        let end = start + n;
        if end > len {
            info!(
                "Stopped ahead of group {} to avoid {} unpaired page(s)",
                index + 1,
                len - start
            );
            break;
        }
        groups.push(PageGroup {
            index,
            pages: start..end,
        });
        index += 1;
        start = end;
    }
    groups
}
