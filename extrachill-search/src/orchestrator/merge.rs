//! Global ordering and windowing of the merged record set.
//!
//! Runs only after every site has answered: the total and the ranking both
//! depend on seeing every record. All sorts are stable, so records that
//! compare equal keep their merge order (site order, then source order).

use std::cmp::Ordering;

use crate::query::{OrderBy, QuerySpec, SortOrder};
use crate::types::ScoredRecord;

/// One window of the fully ordered sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedPage {
    /// Records in `[offset, offset + limit)` of the ordered sequence.
    pub records: Vec<ScoredRecord>,
    /// Length of the full ordered sequence.
    pub total: usize,
}

/// Order `records` in place.
///
/// With a term: score descending, then newest first. Without one: by
/// `order_by` in `order`; [`OrderBy::Relevance`] keeps merge order.
pub fn order_records(records: &mut [ScoredRecord], has_term: bool, order_by: OrderBy, order: SortOrder) {
    if has_term {
        records.sort_by(|a, b| {
            b.rank()
                .total_cmp(&a.rank())
                .then_with(|| b.record.published_at.cmp(&a.record.published_at))
        });
        return;
    }

    let compare: fn(&ScoredRecord, &ScoredRecord) -> Ordering = match order_by {
        OrderBy::Date => |a, b| a.record.published_at.cmp(&b.record.published_at),
        OrderBy::Modified => |a, b| a.record.modified_at.cmp(&b.record.modified_at),
        OrderBy::Title => |a, b| {
            a.record
                .title
                .to_lowercase()
                .cmp(&b.record.title.to_lowercase())
        },
        OrderBy::Relevance => return,
    };

    match order {
        SortOrder::Asc => records.sort_by(compare),
        SortOrder::Desc => records.sort_by(|a, b| compare(b, a)),
    }
}

/// Slice `[offset, offset + limit)` out of an ordered sequence.
pub fn window<T>(items: Vec<T>, offset: usize, limit: Option<usize>) -> Vec<T> {
    items
        .into_iter()
        .skip(offset)
        .take(limit.unwrap_or(usize::MAX))
        .collect()
}

/// Order every record, count them, then cut out the requested window.
pub fn finalize(mut records: Vec<ScoredRecord>, spec: &QuerySpec) -> MergedPage {
    let has_term = !spec.term.trim().is_empty();
    order_records(&mut records, has_term, spec.order_by, spec.order);
    let total = records.len();
    MergedPage {
        records: window(records, spec.offset, spec.limit),
        total,
    }
}
