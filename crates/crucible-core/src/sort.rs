//! The ordering resolver.
//!
//! Turns a partially constrained sequence of entries into a total order. This
//! is deliberately *not* a topological sort: it is a fixed-point relaxation
//! that pins FIRST/LAST in one pass, then relocates BEFORE/AFTER entries until
//! every directional constraint holds, with a quadratic relocation budget as
//! the circuit breaker for cyclic constraint sets.
//!
//! Two tolerances are intentional:
//!
//! - A BEFORE/AFTER reference to an id nobody carries sorts as if it were
//!   ANY. The referenced contributor is commonly just not installed.
//! - Entries with equal constraints keep their relative input order.
//!
//! Constraints are resolved per sort invocation only; later mutation of the
//! entry set is the caller's cue to sort again.

use crate::error::OrderingConflict;
use crate::order::LoadingOrder;

// ─── Orderable ────────────────────────────────────────────────────────────────

/// What an entry must expose to participate in sorting.
pub trait Orderable {
    /// The identifier other entries may target via BEFORE/AFTER, if any.
    ///
    /// Independent of whether anything actually references it.
    fn order_id(&self) -> Option<&str>;

    /// This entry's ordering directive.
    fn loading_order(&self) -> &LoadingOrder;

    /// Human-readable handle used in conflict diagnostics.
    fn describe(&self) -> String;
}

// ─── Resolver ─────────────────────────────────────────────────────────────────

/// Sorts `items` in place according to their [`LoadingOrder`] directives.
///
/// On conflict, `items` is left exactly as passed in — a failed sort never
/// corrupts the caller's storage.
///
/// # Errors
///
/// - [`OrderingConflict::DuplicateFirst`] / [`OrderingConflict::DuplicateLast`]
///   when more than one entry claims a pinned slot.
/// - [`OrderingConflict::BeforeFirst`] / [`OrderingConflict::AfterLast`] when
///   a BEFORE/AFTER chain demands a position outside the pinned anchors.
/// - [`OrderingConflict::CycleSuspected`] when relocations exceed `n²`.
pub fn sort_by_loading_order<T: Orderable>(items: &mut Vec<T>) -> Result<(), OrderingConflict> {
    let order = resolve_order(items)?;
    let mut slots: Vec<Option<T>> = items.drain(..).map(Some).collect();
    items.extend(order.into_iter().filter_map(|idx| slots[idx].take()));
    Ok(())
}

/// Computes the resolved permutation without touching `items`.
fn resolve_order<T: Orderable>(items: &[T]) -> Result<Vec<usize>, OrderingConflict> {
    let n = items.len();
    if n < 2 {
        return Ok((0..n).collect());
    }

    // Pre-sort pass: pin at most one FIRST and one LAST; everything else
    // keeps its relative input order.
    let mut first: Option<usize> = None;
    let mut last: Option<usize> = None;
    let mut middle: Vec<usize> = Vec::with_capacity(n);
    for idx in 0..n {
        match items[idx].loading_order() {
            LoadingOrder::First => {
                if let Some(existing) = first {
                    return Err(OrderingConflict::DuplicateFirst {
                        existing: items[existing].describe(),
                        duplicate: items[idx].describe(),
                    });
                }
                first = Some(idx);
            }
            LoadingOrder::Last => {
                if let Some(existing) = last {
                    return Err(OrderingConflict::DuplicateLast {
                        existing: items[existing].describe(),
                        duplicate: items[idx].describe(),
                    });
                }
                last = Some(idx);
            }
            _ => middle.push(idx),
        }
    }

    let mut seq: Vec<usize> = Vec::with_capacity(n);
    seq.extend(first);
    seq.append(&mut middle);
    seq.extend(last);

    // Constraint relaxation: relocate BEFORE/AFTER entries next to their peer
    // and re-examine everything from the earlier of the two positions. The
    // move budget bounds cyclic chains that would otherwise relocate forever.
    let budget = n * n;
    let mut moves = 0usize;
    let mut i = 0usize;
    while i < seq.len() {
        let cur = seq[i];
        match items[cur].loading_order() {
            LoadingOrder::Any => i += 1,
            LoadingOrder::First => {
                if i != 0 {
                    return Err(OrderingConflict::BeforeFirst {
                        entry: items[seq[0]].describe(),
                        anchor: items[cur].describe(),
                    });
                }
                i += 1;
            }
            LoadingOrder::Last => {
                if i != seq.len() - 1 {
                    return Err(OrderingConflict::AfterLast {
                        entry: items[seq[seq.len() - 1]].describe(),
                        anchor: items[cur].describe(),
                    });
                }
                i += 1;
            }
            LoadingOrder::Before(peer) => match find_peer(items, &seq, peer, cur) {
                None => i += 1,
                Some(j) if i < j => i += 1,
                Some(j) => {
                    seq.remove(i);
                    seq.insert(j, cur);
                    moves += 1;
                    if moves > budget {
                        return Err(cycle_conflict(items, &seq, moves));
                    }
                    i = i.min(j);
                }
            },
            LoadingOrder::After(peer) => match find_peer(items, &seq, peer, cur) {
                None => i += 1,
                Some(j) if i > j => i += 1,
                Some(j) => {
                    // Removing at `i` shifts the peer to `j - 1`, so inserting
                    // at `j` lands directly after it.
                    seq.remove(i);
                    seq.insert(j, cur);
                    moves += 1;
                    if moves > budget {
                        return Err(cycle_conflict(items, &seq, moves));
                    }
                    i = i.min(j);
                }
            },
        }
    }

    Ok(seq)
}

/// Index within `seq` of the entry whose own id is `peer`, skipping `this`.
///
/// Skipping `this` makes a self-referential directive behave like a dangling
/// one instead of burning the relocation budget.
fn find_peer<T: Orderable>(items: &[T], seq: &[usize], peer: &str, this: usize) -> Option<usize> {
    seq.iter()
        .position(|&idx| idx != this && items[idx].order_id() == Some(peer))
}

fn cycle_conflict<T: Orderable>(items: &[T], seq: &[usize], moves: usize) -> OrderingConflict {
    OrderingConflict::CycleSuspected {
        entries: seq.iter().map(|&idx| items[idx].describe()).collect(),
        moves,
    }
}
