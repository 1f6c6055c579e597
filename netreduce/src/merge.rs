//! Sibling branch factoring.
//!
//! The path search produces alternative routes between the same two
//! endpoints. When several of them start (or end) with the same steps, the
//! shared run is pulled out:
//!
//! ```text
//! [A, B, C], [A, E, F]   →   Series[A, Parallel[Series[B, C], Series[E, F]]]
//! [R1, R3], [R2, R3]     →   Series[Parallel[R1, R2], R3]
//! ```
//!
//! Merging is a single level: members of the new `Parallel` are not merged
//! again. Output order is stable (a rebuilt tree takes the position of its
//! first member).

use crate::tree::Tree;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    /// Group by first element.
    Leading,
    /// Group by last element.
    Trailing,
}

/// Factors shared prefixes and suffixes out of sibling branches.
#[derive(Debug, Default, Clone, Copy)]
pub struct Merger;

impl Merger {
    pub fn new() -> Self {
        Self
    }

    /// Merge a list of sibling alternatives.
    pub fn merge(&self, branches: Vec<Tree>) -> Vec<Tree> {
        if branches.len() < 2 {
            return branches;
        }
        let mut slots: Vec<Option<Tree>> = branches.into_iter().map(Some).collect();
        let all: Vec<usize> = (0..slots.len()).collect();

        let leftover = factor_pass(&mut slots, &all, Pass::Leading);
        factor_pass(&mut slots, &leftover, Pass::Trailing);

        slots.into_iter().flatten().collect()
    }
}

/// Shorthand for `Merger::new().merge(branches)`.
pub fn merge_branches(branches: Vec<Tree>) -> Vec<Tree> {
    Merger::new().merge(branches)
}

/// Run one pass over `candidates` (indices into `slots`). Returns the
/// indices that were not consumed by a merge, in ascending order.
fn factor_pass(slots: &mut [Option<Tree>], candidates: &[usize], pass: Pass) -> Vec<usize> {
    // Partition by key element, groups in first-seen order.
    let mut partitions: Vec<(Tree, Vec<usize>)> = Vec::new();
    let mut leftover = Vec::new();

    for &idx in candidates {
        let key = match slots.get(idx).and_then(Option::as_ref).and_then(|t| key_of(t, pass)) {
            Some(k) => k.clone(),
            None => {
                leftover.push(idx);
                continue;
            }
        };
        match partitions.iter_mut().find(|(k, _)| *k == key) {
            Some((_, members)) => members.push(idx),
            None => partitions.push((key, vec![idx])),
        }
    }

    for (_, members) in partitions {
        if members.len() < 2 {
            leftover.extend(members);
            continue;
        }
        let elements: Vec<Vec<Tree>> = members
            .iter()
            .filter_map(|&i| slots.get(i).and_then(Option::as_ref))
            .map(|t| t.elements().to_vec())
            .collect();

        match factor(elements) {
            Some(rebuilt) => {
                let mut targets = members.iter();
                if let Some(slot) = targets.next().and_then(|&first| slots.get_mut(first)) {
                    *slot = Some(rebuilt);
                }
                for &other in targets {
                    if let Some(slot) = slots.get_mut(other) {
                        *slot = None;
                    }
                }
            }
            None => leftover.extend(members),
        }
    }

    leftover.sort_unstable();
    leftover
}

fn key_of(tree: &Tree, pass: Pass) -> Option<&Tree> {
    let elements = tree.elements();
    match pass {
        Pass::Leading => elements.first(),
        Pass::Trailing => elements.last(),
    }
}

/// Factor the common prefix and suffix of a merge group.
///
/// Every member keeps at least one element, so no empty container is ever
/// built. Returns `None` when nothing can be factored.
fn factor(members: Vec<Vec<Tree>>) -> Option<Tree> {
    let shortest = members.iter().map(Vec::len).min()?;
    let budget = shortest.saturating_sub(1);

    let prefix = common_run(&members, budget, |m, i| m.get(i));
    let suffix = common_run(&members, budget - prefix, |m, i| {
        m.len().checked_sub(i + 1).and_then(|j| m.get(j))
    });
    if prefix == 0 && suffix == 0 {
        return None;
    }

    let first = members.first()?;
    let head: Vec<Tree> = first.iter().take(prefix).cloned().collect();
    let tail: Vec<Tree> = first.iter().skip(first.len() - suffix).cloned().collect();

    let alternatives: Vec<Tree> = members
        .into_iter()
        .map(|m| {
            let end = m.len() - suffix;
            Tree::series(m.into_iter().take(end).skip(prefix).collect())
        })
        .collect();

    let mut steps = head;
    steps.push(Tree::Parallel(alternatives));
    steps.extend(tail);
    Some(Tree::Series(steps))
}

/// Length of the run (up to `limit`) on which every member agrees, where
/// `at(member, i)` yields the i-th element in walking order.
fn common_run<'a>(
    members: &'a [Vec<Tree>],
    limit: usize,
    at: impl Fn(&'a Vec<Tree>, usize) -> Option<&'a Tree>,
) -> usize {
    let Some(first) = members.first() else {
        return 0;
    };
    (0..limit)
        .take_while(|&i| match at(first, i) {
            Some(expected) => members.iter().all(|m| at(m, i) == Some(expected)),
            None => false,
        })
        .count()
}
