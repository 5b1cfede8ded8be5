//! Allocated node list decoding.
//!
//! Torque reports where a job landed in `exec_host` as
//! `n0163/2,7,10-11+n0205/0-11`: one `name/slots` token per node, joined
//! with `+`, where each slot list is a comma separated mix of single
//! processor indices and inclusive `lo-hi` ranges.

use once_cell::sync::Lazy;
use regex::Regex;

static RANGE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)-(\d+)$").unwrap());

/// One allocated node and the number of processor slots used on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeAllocation {
    pub name: String,
    pub procs: u32,
}

/// Decode an allocated node list into per-node processor counts.
///
/// A range `lo-hi` counts as `hi - lo + 1` slots; anything else in a slot
/// list counts as one. Overlapping ranges are not deduplicated.
pub fn parse_nodes(node_list: &str) -> Vec<NodeAllocation> {
    node_list
        .split('+')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| {
            let (name, slots) = token.split_once('/').unwrap_or((token, ""));
            NodeAllocation {
                name: name.to_string(),
                procs: count_slots(slots),
            }
        })
        .collect()
}

/// Count processor slots in a comma separated slot list.
fn count_slots(slots: &str) -> u32 {
    slots
        .split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(|segment| match RANGE_RE.captures(segment) {
            Some(caps) => {
                let lo: u32 = caps[1].parse().unwrap_or(0);
                let hi: u32 = caps[2].parse().unwrap_or(0);
                // reversed ranges count as a single slot
                hi.saturating_sub(lo) + 1
            }
            None => 1,
        })
        .sum()
}
