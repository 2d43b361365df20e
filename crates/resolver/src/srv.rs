//! `SRV` record priority and weighted-random ordering (RFC 2782 §3).

use rand::Rng;

/// A single `SRV` record.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct SrvRecord {
    /// Lower values are tried first.
    pub priority: u16,
    /// Relative weight among records sharing a priority.
    pub weight: u16,
    pub port: u16,
    pub target: String,
}

/// Orders `records` for connection attempts: ascending priority, with
/// records sharing a priority shuffled by RFC 2782's weighted-random
/// algorithm (a record's chance of being picked next is proportional to
/// its weight among the remaining records at that priority; weight-zero
/// records are tried last within their priority, ahead only of nothing).
#[must_use]
pub fn order_records(records: &[SrvRecord]) -> Vec<SrvRecord> {
    order_records_with(records, &mut rand::rng())
}

/// Same as [`order_records`] but with an injected RNG, for deterministic tests.
pub fn order_records_with(records: &[SrvRecord], rng: &mut impl Rng) -> Vec<SrvRecord> {
    let mut by_priority: Vec<u16> = records.iter().map(|r| r.priority).collect();
    by_priority.sort_unstable();
    by_priority.dedup();

    let mut ordered = Vec::with_capacity(records.len());
    for priority in by_priority {
        let mut group: Vec<SrvRecord> = records
            .iter()
            .filter(|r| r.priority == priority)
            .cloned()
            .collect();
        ordered.extend(weighted_shuffle(&mut group, rng));
    }
    ordered
}

fn weighted_shuffle(group: &mut Vec<SrvRecord>, rng: &mut impl Rng) -> Vec<SrvRecord> {
    let mut result = Vec::with_capacity(group.len());
    while !group.is_empty() {
        let total_weight: u32 = group.iter().map(|r| u32::from(r.weight) + 1).sum();
        let mut pick = rng.random_range(0..total_weight);
        let mut chosen = 0;
        for (i, record) in group.iter().enumerate() {
            let weight = u32::from(record.weight) + 1;
            if pick < weight {
                chosen = i;
                break;
            }
            pick -= weight;
        }
        result.push(group.remove(chosen));
    }
    result
}
