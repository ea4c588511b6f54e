//! Dense ranking of scored records.

use crate::ScoredRecord;

/// Drop unscored records, stable-sort the rest by score (highest first) and
/// assign `rank = position + 1`. Equal scores keep their input order and still
/// get distinct consecutive ranks. A non-finite score counts as unscored.
pub fn rank(records: Vec<ScoredRecord>) -> Vec<ScoredRecord> {
    let mut ranked: Vec<(f64, ScoredRecord)> = records
        .into_iter()
        .filter(|r| r.is_scored())
        .filter_map(|r| r.weighted_score.map(|score| (score, r)))
        .collect();

    // `sort_by` is stable, so ties stay in fetch order
    ranked.sort_by(|(a, _), (b, _)| b.total_cmp(a));

    let mut ranked: Vec<ScoredRecord> = ranked.into_iter().map(|(_, r)| r).collect();

    for (idx, record) in ranked.iter_mut().enumerate() {
        record.rank = Some(idx as u32 + 1);
    }

    ranked
}

/// First `n` records of an already ranked sequence.
pub fn top_n(ranked: &[ScoredRecord], n: usize) -> &[ScoredRecord] {
    &ranked[..n.min(ranked.len())]
}
