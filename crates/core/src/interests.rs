//! Tag-weighted interest arithmetic.
//!
//! Scores are purely additive: every like adds [`LIKE_WEIGHT`] and every watch
//! adds [`WATCH_WEIGHT`] for each occurrence of a tag on the video. There is no
//! decay or normalization. Sums saturate at the `i64` bounds.

use std::collections::BTreeMap;

use crate::models::Interests;

pub const LIKE_WEIGHT: i64 = 11;
pub const WATCH_WEIGHT: i64 = -1;

/// Per-tag change to apply to a user's interests.
pub type InterestDeltas = BTreeMap<String, i64>;

/// Each occurrence of a tag contributes `weight`; repeated tags accumulate.
pub fn compute_deltas<S: AsRef<str>>(tags: &[S], weight: i64) -> InterestDeltas {
    let mut deltas = InterestDeltas::new();
    for tag in tags {
        let entry = deltas.entry(tag.as_ref().to_string()).or_insert(0);
        *entry = entry.saturating_add(weight);
    }
    deltas
}

/// Add `deltas` into `interests`, treating absent tags as 0.
pub fn merge_into(interests: &mut Interests, deltas: &InterestDeltas) {
    for (tag, delta) in deltas {
        let score = interests.entry(tag.clone()).or_insert(0);
        *score = score.saturating_add(*delta);
    }
}
