use xxhash_rust::xxh3::Xxh3;

use crate::{foundation::error::SearchVizResult, search::model::Trace};

const XXH3_SEED: u64 = 0x5eac_4b1d_7a3c_e901;

/// 128-bit digest of a trace's canonical JSON form.
///
/// Two traces with equal fingerprints serialize to the same bytes (up to hash
/// collisions), which is what "byte-identical replay" is checked against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TraceFingerprint {
    pub hi: u64,
    pub lo: u64,
}

impl std::fmt::Display for TraceFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}{:016x}", self.hi, self.lo)
    }
}

pub fn fingerprint_trace<T: serde::Serialize>(trace: &Trace<T>) -> SearchVizResult<TraceFingerprint> {
    let bytes = serde_json::to_vec(trace)?;
    let mut h = Xxh3::with_seed(XXH3_SEED);
    h.update(&bytes);
    let v = h.digest128();
    Ok(TraceFingerprint {
        hi: (v >> 64) as u64,
        lo: v as u64,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/search/fingerprint.rs"]
mod tests;
