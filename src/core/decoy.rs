/// Decoy selection and stable hashing.
///
/// The decoy flag is recomputed from (mission, ordinal) on every call and
/// never looked up, so losing history cannot change which clues were
/// decoys.

use crate::schema::mission::MissionId;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0001_0000_01b3;

/// Decoy when `hash % DECOY_MODULUS == DECOY_RESIDUE`.
pub const DECOY_MODULUS: u64 = 4;
pub const DECOY_RESIDUE: u64 = 0;

/// 64-bit FNV-1a.
pub fn fnv1a64(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// SplitMix64 finalizer. FNV-1a's low bits only see the low bits of each
/// input byte, so the hash is mixed before any modulo reduction.
pub fn finalize(mut h: u64) -> u64 {
    h = (h ^ (h >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    h = (h ^ (h >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    h ^ (h >> 31)
}

/// Stable hash of a string, identical across platforms and runs.
pub fn stable_hash(input: &str) -> u64 {
    finalize(fnv1a64(input.as_bytes()))
}

/// Whether the clue at `ordinal` in this mission is a decoy.
pub fn is_decoy(mission_id: &MissionId, ordinal: u32) -> bool {
    let key = format!("{}:{}", mission_id.as_str(), ordinal);
    stable_hash(&key) % DECOY_MODULUS == DECOY_RESIDUE
}

/// Hex-encoded structural hash of a template's raw text.
pub fn structure_hash(template_text: &str) -> String {
    format!("{:016x}", fnv1a64(template_text.as_bytes()))
}
