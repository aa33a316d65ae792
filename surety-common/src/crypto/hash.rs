use sha2::{Digest, Sha256};

use crate::{flight::FlightKey, utils::AccountId};

/// Computes the SHA-256 digest of the given data and returns it as a hex string.
pub fn digest(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Reduces the first 8 bytes of a SHA-256 digest modulo `range`.
fn reduce(hash: &[u8], range: u8) -> u8 {
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&hash[..8]);
    (u64::from_be_bytes(prefix) % range.max(1) as u64) as u8
}

/// Eligibility index of a status request: `hash(airline, flight, timestamp) mod range`.
///
/// Fields are hashed in a fixed order (length-prefixed) so the index is
/// reproducible across runs.
pub fn flight_index(key: &FlightKey, range: u8) -> u8 {
    let mut hasher = Sha256::new();
    hasher.update((key.airline.len() as u64).to_le_bytes());
    hasher.update(key.airline.as_bytes());
    hasher.update((key.code.len() as u64).to_le_bytes());
    hasher.update(key.code.as_bytes());
    hasher.update(key.timestamp.to_le_bytes());
    reduce(&hasher.finalize(), range)
}

/// Weak pseudo-random index in `[0, range)` derived from the caller, a per-call nonce
/// and a seed taken from recent sequencer state.
///
/// Not cryptographically strong; the only property relied upon is an approximately
/// uniform spread over the range.
pub fn pseudo_random_index(caller: &AccountId, nonce: u64, seed: &[u8], range: u8) -> u8 {
    let mut hasher = Sha256::new();
    hasher.update(seed);
    hasher.update(caller.as_bytes());
    hasher.update(nonce.to_le_bytes());
    reduce(&hasher.finalize(), range)
}
