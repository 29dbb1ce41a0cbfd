//! Shared utilities and data structures for Stellarcade contracts.
//!
//! Game contracts that run timed, sealed-bid rounds pull their time source and
//! commitment scheme from here so both can be swapped out in tests.
#![no_std]
#![allow(unexpected_cfgs)]

use soroban_sdk::{contracttype, Bytes, BytesN, Env};

/// Persistent storage TTL in ledgers (~30 days at 5s/ledger).
pub const PERSISTENT_BUMP_LEDGERS: u32 = 518_400;

/// Coarse classification of contract errors, shared by every game so that
/// clients can react to a failure without knowing each contract's codes.
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ErrorKind {
    /// Caller lacks the required capability.
    Authorization = 1,
    /// Malformed or out-of-range input.
    Validation = 2,
    /// Operation is invalid for the current phase.
    State = 3,
    /// Commitment mismatch or attempt to overwrite immutable data.
    Integrity = 4,
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Monotonically non-decreasing time source, in seconds.
pub trait Clock {
    fn now(&self) -> u64;
}

/// Reads the close time of the current ledger.
#[derive(Clone)]
pub struct LedgerClock {
    env: Env,
}

impl LedgerClock {
    pub fn new(env: &Env) -> Self {
        Self { env: env.clone() }
    }
}

impl Clock for LedgerClock {
    fn now(&self) -> u64 {
        self.env.ledger().timestamp()
    }
}

// ---------------------------------------------------------------------------
// Commitments
// ---------------------------------------------------------------------------

/// Binds a player to a `(value, key)` pair without disclosing either.
pub trait CommitmentScheme {
    fn commit(&self, env: &Env, value: u64, key: &Bytes) -> BytesN<32>;

    fn verify(&self, env: &Env, commitment: &BytesN<32>, value: u64, key: &Bytes) -> bool {
        self.commit(env, value, key) == *commitment
    }
}

/// `SHA-256(value_be_bytes || key)`.
///
/// The value is always 8 bytes, so the preimage split is unambiguous.
#[derive(Clone, Copy, Default)]
pub struct Sha256Commitment;

impl CommitmentScheme for Sha256Commitment {
    fn commit(&self, env: &Env, value: u64, key: &Bytes) -> BytesN<32> {
        let mut preimage = Bytes::from_array(env, &value.to_be_bytes());
        preimage.append(key);
        env.crypto().sha256(&preimage).into()
    }
}
