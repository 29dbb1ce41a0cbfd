//! Storage keys and typed accessors.
//!
//! Instance keys hold contract-level configuration shared by every round.
//! Persistent keys hold per-round data; each write bumps the entry's TTL.

use soroban_sdk::{contracttype, Address, Env, IntoVal, TryFromVal, Val, Vec};
use stellarcade_shared::PERSISTENT_BUMP_LEDGERS;

use crate::round::RoundData;
use crate::{Error, DEFAULT_PARTICIPATION_TIME, DEFAULT_REVEAL_TIME, MIN_PLAYERS_FLOOR};

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    // --- instance() keys: contract-level config ---
    Admin,
    ParticipationTime,
    RevealTime,
    MinimumPlayers,
    CurrentRound,
    // --- persistent() keys: round and player data ---
    /// RoundData keyed by round id.
    Round(u64),
    /// Vec<Address> in first-commitment order.
    Participants(u64),
    /// Participant keyed by (round id, player).
    Participant(u64, Address),
    /// Vec<RankedValue>, ascending, grown by the sorter.
    Sorted(u64),
    /// Vec<Address> of players at the best distance seen so far.
    Winners(u64),
}

/// Round configuration. Read on every call, so changes apply immediately.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Config {
    pub participation_time: u64,
    pub reveal_time: u64,
    pub minimum_players: u32,
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Admin)
}

pub fn require_initialized(env: &Env) -> Result<(), Error> {
    if !is_initialized(env) {
        return Err(Error::NotInitialized);
    }
    Ok(())
}

/// Store the admin and default configuration, and open round 0.
pub fn initialize(env: &Env, admin: &Address) {
    let instance = env.storage().instance();
    instance.set(&DataKey::Admin, admin);
    instance.set(&DataKey::ParticipationTime, &DEFAULT_PARTICIPATION_TIME);
    instance.set(&DataKey::RevealTime, &DEFAULT_REVEAL_TIME);
    instance.set(&DataKey::MinimumPlayers, &MIN_PLAYERS_FLOOR);
    instance.set(&DataKey::CurrentRound, &0u64);
    save_round(env, &RoundData::new(0));
}

pub fn get_admin(env: &Env) -> Result<Address, Error> {
    env.storage()
        .instance()
        .get(&DataKey::Admin)
        .ok_or(Error::NotInitialized)
}

pub fn config(env: &Env) -> Config {
    let instance = env.storage().instance();
    Config {
        participation_time: instance
            .get(&DataKey::ParticipationTime)
            .unwrap_or(DEFAULT_PARTICIPATION_TIME),
        reveal_time: instance
            .get(&DataKey::RevealTime)
            .unwrap_or(DEFAULT_REVEAL_TIME),
        minimum_players: instance
            .get(&DataKey::MinimumPlayers)
            .unwrap_or(MIN_PLAYERS_FLOOR),
    }
}

pub fn set_participation_time(env: &Env, duration: u64) {
    env.storage()
        .instance()
        .set(&DataKey::ParticipationTime, &duration);
}

pub fn set_reveal_time(env: &Env, duration: u64) {
    env.storage().instance().set(&DataKey::RevealTime, &duration);
}

pub fn set_minimum_players(env: &Env, minimum_players: u32) {
    env.storage()
        .instance()
        .set(&DataKey::MinimumPlayers, &minimum_players);
}

pub fn current_round_id(env: &Env) -> u64 {
    env.storage()
        .instance()
        .get(&DataKey::CurrentRound)
        .unwrap_or(0)
}

pub fn set_current_round_id(env: &Env, round_id: u64) {
    env.storage()
        .instance()
        .set(&DataKey::CurrentRound, &round_id);
}

pub fn load_round(env: &Env, round_id: u64) -> Option<RoundData> {
    env.storage().persistent().get(&DataKey::Round(round_id))
}

pub fn save_round(env: &Env, round: &RoundData) {
    set_persistent(env, DataKey::Round(round.id), round);
}

pub fn load_vec<T>(env: &Env, key: &DataKey) -> Vec<T>
where
    T: IntoVal<Env, Val> + TryFromVal<Env, Val>,
{
    env.storage()
        .persistent()
        .get(key)
        .unwrap_or_else(|| Vec::new(env))
}

pub fn set_persistent<T>(env: &Env, key: DataKey, value: &T)
where
    T: IntoVal<Env, Val>,
{
    env.storage().persistent().set(&key, value);
    extend_persistent_ttl(env, &key);
}

fn extend_persistent_ttl(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_BUMP_LEDGERS, PERSISTENT_BUMP_LEDGERS);
}
