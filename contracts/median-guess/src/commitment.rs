//! Sealed commitments and their reveals.

use soroban_sdk::{contracttype, Address, Bytes, BytesN, Env, Vec};
use stellarcade_shared::CommitmentScheme;

use crate::round::{Phase, RoundData};
use crate::storage::{self, DataKey};
use crate::{Error, ValueCommitted, ValueRevealed};

/// A player's entry in one round.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Participant {
    /// Fixed at submission; never rewritten within the round.
    pub commitment:     BytesN<32>,
    pub revealed_value: Option<u64>,
}

impl Participant {
    pub fn has_revealed(&self) -> bool {
        self.revealed_value.is_some()
    }
}

/// Commitments and revealed values of a single round.
pub(crate) struct CommitmentStore {
    env:      Env,
    round_id: u64,
}

impl CommitmentStore {
    pub fn new(env: &Env, round_id: u64) -> Self {
        Self {
            env: env.clone(),
            round_id,
        }
    }

    /// Record `scheme.commit(value, key)` for `player` and append them to the
    /// participant list.
    pub fn submit<H: CommitmentScheme>(
        &self,
        scheme: &H,
        round: &mut RoundData,
        phase: Phase,
        player: &Address,
        value: u64,
        key: &Bytes,
    ) -> Result<(), Error> {
        if phase != Phase::Active {
            return Err(Error::GameNotActive);
        }
        if key.is_empty() {
            return Err(Error::EmptyKey);
        }
        if load(&self.env, self.round_id, player).is_some() {
            return Err(Error::ValueAlreadySet);
        }
        let participant_count = round
            .participant_count
            .checked_add(1)
            .ok_or(Error::Overflow)?;

        let commitment = scheme.commit(&self.env, value, key);
        let entry = Participant {
            commitment: commitment.clone(),
            revealed_value: None,
        };
        storage::set_persistent(
            &self.env,
            DataKey::Participant(self.round_id, player.clone()),
            &entry,
        );

        let mut players = participants(&self.env, self.round_id);
        players.push_back(player.clone());
        storage::set_persistent(&self.env, DataKey::Participants(self.round_id), &players);

        round.participant_count = participant_count;

        ValueCommitted {
            round_id: self.round_id,
            player: player.clone(),
            commitment,
        }
        .publish(&self.env);

        Ok(())
    }

    pub fn reveal<H: CommitmentScheme>(
        &self,
        scheme: &H,
        phase: Phase,
        player: &Address,
        value: u64,
        key: &Bytes,
    ) -> Result<(), Error> {
        if phase != Phase::RevealWindow {
            return Err(Error::RevealNotOpen);
        }

        let mut entry =
            load(&self.env, self.round_id, player).ok_or(Error::CommitmentMismatch)?;
        if entry.has_revealed() {
            return Err(Error::AlreadyRevealed);
        }
        if !scheme.verify(&self.env, &entry.commitment, value, key) {
            return Err(Error::CommitmentMismatch);
        }

        entry.revealed_value = Some(value);
        storage::set_persistent(
            &self.env,
            DataKey::Participant(self.round_id, player.clone()),
            &entry,
        );

        ValueRevealed {
            round_id: self.round_id,
            player: player.clone(),
            value,
        }
        .publish(&self.env);

        Ok(())
    }
}

pub fn load(env: &Env, round_id: u64, player: &Address) -> Option<Participant> {
    env.storage()
        .persistent()
        .get(&DataKey::Participant(round_id, player.clone()))
}

pub fn participants(env: &Env, round_id: u64) -> Vec<Address> {
    storage::load_vec(env, &DataKey::Participants(round_id))
}

pub fn revealed_value(env: &Env, round_id: u64, player: &Address) -> Option<u64> {
    load(env, round_id, player).and_then(|entry| entry.revealed_value)
}
