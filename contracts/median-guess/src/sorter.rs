//! Resumable insertion sort over the revealed values of a round.
//!
//! Every call takes the next `budget` participants after `sort_cursor` and
//! inserts each revealed value into the already-sorted prefix. The stored
//! view is a valid ascending sequence after every call, so the work can be
//! split at any boundary.

use soroban_sdk::{contracttype, Address, Env, Vec};

use crate::commitment;
use crate::finder::median_of;
use crate::round::RoundData;
use crate::storage::{self, DataKey};

/// A revealed value together with the player who revealed it.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RankedValue {
    pub player: Address,
    pub value:  u64,
}

/// Elements a chunked call may process: `0` means everything remaining, and
/// larger budgets are clamped to what is left.
pub fn effective_steps(budget: u32, remaining: u32) -> u32 {
    if budget == 0 || budget > remaining {
        remaining
    } else {
        budget
    }
}

pub(crate) struct IncrementalSorter {
    env:      Env,
    round_id: u64,
}

impl IncrementalSorter {
    pub fn new(env: &Env, round_id: u64) -> Self {
        Self {
            env: env.clone(),
            round_id,
        }
    }

    /// Merge up to `budget` more participants into the sorted view and
    /// advance `round.sort_cursor`. The median is cached on the round by the
    /// call that completes the sort. Returns the number of participants
    /// consumed; `0` means there was nothing left to do.
    pub fn advance(&self, round: &mut RoundData, budget: u32) -> u32 {
        let remaining = round.participant_count.saturating_sub(round.sort_cursor);
        let steps = effective_steps(budget, remaining);
        if steps == 0 {
            return 0;
        }

        let players = commitment::participants(&self.env, self.round_id);
        let mut sorted: Vec<RankedValue> =
            storage::load_vec(&self.env, &DataKey::Sorted(self.round_id));

        for index in round.sort_cursor..round.sort_cursor + steps {
            let player = players.get_unchecked(index);
            // Unrevealed players take no slot in the sorted view.
            let Some(value) = commitment::revealed_value(&self.env, self.round_id, &player) else {
                continue;
            };
            insert_sorted(&mut sorted, RankedValue { player, value });
        }

        round.sort_cursor += steps;
        if round.sort_complete() {
            round.median = median_of(&sorted);
        }
        storage::set_persistent(&self.env, DataKey::Sorted(self.round_id), &sorted);
        steps
    }
}

/// Insert after any equal values so ties keep commitment order.
fn insert_sorted(sorted: &mut Vec<RankedValue>, entry: RankedValue) {
    let mut position = sorted.len();
    while position > 0 && sorted.get_unchecked(position - 1).value > entry.value {
        position -= 1;
    }
    sorted.insert(position, entry);
}

pub fn sorted_entries(env: &Env, round_id: u64) -> Vec<RankedValue> {
    storage::load_vec(env, &DataKey::Sorted(round_id))
}

pub fn sorted_values(env: &Env, round_id: u64) -> Vec<u64> {
    let mut values = Vec::new(env);
    for entry in sorted_entries(env, round_id).iter() {
        values.push_back(entry.value);
    }
    values
}
