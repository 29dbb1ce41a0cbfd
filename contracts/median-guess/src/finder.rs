//! Median and the resumable scan for the players closest to it.

use soroban_sdk::{Address, Env, Vec};

use crate::round::RoundData;
use crate::sorter::{effective_steps, sorted_entries, RankedValue};
use crate::storage::{self, DataKey};
use crate::Error;

/// Middle element, or the floor of the mean of the two middle elements.
pub fn median_of(sorted: &Vec<RankedValue>) -> Option<u64> {
    let len = sorted.len();
    if len == 0 {
        return None;
    }

    let mid = len / 2;
    let upper = sorted.get_unchecked(mid).value;
    if len % 2 == 1 {
        return Some(upper);
    }
    let lower = sorted.get_unchecked(mid - 1).value;
    Some(lower + (upper - lower) / 2)
}

pub(crate) struct ScanProgress {
    pub sorted_len: u32,
    pub complete:   bool,
}

pub(crate) struct WinnerFinder {
    env:      Env,
    round_id: u64,
}

impl WinnerFinder {
    pub fn new(env: &Env, round_id: u64) -> Self {
        Self {
            env: env.clone(),
            round_id,
        }
    }

    /// Scan up to `budget` sorted positions from `round.find_cursor`, measuring
    /// against the median cached when the sort completed.
    ///
    /// A strictly closer value replaces the working winner set; an equally
    /// close one joins it. The scan is complete once the cursor reaches the
    /// end of the sorted view.
    pub fn advance(&self, round: &mut RoundData, budget: u32) -> ScanProgress {
        let sorted = sorted_entries(&self.env, self.round_id);
        let sorted_len = sorted.len();
        let remaining = sorted_len.saturating_sub(round.find_cursor);
        let steps = effective_steps(budget, remaining);

        // No median means nothing was revealed, so there is nothing to scan.
        if let (Some(median), true) = (round.median, steps > 0) {
            let key = DataKey::Winners(self.round_id);
            let mut winners: Vec<Address> = storage::load_vec(&self.env, &key);

            for index in round.find_cursor..round.find_cursor + steps {
                let entry = sorted.get_unchecked(index);
                let distance = entry.value.abs_diff(median);
                match round.best_distance {
                    Some(best) if distance > best => {}
                    Some(best) if distance == best => winners.push_back(entry.player),
                    _ => {
                        winners = Vec::new(&self.env);
                        winners.push_back(entry.player);
                        round.best_distance = Some(distance);
                    }
                }
            }

            storage::set_persistent(&self.env, key, &winners);
        }

        round.find_cursor += steps;
        ScanProgress {
            sorted_len,
            complete: round.find_cursor == sorted_len,
        }
    }
}

/// Median of a round once its sort has completed.
pub fn median(env: &Env, round_id: u64) -> Result<u64, Error> {
    match storage::load_round(env, round_id) {
        Some(round) if round.sort_complete() => round.median.ok_or(Error::MedianUnavailable),
        _ => Err(Error::MedianUnavailable),
    }
}

/// Winner set of a finalized round; empty while the round is still open.
pub fn winners(env: &Env, round_id: u64) -> Vec<Address> {
    match storage::load_round(env, round_id) {
        Some(round) if round.finalized => storage::load_vec(env, &DataKey::Winners(round_id)),
        _ => Vec::new(env),
    }
}
