//! Round lifecycle.
//!
//! A round moves `NotStarted → Active → RevealWindow → Closed → Finalized`.
//! Only the start time and the finalized flag are stored; the timed phases are
//! derived from the clock on every call, using the configuration in force at
//! that moment. Once sorting has consumed a participant the round stays
//! `Closed` whatever the durations are changed to.

use soroban_sdk::{contracttype, Address, Bytes, Env};
use stellarcade_shared::{Clock, CommitmentScheme};

use crate::commitment::CommitmentStore;
use crate::finder::WinnerFinder;
use crate::gate::AccessGate;
use crate::sorter::IncrementalSorter;
use crate::storage::{self, Config, DataKey};
use crate::{
    Error, GameStarted, MinimumPlayersSet, ParticipationTimeSet, RevealTimeSet, RoundFinalized,
    SortAdvanced, WinnerScanAdvanced, MIN_PLAYERS_FLOOR,
};

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase {
    NotStarted   = 0,
    Active       = 1,
    RevealWindow = 2,
    Closed       = 3,
    Finalized    = 4,
}

/// Per-round record. Progress cursors only move forward within a round.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoundData {
    pub id:                u64,
    /// `None` until the admin starts the round.
    pub start_time:        Option<u64>,
    pub participant_count: u32,
    /// Participants already merged into the sorted view.
    pub sort_cursor:       u32,
    /// Cached on the first winner scan.
    pub median:            Option<u64>,
    /// Sorted positions already scanned for winners.
    pub find_cursor:       u32,
    pub best_distance:     Option<u64>,
    pub finalized:         bool,
}

impl RoundData {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            start_time: None,
            participant_count: 0,
            sort_cursor: 0,
            median: None,
            find_cursor: 0,
            best_distance: None,
            finalized: false,
        }
    }

    pub fn phase(&self, now: u64, config: &Config) -> Phase {
        if self.finalized {
            return Phase::Finalized;
        }
        let Some(start) = self.start_time else {
            return Phase::NotStarted;
        };
        if self.settlement_started() {
            return Phase::Closed;
        }

        let reveal_opens = start.saturating_add(config.participation_time);
        let reveal_closes = reveal_opens.saturating_add(config.reveal_time);
        if now < reveal_opens {
            Phase::Active
        } else if now < reveal_closes {
            Phase::RevealWindow
        } else {
            Phase::Closed
        }
    }

    /// The participant set is frozen from the first sort step on.
    pub fn settlement_started(&self) -> bool {
        self.sort_cursor > 0
    }

    /// True once every participant has been merged into the sorted view.
    pub fn sort_complete(&self) -> bool {
        self.participant_count > 0 && self.sort_cursor == self.participant_count
    }
}

/// Drives the current round through its phases.
///
/// The admin check, the time source and the commitment hash are injected so
/// the same state machine runs against the ledger in production and against
/// fixed doubles in tests.
pub struct RoundManager<G, C, H> {
    env:    Env,
    gate:   G,
    clock:  C,
    scheme: H,
}

impl<G, C, H> RoundManager<G, C, H>
where
    G: AccessGate,
    C: Clock,
    H: CommitmentScheme,
{
    pub fn new(env: &Env, gate: G, clock: C, scheme: H) -> Self {
        Self {
            env: env.clone(),
            gate,
            clock,
            scheme,
        }
    }

    pub fn current_round(&self) -> Result<RoundData, Error> {
        storage::require_initialized(&self.env)?;
        let round_id = storage::current_round_id(&self.env);
        Ok(storage::load_round(&self.env, round_id).unwrap_or_else(|| RoundData::new(round_id)))
    }

    pub fn phase(&self) -> Result<Phase, Error> {
        let round = self.current_round()?;
        Ok(round.phase(self.clock.now(), &storage::config(&self.env)))
    }

    // -----------------------------------------------------------------------
    // Configuration
    // -----------------------------------------------------------------------

    pub fn set_participation_time(&self, caller: &Address, duration: u64) -> Result<(), Error> {
        self.gate.require_admin(&self.env, caller)?;
        storage::set_participation_time(&self.env, duration);
        ParticipationTimeSet { duration }.publish(&self.env);
        Ok(())
    }

    pub fn set_reveal_time(&self, caller: &Address, duration: u64) -> Result<(), Error> {
        self.gate.require_admin(&self.env, caller)?;
        storage::set_reveal_time(&self.env, duration);
        RevealTimeSet { duration }.publish(&self.env);
        Ok(())
    }

    pub fn set_minimum_players(&self, caller: &Address, minimum_players: u32) -> Result<(), Error> {
        self.gate.require_admin(&self.env, caller)?;
        if minimum_players < MIN_PLAYERS_FLOOR {
            return Err(Error::TooFewMinimumPlayers);
        }
        storage::set_minimum_players(&self.env, minimum_players);
        MinimumPlayersSet { minimum_players }.publish(&self.env);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Participation
    // -----------------------------------------------------------------------

    /// Returns the recorded start time.
    pub fn start_game(&self, caller: &Address) -> Result<u64, Error> {
        self.gate.require_admin(&self.env, caller)?;
        let mut round = self.current_round()?;
        if round.start_time.is_some() {
            return Err(Error::GameAlreadyStarted);
        }

        let now = self.clock.now();
        round.start_time = Some(now);
        storage::save_round(&self.env, &round);

        GameStarted {
            round_id: round.id,
            start_time: now,
        }
        .publish(&self.env);

        Ok(now)
    }

    pub fn set_value(&self, player: &Address, value: u64, key: &Bytes) -> Result<(), Error> {
        let mut round = self.current_round()?;
        let phase = round.phase(self.clock.now(), &storage::config(&self.env));

        CommitmentStore::new(&self.env, round.id).submit(
            &self.scheme,
            &mut round,
            phase,
            player,
            value,
            key,
        )?;
        storage::save_round(&self.env, &round);
        Ok(())
    }

    pub fn reveal_value(&self, player: &Address, value: u64, key: &Bytes) -> Result<(), Error> {
        let round = self.current_round()?;
        let phase = round.phase(self.clock.now(), &storage::config(&self.env));

        CommitmentStore::new(&self.env, round.id).reveal(&self.scheme, phase, player, value, key)
    }

    // -----------------------------------------------------------------------
    // Settlement
    // -----------------------------------------------------------------------

    /// Returns the sort cursor after this call.
    pub fn sort_array(&self, caller: &Address, step_budget: u32) -> Result<u32, Error> {
        self.gate.require_admin(&self.env, caller)?;
        let mut round = self.current_round()?;
        let config = storage::config(&self.env);

        if round.phase(self.clock.now(), &config) != Phase::Closed {
            return Err(Error::GameStillActive);
        }
        if round.participant_count < config.minimum_players {
            return Err(Error::NotEnoughPlayers);
        }

        let steps = IncrementalSorter::new(&self.env, round.id).advance(&mut round, step_budget);
        if steps > 0 {
            storage::save_round(&self.env, &round);
            SortAdvanced {
                round_id: round.id,
                sort_cursor: round.sort_cursor,
                participant_count: round.participant_count,
            }
            .publish(&self.env);
        }

        Ok(round.sort_cursor)
    }

    /// Returns `true` when this call finished the scan and finalized the round.
    ///
    /// Finalizing opens the next round, so calling again afterwards targets
    /// that round and fails with `GameStillActive`; the finalized round is
    /// left as it was.
    pub fn find_winner(&self, caller: &Address, step_budget: u32) -> Result<bool, Error> {
        self.gate.require_admin(&self.env, caller)?;
        let mut round = self.current_round()?;

        if round.phase(self.clock.now(), &storage::config(&self.env)) != Phase::Closed
            || !round.sort_complete()
        {
            return Err(Error::GameStillActive);
        }
        let next_round_id = round.id.checked_add(1).ok_or(Error::Overflow)?;

        let progress = WinnerFinder::new(&self.env, round.id).advance(&mut round, step_budget);

        WinnerScanAdvanced {
            round_id: round.id,
            find_cursor: round.find_cursor,
            sorted_len: progress.sorted_len,
        }
        .publish(&self.env);

        if progress.complete {
            self.finalize(round, next_round_id);
        } else {
            storage::save_round(&self.env, &round);
        }

        Ok(progress.complete)
    }

    /// Freeze `round` and open `next_round_id` with the same configuration.
    fn finalize(&self, mut round: RoundData, next_round_id: u64) {
        round.finalized = true;
        storage::save_round(&self.env, &round);
        storage::save_round(&self.env, &RoundData::new(next_round_id));
        storage::set_current_round_id(&self.env, next_round_id);

        let winners = storage::load_vec::<Address>(&self.env, &DataKey::Winners(round.id));
        RoundFinalized {
            round_id: round.id,
            winner_count: winners.len(),
            next_round_id,
        }
        .publish(&self.env);
    }
}
