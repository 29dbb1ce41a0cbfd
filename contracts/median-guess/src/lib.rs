//! Stellarcade Median Guess Contract
//!
//! A sealed-bid guessing game played in rounds. Every player commits to a
//! hidden number, reveals it once submissions close, and the players whose
//! numbers sit closest to the median of all revealed numbers win the round.
//!
//! ## Game Flow
//! 1. Admin calls `start_game`; the participation window opens.
//! 2. Players call `set_value(value, key)`. Only `SHA-256(value || key)` is kept.
//! 3. Once the participation window ends, players call `reveal_value` with the
//!    same `(value, key)` during the reveal window.
//! 4. After the reveal window the admin calls `sort_array(budget)` until every
//!    participant has been merged into the sorted view.
//! 5. The admin then calls `find_winner(budget)` until the scan reaches the end
//!    of the sorted view. The round is frozen and the next round id opens.
//!
//! ## Chunked Work
//! Sorting and the winner scan may not fit into a single transaction budget.
//! Both keep a cursor on the round record and advance it by at most `budget`
//! elements per call (`0` means "everything that is left"), so the result is
//! the same however the work is split up.
//!
//! ## Storage Strategy
//! - `instance()` storage: admin, durations, minimum players, current round id.
//! - `persistent()` storage: per-round records, participant lists, commitments,
//!   the sorted view and the winner set, each with its own TTL.
#![no_std]
#![allow(unexpected_cfgs)]

mod commitment;
mod finder;
mod gate;
mod round;
mod sorter;
mod storage;

use soroban_sdk::{
    contract, contracterror, contractevent, contractimpl, Address, Bytes, BytesN, Env, Vec,
};
use stellarcade_shared::{ErrorKind, LedgerClock, Sha256Commitment};

pub use commitment::Participant;
pub use gate::{AccessGate, StoredAdmin};
pub use round::{Phase, RoundData, RoundManager};
pub use sorter::RankedValue;
pub use storage::Config;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Length of the participation window, in seconds, until the admin changes it.
pub const DEFAULT_PARTICIPATION_TIME: u64 = 180;
/// Length of the reveal window, in seconds, until the admin changes it.
pub const DEFAULT_REVEAL_TIME: u64 = 100;
/// Lowest accepted value for the minimum player count.
pub const MIN_PLAYERS_FLOOR: u32 = 20;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    AlreadyInitialized   = 1,
    NotInitialized       = 2,
    NotAuthorized        = 3,
    TooFewMinimumPlayers = 4,
    GameAlreadyStarted   = 5,
    GameNotActive        = 6,
    EmptyKey             = 7,
    ValueAlreadySet      = 8,
    RevealNotOpen        = 9,
    CommitmentMismatch   = 10,
    AlreadyRevealed      = 11,
    ValueNotRevealed     = 12,
    GameStillActive      = 13,
    NotEnoughPlayers     = 14,
    MedianUnavailable    = 15,
    Overflow             = 16,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotAuthorized => ErrorKind::Authorization,
            Error::TooFewMinimumPlayers
            | Error::EmptyKey
            | Error::NotEnoughPlayers
            | Error::Overflow => ErrorKind::Validation,
            Error::ValueAlreadySet | Error::CommitmentMismatch | Error::AlreadyRevealed => {
                ErrorKind::Integrity
            }
            Error::AlreadyInitialized
            | Error::NotInitialized
            | Error::GameAlreadyStarted
            | Error::GameNotActive
            | Error::RevealNotOpen
            | Error::ValueNotRevealed
            | Error::GameStillActive
            | Error::MedianUnavailable => ErrorKind::State,
        }
    }

    /// Human-readable reason surfaced to players and operators.
    pub fn message(&self) -> &'static str {
        match self {
            Error::AlreadyInitialized => "Contract is already initialized",
            Error::NotInitialized => "Contract is not initialized",
            Error::NotAuthorized => "Caller is not the admin",
            Error::TooFewMinimumPlayers => "Must be at least 20 players",
            Error::GameAlreadyStarted => "Game has already started",
            Error::GameNotActive => "Game is not active",
            Error::EmptyKey => "Setup private key first",
            Error::ValueAlreadySet => "You can't change the value",
            Error::RevealNotOpen => "You can't reveal value now",
            Error::CommitmentMismatch => "Private key or value is incorrect",
            Error::AlreadyRevealed => "Value already revealed",
            Error::ValueNotRevealed => "Value is not revealed",
            Error::GameStillActive => "Game is still active",
            Error::NotEnoughPlayers => "Must be more players to end the game",
            Error::MedianUnavailable => "Median is not available",
            Error::Overflow => "Arithmetic overflow",
        }
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[contractevent]
pub struct Initialized {
    #[topic]
    pub admin: Address,
    pub participation_time: u64,
    pub reveal_time: u64,
    pub minimum_players: u32,
}

#[contractevent]
pub struct ParticipationTimeSet {
    pub duration: u64,
}

#[contractevent]
pub struct RevealTimeSet {
    pub duration: u64,
}

#[contractevent]
pub struct MinimumPlayersSet {
    pub minimum_players: u32,
}

#[contractevent]
pub struct GameStarted {
    #[topic]
    pub round_id: u64,
    pub start_time: u64,
}

#[contractevent]
pub struct ValueCommitted {
    #[topic]
    pub round_id: u64,
    #[topic]
    pub player: Address,
    pub commitment: BytesN<32>,
}

#[contractevent]
pub struct ValueRevealed {
    #[topic]
    pub round_id: u64,
    #[topic]
    pub player: Address,
    pub value: u64,
}

#[contractevent]
pub struct SortAdvanced {
    #[topic]
    pub round_id: u64,
    pub sort_cursor: u32,
    pub participant_count: u32,
}

#[contractevent]
pub struct WinnerScanAdvanced {
    #[topic]
    pub round_id: u64,
    pub find_cursor: u32,
    pub sorted_len: u32,
}

#[contractevent]
pub struct RoundFinalized {
    #[topic]
    pub round_id: u64,
    pub winner_count: u32,
    pub next_round_id: u64,
}

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

#[contract]
pub struct MedianGuess;

#[contractimpl]
impl MedianGuess {
    /// Initialize the game with an admin and the default round configuration.
    /// Round 0 is opened immediately but not started.
    pub fn init(env: Env, admin: Address) -> Result<(), Error> {
        if storage::is_initialized(&env) {
            return Err(Error::AlreadyInitialized);
        }
        admin.require_auth();

        storage::initialize(&env, &admin);

        Initialized {
            admin,
            participation_time: DEFAULT_PARTICIPATION_TIME,
            reveal_time: DEFAULT_REVEAL_TIME,
            minimum_players: MIN_PLAYERS_FLOOR,
        }
        .publish(&env);

        Ok(())
    }

    // -----------------------------------------------------------------------
    // Admin configuration
    // -----------------------------------------------------------------------

    /// Set the participation window length in seconds. Admin only.
    pub fn set_participation_time(env: Env, admin: Address, duration: u64) -> Result<(), Error> {
        manager(&env).set_participation_time(&admin, duration)
    }

    /// Set the reveal window length in seconds. Admin only.
    pub fn set_reveal_time(env: Env, admin: Address, duration: u64) -> Result<(), Error> {
        manager(&env).set_reveal_time(&admin, duration)
    }

    /// Set the number of participants required to close a round. Admin only.
    /// Values below `MIN_PLAYERS_FLOOR` are rejected.
    pub fn set_minimum_players(env: Env, admin: Address, minimum_players: u32) -> Result<(), Error> {
        manager(&env).set_minimum_players(&admin, minimum_players)
    }

    // -----------------------------------------------------------------------
    // Round lifecycle
    // -----------------------------------------------------------------------

    /// Start the clock on the current round. Admin only.
    pub fn start_game(env: Env, admin: Address) -> Result<u64, Error> {
        manager(&env).start_game(&admin)
    }

    /// Commit to `value` under `key`. Allowed once per player per round,
    /// while the participation window is open.
    pub fn set_value(env: Env, player: Address, value: u64, key: Bytes) -> Result<(), Error> {
        player.require_auth();
        manager(&env).set_value(&player, value, &key)
    }

    /// Open a previous commitment during the reveal window.
    pub fn reveal_value(env: Env, player: Address, value: u64, key: Bytes) -> Result<(), Error> {
        player.require_auth();
        manager(&env).reveal_value(&player, value, &key)
    }

    /// Merge up to `step_budget` participants into the sorted view (`0` = all
    /// remaining). Admin only. Returns the sort cursor after the call.
    pub fn sort_array(env: Env, admin: Address, step_budget: u32) -> Result<u32, Error> {
        manager(&env).sort_array(&admin, step_budget)
    }

    /// Scan up to `step_budget` sorted positions for winners (`0` = all
    /// remaining). Admin only. Returns `true` when the call finalized the round.
    /// Once a round is finalized, further calls address the next round and
    /// fail with `GameStillActive` until it has been played and sorted.
    pub fn find_winner(env: Env, admin: Address, step_budget: u32) -> Result<bool, Error> {
        manager(&env).find_winner(&admin, step_budget)
    }

    // -----------------------------------------------------------------------
    // View functions
    // -----------------------------------------------------------------------

    /// Current round id.
    pub fn id(env: Env) -> u64 {
        storage::current_round_id(&env)
    }

    pub fn participation_time(env: Env) -> u64 {
        storage::config(&env).participation_time
    }

    pub fn reveal_time(env: Env) -> u64 {
        storage::config(&env).reveal_time
    }

    pub fn minimum_players(env: Env) -> u32 {
        storage::config(&env).minimum_players
    }

    /// Phase of the current round at the current ledger time.
    pub fn get_phase(env: Env) -> Result<Phase, Error> {
        manager(&env).phase()
    }

    /// Start time of a round, or 0 if it has not been started.
    pub fn get_start_time(env: Env, round_id: u64) -> u64 {
        storage::load_round(&env, round_id)
            .and_then(|round| round.start_time)
            .unwrap_or(0)
    }

    /// Round record, or `None` for an id that was never opened.
    pub fn get_round(env: Env, round_id: u64) -> Option<RoundData> {
        storage::load_round(&env, round_id)
    }

    /// Participants of a round in commitment order.
    pub fn get_participants(env: Env, round_id: u64) -> Vec<Address> {
        commitment::participants(&env, round_id)
    }

    pub fn has_committed(env: Env, player: Address, round_id: u64) -> bool {
        commitment::load(&env, round_id, &player).is_some()
    }

    pub fn get_commitment(env: Env, player: Address, round_id: u64) -> Option<BytesN<32>> {
        commitment::load(&env, round_id, &player).map(|p| p.commitment)
    }

    /// Revealed value of `player` in `round_id`. Readable by anyone.
    pub fn get_user_data(env: Env, player: Address, round_id: u64) -> Result<u64, Error> {
        commitment::revealed_value(&env, round_id, &player).ok_or(Error::ValueNotRevealed)
    }

    /// Revealed values of a round in ascending order, as far as sorting got.
    pub fn get_array(env: Env, round_id: u64) -> Vec<u64> {
        sorter::sorted_values(&env, round_id)
    }

    pub fn get_median(env: Env, round_id: u64) -> Result<u64, Error> {
        finder::median(&env, round_id)
    }

    /// Winners of a finalized round. Empty until the round is finalized.
    pub fn get_winner(env: Env, round_id: u64) -> Vec<Address> {
        finder::winners(&env, round_id)
    }
}

fn manager(env: &Env) -> RoundManager<StoredAdmin, LedgerClock, Sha256Commitment> {
    RoundManager::new(env, StoredAdmin, LedgerClock::new(env), Sha256Commitment)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
