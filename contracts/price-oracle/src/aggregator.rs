//! Mock Aggregator
//!
//! In-memory price feed with Chainlink-style rounds. Every answer update opens
//! a new round; readers always see the latest one. Used by tests and local
//! deployments in place of a live feed.

use borsh::{BorshDeserialize, BorshSerialize};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use dsc_common::{
    interfaces::PriceFeed,
    types::{Address, PriceReading},
};

// ============ Round Data ============

/// One recorded round of a feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct RoundData {
    /// Monotonic round identifier, starting at 1
    pub round_id: u64,
    /// Signed answer in the feed's decimals
    pub answer: i128,
    /// Round in which the answer was computed
    pub answered_in_round: u64,
}

#[derive(Debug)]
struct AggregatorState {
    rounds: Vec<RoundData>,
    is_valid: bool,
}

impl AggregatorState {
    fn latest(&self) -> RoundData {
        // rounds is never empty; seeded in MockAggregator::new
        self.rounds[self.rounds.len() - 1]
    }
}

// ============ Aggregator ============

/// Settable price feed
#[derive(Debug)]
pub struct MockAggregator {
    address: Address,
    decimals: u8,
    state: Mutex<AggregatorState>,
}

impl MockAggregator {
    /// Create a feed whose first round carries `initial_answer`
    pub fn new(address: Address, decimals: u8, initial_answer: i128) -> Self {
        let first = RoundData {
            round_id: 1,
            answer: initial_answer,
            answered_in_round: 1,
        };
        Self {
            address,
            decimals,
            state: Mutex::new(AggregatorState {
                rounds: vec![first],
                is_valid: true,
            }),
        }
    }

    /// Decimal precision of answers
    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    /// Publish a new answer as the next round
    pub fn update_answer(&self, answer: i128) {
        let mut state = self.state.lock();
        let round_id = state.latest().round_id + 1;
        state.rounds.push(RoundData {
            round_id,
            answer,
            answered_in_round: round_id,
        });
        tracing::trace!(round_id, answer, "aggregator answer updated");
    }

    /// Latest answer
    pub fn latest_answer(&self) -> i128 {
        self.state.lock().latest().answer
    }

    /// Latest round
    pub fn latest_round_data(&self) -> RoundData {
        self.state.lock().latest()
    }

    /// A past round, if it exists
    pub fn get_round_data(&self, round_id: u64) -> Option<RoundData> {
        let state = self.state.lock();
        round_id
            .checked_sub(1)
            .and_then(|index| state.rounds.get(index as usize))
            .copied()
    }

    /// Flag the feed as usable or not (e.g. stale heartbeat)
    pub fn set_valid(&self, is_valid: bool) {
        self.state.lock().is_valid = is_valid;
    }
}

impl PriceFeed for MockAggregator {
    fn address(&self) -> Address {
        self.address
    }

    fn latest_price(&self) -> PriceReading {
        let state = self.state.lock();
        PriceReading {
            answer: state.latest().answer,
            decimals: self.decimals,
            is_valid: state.is_valid,
        }
    }
}
