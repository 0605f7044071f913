//! Engine Events for DSC
//!
//! Events are appended when an operation commits and can be indexed
//! off-chain. Aborted operations never leave an event behind.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::types::{borsh_u256, Address, Amount};

/// Event types for indexing and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[borsh(use_discriminant = true)]
#[repr(u8)]
pub enum EventType {
    // Collateral Events (0x01 - 0x1F)
    CollateralDeposited = 0x01,
    CollateralRedeemed = 0x02,

    // Debt Events (0x20 - 0x3F)
    DscMinted = 0x20,
    DscBurned = 0x21,

    // Liquidation Events (0x40 - 0x5F)
    Liquidated = 0x40,
}

/// Main event enum containing all engine events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum DscEvent {
    /// Emitted when collateral is pulled from a user into the engine
    CollateralDeposited {
        user: Address,
        token: Address,
        #[borsh(serialize_with = "borsh_u256::serialize", deserialize_with = "borsh_u256::deserialize")]
        amount: Amount,
        nonce: u64,
    },

    /// Emitted when collateral leaves a user's record, either to the user
    /// or to a liquidator
    CollateralRedeemed {
        redeemed_from: Address,
        redeemed_to: Address,
        token: Address,
        #[borsh(serialize_with = "borsh_u256::serialize", deserialize_with = "borsh_u256::deserialize")]
        amount: Amount,
        nonce: u64,
    },

    /// Emitted when DSC is minted against a user's collateral
    DscMinted {
        user: Address,
        #[borsh(serialize_with = "borsh_u256::serialize", deserialize_with = "borsh_u256::deserialize")]
        amount: Amount,
        nonce: u64,
    },

    /// Emitted when DSC paid by `dsc_from` is burned against `on_behalf_of`'s debt
    DscBurned {
        on_behalf_of: Address,
        dsc_from: Address,
        #[borsh(serialize_with = "borsh_u256::serialize", deserialize_with = "borsh_u256::deserialize")]
        amount: Amount,
        nonce: u64,
    },

    /// Emitted when a liquidator covers part of a user's debt
    Liquidated {
        liquidator: Address,
        user: Address,
        token: Address,
        #[borsh(serialize_with = "borsh_u256::serialize", deserialize_with = "borsh_u256::deserialize")]
        debt_covered: Amount,
        #[borsh(serialize_with = "borsh_u256::serialize", deserialize_with = "borsh_u256::deserialize")]
        collateral_seized: Amount,
        #[borsh(serialize_with = "borsh_u256::serialize", deserialize_with = "borsh_u256::deserialize")]
        bonus_collateral: Amount,
        nonce: u64,
    },
}

impl DscEvent {
    /// Get the event type for filtering
    pub fn event_type(&self) -> EventType {
        match self {
            Self::CollateralDeposited { .. } => EventType::CollateralDeposited,
            Self::CollateralRedeemed { .. } => EventType::CollateralRedeemed,
            Self::DscMinted { .. } => EventType::DscMinted,
            Self::DscBurned { .. } => EventType::DscBurned,
            Self::Liquidated { .. } => EventType::Liquidated,
        }
    }

    /// Commit counter of the operation that emitted the event
    pub fn nonce(&self) -> u64 {
        match self {
            Self::CollateralDeposited { nonce, .. }
            | Self::CollateralRedeemed { nonce, .. }
            | Self::DscMinted { nonce, .. }
            | Self::DscBurned { nonce, .. }
            | Self::Liquidated { nonce, .. } => *nonce,
        }
    }

    /// Serialize event to bytes for storage/transmission
    pub fn to_bytes(&self) -> Vec<u8> {
        borsh::to_vec(self).unwrap_or_default()
    }

    /// Deserialize event from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        borsh::from_slice(bytes).ok()
    }
}

/// Event log for collecting events across committed operations
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<DscEvent>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Emit an event (add to log)
    pub fn emit(&mut self, event: DscEvent) {
        self.events.push(event);
    }

    /// Append a batch of events in order
    pub fn extend(&mut self, events: impl IntoIterator<Item = DscEvent>) {
        self.events.extend(events);
    }

    /// Get all events
    pub fn events(&self) -> &[DscEvent] {
        &self.events
    }

    /// Take ownership of all events, leaving the log empty
    pub fn take(&mut self) -> Vec<DscEvent> {
        std::mem::take(&mut self.events)
    }

    /// Filter events by type
    pub fn filter_by_type(&self, event_type: EventType) -> Vec<&DscEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Check if any events were emitted
    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// Get number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
