//! Model state: participant balances plus a bounded escrow table

use arrayvec::ArrayVec;

/// Participants are addressed by index
pub type Participant = u8;

pub const MAX_PARTICIPANTS: usize = 4;
/// One slot per ordered (initializer, receiver) pair
pub const MAX_ESCROWS: usize = MAX_PARTICIPANTS * MAX_PARTICIPANTS;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Escrow {
    pub initializer: Participant,
    pub receiver: Participant,
    pub amount: u64,
    pub is_released: bool,
    /// Actual custody, rent included
    pub balance: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Params {
    /// Rent-exempt minimum of an escrow account
    pub rent: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct State {
    pub balances: ArrayVec<u64, MAX_PARTICIPANTS>,
    pub escrows: ArrayVec<Escrow, MAX_ESCROWS>,
    pub params: Params,
}

impl Default for Params {
    fn default() -> Self {
        // 82-byte account under the default rent schedule
        Self { rent: 1_461_600 }
    }
}

impl Default for State {
    fn default() -> Self {
        Self {
            balances: ArrayVec::new(),
            escrows: ArrayVec::new(),
            params: Params::default(),
        }
    }
}

impl State {
    /// State with the given participant balances (extra entries are dropped)
    pub fn with_balances(balances: &[u64], params: Params) -> Self {
        let mut s = Self {
            params,
            ..Self::default()
        };
        for &b in balances.iter().take(MAX_PARTICIPANTS) {
            s.balances.push(b);
        }
        s
    }

    pub fn balance(&self, who: Participant) -> u64 {
        self.balances.get(who as usize).copied().unwrap_or(0)
    }

    pub fn find(&self, initializer: Participant, receiver: Participant) -> Option<usize> {
        self.escrows
            .iter()
            .position(|e| e.initializer == initializer && e.receiver == receiver)
    }

    pub fn escrow(&self, initializer: Participant, receiver: Participant) -> Option<&Escrow> {
        self.find(initializer, receiver).map(|i| &self.escrows[i])
    }
}

impl Escrow {
    /// Custody covers rent plus the declared amount
    pub fn is_funded(&self, rent: u64) -> bool {
        self.balance >= rent.saturating_add(self.amount)
    }
}
