//! Scenario runner over the in-memory ledger

use crate::config::{Config, Operation, StepConfig};
use escrow_program::ledger::memory::{MemoryLedger, RentSchedule};
use escrow_program::{derive_escrow_address, EscrowError, EscrowInstruction};
use pinocchio::program_error::ProgramError;
use pinocchio::pubkey::Pubkey;
use std::collections::BTreeMap;
use thiserror::Error;

/// Outcome label for a successful step
pub const OK: &str = "ok";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimError {
    #[error("invalid program id {0:?}")]
    InvalidProgramId(String),

    #[error("invalid participant name {0:?} (1..=32 bytes)")]
    InvalidParticipant(String),

    #[error("duplicate participant {0:?}")]
    DuplicateParticipant(String),

    #[error("step {step}: unknown participant {name:?}")]
    UnknownParticipant { step: usize, name: String },

    #[error("step {step}: initialize requires an amount")]
    MissingAmount { step: usize },

    #[error("step {step}: expected {expected}, got {actual}")]
    Mismatch {
        step: usize,
        expected: String,
        actual: String,
    },
}

/// Error name as written in `expect`
pub fn outcome_name(result: &Result<(), ProgramError>) -> String {
    match result {
        Ok(()) => OK.to_string(),
        Err(err) => match EscrowError::from_program_error(err) {
            Some(escrow) => format!("{:?}", escrow),
            None => format!("{:?}", err),
        },
    }
}

fn participant_key(name: &str) -> Result<Pubkey, SimError> {
    let bytes = name.as_bytes();
    if bytes.is_empty() || bytes.len() > 32 {
        return Err(SimError::InvalidParticipant(name.to_string()));
    }
    let mut key = [0u8; 32];
    key[..bytes.len()].copy_from_slice(bytes);
    Ok(key)
}

fn parse_program_id(text: &str) -> Result<Pubkey, SimError> {
    bs58::decode(text)
        .into_vec()
        .ok()
        .and_then(|bytes| Pubkey::try_from(bytes.as_slice()).ok())
        .ok_or_else(|| SimError::InvalidProgramId(text.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub index: usize,
    pub op: Operation,
    pub outcome: String,
}

pub struct Simulator {
    ledger: MemoryLedger,
    program_id: Pubkey,
    participants: BTreeMap<String, Pubkey>,
}

impl Simulator {
    pub fn new(config: &Config) -> Result<Self, SimError> {
        let program_id = parse_program_id(&config.program_id)?;
        let rent = RentSchedule {
            lamports_per_byte_year: config.rent.lamports_per_byte_year,
            exemption_threshold_years: config.rent.exemption_threshold,
        };
        let mut ledger = MemoryLedger::new(program_id)
            .with_rent(rent)
            .with_transaction_fee(config.transaction_fee);

        let mut participants = BTreeMap::new();
        for p in &config.participants {
            let key = participant_key(&p.name)?;
            if participants.insert(p.name.clone(), key).is_some() {
                return Err(SimError::DuplicateParticipant(p.name.clone()));
            }
            ledger.airdrop(key, p.lamports);
        }

        Ok(Self {
            ledger,
            program_id,
            participants,
        })
    }

    fn key(&self, step: usize, name: &str) -> Result<Pubkey, SimError> {
        self.participants
            .get(name)
            .copied()
            .ok_or_else(|| SimError::UnknownParticipant {
                step,
                name: name.to_string(),
            })
    }

    pub fn balance(&self, name: &str) -> Option<u64> {
        self.participants.get(name).map(|key| self.ledger.lamports(key))
    }

    /// Balance held by the escrow for (initializer, receiver); 0 when absent
    pub fn escrow_balance(&self, initializer: &str, receiver: &str) -> Option<u64> {
        let initializer = self.participants.get(initializer)?;
        let receiver = self.participants.get(receiver)?;
        let (escrow, _) = derive_escrow_address(initializer, receiver, &self.program_id);
        Some(self.ledger.lamports(&escrow))
    }

    pub fn ledger(&self) -> &MemoryLedger {
        &self.ledger
    }

    /// Execute one step and return its outcome label
    pub fn execute(&mut self, index: usize, step: &StepConfig) -> Result<String, SimError> {
        let signer = self.key(index, &step.signer)?;
        let initializer = self.key(index, &step.initializer)?;
        let receiver = self.key(index, &step.receiver)?;
        let supplied = match &step.supplied_receiver {
            Some(name) => self.key(index, name)?,
            None => receiver,
        };
        let (escrow, _) = derive_escrow_address(&initializer, &receiver, &self.program_id);
        let system = pinocchio_system::ID;

        let (data, accounts) = match step.op {
            Operation::Initialize => {
                let amount = step.amount.ok_or(SimError::MissingAmount { step: index })?;
                (
                    EscrowInstruction::InitializeEscrow { amount }.pack(),
                    vec![initializer, supplied, escrow, system],
                )
            }
            Operation::Deposit => (
                EscrowInstruction::DepositEscrow.pack(),
                vec![initializer, escrow, system],
            ),
            Operation::Release => (
                EscrowInstruction::ReleaseEscrow.pack(),
                vec![signer, supplied, escrow, system],
            ),
            Operation::Cancel => (
                EscrowInstruction::CancelEscrow.pack(),
                vec![signer, supplied, escrow, system],
            ),
        };

        let result = self.ledger.process_transaction(&[signer], &data, &accounts);
        Ok(outcome_name(&result))
    }

    /// Run every step, stopping at the first unexpected outcome
    pub fn run(&mut self, steps: &[StepConfig]) -> Result<Vec<StepReport>, SimError> {
        let mut reports = Vec::with_capacity(steps.len());
        for (index, step) in steps.iter().enumerate() {
            let outcome = self.execute(index, step)?;
            let expected = step.expect.as_deref().unwrap_or(OK);

            log::info!(
                "step {}: {:?} signer={} {}->{} => {}",
                index,
                step.op,
                step.signer,
                step.initializer,
                step.receiver,
                outcome
            );

            if outcome != expected {
                return Err(SimError::Mismatch {
                    step: index,
                    expected: expected.to_string(),
                    actual: outcome,
                });
            }
            reports.push(StepReport {
                index,
                op: step.op,
                outcome,
            });
        }
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ParticipantConfig, DEFAULT_AMOUNT};

    #[test]
    fn test_default_scenario_passes() {
        let config = Config::default_scenario();
        let mut sim = Simulator::new(&config).unwrap();
        let reports = sim.run(&config.steps).unwrap();
        assert_eq!(reports.len(), config.steps.len());

        // bob and bob4 were paid, bob2 and bob3 were not
        assert_eq!(sim.balance("bob"), Some(DEFAULT_AMOUNT));
        assert_eq!(sim.balance("bob2"), Some(0));
        assert_eq!(sim.balance("bob3"), Some(0));
        assert_eq!(sim.balance("bob4"), Some(DEFAULT_AMOUNT));
        assert_eq!(sim.escrow_balance("alice", "bob3"), Some(0));
        assert_eq!(sim.escrow_balance("alice", "bob2"), Some(1_461_600 + DEFAULT_AMOUNT));
    }

    #[test]
    fn test_mismatch_stops_run() {
        let mut config = Config::default_scenario();
        config.steps[3].expect = None;
        let mut sim = Simulator::new(&config).unwrap();
        assert_eq!(
            sim.run(&config.steps),
            Err(SimError::Mismatch {
                step: 3,
                expected: OK.to_string(),
                actual: "AlreadyReleased".to_string(),
            })
        );
    }

    #[test]
    fn test_supplied_receiver_mismatch() {
        let mut config = Config::default_scenario();
        config.steps.truncate(2);
        let mut wrong = config.steps[1].clone();
        wrong.op = Operation::Release;
        wrong.supplied_receiver = Some("mallory".to_string());
        wrong.expect = Some("AddressMismatch".to_string());
        config.steps.push(wrong);

        let mut sim = Simulator::new(&config).unwrap();
        sim.run(&config.steps).unwrap();
        assert_eq!(sim.balance("mallory"), Some(10_000_000_000));
    }

    #[test]
    fn test_config_errors() {
        let mut config = Config::default_scenario();
        config.program_id = "not base58 0OIl".to_string();
        assert!(matches!(
            Simulator::new(&config),
            Err(SimError::InvalidProgramId(_))
        ));

        let mut config = Config::default_scenario();
        config.participants.push(ParticipantConfig {
            name: "alice".to_string(),
            lamports: 1,
        });
        assert!(matches!(
            Simulator::new(&config),
            Err(SimError::DuplicateParticipant(_))
        ));

        let mut config = Config::default_scenario();
        config.steps[0].signer = "nobody".to_string();
        let mut sim = Simulator::new(&config).unwrap();
        assert!(matches!(
            sim.run(&config.steps),
            Err(SimError::UnknownParticipant { step: 0, .. })
        ));

        let mut config = Config::default_scenario();
        config.steps[0].amount = None;
        let mut sim = Simulator::new(&config).unwrap();
        assert_eq!(sim.run(&config.steps), Err(SimError::MissingAmount { step: 0 }));
    }

    #[test]
    fn test_outcome_names() {
        assert_eq!(outcome_name(&Ok(())), "ok");
        assert_eq!(outcome_name(&Err(EscrowError::NotFound.into())), "NotFound");
        assert_eq!(
            outcome_name(&Err(ProgramError::InvalidInstructionData)),
            "InvalidInstructionData"
        );
    }
}
