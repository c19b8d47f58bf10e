//! Simulator configuration

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::Path;

/// Lamports each scenario amount moves: 2 SOL
pub const DEFAULT_AMOUNT: u64 = 2_000_000_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Escrow program ID (base58)
    pub program_id: String,

    /// Flat fee charged to the first signer of each transaction
    pub transaction_fee: u64,

    pub rent: RentConfig,

    pub participants: Vec<ParticipantConfig>,

    pub steps: Vec<StepConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentConfig {
    pub lamports_per_byte_year: u64,
    pub exemption_threshold: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantConfig {
    /// Up to 32 bytes; also the account key, zero padded
    pub name: String,
    pub lamports: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Initialize,
    Deposit,
    Release,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepConfig {
    pub op: Operation,

    /// Participant signing and paying the fee
    pub signer: String,

    /// Escrow terms; select the escrow address
    pub initializer: String,
    pub receiver: String,

    /// Receiver account handed to release/cancel when it differs from the terms
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplied_receiver: Option<String>,

    /// Required for initialize
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<u64>,

    /// Expected error name; absent means the step must succeed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expect: Option<String>,
}

impl StepConfig {
    fn new(op: Operation, signer: &str, initializer: &str, receiver: &str) -> Self {
        Self {
            op,
            signer: signer.to_string(),
            initializer: initializer.to_string(),
            receiver: receiver.to_string(),
            supplied_receiver: None,
            amount: None,
            expect: None,
        }
    }

    fn amount(mut self, amount: u64) -> Self {
        self.amount = Some(amount);
        self
    }

    fn expect(mut self, error: &str) -> Self {
        self.expect = Some(error.to_string());
        self
    }
}

impl Config {
    /// Load configuration from `$ESCROW_SIM_CONFIG` (default `escrow-sim.toml`).
    /// Returns `None` when the file does not exist.
    pub fn load() -> Result<Option<Self>> {
        let config_path = std::env::var("ESCROW_SIM_CONFIG")
            .unwrap_or_else(|_| "escrow-sim.toml".to_string());

        Self::load_from(Path::new(&config_path))
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>> {
        let config_str = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e)
                    .context(format!("Failed to read config file: {}", path.display()))
            }
        };

        let config: Config = toml::from_str(&config_str)
            .context(format!("Failed to parse config TOML: {}", path.display()))?;

        Ok(Some(config))
    }

    /// Built-in scenario: initialize, fund, release, replay and attack paths
    pub fn default_scenario() -> Self {
        use Operation::*;

        let participants = [
            ("alice", 10_000_000_000),
            ("bob", 0),
            ("bob2", 0),
            ("bob3", 0),
            ("bob4", 0),
            ("mallory", 10_000_000_000),
        ]
        .into_iter()
        .map(|(name, lamports)| ParticipantConfig {
            name: name.to_string(),
            lamports,
        })
        .collect();

        let steps = vec![
            // Funded escrow, released once
            StepConfig::new(Initialize, "alice", "alice", "bob").amount(DEFAULT_AMOUNT),
            StepConfig::new(Deposit, "alice", "alice", "bob"),
            StepConfig::new(Release, "alice", "alice", "bob"),
            StepConfig::new(Release, "alice", "alice", "bob").expect("AlreadyReleased"),
            // Attacker cannot release
            StepConfig::new(Initialize, "alice", "alice", "bob2").amount(DEFAULT_AMOUNT),
            StepConfig::new(Deposit, "alice", "alice", "bob2"),
            StepConfig::new(Release, "mallory", "alice", "bob2").expect("Unauthorized"),
            // Attacker cannot cancel; initializer can
            StepConfig::new(Initialize, "alice", "alice", "bob3").amount(DEFAULT_AMOUNT),
            StepConfig::new(Deposit, "alice", "alice", "bob3"),
            StepConfig::new(Cancel, "mallory", "alice", "bob3").expect("Unauthorized"),
            StepConfig::new(Cancel, "alice", "alice", "bob3"),
            // Released escrow cannot be cancelled
            StepConfig::new(Initialize, "alice", "alice", "bob4").amount(DEFAULT_AMOUNT),
            StepConfig::new(Deposit, "alice", "alice", "bob4"),
            StepConfig::new(Release, "alice", "alice", "bob4"),
            StepConfig::new(Cancel, "alice", "alice", "bob4").expect("AlreadyReleased"),
        ];

        Self {
            program_id: bs58::encode(escrow_program::ID).into_string(),
            transaction_fee: 5_000,
            rent: RentConfig {
                lamports_per_byte_year: 3_480,
                exemption_threshold: 2,
            },
            participants,
            steps,
        }
    }

    /// Write default config to file
    pub fn write_default(path: &str) -> Result<()> {
        let config = Self::default_scenario();
        let toml_str = toml::to_string_pretty(&config)
            .context("Failed to serialize config")?;

        std::fs::write(path, toml_str)
            .context(format!("Failed to write config to {}", path))?;

        log::info!("Created default config at {}", path);
        Ok(())
    }
}
