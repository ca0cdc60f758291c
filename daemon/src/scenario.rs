//! Scenario files: a named cast of accounts and a list of calls, replayed in
//! order against a fresh chain whose clock only moves on `advance` steps.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use tally_governance::{NewProposal, ProposalId};
use tally_node::{Chain, ChainConfig, ChainError, Receipt};
use tally_nullables::NullClock;
use tally_token::TokenParams;
use tally_types::{Address, Amount, Clock, SystemClock, Timestamp};
use tracing::{debug, info};

fn default_true() -> bool {
    true
}

/// A scenario file.
///
/// ```toml
/// start_time = 1700000000
///
/// [accounts]
/// alice = "0x00000000000000000000000000000000000000a1"
///
/// [[step]]
/// action = "create_token"
/// caller = "alice"
/// label = "com"
/// name = "Community"
/// symbol = "COM"
/// initial_supply = "1000"
/// ```
#[derive(Debug, Deserialize)]
pub struct Scenario {
    /// Unix seconds the clock starts at; wall-clock time when absent.
    #[serde(default)]
    pub start_time: Option<u64>,
    /// Names usable wherever an address is expected.
    #[serde(default)]
    pub accounts: HashMap<String, Address>,
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parsing scenario {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }
}

/// One call in a scenario. Account and token fields take a name from
/// `[accounts]`, a token label, or a hex address.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    CreateToken {
        caller: String,
        /// Name later steps can use for the new token's address.
        label: Option<String>,
        name: String,
        symbol: String,
        initial_supply: Amount,
        #[serde(default)]
        decimals: u8,
        #[serde(default = "default_true")]
        transferable: bool,
    },
    Transfer {
        caller: String,
        token: String,
        to: String,
        amount: Amount,
    },
    SetTransferable {
        caller: String,
        token: String,
        transferable: bool,
    },
    SetDistributor {
        caller: String,
        token: String,
        account: String,
        #[serde(default = "default_true")]
        enabled: bool,
    },
    Distribute {
        caller: String,
        token: String,
        recipients: Vec<String>,
        amounts: Vec<Amount>,
    },
    CreateProposal {
        caller: String,
        token: String,
        title: String,
        #[serde(default)]
        description: String,
        duration_secs: u64,
        quorum_percent: u64,
    },
    Vote {
        caller: String,
        proposal: ProposalId,
        support: bool,
    },
    Advance {
        secs: u64,
    },
    Execute {
        caller: String,
        proposal: ProposalId,
    },
}

impl Step {
    fn action(&self) -> &'static str {
        match self {
            Self::CreateToken { .. } => "create_token",
            Self::Transfer { .. } => "transfer",
            Self::SetTransferable { .. } => "set_transferable",
            Self::SetDistributor { .. } => "set_distributor",
            Self::Distribute { .. } => "distribute",
            Self::CreateProposal { .. } => "create_proposal",
            Self::Vote { .. } => "vote",
            Self::Advance { .. } => "advance",
            Self::Execute { .. } => "execute",
        }
    }
}

/// What happened to one step; printed as one JSON line.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Committed { step: usize, receipt: Receipt },
    Rejected {
        step: usize,
        action: &'static str,
        error: String,
    },
    Advanced { step: usize, now: Timestamp },
}

/// Replays steps against an in-memory chain.
pub struct Runner {
    chain: Chain,
    clock: Arc<NullClock>,
    names: HashMap<String, Address>,
}

impl Runner {
    pub fn new(config: ChainConfig, scenario: &Scenario) -> Result<Self> {
        let start = scenario
            .start_time
            .unwrap_or_else(|| SystemClock.now().as_secs());
        let clock = Arc::new(NullClock::new(start));
        let chain = Chain::new(config, clock.clone())?;
        Ok(Self {
            chain,
            clock,
            names: scenario.accounts.clone(),
        })
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    fn resolve(&self, name: &str) -> Result<Address> {
        if let Some(address) = self.names.get(name) {
            return Ok(*address);
        }
        name.parse()
            .map_err(|e| anyhow!("{name:?} is neither a known name nor an address: {e}"))
    }

    /// Run one step. Calls the chain rejects become [`Outcome::Rejected`];
    /// only malformed steps are errors.
    pub fn run_step(&mut self, index: usize, step: &Step) -> Result<Outcome> {
        debug!(step = index, action = step.action(), "running step");
        let result = match step {
            Step::CreateToken {
                caller,
                label,
                name,
                symbol,
                initial_supply,
                decimals,
                transferable,
            } => {
                let params = TokenParams {
                    name: name.clone(),
                    symbol: symbol.clone(),
                    initial_supply: *initial_supply,
                    decimals: *decimals,
                    transferable: *transferable,
                };
                if let Some(label) = label {
                    if self.names.contains_key(label) {
                        bail!("label {label:?} is already taken");
                    }
                }
                let created = self.chain.create_token(self.resolve(caller)?, params);
                if let (Ok((address, _)), Some(label)) = (&created, label) {
                    self.names.insert(label.clone(), *address);
                }
                created.map(|(_, receipt)| receipt)
            }
            Step::Transfer {
                caller,
                token,
                to,
                amount,
            } => self.chain.transfer(
                self.resolve(caller)?,
                self.resolve(token)?,
                self.resolve(to)?,
                *amount,
            ),
            Step::SetTransferable {
                caller,
                token,
                transferable,
            } => self.chain.set_transferable(
                self.resolve(caller)?,
                self.resolve(token)?,
                *transferable,
            ),
            Step::SetDistributor {
                caller,
                token,
                account,
                enabled,
            } => self.chain.set_distributor(
                self.resolve(caller)?,
                self.resolve(token)?,
                self.resolve(account)?,
                *enabled,
            ),
            Step::Distribute {
                caller,
                token,
                recipients,
                amounts,
            } => {
                let recipients = recipients
                    .iter()
                    .map(|r| self.resolve(r))
                    .collect::<Result<Vec<_>>>()?;
                self.chain.distribute_tokens(
                    self.resolve(caller)?,
                    self.resolve(token)?,
                    &recipients,
                    amounts,
                )
            }
            Step::CreateProposal {
                caller,
                token,
                title,
                description,
                duration_secs,
                quorum_percent,
            } => {
                let request = NewProposal {
                    title: title.clone(),
                    description: description.clone(),
                    token: self.resolve(token)?,
                    duration_secs: *duration_secs,
                    quorum_percent: *quorum_percent,
                };
                self.chain
                    .create_proposal(self.resolve(caller)?, request)
                    .map(|(_, receipt)| receipt)
            }
            Step::Vote {
                caller,
                proposal,
                support,
            } => self
                .chain
                .cast_vote(self.resolve(caller)?, *proposal, *support),
            Step::Advance { secs } => {
                self.clock.advance(*secs);
                let now = self.clock.now();
                info!(by = %tally_utils::format_duration(*secs), %now, "clock advanced");
                return Ok(Outcome::Advanced { step: index, now });
            }
            Step::Execute { caller, proposal } => self
                .chain
                .execute_proposal(self.resolve(caller)?, *proposal)
                .map(|(_, receipt)| receipt),
        };
        Ok(outcome(index, step.action(), result))
    }
}

fn outcome(step: usize, action: &'static str, result: Result<Receipt, ChainError>) -> Outcome {
    match result {
        Ok(receipt) => Outcome::Committed { step, receipt },
        Err(e) => Outcome::Rejected {
            step,
            action,
            error: e.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMMUNITY: &str = r#"
        start_time = 1000

        [accounts]
        alice = "0x00000000000000000000000000000000000000a1"
        bob = "0x00000000000000000000000000000000000000b0"
        carol = "0x00000000000000000000000000000000000000c0"

        [[step]]
        action = "create_token"
        caller = "alice"
        label = "com"
        name = "Community"
        symbol = "COM"
        initial_supply = "1000"

        [[step]]
        action = "transfer"
        caller = "alice"
        token = "com"
        to = "bob"
        amount = "100"

        [[step]]
        action = "create_proposal"
        caller = "alice"
        token = "com"
        title = "Fund the garden"
        duration_secs = 604800
        quorum_percent = 25

        [[step]]
        action = "vote"
        caller = "bob"
        proposal = 1
        support = true

        [[step]]
        action = "execute"
        caller = "carol"
        proposal = 1

        [[step]]
        action = "vote"
        caller = "alice"
        proposal = 1
        support = true

        [[step]]
        action = "advance"
        secs = 604801

        [[step]]
        action = "execute"
        caller = "carol"
        proposal = 1
    "#;

    fn run(scenario: &Scenario) -> Vec<Outcome> {
        let mut runner = Runner::new(ChainConfig::default(), scenario).unwrap();
        scenario
            .steps
            .iter()
            .enumerate()
            .map(|(i, step)| runner.run_step(i, step).unwrap())
            .collect()
    }

    #[test]
    fn replays_a_full_proposal_lifecycle() {
        let scenario = Scenario::from_toml_str(COMMUNITY).unwrap();
        assert_eq!(scenario.steps.len(), 8);

        let outcomes = run(&scenario);
        assert!(matches!(outcomes[3], Outcome::Committed { .. }));
        assert!(matches!(
            &outcomes[4],
            Outcome::Rejected { action: "execute", error, .. } if error.contains("voting")
        ));
        assert!(matches!(outcomes[6], Outcome::Advanced { now, .. } if now == Timestamp::new(605_801)));
        match &outcomes[7] {
            Outcome::Committed { receipt, .. } => assert_eq!(receipt.call, "execute_proposal"),
            other => panic!("expected commit, got {other:?}"),
        }
    }

    #[test]
    fn outcomes_serialize_with_status_tag() {
        let scenario = Scenario::from_toml_str(COMMUNITY).unwrap();
        let outcomes = run(&scenario);
        let json = serde_json::to_value(&outcomes[1]).unwrap();
        assert_eq!(json["status"], "committed");
        assert_eq!(json["receipt"]["block"]["number"], 2);
    }

    #[test]
    fn unknown_name_is_an_error() {
        let scenario = Scenario::from_toml_str(
            r#"
            [[step]]
            action = "vote"
            caller = "mallory"
            proposal = 1
            support = false
            "#,
        )
        .unwrap();
        let mut runner = Runner::new(ChainConfig::default(), &scenario).unwrap();
        assert!(runner.run_step(0, &scenario.steps[0]).is_err());
    }

    #[test]
    fn reused_label_is_rejected_before_deploying() {
        let scenario = Scenario::from_toml_str(
            r#"
            start_time = 10

            [[step]]
            action = "create_token"
            caller = "0x00000000000000000000000000000000000000a1"
            label = "com"
            name = "First"
            symbol = "ONE"
            initial_supply = "10"

            [[step]]
            action = "create_token"
            caller = "0x00000000000000000000000000000000000000a1"
            label = "com"
            name = "Second"
            symbol = "TWO"
            initial_supply = "10"
            "#,
        )
        .unwrap();
        let mut runner = Runner::new(ChainConfig::default(), &scenario).unwrap();
        runner.run_step(0, &scenario.steps[0]).unwrap();
        let first = runner.chain().token_at(0).unwrap().unwrap();

        assert!(runner.run_step(1, &scenario.steps[1]).is_err());
        assert_eq!(runner.chain().block_height().unwrap(), 1);
        assert_eq!(runner.chain().token_count().unwrap(), 1);
        assert_eq!(runner.resolve("com").unwrap(), first);
    }

    #[test]
    fn missing_start_time_uses_wall_clock() {
        let scenario = Scenario::from_toml_str(
            r#"
            [[step]]
            action = "advance"
            secs = 0
            "#,
        )
        .unwrap();
        assert_eq!(scenario.start_time, None);
        let before = SystemClock.now();
        let mut runner = Runner::new(ChainConfig::default(), &scenario).unwrap();
        match runner.run_step(0, &scenario.steps[0]).unwrap() {
            Outcome::Advanced { now, .. } => assert!(now >= before),
            other => panic!("expected advance, got {other:?}"),
        }
    }

    #[test]
    fn huge_advance_saturates() {
        let scenario = Scenario::from_toml_str(
            r#"
            start_time = 9223372036854775807

            [[step]]
            action = "advance"
            secs = 9223372036854775807

            [[step]]
            action = "advance"
            secs = 9223372036854775807
            "#,
        )
        .unwrap();
        let mut runner = Runner::new(ChainConfig::default(), &scenario).unwrap();
        runner.run_step(0, &scenario.steps[0]).unwrap();
        assert!(matches!(
            runner.run_step(1, &scenario.steps[1]).unwrap(),
            Outcome::Advanced { now, .. } if now == Timestamp::new(u64::MAX)
        ));
    }

    #[test]
    fn unknown_action_fails_to_parse() {
        let result = Scenario::from_toml_str(
            r#"
            [[step]]
            action = "teleport"
            "#,
        );
        assert!(result.is_err());
    }
}
