//! Scripted rules engine — a `RulesEngine` whose legality and outcomes are
//! fixed by the test.

use knightwire_core::error::RelayError;
use knightwire_core::rules::{Game, RulesEngine};

/// How a [`ScriptedGame`] answers outcome queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeScript {
    /// The game never ends.
    Never,
    /// The game ends with `result` once `plies` moves have been played.
    AfterPlies {
        /// Number of accepted moves that ends the game.
        plies: usize,
        /// Result string reported from then on.
        result: String,
    },
    /// Every outcome query fails.
    Failing,
}

/// Engine producing [`ScriptedGame`]s that accept only a fixed set of moves.
#[derive(Debug, Clone)]
pub struct ScriptedEngine {
    legal: Vec<String>,
    outcome: OutcomeScript,
}

impl ScriptedEngine {
    /// Games accept exactly the given notations, any number of times, and
    /// never end.
    #[must_use]
    pub fn accepting(legal: &[&str]) -> Self {
        Self {
            legal: legal.iter().map(|m| (*m).to_owned()).collect(),
            outcome: OutcomeScript::Never,
        }
    }

    /// Sets how games answer outcome queries.
    #[must_use]
    pub fn with_outcome(mut self, outcome: OutcomeScript) -> Self {
        self.outcome = outcome;
        self
    }
}

impl RulesEngine for ScriptedEngine {
    fn new_game(&self) -> Box<dyn Game> {
        Box::new(ScriptedGame {
            legal: self.legal.clone(),
            outcome: self.outcome.clone(),
            played: Vec::new(),
        })
    }
}

/// A game whose rendering is the space-separated list of accepted moves.
#[derive(Debug, Clone)]
pub struct ScriptedGame {
    legal: Vec<String>,
    outcome: OutcomeScript,
    played: Vec<String>,
}

impl ScriptedGame {
    fn finished(&self) -> bool {
        matches!(&self.outcome, OutcomeScript::AfterPlies { plies, .. } if self.played.len() >= *plies)
    }
}

impl Game for ScriptedGame {
    fn play(&mut self, notation: &str) -> Result<(), RelayError> {
        if self.finished() || !self.legal.iter().any(|m| m == notation) {
            return Err(RelayError::IllegalMove {
                notation: notation.to_owned(),
                reason: "not in script".into(),
            });
        }
        self.played.push(notation.to_owned());
        Ok(())
    }

    fn render(&self) -> String {
        self.played.join(" ")
    }

    fn outcome(&self) -> Result<Option<String>, RelayError> {
        match &self.outcome {
            OutcomeScript::Failing => Err(RelayError::RulesEngine("engine unavailable".into())),
            OutcomeScript::AfterPlies { result, .. } if self.finished() => Ok(Some(result.clone())),
            _ => Ok(None),
        }
    }
}
