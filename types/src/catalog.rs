//! Reference catalog of known ledger programs and networks.
//!
//! Loaded once at startup and passed to the decoder; replaces scattered
//! program-id literals.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::IdParseError;
use crate::id::AgentId;

/// The two token-program identifiers whose transfer-with-amount-check
/// instruction backs a receipt.
const TOKEN_PROGRAM: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";
const TOKEN_2022_PROGRAM: &str = "TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb";

/// Catalog of program identifiers the decoder recognizes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenCatalog {
    /// Programs whose transfer-checked instruction counts as a payment.
    pub token_programs: Vec<AgentId>,
}

impl TokenCatalog {
    /// Build the catalog for the public ledger's well-known token programs.
    pub fn mainnet() -> Self {
        let token_programs = [TOKEN_PROGRAM, TOKEN_2022_PROGRAM]
            .iter()
            .map(|s| AgentId::from_str(s).expect("well-known program id"))
            .collect();
        Self { token_programs }
    }

    /// Build a catalog from explicit base58 program ids (e.g. from config).
    pub fn from_ids(ids: &[String]) -> Result<Self, IdParseError> {
        let token_programs = ids
            .iter()
            .map(|s| AgentId::from_str(s))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { token_programs })
    }

    /// Whether the given program key is a recognized token program.
    pub fn is_token_program(&self, program: &AgentId) -> bool {
        self.token_programs.contains(program)
    }
}
