//! Genesis configuration
//!
//! Describes a ledger at construction time: metadata, the regulator installed
//! first, and the initial allocations. Loaded from TOML:
//!
//! ```toml
//! name = "Atomic Token"
//! symbol = "ATOM"
//! decimals = 18
//!
//! [regulator]
//! kind = "lockup"
//! address = "a0a0...a0"
//! # release_at = "2030-01-01T00:00:00Z"
//!
//! [[allocations]]
//! holder = "0202...02"
//! amount = "999999999000000000000000"
//! ```
//!
//! Amounts are decimal strings because TOML integers stop at `i64`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

use lib_regulator::{LockupPolicy, PermissivePolicy, RegulatorRef};
use lib_types::{Address, Amount};

use crate::errors::{TokenError, TokenResult};
use crate::token::{RegulatedToken, TokenMetadata};

/// Which reference regulator to install at genesis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegulatorKind {
    /// Lockup (indefinite unless `release_at` is set)
    #[default]
    Lockup,
    /// Approve everything
    Permissive,
}

/// Regulator section of the genesis file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegulatorConfig {
    #[serde(default)]
    pub kind: RegulatorKind,
    /// Hex address the regulator is installed at
    pub address: String,
    /// Lockup release instant (RFC 3339); ignored for other kinds
    #[serde(default)]
    pub release_at: Option<DateTime<Utc>>,
}

/// One initial allocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationConfig {
    /// Hex address of the holder
    pub holder: String,
    /// Decimal amount in base units
    pub amount: String,
}

/// Complete genesis description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisConfig {
    pub name: String,
    pub symbol: String,
    #[serde(default = "default_decimals")]
    pub decimals: u8,
    pub regulator: RegulatorConfig,
    #[serde(default)]
    pub allocations: Vec<AllocationConfig>,
}

fn default_decimals() -> u8 {
    18
}

impl GenesisConfig {
    /// Parse a genesis description from TOML text
    pub fn from_toml_str(content: &str) -> TokenResult<Self> {
        let config: GenesisConfig = toml::from_str(content)
            .map_err(|e| TokenError::Config(format!("invalid genesis TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a genesis description from a TOML file
    pub fn load(path: impl AsRef<Path>) -> TokenResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            TokenError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        debug!(path = %path.display(), "loaded genesis file");
        Self::from_toml_str(&content)
    }

    /// Check metadata and that every address and amount parses
    pub fn validate(&self) -> TokenResult<()> {
        if self.name.trim().is_empty() {
            return Err(TokenError::Config("token name cannot be empty".to_string()));
        }
        if self.symbol.trim().is_empty() {
            return Err(TokenError::Config("token symbol cannot be empty".to_string()));
        }
        self.regulator_address()?;
        self.allocations()?;
        Ok(())
    }

    /// Token metadata
    pub fn metadata(&self) -> TokenMetadata {
        TokenMetadata {
            name: self.name.clone(),
            symbol: self.symbol.clone(),
            decimals: self.decimals,
        }
    }

    /// Address of the genesis regulator
    pub fn regulator_address(&self) -> TokenResult<Address> {
        parse_address("regulator.address", &self.regulator.address)
    }

    /// Build the genesis regulator
    pub fn regulator(&self) -> TokenResult<RegulatorRef> {
        let address = self.regulator_address()?;
        let regulator = match self.regulator.kind {
            RegulatorKind::Lockup => match self.regulator.release_at {
                Some(release_at) => RegulatorRef::new(address, LockupPolicy::until(release_at)),
                None => RegulatorRef::new(address, LockupPolicy::indefinite()),
            },
            RegulatorKind::Permissive => RegulatorRef::new(address, PermissivePolicy),
        };
        Ok(regulator)
    }

    /// Parsed `(holders, balances)` in file order
    pub fn allocations(&self) -> TokenResult<(Vec<Address>, Vec<Amount>)> {
        let mut holders = Vec::with_capacity(self.allocations.len());
        let mut balances = Vec::with_capacity(self.allocations.len());

        for (index, allocation) in self.allocations.iter().enumerate() {
            holders.push(parse_address(
                &format!("allocations[{}].holder", index),
                &allocation.holder,
            )?);
            let amount = allocation.amount.trim().parse::<Amount>().map_err(|e| {
                TokenError::InvalidArgument(format!(
                    "allocations[{}].amount {:?}: {}",
                    index, allocation.amount, e
                ))
            })?;
            balances.push(amount);
        }

        Ok((holders, balances))
    }
}

fn parse_address(field: &str, value: &str) -> TokenResult<Address> {
    value
        .parse::<Address>()
        .map_err(|e| TokenError::InvalidArgument(format!("{}: {}", field, e)))
}

impl RegulatedToken {
    /// Create a ledger owned by `caller` from a genesis description
    pub fn from_genesis(caller: Address, config: &GenesisConfig) -> TokenResult<Self> {
        config.validate()?;
        let (holders, balances) = config.allocations()?;
        Self::with_metadata(
            caller,
            config.regulator()?,
            &holders,
            &balances,
            config.metadata(),
        )
    }
}
