// Entity Models - what the family bank backend hands us
//
// Each entity mirrors one JSON shape of the REST API:
// - Accounts (checking, savings, parent vault) and their owners
// - Allowance configs with their schedule and splits
// - Interest configs for savings accounts

pub mod account;
pub mod allowance;
pub mod interest;

pub use account::{Account, AccountDirectory, AccountType, NewCheckingAccount, NicknameUpdate};
pub use allowance::{AllowanceConfig, AllowanceSplit, AllowanceUpdate};
pub use interest::{CompoundFrequency, InterestConfig, InterestUpdate};

/// The backend stores flags as SQLite integers (`0`/`1`); accept those as
/// well as real JSON booleans.
pub(crate) mod flag {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Int(i64),
        Null(()),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Bool(b) => b,
            Raw::Int(i) => i != 0,
            Raw::Null(()) => false,
        })
    }

    pub fn serialize<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(if *value { 1 } else { 0 })
    }
}
