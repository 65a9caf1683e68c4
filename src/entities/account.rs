// 💳 Account Entity - checking, savings and the parent vault
//
// Accounts are owned by the backend; this side only reads them, groups them
// for display and builds the request bodies for account management.

use serde::{Deserialize, Serialize};

// ============================================================================
// ACCOUNT TYPE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    /// Spending account, a kid may hold several
    Checking,

    /// Interest-bearing account
    Savings,

    /// The parents' funding source
    ParentVault,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Checking => "checking",
            AccountType::Savings => "savings",
            AccountType::ParentVault => "parent_vault",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            AccountType::Checking => "💳",
            AccountType::Savings => "🏦",
            AccountType::ParentVault => "🔐",
        }
    }

    /// Only checking and savings accounts can receive allowance splits
    pub fn accepts_allowance(&self) -> bool {
        matches!(self, AccountType::Checking | AccountType::Savings)
    }
}

// ============================================================================
// ACCOUNT
// ============================================================================

/// One row of `GET /api/accounts`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub user_id: i64,
    pub account_type: AccountType,

    #[serde(default)]
    pub balance: f64,

    #[serde(default)]
    pub nickname: Option<String>,

    #[serde(default, with = "super::flag")]
    pub is_default: bool,

    /// Owner's display name, joined in by the backend
    #[serde(default)]
    pub owner_name: Option<String>,
}

impl Account {
    /// Nickname (falling back to the account type) with a star on defaults
    pub fn display_name(&self) -> String {
        let name = self
            .nickname
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(self.account_type.as_str());

        if self.is_default {
            format!("{} ⭐", name)
        } else {
            name.to_string()
        }
    }

    /// Nickname or "Unnamed", as shown in split editors
    pub fn label(&self) -> &str {
        self.nickname
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or("Unnamed")
    }
}

// ============================================================================
// ACCOUNT DIRECTORY
// ============================================================================

/// Accounts fetched for one render, with the lookups the views need.
///
/// Passed explicitly to whatever renders, instead of living in a global.
#[derive(Debug, Clone, Default)]
pub struct AccountDirectory {
    accounts: Vec<Account>,
}

impl AccountDirectory {
    pub fn new(accounts: Vec<Account>) -> Self {
        AccountDirectory { accounts }
    }

    pub fn all(&self) -> &[Account] {
        &self.accounts
    }

    pub fn find_by_id(&self, id: i64) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    pub fn by_user(&self, user_id: i64) -> Vec<&Account> {
        self.accounts.iter().filter(|a| a.user_id == user_id).collect()
    }

    pub fn by_type(&self, user_id: i64, account_type: AccountType) -> Vec<&Account> {
        self.accounts
            .iter()
            .filter(|a| a.user_id == user_id && a.account_type == account_type)
            .collect()
    }

    /// A user's allowance-eligible accounts: checking first, then savings
    pub fn split_targets(&self, user_id: i64) -> Vec<&Account> {
        let mut targets = self.by_type(user_id, AccountType::Checking);
        targets.extend(self.by_type(user_id, AccountType::Savings));
        targets
    }

    pub fn default_for(&self, user_id: i64, account_type: AccountType) -> Option<&Account> {
        self.accounts
            .iter()
            .find(|a| a.user_id == user_id && a.account_type == account_type && a.is_default)
    }

    pub fn count(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

// ============================================================================
// REQUEST BODIES
// ============================================================================

/// Body of `POST /api/accounts/checking`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCheckingAccount {
    /// Set when a parent creates the account for a kid
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    pub nickname: String,
}

/// Body of `PUT /api/accounts/{id}/nickname`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NicknameUpdate {
    pub nickname: String,
}

// ============================================================================
// TESTS
// ============================================================================
