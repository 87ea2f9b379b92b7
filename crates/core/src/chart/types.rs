//! Chart of accounts domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use defter_shared::types::AccountId;

use super::code::AccountCode;

/// Position of an account in the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    /// Top-level aggregate. Never posted to.
    Main,
    /// Intermediate aggregate.
    Group,
    /// Leaf account. The only kind that accepts postings.
    SubLedger,
}

impl Classification {
    /// Whether voucher lines may reference accounts of this classification.
    #[must_use]
    pub const fn is_postable(self) -> bool {
        matches!(self, Self::SubLedger)
    }

    /// Whether accounts of this classification may have children.
    #[must_use]
    pub const fn can_have_children(self) -> bool {
        !self.is_postable()
    }

    /// Stable string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Main => "MAIN",
            Self::Group => "GROUP",
            Self::SubLedger => "SUB_LEDGER",
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expected sign of an account's net balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BalanceNature {
    /// Should never carry a credit balance.
    DebitOnly,
    /// Should never carry a debit balance.
    CreditOnly,
    /// Either sign is normal.
    Both,
}

impl BalanceNature {
    /// Returns true if `net` (debit minus credit) has the wrong sign for this nature.
    #[must_use]
    pub fn is_violated_by(self, net: Decimal) -> bool {
        match self {
            Self::DebitOnly => net < Decimal::ZERO,
            Self::CreditOnly => net > Decimal::ZERO,
            Self::Both => false,
        }
    }
}

/// Routing tag used by producer modules to pick accounts automatically.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialRole {
    /// No special meaning.
    #[default]
    Standard,
    /// Cash on hand.
    Cash,
    /// Bank account.
    Bank,
    /// Cheques in portfolio.
    Cheque,
    /// Deductible input VAT.
    InputVat,
    /// Calculated output VAT.
    OutputVat,
    /// VAT on returns.
    ReturnVat,
    /// Withholding tax.
    Withholding,
}

impl SpecialRole {
    /// Roles whose postings must name a settlement method for statutory export.
    #[must_use]
    pub const fn requires_settlement_method(self) -> bool {
        matches!(self, Self::Cash | Self::Bank | Self::Cheque)
    }
}

/// An account of a tenant's chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account ID.
    pub id: AccountId,
    /// Hierarchical code, unique per tenant.
    pub code: AccountCode,
    /// Display name.
    pub name: String,
    /// Parent account, `None` for roots.
    pub parent_id: Option<AccountId>,
    /// 1 for roots, parent depth + 1 otherwise.
    pub depth: u32,
    /// Classification.
    pub classification: Classification,
    /// Balance nature.
    pub balance_nature: BalanceNature,
    /// Routing tag.
    pub special_role: SpecialRole,
    /// Cached sum of posted debits.
    pub debit_total: Decimal,
    /// Cached sum of posted credits.
    pub credit_total: Decimal,
    /// Inactive accounts reject new postings.
    pub is_active: bool,
}

impl Account {
    /// Net balance, debit total minus credit total.
    #[must_use]
    pub fn net_balance(&self) -> Decimal {
        self.debit_total - self.credit_total
    }

    /// `code - name`, as printed on reports.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} - {}", self.code, self.name)
    }
}

/// Input for creating an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccount {
    /// Hierarchical code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Parent account.
    #[serde(default)]
    pub parent_id: Option<AccountId>,
    /// Classification.
    pub classification: Classification,
    /// Balance nature.
    pub balance_nature: BalanceNature,
    /// Routing tag.
    #[serde(default)]
    pub special_role: SpecialRole,
}

/// Partial update of an account. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountChanges {
    /// New code.
    #[serde(default)]
    pub code: Option<String>,
    /// New name.
    #[serde(default)]
    pub name: Option<String>,
    /// New parent. `Some(None)` moves the account to the root.
    #[serde(default, with = "double_option")]
    pub parent_id: Option<Option<AccountId>>,
    /// New classification.
    #[serde(default)]
    pub classification: Option<Classification>,
    /// New balance nature.
    #[serde(default)]
    pub balance_nature: Option<BalanceNature>,
    /// New routing tag.
    #[serde(default)]
    pub special_role: Option<SpecialRole>,
    /// Activate or deactivate.
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Distinguishes an absent field from an explicit `null`.
mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T, S>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}
