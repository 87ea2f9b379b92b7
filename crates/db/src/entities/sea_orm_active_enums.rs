//! `SeaORM` active enums mirroring the ledger's Postgres enum types.
//!
//! Each enum converts both ways with its domain counterpart in `defter-core`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use defter_core::chart::{BalanceNature as DomainBalanceNature, Classification, SpecialRole as DomainSpecialRole};
use defter_core::ledger::{
    DocumentKind as DomainDocumentKind, SettlementMethod as DomainSettlementMethod,
    VoucherType as DomainVoucherType,
};

/// Mirrors Postgres enum `account_classification`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_classification")]
pub enum AccountClassification {
    #[sea_orm(string_value = "MAIN")]
    Main,
    #[sea_orm(string_value = "GROUP")]
    Group,
    #[sea_orm(string_value = "SUB_LEDGER")]
    SubLedger,
}

/// Mirrors Postgres enum `balance_nature`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "balance_nature")]
pub enum BalanceNature {
    #[sea_orm(string_value = "DEBIT_ONLY")]
    DebitOnly,
    #[sea_orm(string_value = "CREDIT_ONLY")]
    CreditOnly,
    #[sea_orm(string_value = "BOTH")]
    Both,
}

/// Mirrors Postgres enum `special_role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "special_role")]
pub enum SpecialRole {
    #[sea_orm(string_value = "standard")]
    Standard,
    #[sea_orm(string_value = "cash")]
    Cash,
    #[sea_orm(string_value = "bank")]
    Bank,
    #[sea_orm(string_value = "cheque")]
    Cheque,
    #[sea_orm(string_value = "input_vat")]
    InputVat,
    #[sea_orm(string_value = "output_vat")]
    OutputVat,
    #[sea_orm(string_value = "return_vat")]
    ReturnVat,
    #[sea_orm(string_value = "withholding")]
    Withholding,
}

/// Mirrors Postgres enum `voucher_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "voucher_type")]
pub enum VoucherType {
    #[sea_orm(string_value = "OPENING")]
    Opening,
    #[sea_orm(string_value = "CASH_RECEIPT")]
    CashReceipt,
    #[sea_orm(string_value = "CASH_PAYMENT")]
    CashPayment,
    #[sea_orm(string_value = "GENERAL")]
    General,
    #[sea_orm(string_value = "CLOSING")]
    Closing,
}

/// Mirrors Postgres enum `document_kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "document_kind")]
pub enum DocumentKind {
    #[sea_orm(string_value = "invoice")]
    Invoice,
    #[sea_orm(string_value = "check")]
    Check,
    #[sea_orm(string_value = "receipt")]
    Receipt,
    #[sea_orm(string_value = "note")]
    Note,
    #[sea_orm(string_value = "other")]
    Other,
}

/// Mirrors Postgres enum `settlement_method`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "settlement_method")]
pub enum SettlementMethod {
    #[sea_orm(string_value = "cash")]
    Cash,
    #[sea_orm(string_value = "bank")]
    Bank,
    #[sea_orm(string_value = "check")]
    Check,
    #[sea_orm(string_value = "note")]
    Note,
    #[sea_orm(string_value = "card")]
    Card,
}

/// Pairs a database enum with its domain enum, variant for variant.
macro_rules! domain_mapping {
    ($db:ident <=> $domain:ident { $($variant:ident),+ $(,)? }) => {
        impl From<$db> for $domain {
            fn from(value: $db) -> Self {
                match value {
                    $($db::$variant => Self::$variant,)+
                }
            }
        }

        impl From<$domain> for $db {
            fn from(value: $domain) -> Self {
                match value {
                    $($domain::$variant => Self::$variant,)+
                }
            }
        }
    };
}

domain_mapping!(AccountClassification <=> Classification { Main, Group, SubLedger });
domain_mapping!(BalanceNature <=> DomainBalanceNature { DebitOnly, CreditOnly, Both });
domain_mapping!(SpecialRole <=> DomainSpecialRole {
    Standard, Cash, Bank, Cheque, InputVat, OutputVat, ReturnVat, Withholding,
});
domain_mapping!(VoucherType <=> DomainVoucherType { Opening, CashReceipt, CashPayment, General, Closing });
domain_mapping!(DocumentKind <=> DomainDocumentKind { Invoice, Check, Receipt, Note, Other });
domain_mapping!(SettlementMethod <=> DomainSettlementMethod { Cash, Bank, Check, Note, Card });
