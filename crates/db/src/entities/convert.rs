//! Conversions from stored rows to domain types.

use defter_core::chart::{Account, AccountCode, ChartError};
use defter_core::fiscal::FiscalPeriod;
use defter_core::ledger::{DocumentMetadata, PostingAccount, SourceRef, Voucher, VoucherLine};
use defter_shared::types::{
    AccountId, BranchId, FiscalPeriodId, TenantId, VoucherId, VoucherLineId,
};

use super::{accounts, fiscal_periods, voucher_lines, vouchers};

impl TryFrom<accounts::Model> for Account {
    type Error = ChartError;

    fn try_from(model: accounts::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: AccountId::from_uuid(model.id),
            code: AccountCode::parse(&model.code)?,
            name: model.name,
            parent_id: model.parent_id.map(AccountId::from_uuid),
            // The column carries CHECK (depth >= 1).
            depth: u32::try_from(model.depth).unwrap_or(1),
            classification: model.classification.into(),
            balance_nature: model.balance_nature.into(),
            special_role: model.special_role.into(),
            debit_total: model.debit_total,
            credit_total: model.credit_total,
            is_active: model.is_active,
        })
    }
}

/// Posting facts of an account, as voucher validation needs them.
#[must_use]
pub fn posting_account(account: &Account) -> PostingAccount {
    PostingAccount {
        id: account.id,
        code: account.code.clone(),
        classification: account.classification,
        is_active: account.is_active,
    }
}

impl From<fiscal_periods::Model> for FiscalPeriod {
    fn from(model: fiscal_periods::Model) -> Self {
        Self {
            id: FiscalPeriodId::from_uuid(model.id),
            tenant_id: TenantId::from_uuid(model.tenant_id),
            name: model.name,
            start_date: model.start_date,
            end_date: model.end_date,
            is_active: model.is_active,
            lock_date: model.lock_date,
            last_sequence_number: model.last_sequence_number,
        }
    }
}

impl From<vouchers::Model> for Voucher {
    fn from(model: vouchers::Model) -> Self {
        let source = match (model.source_module, model.source_record_id) {
            (Some(module), Some(record_id)) => Some(SourceRef { module, record_id }),
            _ => None,
        };
        Self {
            id: VoucherId::from_uuid(model.id),
            tenant_id: TenantId::from_uuid(model.tenant_id),
            fiscal_period_id: FiscalPeriodId::from_uuid(model.fiscal_period_id),
            branch_id: BranchId::from_uuid(model.branch_id),
            voucher_type: model.voucher_type.into(),
            voucher_number: model.voucher_number,
            date: model.voucher_date,
            description: model.description,
            total_debit: model.total_debit,
            total_credit: model.total_credit,
            sequence_number: model.sequence_number,
            locked: model.locked,
            source,
        }
    }
}

impl From<voucher_lines::Model> for VoucherLine {
    fn from(model: voucher_lines::Model) -> Self {
        Self {
            id: VoucherLineId::from_uuid(model.id),
            voucher_id: VoucherId::from_uuid(model.voucher_id),
            // The column carries CHECK (line_no >= 1).
            line_no: u32::try_from(model.line_no).unwrap_or(1),
            account_id: AccountId::from_uuid(model.account_id),
            debit: model.debit,
            credit: model.credit,
            description: model.description,
            document: DocumentMetadata {
                kind: model.document_kind.map(Into::into),
                number: model.document_number,
                date: model.document_date,
                settlement: model.settlement_method.map(Into::into),
            },
        }
    }
}
