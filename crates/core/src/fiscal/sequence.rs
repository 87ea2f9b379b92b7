//! Canonical statutory ordering of vouchers.
//!
//! Vouchers are numbered and printed by date, then voucher-type priority,
//! then voucher number. The voucher ID breaks any remaining tie so the
//! order is total and reproducible.

use std::cmp::Ordering;

use chrono::NaiveDate;

use defter_shared::types::VoucherId;

use crate::ledger::VoucherType;

/// Sort key of the canonical statutory sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalKey {
    /// Voucher date.
    pub date: NaiveDate,
    /// Voucher type.
    pub voucher_type: VoucherType,
    /// Voucher number.
    pub voucher_number: String,
    /// Voucher ID.
    pub id: VoucherId,
}

impl CanonicalKey {
    /// Builds a key.
    #[must_use]
    pub fn new(date: NaiveDate, voucher_type: VoucherType, voucher_number: &str, id: VoucherId) -> Self {
        Self {
            date,
            voucher_type,
            voucher_number: voucher_number.to_string(),
            id,
        }
    }
}

impl Ord for CanonicalKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.date
            .cmp(&other.date)
            .then_with(|| self.voucher_type.priority().cmp(&other.voucher_type.priority()))
            .then_with(|| natural_cmp(&self.voucher_number, &other.voucher_number))
            .then_with(|| self.id.into_inner().cmp(&other.id.into_inner()))
    }
}

impl PartialOrd for CanonicalKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Compares voucher numbers with digit runs taken as numbers.
///
/// `"M-9"` sorts before `"M-10"`; zero-padded numbers sort as plain text would.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.as_bytes();
    let mut right = b.as_bytes();

    loop {
        match (left.first(), right.first()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let l_len = left.iter().take_while(|c| c.is_ascii_digit()).count();
                let r_len = right.iter().take_while(|c| c.is_ascii_digit()).count();
                let l_digits = trim_zeros(&left[..l_len]);
                let r_digits = trim_zeros(&right[..r_len]);
                let ord = l_digits
                    .len()
                    .cmp(&r_digits.len())
                    .then_with(|| l_digits.cmp(r_digits));
                if ord != Ordering::Equal {
                    return ord;
                }
                left = &left[l_len..];
                right = &right[r_len..];
            }
            (Some(l), Some(r)) => {
                if l != r {
                    return l.cmp(r);
                }
                left = &left[1..];
                right = &right[1..];
            }
        }
    }
}

fn trim_zeros(digits: &[u8]) -> &[u8] {
    let start = digits.iter().position(|&c| c != b'0').unwrap_or(digits.len());
    &digits[start..]
}

/// Sorts items into canonical order using `key` to extract each item's key.
pub fn sort_canonically<T, F>(items: &mut [T], key: F)
where
    F: Fn(&T) -> CanonicalKey,
{
    items.sort_by_cached_key(|item| key(item));
}
