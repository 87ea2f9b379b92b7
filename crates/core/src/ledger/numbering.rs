//! Human voucher numbers.

use super::types::VoucherType;

/// Formats an auto-generated voucher number, e.g. `M-000042`.
#[must_use]
pub fn format_voucher_number(voucher_type: VoucherType, sequence: i64, digits: usize) -> String {
    format!("{}{sequence:0digits$}", voucher_type.number_prefix())
}

/// Trims a caller-supplied number, treating blank as absent.
#[must_use]
pub fn normalize_voucher_number(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim).filter(|n| !n.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_pads_to_digits() {
        assert_eq!(format_voucher_number(VoucherType::General, 42, 6), "M-000042");
        assert_eq!(format_voucher_number(VoucherType::CashPayment, 7, 4), "TD-0007");
        assert_eq!(format_voucher_number(VoucherType::Opening, 1_234_567, 6), "A-1234567");
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_voucher_number(Some("  M-7 ")), Some("M-7".to_string()));
        assert_eq!(normalize_voucher_number(Some("   ")), None);
        assert_eq!(normalize_voucher_number(None), None);
    }
}
