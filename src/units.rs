//! Fixed-point amount conversion.
//!
//! Ledger amounts are integers in the asset's smallest unit. Decimal strings
//! only exist at the edges: formatting for display and parsing user input.

use crate::error::UnitsError;

/// Integer amount in the asset's smallest unit.
pub type Amount = u128;

/// Decimal count of the vault asset.
pub const DEFAULT_DECIMALS: u32 = 18;

/// Shown in place of an amount that cannot be rendered.
pub const FORMAT_ERROR: &str = "Format error";

fn scale(decimals: u32) -> Result<Amount, UnitsError> {
    10u128
        .checked_pow(decimals)
        .ok_or(UnitsError::Decimals(decimals))
}

/// Render `value` as a decimal string with trailing fractional zeros trimmed.
pub fn format_units(value: Amount, decimals: u32) -> Result<String, UnitsError> {
    let scale = scale(decimals)?;
    let whole = value / scale;
    let frac = value % scale;
    if frac == 0 {
        return Ok(whole.to_string());
    }

    let frac = format!("{:0width$}", frac, width = decimals as usize);
    Ok(format!("{whole}.{}", frac.trim_end_matches('0')))
}

/// Like [`format_units`], but never fails.
pub fn display_units(value: Amount, decimals: u32) -> String {
    format_units(value, decimals).unwrap_or_else(|e| {
        tracing::warn!("Cannot format amount {value}: {e}");
        FORMAT_ERROR.to_string()
    })
}

/// Parse a decimal string such as `"12.5"` into smallest units.
pub fn parse_units(input: &str, decimals: u32) -> Result<Amount, UnitsError> {
    let scale = scale(decimals)?;
    let s = input.trim();
    if s.is_empty() {
        return Err(UnitsError::Empty);
    }

    let (whole, frac) = s.split_once('.').unwrap_or((s, ""));
    let digits_only = |part: &str| part.chars().all(|c| c.is_ascii_digit());
    if (whole.is_empty() && frac.is_empty()) || !digits_only(whole) || !digits_only(frac) {
        return Err(UnitsError::Invalid(s.to_string()));
    }
    if frac.len() > decimals as usize {
        return Err(UnitsError::TooPrecise(decimals));
    }

    let whole: Amount = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| UnitsError::Overflow)?
    };
    let frac: Amount = if frac.is_empty() {
        0
    } else {
        format!("{:0<width$}", frac, width = decimals as usize)
            .parse()
            .map_err(|_| UnitsError::Overflow)?
    };

    whole
        .checked_mul(scale)
        .and_then(|v| v.checked_add(frac))
        .ok_or(UnitsError::Overflow)
}

/// Validate a deposit amount typed by the user. Zero is rejected.
pub fn parse_deposit_amount(input: &str, decimals: u32) -> Result<Amount, UnitsError> {
    match parse_units(input, decimals)? {
        0 => Err(UnitsError::NotPositive),
        amount => Ok(amount),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE: Amount = 1_000_000_000_000_000_000;

    #[test]
    fn format_whole_amounts_without_fraction() {
        assert_eq!(format_units(800 * ONE, 18).unwrap(), "800");
        assert_eq!(format_units(0, 18).unwrap(), "0");
    }

    #[test]
    fn format_trims_trailing_zeros() {
        assert_eq!(format_units(ONE + ONE / 2, 18).unwrap(), "1.5");
        assert_eq!(format_units(1, 18).unwrap(), "0.000000000000000001");
        assert_eq!(format_units(12_340, 3).unwrap(), "12.34");
    }

    #[test]
    fn format_with_zero_decimals() {
        assert_eq!(format_units(42, 0).unwrap(), "42");
    }

    #[test]
    fn format_rejects_unsupported_decimals() {
        assert_eq!(format_units(1, 39), Err(UnitsError::Decimals(39)));
        assert_eq!(display_units(1, 39), FORMAT_ERROR);
    }

    #[test]
    fn parse_accepts_common_inputs() {
        assert_eq!(parse_units("300", 18).unwrap(), 300 * ONE);
        assert_eq!(parse_units(" 1.5 ", 18).unwrap(), ONE + ONE / 2);
        assert_eq!(parse_units(".25", 2).unwrap(), 25);
        assert_eq!(parse_units("7.", 2).unwrap(), 700);
    }

    #[test]
    fn parse_rejects_bad_inputs() {
        assert_eq!(parse_units("", 18), Err(UnitsError::Empty));
        assert_eq!(parse_units(".", 18), Err(UnitsError::Invalid(".".into())));
        assert_eq!(parse_units("-1", 18), Err(UnitsError::Invalid("-1".into())));
        assert_eq!(parse_units("1.2.3", 18), Err(UnitsError::Invalid("1.2.3".into())));
        assert_eq!(parse_units("abc", 18), Err(UnitsError::Invalid("abc".into())));
        assert_eq!(parse_units("0.001", 2), Err(UnitsError::TooPrecise(2)));
    }

    #[test]
    fn parse_detects_overflow() {
        let huge = "9".repeat(40);
        assert_eq!(parse_units(&huge, 0), Err(UnitsError::Overflow));
        assert_eq!(parse_units("1000000000000000000000", 18), Err(UnitsError::Overflow));
    }

    #[test]
    fn parse_then_format_preserves_value() {
        let amount = parse_units("1234.000500", 18).unwrap();
        assert_eq!(format_units(amount, 18).unwrap(), "1234.0005");
    }

    #[test]
    fn deposit_amount_must_be_positive() {
        assert_eq!(parse_deposit_amount("0", 18), Err(UnitsError::NotPositive));
        assert_eq!(parse_deposit_amount("0.00", 18), Err(UnitsError::NotPositive));
        assert_eq!(parse_deposit_amount("10", 18).unwrap(), 10 * ONE);
    }
}
