//! Display helpers for base-unit amounts, coin types and addresses

use chrono::{TimeZone, Utc};

use super::constants::{BASE_UNIT_DECIMALS, COIN_TYPE_DELIMITER, SENDER_PREFIX_CHARS};

/// Format a base-unit amount as a decimal string with `places` fraction digits.
///
/// Integer arithmetic end to end, rounding half away from zero, so large sums
/// never lose precision the way a float conversion would.
pub fn format_base_units(amount: i128, places: u32) -> String {
    let places = places.min(BASE_UNIT_DECIMALS);
    let divisor = 10u128.pow(BASE_UNIT_DECIMALS - places);
    let magnitude = amount.unsigned_abs();

    let mut scaled = magnitude / divisor;
    if (magnitude % divisor) * 2 >= divisor {
        scaled += 1;
    }

    let unit = 10u128.pow(places);
    let whole = scaled / unit;
    let frac = scaled % unit;
    let sign = if amount < 0 && scaled != 0 { "-" } else { "" };

    if places == 0 {
        format!("{}{}", sign, whole)
    } else {
        format!("{}{}.{:0width$}", sign, whole, frac, width = places as usize)
    }
}

/// Symbol of a coin type: the token after the last `::`
pub fn coin_symbol(coin_type: &str) -> &str {
    coin_type
        .rsplit(COIN_TYPE_DELIMITER)
        .next()
        .unwrap_or(coin_type)
}

/// Short sender form: first characters followed by an ellipsis
pub fn truncate_address(address: &str) -> String {
    let prefix: String = address.chars().take(SENDER_PREFIX_CHARS).collect();
    format!("{}...", prefix)
}

/// Render a millisecond timestamp as UTC wall-clock time
pub fn format_timestamp_ms(timestamp_ms: i64) -> Option<String> {
    Utc.timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_base_units() {
        assert_eq!(format_base_units(1_000_000, 4), "0.0010");
        assert_eq!(format_base_units(5_000_000_000, 4), "5.0000");
        assert_eq!(format_base_units(-2_500_000_000, 2), "-2.50");
        assert_eq!(format_base_units(0, 4), "0.0000");
        // 0.00005 rounds up at 4 places
        assert_eq!(format_base_units(50_000, 4), "0.0001");
        assert_eq!(format_base_units(49_999, 4), "0.0000");
    }

    #[test]
    fn test_format_large_amounts() {
        let huge = u64::MAX as i128 * 4;
        assert_eq!(format_base_units(huge, 2), "73786976294.84");
    }

    #[test]
    fn test_coin_symbol() {
        assert_eq!(coin_symbol("0x2::sui::SUI"), "SUI");
        assert_eq!(coin_symbol("0xabc::usdc::USDC"), "USDC");
        assert_eq!(coin_symbol("plain"), "plain");
    }

    #[test]
    fn test_truncate_address() {
        assert_eq!(truncate_address("0xABC"), "0xABC...");
        assert_eq!(truncate_address("0x1234567890"), "0x1234...");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(
            format_timestamp_ms(1_700_000_000_000).as_deref(),
            Some("2023-11-14 22:13:20 UTC")
        );
    }
}
