//! Shared helper functions for CLI commands

use rust_decimal::Decimal;

/// Format an amount with two decimals
pub fn format_money(value: Decimal) -> String {
    format!("{:.2}", value)
}

/// Format a percentage with up to two decimals
pub fn format_percent(value: Decimal) -> String {
    format!("{}%", value.round_dp(2).normalize())
}

/// Truncate a string to max_len characters, adding "..." if truncated
///
/// Useful for table columns that need fixed-width output.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Tree indentation for a BOM depth
pub fn tree_prefix(depth: usize) -> String {
    if depth == 0 {
        String::new()
    } else {
        format!("{}└─ ", "│  ".repeat(depth - 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(dec!(1125)), "1125.00");
        assert_eq!(format_money(dec!(0.5)), "0.50");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(dec!(28.571428)), "28.57%");
        assert_eq!(format_percent(dec!(100.00)), "100%");
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("ragréage", 8), "ragréage");
    }

    #[test]
    fn test_tree_prefix() {
        assert_eq!(tree_prefix(0), "");
        assert_eq!(tree_prefix(1), "└─ ");
        assert_eq!(tree_prefix(2), "│  └─ ");
    }
}
