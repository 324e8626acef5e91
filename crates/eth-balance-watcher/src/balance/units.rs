use alloy_primitives::{utils::format_ether, U256};

/// Exact conversion of a wei amount to ether, as a decimal string.
///
/// Every `U256` amount is converted without loss. Trailing fractional zeros are dropped, so
/// `1500000000000000000` wei becomes `1.5` and whole amounts have no decimal point.
pub fn wei_to_ether(wei: U256) -> String {
    let formatted = format_ether(wei);
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Ether amount as `f64`, for metric export. Precision is lost beyond ~15 significant digits.
pub fn wei_to_ether_f64(wei: U256) -> f64 {
    ether_to_f64(&wei_to_ether(wei))
}

pub(crate) fn ether_to_f64(ether: &str) -> f64 {
    ether.parse::<f64>().unwrap_or(f64::NAN)
}

pub fn wei_to_f64(wei: U256) -> f64 {
    wei.to_string().parse::<f64>().unwrap_or(f64::NAN)
}
