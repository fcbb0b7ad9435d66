use crate::inventory::RecordError;
use lazy_regex::regex;

/// Converts a locale formatted price into its integer digits: `5'990.00 руб.` -> `5990`.
pub fn normalize_price(raw: &str) -> String {
    let integer_part = raw.split_once('.').map_or(raw, |(integer, _)| integer);
    regex!(r"[^0-9]").replace_all(integer_part, "").into_owned()
}

pub fn parse_price(raw: &str) -> Result<u64, RecordError> {
    normalize_price(raw)
        .parse()
        .map_err(|_| RecordError::InvalidPrice {
            price: raw.to_string(),
        })
}
