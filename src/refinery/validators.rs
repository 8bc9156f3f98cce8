// * Field Validators
// * One predicate (or normalizer) per column of the proxy table.
// * Input is the raw cell text: whitespace preserved, markup stripped.

use regex::Regex;
use std::sync::LazyLock;

// * Four dot-separated groups of 1-3 digits. No 0-255 range check.
static PATTERN_IP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\d{1,3}\.){3}\d{1,3}$").expect("Invalid IP regex"));

static PATTERN_PORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2,5}$").expect("Invalid port regex"));

static PATTERN_COUNTRY_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{2}$").expect("Invalid country code regex"));

// * ASCII word/space classes, matching the page's country names
static PATTERN_COUNTRY_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z](?-u:[\w\s])+$").expect("Invalid country name regex"));

pub fn is_ip(text: &str) -> bool {
    PATTERN_IP.is_match(text)
}

// * 2-5 digits that also fit a u16. "99999" matches the pattern but is rejected here.
pub fn parse_port(text: &str) -> Option<u16> {
    if !PATTERN_PORT.is_match(text) {
        return None;
    }
    text.parse::<u16>().ok()
}

pub fn is_country_code(text: &str) -> bool {
    PATTERN_COUNTRY_CODE.is_match(text)
}

pub fn is_country_name(text: &str) -> bool {
    PATTERN_COUNTRY_NAME.is_match(text)
}

// ? No fixed set of levels is published ("transparent", "anonymous", "elite proxy" seen so far)
pub fn is_anonymity(text: &str) -> bool {
    !text.is_empty()
}

// * Strict yes/no. Anything else is a miss and leaves the flag false.
pub fn parse_flag(text: &str) -> Option<bool> {
    match text {
        "yes" => Some(true),
        "no" => Some(false),
        _ => None,
    }
}

// TODO: require a time unit word ("seconds", "minutes", "hours") once the page format settles
pub fn is_last_checked(_text: &str) -> bool {
    true
}
