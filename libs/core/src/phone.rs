/// Default country calling code for bare national numbers.
pub const DEFAULT_COUNTRY_CODE: &str = "1";

/// Strip a destination down to digits and, when exactly 10 remain, prepend
/// the country code. Anything else (already-prefixed numbers, short codes,
/// international formats) passes through digit-stripped but otherwise
/// untouched. Carriers that want a `+` prefix add it themselves afterwards.
pub fn normalize_destination(raw: &str, country_code: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.len() == 10 {
        format!("{country_code}{digits}")
    } else {
        digits
    }
}
