//! Ticker symbol normalization
//!
//! User input is accepted in any case with surrounding whitespace. A symbol
//! that already carries a recognized exchange suffix is kept as-is; anything
//! else is assumed to be an NSE symbol and gets the `.NS` suffix.

/// Exchange suffixes that are passed through unchanged
const EXCHANGE_SUFFIXES: &[&str] = &[".NS", ".BO"];

/// Default exchange suffix appended when none is present
const DEFAULT_SUFFIX: &str = ".NS";

/// Normalize a user-entered ticker symbol
pub fn normalize(ticker: &str) -> String {
    let sym = ticker.trim().to_uppercase();

    if EXCHANGE_SUFFIXES.iter().any(|suffix| sym.ends_with(suffix)) {
        return sym;
    }

    format!("{}{}", sym, DEFAULT_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appends_default_suffix() {
        assert_eq!(normalize("sbin"), "SBIN.NS");
        assert_eq!(normalize("RELIANCE"), "RELIANCE.NS");
    }

    #[test]
    fn test_trims_and_uppercases() {
        assert_eq!(normalize("  tcs \n"), "TCS.NS");
        assert_eq!(normalize(" infy.ns"), "INFY.NS");
    }

    #[test]
    fn test_keeps_recognized_suffixes() {
        assert_eq!(normalize("SBIN.NS"), "SBIN.NS");
        assert_eq!(normalize("sbin.bo"), "SBIN.BO");
    }
}
