//! Values-file flag matcher

use once_cell::sync::Lazy;
use regex::Regex;

/// `-f` / `--values`, optionally followed by `=PATH`. Anchored on both ends,
/// so `-fvalues.yaml`, `--values-x` and `--values=` are not flags.
static VALUES_FLAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(-f|--values)(?:=(.+))?$").expect("valid regex"));

/// Classification of a single argv token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagMatch<'a> {
    /// Not a values-file flag; passes through untouched.
    NoMatch,
    /// `--values=PATH` / `-f=PATH`.
    Inline { flag: &'a str, value: &'a str },
    /// `--values` / `-f`; the path is the next token.
    NeedsValue { flag: &'a str },
}

pub fn match_flag(token: &str) -> FlagMatch<'_> {
    let Some(caps) = VALUES_FLAG.captures(token) else {
        return FlagMatch::NoMatch;
    };
    let flag = caps.get(1).map_or("", |m| m.as_str());
    match caps.get(2) {
        Some(value) => FlagMatch::Inline { flag, value: value.as_str() },
        None => FlagMatch::NeedsValue { flag },
    }
}
