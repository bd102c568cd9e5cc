use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

/// SR numbers are nine ASCII digits standing on their own; longer runs such
/// as phone numbers never match. Boundaries are ASCII-only so full-width or
/// other Unicode digits can't form or border a match.
static CASE_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u:\b)[0-9]{9}(?-u:\b)").expect("case number pattern is valid")
});

/// A validated support case (SR) number.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CaseNumber(String);

impl CaseNumber {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CaseNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CaseNumber {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match extract_case_number(trimmed) {
            Some(number) if number.as_str() == trimmed => Ok(number),
            _ => anyhow::bail!("{} is not a valid case number", s),
        }
    }
}

/// Find the first case number in free-form text.
pub fn extract_case_number(text: &str) -> Option<CaseNumber> {
    CASE_NUMBER
        .find(text)
        .map(|m| CaseNumber(m.as_str().to_string()))
}

/// Remove the first occurrence of `token` from `text` and trim what is left.
/// Text without the token comes back trimmed but otherwise unchanged.
pub fn strip_command(token: &str, text: &str) -> String {
    match text.find(token) {
        Some(pos) => {
            let before = text[..pos].trim();
            let after = text[pos + token.len()..].trim();
            match (before.is_empty(), after.is_empty()) {
                (true, _) => after.to_string(),
                (false, true) => before.to_string(),
                (false, false) => format!("{} {}", before, after),
            }
        }
        None => text.trim().to_string(),
    }
}
