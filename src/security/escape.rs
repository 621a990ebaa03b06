use std::fmt;

/// PowerShell's escape character. It is also the string-literal escape, so
/// one rule covers both.
const ESCAPE: char = '`';
const SIGIL: char = '$';
/// PowerShell closes a double-quoted literal on any of these.
const DOUBLE_QUOTES: &[char] = &['"', '\u{201C}', '\u{201D}', '\u{201E}'];

/// A caller string made safe for interpolation inside a double-quoted
/// PowerShell literal.
///
/// Escaping is not idempotent: escaping an escaped value escapes it again.
/// Values only come out of [`escape`], so a template receives each argument
/// escaped exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscapedArgument(String);

impl EscapedArgument {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EscapedArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn escape(raw: &str) -> EscapedArgument {
    let escaped = raw
        .replace(ESCAPE, "``")
        .chars()
        .fold(String::with_capacity(raw.len()), |mut out, c| {
            if DOUBLE_QUOTES.contains(&c) {
                out.push(ESCAPE);
            }
            out.push(c);
            out
        })
        .replace(SIGIL, "`$");
    EscapedArgument(escaped)
}
