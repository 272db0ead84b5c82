//! Loggable client address.
//!
//! A dual-stack listener reports IPv4 clients as IPv4-mapped IPv6 addresses
//! (`::ffff:10.0.0.5`). For log grouping we want the IPv4 part. The match is
//! a coarse textual heuristic, not validation: any line holding at least
//! three colons matches, and the text after its last colon is taken as the
//! address. Never treat the result as a trusted identity.

use std::fmt;

/// Line terminators a match cannot cross.
const LINE_BREAKS: [char; 4] = ['\n', '\r', '\u{2028}', '\u{2029}'];

/// Returns the trailing segment of `raw` when it looks like
/// `<any>:<any>:<any>:<tail>`, or `raw` itself otherwise.
///
/// ```rust
/// use gqlveil::address::resolve;
///
/// assert_eq!(resolve("::ffff:10.0.0.5"), "10.0.0.5");
/// assert_eq!(resolve("10.0.0.5"), "10.0.0.5");
/// ```
pub fn resolve(raw: &str) -> &str {
    raw.split(LINE_BREAKS)
        .find(|line| line.matches(':').count() >= 3)
        .and_then(|line| line.rsplit_once(':'))
        .map_or(raw, |(_, tail)| tail)
}

/// A peer address alongside its resolved, loggable form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientAddress {
    raw: String,
    resolved: String,
}

impl ClientAddress {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let resolved = resolve(&raw).to_owned();
        Self { raw, resolved }
    }

    pub fn raw(&self) -> &str { &self.raw }
    pub fn resolved(&self) -> &str { &self.resolved }

    /// `true` when the heuristic picked a suffix out of the raw string.
    pub fn is_mapped(&self) -> bool {
        self.raw != self.resolved
    }
}

impl fmt::Display for ClientAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.resolved)
    }
}
