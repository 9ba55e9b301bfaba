use std::fmt;

/// Separator between literal fragments, written the way log grep patterns are
const WILDCARD: &str = ".*";

/// A log-line pattern made of literal fragments that must appear in order.
///
/// `"failed to connect to peer.*Connection refused"` matches any line that
/// contains `failed to connect to peer` followed, anywhere later on the same
/// line, by `Connection refused`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogPattern {
    raw: String,
    fragments: Vec<String>,
}

impl LogPattern {
    pub fn new(pattern: &str) -> Self {
        let fragments = pattern
            .split(WILDCARD)
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect();
        Self {
            raw: pattern.to_string(),
            fragments,
        }
    }

    /// True when the pattern has no literal text to look for
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches(
        &self,
        line: &str,
    ) -> bool {
        if self.fragments.is_empty() {
            return false;
        }
        let mut rest = line;
        for fragment in &self.fragments {
            match rest.find(fragment.as_str()) {
                Some(pos) => rest = &rest[pos + fragment.len()..],
                None => return false,
            }
        }
        true
    }

    /// Scans only the last `look_back_lines` lines of `text`.
    ///
    /// Older output is ignored so a marker left by an earlier run outside the
    /// window cannot satisfy the wait.
    pub fn scan_recent(
        &self,
        text: &str,
        look_back_lines: usize,
    ) -> bool {
        let lines: Vec<&str> = text.lines().collect();
        let start = lines.len().saturating_sub(look_back_lines);
        lines[start..].iter().any(|line| self.matches(line))
    }
}

impl fmt::Display for LogPattern {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for LogPattern {
    fn from(pattern: &str) -> Self {
        LogPattern::new(pattern)
    }
}
