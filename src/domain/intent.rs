use std::fmt;

/// What the classifier decided the request is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    Tool1,
    Tool2,
    Tool3,
    Unknown,
}

impl Intent {
    pub const TOOLS: [Intent; 3] = [Intent::Tool1, Intent::Tool2, Intent::Tool3];

    pub fn label(self) -> &'static str {
        match self {
            Intent::Tool1 => "tool1",
            Intent::Tool2 => "tool2",
            Intent::Tool3 => "tool3",
            Intent::Unknown => "unknown",
        }
    }

    /// Exact label match, ignoring case, whitespace and wrapping quotes.
    pub fn from_label(label: &str) -> Intent {
        let cleaned = label
            .trim()
            .trim_matches(|c: char| c == '"' || c == '\'' || c == '`' || c == '.')
            .to_ascii_lowercase();
        match cleaned.as_str() {
            "tool1" => Intent::Tool1,
            "tool2" => Intent::Tool2,
            "tool3" => Intent::Tool3,
            _ => Intent::Unknown,
        }
    }

    /// Reads a free-form model reply. An exact label wins; otherwise the reply
    /// must name exactly one tool label, anything else is `Unknown`.
    pub fn from_reply(reply: &str) -> Intent {
        let exact = Intent::from_label(reply);
        if exact != Intent::Unknown {
            return exact;
        }
        let lowered = reply.to_ascii_lowercase();
        let words: Vec<&str> = lowered
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        let mentioned: Vec<Intent> = Intent::TOOLS
            .into_iter()
            .filter(|tool| words.contains(&tool.label()))
            .collect();
        match mentioned.as_slice() {
            [only] => *only,
            _ => Intent::Unknown,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
