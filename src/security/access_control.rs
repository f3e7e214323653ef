//! Bot token allowlist.
//!
//! An optional explicit set of tokens permitted through the proxy. With no
//! allowlist configured every token is accepted.

use std::collections::HashSet;

/// Token admission policy, fixed for the lifetime of the process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TokenAllowlist {
    /// No allowlist configured.
    #[default]
    Unrestricted,
    /// Only these tokens are admitted.
    Restricted(HashSet<String>),
}

impl TokenAllowlist {
    /// Build the policy from a comma-separated value.
    ///
    /// Entries are trimmed and empty entries dropped. An absent value, or one
    /// with no non-empty entries, yields [`TokenAllowlist::Unrestricted`].
    pub fn parse(raw: Option<&str>) -> Self {
        let tokens: HashSet<String> = raw
            .into_iter()
            .flat_map(|value| value.split(','))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect();

        if tokens.is_empty() {
            Self::Unrestricted
        } else {
            Self::Restricted(tokens)
        }
    }

    pub fn is_restricted(&self) -> bool {
        matches!(self, Self::Restricted(_))
    }

    /// Number of configured tokens (0 when unrestricted).
    pub fn len(&self) -> usize {
        match self {
            Self::Unrestricted => 0,
            Self::Restricted(tokens) => tokens.len(),
        }
    }

    /// Decide admission for a token taken from the request path.
    ///
    /// Comparison is exact and case-sensitive; the candidate is not trimmed.
    /// A restricted allowlist rejects requests with no extractable token.
    pub fn permits(&self, token: Option<&str>) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::Restricted(tokens) => token.is_some_and(|t| tokens.contains(t)),
        }
    }
}
