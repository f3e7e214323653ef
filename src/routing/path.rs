//! Bot API path parsing.
//!
//! The upstream protocol addresses every call as `/bot<token>/<method>`.
//! Parsing is a literal prefix check followed by a scan to the next `/`;
//! no regex is involved.

/// Literal prefix of every Bot API path.
pub const BOT_PREFIX: &str = "/bot";

/// Paths answered locally with the health payload.
pub const HEALTH_PATHS: [&str; 2] = ["/", "/health"];

/// Where an inbound path should go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestTarget<'a> {
    /// Local health probe.
    Health,
    /// Forward to the upstream API.
    Bot(BotPath<'a>),
    /// Neither; rejected with 400.
    Invalid,
}

/// Classify a request path. Health paths win over the bot prefix.
pub fn classify(path: &str) -> RequestTarget<'_> {
    if HEALTH_PATHS.contains(&path) {
        return RequestTarget::Health;
    }
    match BotPath::parse(path) {
        Some(bot) => RequestTarget::Bot(bot),
        None => RequestTarget::Invalid,
    }
}

/// Path form safe for logs: bot tokens are replaced.
pub fn loggable_path(path: &str) -> String {
    match BotPath::parse(path) {
        Some(bot) => bot.redacted(),
        None => path.to_string(),
    }
}

/// A path split into its token and method segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BotPath<'a> {
    token: Option<&'a str>,
    method: Option<&'a str>,
}

impl<'a> BotPath<'a> {
    /// Parse a path that starts with `/bot`. Returns `None` otherwise.
    ///
    /// The token is everything between the prefix and the next `/`. A path
    /// with no separator after the prefix, or with an empty token, carries
    /// no extractable token.
    pub fn parse(path: &'a str) -> Option<Self> {
        let rest = path.strip_prefix(BOT_PREFIX)?;
        let parsed = match rest.split_once('/') {
            Some((token, method)) if !token.is_empty() => Self {
                token: Some(token),
                method: Some(method),
            },
            _ => Self {
                token: None,
                method: None,
            },
        };
        Some(parsed)
    }

    /// The bot token, when the path has the `/bot<token>/...` shape.
    pub fn token(&self) -> Option<&'a str> {
        self.token
    }

    /// Everything after the token separator; may be empty.
    pub fn method(&self) -> Option<&'a str> {
        self.method
    }

    /// Path form safe for logs: the token is never printed.
    pub fn redacted(&self) -> String {
        match self.method {
            Some(method) => format!("{BOT_PREFIX}<redacted>/{method}"),
            None => format!("{BOT_PREFIX}<redacted>"),
        }
    }
}
