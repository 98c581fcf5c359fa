//! Trigger expression parsing and evaluation
//!
//! A trigger is a declarative failure condition of the form
//! `<type> <target> <operator>: <expected text>`, e.g.
//! `url http://localhost:8080 contains: error`.

use crate::error::{Error, Result};
use std::fmt;

/// Kind of resource a trigger probes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Url,
    File,
    Ping,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Url => write!(f, "url"),
            ResourceKind::File => write!(f, "file"),
            ResourceKind::Ping => write!(f, "ping"),
        }
    }
}

/// Substring operator applied to the probe output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOp {
    Contains,
    NotContains,
}

impl fmt::Display for TriggerOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerOp::Contains => write!(f, "contains"),
            TriggerOp::NotContains => write!(f, "not-contains"),
        }
    }
}

/// A parsed trigger expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
    pub kind: ResourceKind,
    pub target: String,
    pub op: TriggerOp,
    pub expected: String,
}

impl Trigger {
    /// Parse a raw trigger string.
    ///
    /// The type and operator tokens are case-insensitive; the target is kept
    /// verbatim. The expected text is everything after the operator token,
    /// joined with single spaces, and may be empty.
    pub fn parse(raw: &str) -> Result<Trigger> {
        let tokens: Vec<&str> = raw.split_whitespace().collect();
        if tokens.len() < 3 {
            return Err(Error::TriggerSyntax(raw.to_string()));
        }

        let kind = match tokens[0].to_ascii_lowercase().as_str() {
            "url" => ResourceKind::Url,
            "file" => ResourceKind::File,
            "ping" => ResourceKind::Ping,
            _ => return Err(Error::InvalidTriggerType(tokens[0].to_string())),
        };

        let target = tokens[1].to_string();

        let op_token = tokens[2];
        let bare_op = op_token
            .strip_suffix(':')
            .ok_or_else(|| Error::InvalidTriggerOperator(op_token.to_string()))?;
        let op = match bare_op.to_ascii_lowercase().as_str() {
            "contains" => TriggerOp::Contains,
            "not-contains" => TriggerOp::NotContains,
            _ => return Err(Error::InvalidTriggerOperator(op_token.to_string())),
        };

        let expected = tokens[3..].join(" ");

        Ok(Trigger {
            kind,
            target,
            op,
            expected,
        })
    }

    /// Apply the contains/not-contains policy to the observed probe output.
    ///
    /// Returns `true` when the trigger fires, i.e. the application is deemed
    /// failing. Plain substring search; an empty expected string is always
    /// found.
    pub fn verdict(&self, observed: &str) -> bool {
        let found = observed.contains(&self.expected);
        match self.op {
            TriggerOp::Contains => found,
            TriggerOp::NotContains => !found,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url_trigger() {
        let trigger = Trigger::parse("url http://localhost:8080 contains: error").unwrap();
        assert_eq!(trigger.kind, ResourceKind::Url);
        assert_eq!(trigger.target, "http://localhost:8080");
        assert_eq!(trigger.op, TriggerOp::Contains);
        assert_eq!(trigger.expected, "error");
    }

    #[test]
    fn test_parse_case_insensitive_type_and_op() {
        let trigger = Trigger::parse("URL http://Example.com/Health Not-Contains: OK").unwrap();
        assert_eq!(trigger.kind, ResourceKind::Url);
        assert_eq!(trigger.op, TriggerOp::NotContains);
        // The target keeps its case
        assert_eq!(trigger.target, "http://Example.com/Health");
    }

    #[test]
    fn test_parse_multiword_expected_normalizes_whitespace() {
        let trigger = Trigger::parse("file /var/log/app.log contains: fatal   server  error").unwrap();
        assert_eq!(trigger.expected, "fatal server error");
    }

    #[test]
    fn test_parse_empty_expected() {
        let trigger = Trigger::parse("ping host.example.com contains:").unwrap();
        assert_eq!(trigger.expected, "");
    }

    #[test]
    fn test_parse_unknown_type() {
        let err = Trigger::parse("ftp host contains: x").unwrap_err();
        assert!(matches!(err, Error::InvalidTriggerType(t) if t == "ftp"));
    }

    #[test]
    fn test_parse_unknown_operator() {
        let err = Trigger::parse("url http://host matches: x").unwrap_err();
        assert!(matches!(err, Error::InvalidTriggerOperator(_)));
    }

    #[test]
    fn test_parse_operator_requires_colon() {
        let err = Trigger::parse("url http://host contains x").unwrap_err();
        assert!(matches!(err, Error::InvalidTriggerOperator(op) if op == "contains"));
    }

    #[test]
    fn test_parse_too_few_tokens() {
        assert!(matches!(
            Trigger::parse("url http://host"),
            Err(Error::TriggerSyntax(_))
        ));
        assert!(matches!(Trigger::parse(""), Err(Error::TriggerSyntax(_))));
    }

    #[test]
    fn test_verdict_decision_table() {
        let contains = Trigger::parse("file /tmp/app contains: error").unwrap();
        assert!(contains.verdict("fatal error in worker"));
        assert!(!contains.verdict("all good"));

        let not_contains = Trigger::parse("file /tmp/app not-contains: error").unwrap();
        assert!(!not_contains.verdict("fatal error in worker"));
        assert!(not_contains.verdict("all good"));
    }

    #[test]
    fn test_verdict_empty_expected_is_always_found() {
        let contains = Trigger::parse("file /tmp/app contains:").unwrap();
        assert!(contains.verdict("anything"));
        assert!(contains.verdict(""));

        let not_contains = Trigger::parse("file /tmp/app not-contains:").unwrap();
        assert!(!not_contains.verdict("anything"));
        assert!(!not_contains.verdict(""));
    }

    #[test]
    fn test_verdict_connection_refused_scenario() {
        let trigger = Trigger::parse("url http://host:777 contains: refused").unwrap();
        assert!(trigger.verdict("Connection refused"));
    }

    #[test]
    fn test_verdict_file_ok_scenario() {
        let trigger = Trigger::parse("file /tmp/app not-contains: OK").unwrap();
        assert!(!trigger.verdict("OK"));
    }

    #[test]
    fn test_verdict_ping_failure_scenario() {
        let trigger = Trigger::parse("ping host not-contains: OK").unwrap();
        assert!(trigger.verdict("FAILURE"));
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let raw = "url http://localhost:8080 contains: error";
        let first = Trigger::parse(raw).unwrap().verdict("an error occurred");
        let second = Trigger::parse(raw).unwrap().verdict("an error occurred");
        assert_eq!(first, second);
        assert!(first);
    }
}
