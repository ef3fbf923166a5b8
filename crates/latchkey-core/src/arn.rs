//! Resource names.
//!
//! An [`Arn`] identifies a managed resource outside this layer (a state
//! machine, a secret namespace, a firewall, an externally supplied
//! function). Optional inputs use [`Arn::from_optional`]: a missing or
//! empty string means "not configured" and maps to `None`, never to an
//! empty `Arn` — conditional wiring branches on `Option`, not on string
//! emptiness.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// A validated resource name in `arn:partition:service:region:account:resource` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Arn(String);

impl Arn {
    /// Parse and validate a resource name.
    pub fn parse(s: &str) -> CoreResult<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidArn("empty string".to_string()));
        }
        if !trimmed.starts_with("arn:") {
            return Err(CoreError::InvalidArn(trimmed.to_string()));
        }
        // Resource part may itself contain colons; require the five
        // leading sections plus a non-empty remainder.
        let parts: Vec<&str> = trimmed.splitn(6, ':').collect();
        if parts.len() != 6 || parts[1].is_empty() || parts[2].is_empty() || parts[5].is_empty() {
            return Err(CoreError::InvalidArn(trimmed.to_string()));
        }
        Ok(Arn(trimmed.to_string()))
    }

    /// Parse an optional input. `None` and empty/whitespace strings both
    /// yield `None`; anything else must be a valid resource name.
    pub fn from_optional(value: Option<&str>) -> CoreResult<Option<Self>> {
        match value {
            None => Ok(None),
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => Self::parse(s).map(Some),
        }
    }

    /// The service section (third field) of the name.
    pub fn service(&self) -> &str {
        self.0.split(':').nth(2).unwrap_or("")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Arn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_state_machine_arn() {
        let arn = Arn::parse("arn:aws:states:eu-west-1:123456789012:stateMachine:granter").unwrap();
        assert_eq!(arn.service(), "states");
    }

    #[test]
    fn rejects_non_arn_strings() {
        assert!(Arn::parse("not-an-arn").is_err());
        assert!(Arn::parse("arn:aws:lambda").is_err());
        assert!(Arn::parse("").is_err());
    }

    #[test]
    fn optional_treats_empty_as_absent() {
        assert!(Arn::from_optional(None).unwrap().is_none());
        assert!(Arn::from_optional(Some("")).unwrap().is_none());
        assert!(Arn::from_optional(Some("   ")).unwrap().is_none());

        let arn = Arn::from_optional(Some("arn:aws:lambda:us-east-1:111122223333:function:approve"))
            .unwrap()
            .unwrap();
        assert_eq!(arn.service(), "lambda");
    }

    #[test]
    fn optional_still_rejects_malformed_input() {
        assert!(Arn::from_optional(Some("garbage")).is_err());
    }
}
