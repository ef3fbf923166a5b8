//! Recurrence schedule expressions.
//!
//! Two forms are accepted: `rate(N minutes|hours)` and `cron(...)` with
//! a six-field cron body. The expression round-trips unchanged into the
//! manifest; this layer only validates shape.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// A parsed recurrence expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Schedule {
    Rate { minutes: u32 },
    Cron { expression: String },
}

impl Schedule {
    pub fn parse(expr: &str) -> CoreResult<Self> {
        let expr = expr.trim();
        if let Some(body) = strip_call(expr, "rate") {
            return parse_rate(expr, body);
        }
        if let Some(body) = strip_call(expr, "cron") {
            let fields = body.split_whitespace().count();
            if fields != 6 {
                return Err(CoreError::InvalidSchedule(format!(
                    "{expr}: cron body must have 6 fields, got {fields}"
                )));
            }
            return Ok(Schedule::Cron {
                expression: body.to_string(),
            });
        }
        Err(CoreError::InvalidSchedule(expr.to_string()))
    }

    /// Render back to the `rate(...)`/`cron(...)` string form.
    pub fn expression(&self) -> String {
        match self {
            Schedule::Rate { minutes: 1 } => "rate(1 minute)".to_string(),
            Schedule::Rate { minutes } => format!("rate({minutes} minutes)"),
            Schedule::Cron { expression } => format!("cron({expression})"),
        }
    }
}

fn strip_call<'a>(expr: &'a str, name: &str) -> Option<&'a str> {
    expr.strip_prefix(name)?
        .strip_prefix('(')?
        .strip_suffix(')')
}

fn parse_rate(expr: &str, body: &str) -> CoreResult<Schedule> {
    let invalid = || CoreError::InvalidSchedule(expr.to_string());
    let (count, unit) = body.trim().split_once(' ').ok_or_else(invalid)?;
    let count: u32 = count.parse().map_err(|_| invalid())?;
    if count == 0 {
        return Err(invalid());
    }
    let minutes = match unit.trim() {
        "minute" | "minutes" => count,
        "hour" | "hours" => count.checked_mul(60).ok_or_else(invalid)?,
        _ => return Err(invalid()),
    };
    Ok(Schedule::Rate { minutes })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rate_minutes() {
        assert_eq!(
            Schedule::parse("rate(5 minutes)").unwrap(),
            Schedule::Rate { minutes: 5 }
        );
        assert_eq!(
            Schedule::parse("rate(1 minute)").unwrap(),
            Schedule::Rate { minutes: 1 }
        );
    }

    #[test]
    fn parses_rate_hours_as_minutes() {
        assert_eq!(
            Schedule::parse("rate(2 hours)").unwrap(),
            Schedule::Rate { minutes: 120 }
        );
    }

    #[test]
    fn parses_six_field_cron() {
        let s = Schedule::parse("cron(0 12 * * ? *)").unwrap();
        assert_eq!(s.expression(), "cron(0 12 * * ? *)");
    }

    #[test]
    fn rejects_malformed_expressions() {
        assert!(Schedule::parse("every 5 minutes").is_err());
        assert!(Schedule::parse("rate(0 minutes)").is_err());
        assert!(Schedule::parse("rate(5 fortnights)").is_err());
        assert!(Schedule::parse("rate(100000000 hours)").is_err());
        assert!(Schedule::parse("cron(0 12 * *)").is_err());
    }

    #[test]
    fn rate_round_trips() {
        let s = Schedule::parse("rate(5 minutes)").unwrap();
        assert_eq!(s.expression(), "rate(5 minutes)");
        let s = Schedule::parse("rate(1 minute)").unwrap();
        assert_eq!(s.expression(), "rate(1 minute)");
    }
}
