use seqcore::{AttributeStore, ExecutionStatus, NodeError, SetupError, UserInterface};
use std::time::Duration;

pub const CHANNEL_ATTRIBUTE: &str = "channel";
pub const TIMEOUT_ATTRIBUTE: &str = "timeout";
pub const INPUT_VAR_ATTRIBUTE: &str = "inputVar";
pub const OUTPUT_VAR_ATTRIBUTE: &str = "outputVar";

/// Reads the optional `timeout` attribute (non-negative seconds).
pub(crate) fn timeout_attribute(
    attributes: &AttributeStore,
    default: Duration,
) -> Result<Duration, SetupError> {
    let Some(raw) = attributes.get(TIMEOUT_ATTRIBUTE) else {
        return Ok(default);
    };
    let invalid = |reason: &str| SetupError::InvalidAttribute {
        name: TIMEOUT_ATTRIBUTE.to_string(),
        value: raw.to_string(),
        reason: reason.to_string(),
    };
    let seconds: f64 = raw
        .trim()
        .parse()
        .map_err(|_| invalid("not a number of seconds"))?;
    if seconds < 0.0 {
        return Err(invalid("must not be negative"));
    }
    Duration::try_from_secs_f64(seconds).map_err(|_| invalid("out of range"))
}

/// Reads a required, non-empty attribute.
pub(crate) fn non_empty_attribute<'a>(
    attributes: &'a AttributeStore,
    name: &str,
) -> Result<&'a str, SetupError> {
    let value = attributes.require(name)?;
    if value.trim().is_empty() {
        return Err(SetupError::InvalidAttribute {
            name: name.to_string(),
            value: value.to_string(),
            reason: "must not be empty".to_string(),
        });
    }
    Ok(value)
}

/// Maps the result of one execution to a status, reporting either way.
pub(crate) fn report_outcome(
    ui: &dyn UserInterface,
    context: &str,
    result: Result<String, NodeError>,
) -> ExecutionStatus {
    match result {
        Ok(message) => {
            ui.report_message(&message);
            ExecutionStatus::Success
        }
        Err(e) => {
            ui.report_failure(&format!("{}: {}", context, e));
            ExecutionStatus::Failure
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_timeout(raw: &str) -> AttributeStore {
        AttributeStore::new().with(TIMEOUT_ATTRIBUTE, raw)
    }

    #[test]
    fn timeout_defaults_when_absent() {
        let d = timeout_attribute(&AttributeStore::new(), Duration::from_secs(2)).unwrap();
        assert_eq!(d, Duration::from_secs(2));
    }

    #[test]
    fn timeout_accepts_fractional_seconds() {
        let d = timeout_attribute(&with_timeout("0.25"), Duration::ZERO).unwrap();
        assert_eq!(d, Duration::from_millis(250));
        let d = timeout_attribute(&with_timeout("0"), Duration::from_secs(2)).unwrap();
        assert_eq!(d, Duration::ZERO);
    }

    #[test]
    fn timeout_rejects_negative_and_garbage() {
        for raw in ["-1", "soon", "NaN", "inf"] {
            assert!(
                matches!(
                    timeout_attribute(&with_timeout(raw), Duration::ZERO),
                    Err(SetupError::InvalidAttribute { .. })
                ),
                "accepted {}",
                raw
            );
        }
    }
}
