use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    #[error("expected H:MM:SS.fraction, got {parts} component(s)")]
    WrongShape { parts: usize },
    #[error("invalid {component} component {text:?}")]
    InvalidComponent {
        component: &'static str,
        text: String,
    },
}

// Time spans are written by the solver as "H:MM:SS.fffffff".
pub fn parse_runtime(text: &str) -> Result<f64, DurationError> {
    let parts: Vec<&str> = text.split(':').collect();
    if parts.len() != 3 {
        return Err(DurationError::WrongShape { parts: parts.len() });
    }

    let hours: i64 = component(parts[0], "hours")?;
    let minutes: i64 = component(parts[1], "minutes")?;
    let seconds: f64 = component(parts[2], "seconds")?;

    Ok(hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds)
}

fn component<T: std::str::FromStr>(text: &str, component: &'static str) -> Result<T, DurationError> {
    text.trim()
        .parse()
        .map_err(|_| DurationError::InvalidComponent {
            component,
            text: text.to_string(),
        })
}

#[test]
fn parses_hours_minutes_seconds() {
    assert_eq!(parse_runtime("0:01:30.5"), Ok(90.5));
    assert_eq!(parse_runtime("0:00:45.0"), Ok(45.0));
    assert_eq!(parse_runtime("2:03:04"), Ok(2.0 * 3600.0 + 3.0 * 60.0 + 4.0));
}

#[test]
fn parses_dotnet_timespan_precision() {
    let seconds = parse_runtime("00:00:01.2345678").unwrap();
    assert!((seconds - 1.2345678).abs() < 1e-9);
}

#[test]
fn rejects_wrong_number_of_parts() {
    assert_eq!(parse_runtime("90.5"), Err(DurationError::WrongShape { parts: 1 }));
    assert_eq!(parse_runtime("01:30.5"), Err(DurationError::WrongShape { parts: 2 }));
    assert_eq!(parse_runtime("0:0:01:30"), Err(DurationError::WrongShape { parts: 4 }));
    assert_eq!(parse_runtime(""), Err(DurationError::WrongShape { parts: 1 }));
}

#[test]
fn rejects_non_numeric_components() {
    assert!(matches!(
        parse_runtime("x:01:30.5"),
        Err(DurationError::InvalidComponent { component: "hours", .. })
    ));
    // A day prefix makes the hours component fractional.
    assert!(matches!(
        parse_runtime("1.02:00:00"),
        Err(DurationError::InvalidComponent { component: "hours", .. })
    ));
    assert!(matches!(
        parse_runtime("0:01:30.5.1"),
        Err(DurationError::InvalidComponent { component: "seconds", .. })
    ));
}

#[cfg(test)]
mod proptests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[quickcheck]
    fn well_formed_durations_sum_up(hours: u16, minutes: u8, millis: u16) -> bool {
        let minutes = minutes % 60;
        let seconds = (millis % 60_000) as f64 / 1000.0;
        let text = format!("{}:{:02}:{:06.3}", hours, minutes, seconds);
        let expected = hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds;
        match parse_runtime(&text) {
            Ok(parsed) => (parsed - expected).abs() < 1e-6,
            Err(_) => false,
        }
    }

    #[quickcheck]
    fn anything_without_two_colons_is_rejected(text: String) -> bool {
        if text.matches(':').count() == 2 {
            return true;
        }
        parse_runtime(&text).is_err()
    }
}
