//! Flight submission payload and the immutable flight context it validates into.

use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::errors::{AssistantError, AssistantResult};

/// Categorical cause of a delay or cancellation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum DisruptionKind {
    /// No disruption reported.
    #[default]
    #[serde(alias = "none")]
    None,
    /// Adverse weather at or around the destination.
    #[serde(alias = "weather")]
    Weather,
    /// Aircraft technical issue.
    #[serde(alias = "technical")]
    Technical,
    /// Air traffic congestion.
    #[serde(alias = "congestion")]
    Congestion,
    /// Crew staffing shortage.
    #[serde(alias = "staffing")]
    Staffing,
}

impl DisruptionKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::None,
        Self::Weather,
        Self::Technical,
        Self::Congestion,
        Self::Staffing,
    ];

    /// Stable display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Weather => "Weather",
            Self::Technical => "Technical",
            Self::Congestion => "Congestion",
            Self::Staffing => "Staffing",
        }
    }

    /// Status derived from this disruption.
    #[must_use]
    pub const fn status(self) -> FlightStatus {
        match self {
            Self::None => FlightStatus::OnTime,
            Self::Weather | Self::Technical | Self::Congestion => FlightStatus::Delayed,
            Self::Staffing => FlightStatus::Cancelled,
        }
    }

    /// Whether any disruption is reported.
    #[must_use]
    pub const fn is_disrupted(self) -> bool {
        !matches!(self, Self::None)
    }
}

impl fmt::Display for DisruptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flight status as shown to the traveller.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum FlightStatus {
    /// Departing as scheduled.
    #[serde(rename = "On Time")]
    OnTime,
    /// Departing late.
    Delayed,
    /// Not operating.
    Cancelled,
}

impl FlightStatus {
    /// Stable display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OnTime => "On Time",
            Self::Delayed => "Delayed",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw flight details as submitted by the user.
///
/// Every field is kept as loosely typed as the form that produces it; use
/// [`FlightValidator::validate`] to obtain a [`FlightContext`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FlightSubmission {
    /// Flight number, free text (required).
    #[serde(default)]
    pub flight_number: String,
    /// Origin airport code (required).
    #[serde(default)]
    pub origin: String,
    /// Destination airport code (required).
    #[serde(default)]
    pub destination: String,
    /// Operating airline.
    #[serde(default)]
    pub airline: Option<String>,
    /// Scheduled date as `YYYY-MM-DD` (required).
    #[serde(default)]
    pub scheduled_date: Option<String>,
    /// Scheduled departure time as `HH:MM`.
    #[serde(default)]
    pub departure_time: Option<String>,
    /// Reported disruption.
    #[serde(default)]
    pub disruption: DisruptionKind,
}

impl FlightSubmission {
    /// Create a submission with the required fields.
    #[must_use]
    pub fn new(
        flight_number: impl Into<String>,
        origin: impl Into<String>,
        destination: impl Into<String>,
        scheduled_date: impl Into<String>,
    ) -> Self {
        Self {
            flight_number: flight_number.into(),
            origin: origin.into(),
            destination: destination.into(),
            scheduled_date: Some(scheduled_date.into()),
            ..Self::default()
        }
    }

    /// Set the operating airline.
    #[must_use]
    pub fn with_airline(mut self, airline: impl Into<String>) -> Self {
        self.airline = Some(airline.into());
        self
    }

    /// Set the scheduled departure time (`HH:MM`).
    #[must_use]
    pub fn with_departure_time(mut self, time: impl Into<String>) -> Self {
        self.departure_time = Some(time.into());
        self
    }

    /// Set the reported disruption.
    #[must_use]
    pub fn with_disruption(mut self, disruption: DisruptionKind) -> Self {
        self.disruption = disruption;
        self
    }
}

/// Immutable flight facts a conversation is anchored to.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct FlightContext {
    flight_number: String,
    origin: String,
    destination: String,
    airline: Option<String>,
    scheduled_date: NaiveDate,
    departure_time: NaiveTime,
    disruption: DisruptionKind,
    status: FlightStatus,
}

impl FlightContext {
    /// Label used when no airline was submitted.
    pub const UNKNOWN_AIRLINE: &'static str = "Unknown airline";

    /// Flight number.
    #[must_use]
    pub fn flight_number(&self) -> &str {
        &self.flight_number
    }

    /// Origin airport code.
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Destination airport code.
    #[must_use]
    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Operating airline, if submitted.
    #[must_use]
    pub fn airline(&self) -> Option<&str> {
        self.airline.as_deref()
    }

    /// Airline name, or a placeholder when none was submitted.
    #[must_use]
    pub fn airline_label(&self) -> &str {
        self.airline().unwrap_or(Self::UNKNOWN_AIRLINE)
    }

    /// Scheduled date.
    #[must_use]
    pub const fn scheduled_date(&self) -> NaiveDate {
        self.scheduled_date
    }

    /// Scheduled departure time.
    #[must_use]
    pub const fn departure_time(&self) -> NaiveTime {
        self.departure_time
    }

    /// Reported disruption.
    #[must_use]
    pub const fn disruption(&self) -> DisruptionKind {
        self.disruption
    }

    /// Status derived from the disruption.
    #[must_use]
    pub const fn status(&self) -> FlightStatus {
        self.status
    }
}

/// Turns [`FlightSubmission`]s into [`FlightContext`]s.
#[derive(Clone, Debug)]
pub struct FlightValidator {
    airport_code: Regex,
    default_departure: NaiveTime,
}

impl FlightValidator {
    /// Build a validator that fills missing departure times with `default_departure`.
    ///
    /// # Errors
    /// Returns an error if the airport code pattern fails to compile.
    pub fn new(default_departure: NaiveTime) -> AssistantResult<Self> {
        Ok(Self {
            airport_code: Regex::new(r"^[A-Z]{3}$")?,
            default_departure,
        })
    }

    /// Validate a submission.
    ///
    /// Airport codes are trimmed and upper-cased before checking.
    ///
    /// # Errors
    /// Returns [`AssistantError::Validation`] when a required field is missing or malformed.
    pub fn validate(&self, submission: &FlightSubmission) -> AssistantResult<FlightContext> {
        let flight_number = submission.flight_number.trim();
        if flight_number.is_empty() {
            return Err(AssistantError::Validation(
                "flight number is required".to_string(),
            ));
        }

        let origin = self.airport("origin", &submission.origin)?;
        let destination = self.airport("destination", &submission.destination)?;
        if origin == destination {
            return Err(AssistantError::Validation(
                "origin and destination must differ".to_string(),
            ));
        }

        let scheduled_date = match submission.scheduled_date.as_deref().map(str::trim) {
            None | Some("") => {
                return Err(AssistantError::Validation(
                    "scheduled date is required".to_string(),
                ));
            }
            Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|err| {
                AssistantError::Validation(format!("invalid scheduled date {raw:?}: {err}"))
            })?,
        };

        let departure_time = match submission.departure_time.as_deref().map(str::trim) {
            None | Some("") => self.default_departure,
            Some(raw) => parse_time(raw)?,
        };

        let airline = submission
            .airline
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_owned);

        Ok(FlightContext {
            flight_number: flight_number.to_owned(),
            origin,
            destination,
            airline,
            scheduled_date,
            departure_time,
            disruption: submission.disruption,
            status: submission.disruption.status(),
        })
    }

    fn airport(&self, field: &str, raw: &str) -> AssistantResult<String> {
        let code = raw.trim().to_ascii_uppercase();
        if code.is_empty() {
            return Err(AssistantError::Validation(format!("{field} is required")));
        }
        if !self.airport_code.is_match(&code) {
            return Err(AssistantError::Validation(format!(
                "{field} must be a 3-letter airport code, got {raw:?}"
            )));
        }
        Ok(code)
    }
}

fn parse_time(raw: &str) -> AssistantResult<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|err| AssistantError::Validation(format!("invalid departure time {raw:?}: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> FlightValidator {
        FlightValidator::new(NaiveTime::from_hms_opt(8, 0, 0).unwrap()).unwrap()
    }

    #[test]
    fn test_status_derivation() {
        assert_eq!(DisruptionKind::None.status(), FlightStatus::OnTime);
        assert_eq!(DisruptionKind::Weather.status(), FlightStatus::Delayed);
        assert_eq!(DisruptionKind::Technical.status(), FlightStatus::Delayed);
        assert_eq!(DisruptionKind::Congestion.status(), FlightStatus::Delayed);
        assert_eq!(DisruptionKind::Staffing.status(), FlightStatus::Cancelled);
    }

    #[test]
    fn test_validate_normalizes_fields() {
        let submission = FlightSubmission::new(" AA1234 ", "jfk", " lax ", "2024-05-01")
            .with_airline("  ")
            .with_disruption(DisruptionKind::Weather);
        let ctx = validator().validate(&submission).unwrap();
        assert_eq!(ctx.flight_number(), "AA1234");
        assert_eq!(ctx.origin(), "JFK");
        assert_eq!(ctx.destination(), "LAX");
        assert_eq!(ctx.airline(), None);
        assert_eq!(ctx.airline_label(), FlightContext::UNKNOWN_AIRLINE);
        assert_eq!(ctx.departure_time().to_string(), "08:00:00");
        assert_eq!(ctx.status(), FlightStatus::Delayed);
    }

    #[test]
    fn test_validate_rejects_missing_fields() {
        let v = validator();
        let missing_number = FlightSubmission::new("", "JFK", "LAX", "2024-05-01");
        let missing_origin = FlightSubmission::new("AA1", "", "LAX", "2024-05-01");
        let missing_destination = FlightSubmission::new("AA1", "JFK", "", "2024-05-01");
        let mut missing_date = FlightSubmission::new("AA1", "JFK", "LAX", "");
        for submission in [&missing_number, &missing_origin, &missing_destination, &missing_date] {
            assert!(matches!(
                v.validate(submission),
                Err(AssistantError::Validation(_))
            ));
        }
        missing_date.scheduled_date = None;
        assert!(v.validate(&missing_date).is_err());
    }

    #[test]
    fn test_validate_rejects_malformed_values() {
        let v = validator();
        let bad_code = FlightSubmission::new("AA1", "JFK1", "LAX", "2024-05-01");
        let same_airports = FlightSubmission::new("AA1", "JFK", "jfk", "2024-05-01");
        let bad_date = FlightSubmission::new("AA1", "JFK", "LAX", "05/01/2024");
        let bad_time =
            FlightSubmission::new("AA1", "JFK", "LAX", "2024-05-01").with_departure_time("25:99");
        for submission in [&bad_code, &same_airports, &bad_date, &bad_time] {
            assert!(v.validate(submission).is_err());
        }
    }

    #[test]
    fn test_validate_accepts_free_text_flight_number() {
        let submission =
            FlightSubmission::new("Charter 2024 Spring Special", "JFK", "LAX", "2024-05-01");
        let ctx = validator().validate(&submission).unwrap();
        assert_eq!(ctx.flight_number(), "Charter 2024 Spring Special");

        let long_number = "X".repeat(200);
        let submission = FlightSubmission::new(long_number.as_str(), "JFK", "LAX", "2024-05-01");
        assert_eq!(
            validator().validate(&submission).unwrap().flight_number(),
            long_number
        );
    }

    #[test]
    fn test_disruption_deserialization() {
        let lower: DisruptionKind = serde_json::from_str("\"weather\"").unwrap();
        let title: DisruptionKind = serde_json::from_str("\"Staffing\"").unwrap();
        assert_eq!(lower, DisruptionKind::Weather);
        assert_eq!(title, DisruptionKind::Staffing);
        assert!(serde_json::from_str::<DisruptionKind>("\"volcano\"").is_err());
        assert_eq!(DisruptionKind::Technical.to_string(), "Technical");
    }
}
