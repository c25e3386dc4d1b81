//! Ordered keyword rules that turn a question into a canned answer.
//!
//! Rules are evaluated top to bottom against the lower-cased question and the
//! first rule with a matching keyword wins, even when a later rule would also
//! match. The last rule has no keywords and always matches.

use std::fmt;

use chrono::{NaiveTime, TimeDelta};
use serde::Serialize;

use crate::core::config::EngineConfig;
use crate::core::flight::{DisruptionKind, FlightContext};

/// Weather reported at the destination when the flight is weather-disrupted.
pub const ADVERSE_WEATHER: &str = "thunderstorms with heavy rain and wind gusts up to 45 mph";
/// Weather reported at the destination otherwise.
pub const CLEAR_WEATHER: &str = "clear with a temperature of 75°F and light winds";
/// Appended to weather answers when storms are disrupting operations.
pub const NETWORK_IMPACT: &str =
    "These conditions are affecting flight operations across the network, so further delays are possible.";
/// Departure time offered for the next-day alternative.
const ALTERNATIVE_DEPARTURE: &str = "08:00";

/// Which rule answered a question.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// Delay / on-time status.
    Status,
    /// Destination weather.
    Weather,
    /// Alternative flights.
    Alternatives,
    /// Operating airline.
    Airline,
    /// Airport arrival advice.
    Arrival,
    /// Scheduled departure.
    DepartureTime,
    /// Generic offer of help.
    Fallback,
}

impl RuleKind {
    /// Stable string form for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Weather => "weather",
            Self::Alternatives => "alternatives",
            Self::Airline => "airline",
            Self::Arrival => "arrival",
            Self::DepartureTime => "departure_time",
            Self::Fallback => "fallback",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type Template = fn(&ResponseEngine, &FlightContext) -> String;

/// One entry of the rule table.
struct Rule {
    kind: RuleKind,
    keywords: &'static [&'static str],
    template: Template,
}

impl Rule {
    fn matches(&self, question: &str) -> bool {
        self.keywords.is_empty() || self.keywords.iter().any(|kw| question.contains(kw))
    }
}

static RULES: [Rule; 7] = [
    Rule {
        kind: RuleKind::Status,
        keywords: &["delay", "on time"],
        template: ResponseEngine::status,
    },
    Rule {
        kind: RuleKind::Weather,
        keywords: &["weather"],
        template: ResponseEngine::weather,
    },
    Rule {
        kind: RuleKind::Alternatives,
        keywords: &["alternative", "other flight"],
        template: ResponseEngine::alternatives,
    },
    Rule {
        kind: RuleKind::Airline,
        keywords: &["airline"],
        template: ResponseEngine::airline,
    },
    Rule {
        kind: RuleKind::Arrival,
        keywords: &["arrive", "airport"],
        template: ResponseEngine::arrival,
    },
    Rule {
        kind: RuleKind::DepartureTime,
        keywords: &["time", "when"],
        template: ResponseEngine::departure_time,
    },
    Rule {
        kind: RuleKind::Fallback,
        keywords: &[],
        template: ResponseEngine::fallback,
    },
];

fn find_rule(question: &str) -> &'static Rule {
    let lowered = question.to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.matches(&lowered))
        .unwrap_or(&RULES[RULES.len() - 1])
}

/// Which rule would answer `question`.
#[must_use]
pub fn classify(question: &str) -> RuleKind {
    find_rule(question).kind
}

/// Answer `question` with the default engine settings.
#[must_use]
pub fn respond(question: &str, context: &FlightContext) -> String {
    ResponseEngine::default().respond(question, context)
}

/// Stateless rule engine.
///
/// Holds only settings; the same question and flight always give the same answer.
#[derive(Clone, Debug)]
pub struct ResponseEngine {
    arrival_lead_hours: u32,
}

impl Default for ResponseEngine {
    fn default() -> Self {
        Self {
            arrival_lead_hours: 2,
        }
    }
}

impl ResponseEngine {
    /// Build an engine from configuration.
    #[must_use]
    pub const fn new(config: &EngineConfig) -> Self {
        Self {
            arrival_lead_hours: config.arrival_lead_hours,
        }
    }

    /// Answer a question about a flight.
    #[must_use]
    pub fn respond(&self, question: &str, context: &FlightContext) -> String {
        (find_rule(question).template)(self, context)
    }
}

// Every template has the `Template` signature; only `arrival` reads engine settings.
#[allow(clippy::unused_self)]
impl ResponseEngine {
    fn status(&self, ctx: &FlightContext) -> String {
        let flight = ctx.flight_number();
        let clause = match ctx.disruption() {
            DisruptionKind::None => {
                return format!(
                    "Good news! Your flight {flight} is currently on time. No delays are expected, and I'll notify you if there are any changes."
                );
            }
            DisruptionKind::Weather => {
                "Severe weather along the route is expected to delay departure by approximately 2 hours."
            }
            DisruptionKind::Technical => {
                "A technical inspection of the aircraft is expected to delay departure by approximately 1.5 hours."
            }
            DisruptionKind::Congestion => {
                "Air traffic congestion is expected to delay departure by approximately 1 hour."
            }
            DisruptionKind::Staffing => {
                "The flight has been cancelled because of crew shortages. I can help you rebook on the next available flight at no additional cost."
            }
        };
        format!(
            "Your flight {flight} is currently {} due to a {} disruption. {clause}",
            ctx.status(),
            ctx.disruption()
        )
    }

    fn weather(&self, ctx: &FlightContext) -> String {
        if ctx.disruption() == DisruptionKind::Weather {
            format!(
                "The current weather at {} is {ADVERSE_WEATHER}. {NETWORK_IMPACT}",
                ctx.destination()
            )
        } else {
            format!("The current weather at {} is {CLEAR_WEATHER}.", ctx.destination())
        }
    }

    fn alternatives(&self, ctx: &FlightContext) -> String {
        if !ctx.disruption().is_disrupted() {
            return format!(
                "Flight {} is on schedule, so there's no need to change your plans. I can still search for alternative flights from {} to {} if you'd like.",
                ctx.flight_number(),
                ctx.origin(),
                ctx.destination()
            );
        }
        let day = ctx
            .scheduled_date()
            .succ_opt()
            .map_or_else(|| "the following day".to_string(), |d| d.format("%Y-%m-%d").to_string());
        format!(
            "Since flight {} is {}, I found an alternative: a {} flight from {} to {} departing tomorrow morning ({day}) at {ALTERNATIVE_DEPARTURE}. Would you like me to check seat availability?",
            ctx.flight_number(),
            ctx.status().as_str().to_lowercase(),
            ctx.airline_label(),
            ctx.origin(),
            ctx.destination()
        )
    }

    fn airline(&self, ctx: &FlightContext) -> String {
        format!(
            "You're flying with {} on flight {}.",
            ctx.airline_label(),
            ctx.flight_number()
        )
    }

    fn arrival(&self, ctx: &FlightContext) -> String {
        let hours = self.arrival_lead_hours;
        let unit = if hours == 1 { "hour" } else { "hours" };
        let departure = ctx.departure_time();
        format!(
            "For your flight from {} to {}, we recommend arriving at the airport at least {hours} {unit} before your scheduled departure time of {}, so plan to be there by {}.",
            ctx.origin(),
            ctx.destination(),
            hhmm(departure),
            hhmm(self.arrive_by(departure))
        )
    }

    fn arrive_by(&self, departure: NaiveTime) -> NaiveTime {
        TimeDelta::try_hours(i64::from(self.arrival_lead_hours))
            .map_or(departure, |lead| departure.overflowing_sub_signed(lead).0)
    }

    fn departure_time(&self, ctx: &FlightContext) -> String {
        format!(
            "Flight {} is scheduled to depart at {} on {}.",
            ctx.flight_number(),
            hhmm(ctx.departure_time()),
            ctx.scheduled_date().format("%Y-%m-%d")
        )
    }

    fn fallback(&self, ctx: &FlightContext) -> String {
        format!(
            "I'm here to help with your {} flight {} from {} to {}. Is there anything specific you'd like to know?",
            ctx.airline_label(),
            ctx.flight_number(),
            ctx.origin(),
            ctx.destination()
        )
    }
}

fn hhmm(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}
