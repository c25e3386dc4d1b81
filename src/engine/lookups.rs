//! Canned travel-desk lookups: airport weather, flight status and alternative routes.
//!
//! Every answer comes from fixed tables keyed by airport code or derived from
//! the flight context, so the same input always gives the same report.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::core::flight::{DisruptionKind, FlightContext, FlightStatus};

/// Likelihood that conditions at an airport delay departures.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum DelayRisk {
    /// Normal operations.
    Low,
    /// Some delays likely.
    Moderate,
    /// Widespread delays likely.
    High,
    /// Airport not covered by the table.
    Unknown,
}

impl DelayRisk {
    /// Stable display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
            Self::Unknown => "Unknown",
        }
    }
}

struct AirportConditions {
    code: &'static str,
    condition: &'static str,
    temperature: &'static str,
    wind: &'static str,
    risk: DelayRisk,
}

static AIRPORT_CONDITIONS: [AirportConditions; 5] = [
    AirportConditions {
        code: "JFK",
        condition: "Clear",
        temperature: "72°F",
        wind: "5mph NE",
        risk: DelayRisk::Low,
    },
    AirportConditions {
        code: "LAX",
        condition: "Sunny",
        temperature: "82°F",
        wind: "8mph W",
        risk: DelayRisk::Low,
    },
    AirportConditions {
        code: "ORD",
        condition: "Overcast",
        temperature: "65°F",
        wind: "12mph NW",
        risk: DelayRisk::Moderate,
    },
    AirportConditions {
        code: "DFW",
        condition: "Thunderstorms",
        temperature: "75°F",
        wind: "20mph S",
        risk: DelayRisk::High,
    },
    AirportConditions {
        code: "ATL",
        condition: "Rain",
        temperature: "70°F",
        wind: "15mph SE",
        risk: DelayRisk::Moderate,
    },
];

static UNLISTED_AIRPORT: AirportConditions = AirportConditions {
    code: "",
    condition: "Unknown",
    temperature: "70°F",
    wind: "10mph",
    risk: DelayRisk::Unknown,
};

/// Connection hub used for the connecting option, keyed by origin.
const CONNECTION_HUBS: [(&str, &str); 5] = [
    ("JFK", "BOS"),
    ("LAX", "SFO"),
    ("ORD", "DTW"),
    ("DFW", "IAH"),
    ("ATL", "CLT"),
];
const DEFAULT_HUB: &str = "DCA";

/// Nearby airport used for the alternative-airport option, keyed by destination.
const NEARBY_AIRPORTS: [(&str, &str); 5] = [
    ("JFK", "LGA"),
    ("LAX", "BUR"),
    ("ORD", "MDW"),
    ("DFW", "DAL"),
    ("ATL", "PDK"),
];

/// Weather report for one airport.
#[derive(Clone, Debug, Serialize)]
pub struct AirportWeather {
    /// Upper-cased airport code.
    pub airport: String,
    /// When the report was produced.
    pub observed_at: DateTime<Utc>,
    /// Sky condition.
    pub condition: &'static str,
    /// Temperature.
    pub temperature: &'static str,
    /// Wind speed and direction.
    pub wind: &'static str,
    /// Delay risk from the conditions.
    pub delay_risk: DelayRisk,
    /// One-line human summary.
    pub summary: String,
}

/// Look up the conditions at `airport_code`.
///
/// Codes are trimmed and upper-cased; airports outside the table get a
/// neutral report with [`DelayRisk::Unknown`].
#[must_use]
pub fn airport_weather(airport_code: &str, observed_at: DateTime<Utc>) -> AirportWeather {
    let airport = airport_code.trim().to_ascii_uppercase();
    let conditions = AIRPORT_CONDITIONS
        .iter()
        .find(|entry| entry.code == airport)
        .unwrap_or(&UNLISTED_AIRPORT);
    let summary = format!(
        "Weather at {airport} is {} with {}. Wind: {}. Delay risk: {}.",
        conditions.condition,
        conditions.temperature,
        conditions.wind,
        conditions.risk.as_str()
    );
    AirportWeather {
        airport,
        observed_at,
        condition: conditions.condition,
        temperature: conditions.temperature,
        wind: conditions.wind,
        delay_risk: conditions.risk,
        summary,
    }
}

/// Status report for one flight.
#[derive(Clone, Debug, Serialize)]
pub struct FlightStatusReport {
    /// Flight number.
    pub flight_number: String,
    /// `"{origin} to {destination}"`.
    pub route: String,
    /// Scheduled date.
    pub date: NaiveDate,
    /// Derived status.
    pub status: FlightStatus,
    /// Reported disruption.
    pub disruption: DisruptionKind,
    /// Expected delay; absent when the flight is cancelled.
    pub predicted_delay_minutes: Option<u32>,
    /// Suggested next step for the traveller.
    pub recommendation: &'static str,
}

const fn expected_delay_minutes(disruption: DisruptionKind) -> Option<u32> {
    match disruption {
        DisruptionKind::None => Some(0),
        DisruptionKind::Weather => Some(120),
        DisruptionKind::Technical => Some(90),
        DisruptionKind::Congestion => Some(60),
        DisruptionKind::Staffing => None,
    }
}

/// Report the status of a flight from its disruption.
#[must_use]
pub fn flight_status(flight: &FlightContext) -> FlightStatusReport {
    let predicted_delay_minutes = expected_delay_minutes(flight.disruption());
    let recommendation = match predicted_delay_minutes {
        None => "Rebook on an alternative flight",
        Some(minutes) if minutes < 30 => "Monitor flight status",
        Some(_) => "Consider alternative arrangements",
    };
    FlightStatusReport {
        flight_number: flight.flight_number().to_owned(),
        route: format!("{} to {}", flight.origin(), flight.destination()),
        date: flight.scheduled_date(),
        status: flight.status(),
        disruption: flight.disruption(),
        predicted_delay_minutes,
        recommendation,
    }
}

/// One leg of a connecting itinerary.
#[derive(Clone, Debug, Serialize)]
pub struct RouteLeg {
    /// Flight number.
    pub flight: String,
    /// Departure airport.
    pub from: String,
    /// Arrival airport.
    pub to: String,
    /// Departure, relative to now.
    pub departure: &'static str,
}

/// A way to reach the destination other than the booked flight.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RouteOption {
    /// Non-stop flight on another carrier.
    DirectFlight {
        /// Flight number.
        flight: String,
        /// Operating airline.
        airline: &'static str,
        /// Departure, relative to now.
        departure: &'static str,
        /// Arrival, relative to now.
        arrival: &'static str,
        /// Fare difference.
        price_difference: &'static str,
        /// Seats left.
        availability: &'static str,
    },
    /// Two legs through a hub.
    Connection {
        /// Legs in travel order.
        legs: Vec<RouteLeg>,
        /// Operating airline.
        airline: &'static str,
        /// Door-to-door time.
        total_travel_time: &'static str,
        /// Fare difference.
        price_difference: &'static str,
        /// Seats left.
        availability: &'static str,
    },
    /// Flight into an airport near the destination.
    AlternativeAirport {
        /// Flight number.
        flight: String,
        /// Operating airline.
        airline: &'static str,
        /// Departure, relative to now.
        departure: &'static str,
        /// Airport the flight lands at.
        arrival_airport: String,
        /// Distance from the booked destination.
        distance_to_original: &'static str,
        /// Ground options onward.
        ground_transport: &'static str,
        /// Fare difference.
        price_difference: &'static str,
        /// Seats left.
        availability: &'static str,
    },
}

/// Alternatives for one flight.
#[derive(Clone, Debug, Serialize)]
pub struct AlternativeRoutes {
    /// Booked flight number.
    pub original_flight: String,
    /// Origin airport code.
    pub origin: String,
    /// Destination airport code.
    pub destination: String,
    /// Options, fastest first.
    pub alternatives: Vec<RouteOption>,
    /// Which option to take.
    pub recommendation: &'static str,
}

/// Numeric part of a flight number with a two-letter carrier prefix.
fn flight_digits(flight_number: &str) -> Option<u32> {
    let (carrier, digits) = flight_number.split_at_checked(2)?;
    if !carrier.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    digits.parse().ok()
}

/// Build `{carrier}{digits}` from the booked number, or `fallback` when it has no usable digits.
fn sibling_flight(
    digits: Option<u32>,
    carrier: &str,
    derive: impl FnOnce(u32) -> Option<u32>,
    fallback: &str,
) -> String {
    digits
        .and_then(derive)
        .map_or_else(|| fallback.to_owned(), |n| format!("{carrier}{n}"))
}

fn table_lookup(table: &[(&'static str, &'static str)], code: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(key, _)| *key == code)
        .map(|(_, value)| *value)
}

/// Suggest direct, connecting and nearby-airport alternatives for a flight.
#[must_use]
pub fn alternative_routes(flight: &FlightContext) -> AlternativeRoutes {
    let origin = flight.origin();
    let destination = flight.destination();
    let digits = flight_digits(flight.flight_number());
    let hub = table_lookup(&CONNECTION_HUBS, origin).unwrap_or(DEFAULT_HUB);

    let direct = RouteOption::DirectFlight {
        flight: sibling_flight(digits, "DL", |n| n.checked_add(100), "DL2532"),
        airline: "Delta Air Lines",
        departure: "2 hours from now",
        arrival: "4 hours from now",
        price_difference: "+$150",
        availability: "6 seats left",
    };
    let connection = RouteOption::Connection {
        legs: vec![
            RouteLeg {
                flight: sibling_flight(digits, "UA", |n| n.checked_sub(50), "UA1422"),
                from: origin.to_owned(),
                to: hub.to_owned(),
                departure: "1.5 hours from now",
            },
            RouteLeg {
                flight: sibling_flight(digits, "UA", |n| n.checked_add(75), "UA1575"),
                from: hub.to_owned(),
                to: destination.to_owned(),
                departure: "4 hours from now",
            },
        ],
        airline: "United Airlines",
        total_travel_time: "6.5 hours",
        price_difference: "+$50",
        availability: "12 seats left",
    };
    let nearby = RouteOption::AlternativeAirport {
        flight: sibling_flight(digits, "AA", |n| n.checked_add(200), "AA3689"),
        airline: "American Airlines",
        departure: "3 hours from now",
        arrival_airport: table_lookup(&NEARBY_AIRPORTS, destination)
            .unwrap_or(destination)
            .to_owned(),
        distance_to_original: "25 miles",
        ground_transport: "Taxi, Shuttle, Rideshare available",
        price_difference: "-$75",
        availability: "2 seats left",
    };

    AlternativeRoutes {
        original_flight: flight.flight_number().to_owned(),
        origin: origin.to_owned(),
        destination: destination.to_owned(),
        alternatives: vec![direct, connection, nearby],
        recommendation: "We recommend the direct Delta flight as the fastest option to your destination.",
    }
}
