//! Deterministic response engine and travel-desk lookups.

pub mod lookups;
pub mod responder;
pub mod rules;

pub use lookups::{
    AirportWeather, AlternativeRoutes, DelayRisk, FlightStatusReport, RouteLeg, RouteOption,
    airport_weather, alternative_routes, flight_status,
};
pub use responder::{DelayedResponder, ReplyFuture, Responder};
pub use rules::{ResponseEngine, RuleKind, classify, respond};
