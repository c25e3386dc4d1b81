//! Binary entrypoint that launches the flight assistant server.

use std::process::ExitCode;

use flight_assistant::start_flight_assistant;

/// Start the HTTP server and block until shutdown.
fn main() -> ExitCode {
    start_flight_assistant::run()
}
