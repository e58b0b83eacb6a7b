pub mod telemetry;

pub use telemetry::{Command, CommandSpan};
