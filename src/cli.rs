//! CLI domain: parse, route, output, and presentation only.
//! No tree logic; the route table dispatches to the engine.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands, FilterArgs, OutputFormat};
pub use route::RunContext;
