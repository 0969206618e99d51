//! # CLI Module
//!
//! Command-line access to a route table file.
//!
//! ## Commands
//!
//! ```bash
//! # List routes with their resolved group middleware
//! trellis --table routes.yaml routes
//!
//! # Dispatch a request and show the outcome
//! trellis --table routes.yaml dispatch GET pages/5
//! trellis --table routes.yaml --format json dispatch delete pages
//!
//! # Reverse routing, positional or by name
//! trellis --table routes.yaml path calendar 2020 12
//! trellis --table routes.yaml path calendar --json '{"year": 2020}'
//!
//! # Keep dispatching stdin lines while the table file is edited
//! trellis --table routes.yaml watch
//! ```
//!
//! `TRELLIS_TABLE` may replace `--table`; `TRELLIS_LOG` sets the log filter
//! (default `warn`).

mod commands;

pub use commands::{run_cli, Cli, Commands, OutputFormat};
