use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use crate::reload::{watch_table, SharedRouter};
use crate::router::{parse_method, Dispatch, Router};
use crate::table::RouteTable;

/// Command-line interface for trellis
///
/// Loads a route table file and answers routing questions against it.
#[derive(Parser, Debug)]
#[command(name = "trellis")]
#[command(about = "Route table inspection and dispatch", long_about = None)]
pub struct Cli {
    /// Route table file (YAML, JSON or TOML)
    #[arg(short, long, env = "TRELLIS_TABLE")]
    pub table: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List every route in registration order
    Routes,
    /// Dispatch one request
    Dispatch {
        /// HTTP method, any case
        method: String,
        /// Request path
        #[arg(default_value = "")]
        path: String,
    },
    /// Generate the path of a named route
    Path {
        /// Route name
        name: String,
        /// Positional values
        values: Vec<String>,
        /// Route data as JSON (array or object); overrides positional values
        #[arg(long)]
        json: Option<String>,
    },
    /// Dispatch `METHOD PATH` lines from stdin, reloading the table on change
    Watch,
}

/// Output format for command results
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One line per result
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Execute a parsed command, writing results to `out`
///
/// # Errors
///
/// Returns an error if:
/// - The route table cannot be loaded or built
/// - A dispatch method is not a valid HTTP method
/// - Path generation fails
/// - The table watcher cannot be started
pub fn run_cli<W: Write>(cli: &Cli, out: &mut W) -> anyhow::Result<()> {
    let router = RouteTable::load(&cli.table)
        .and_then(|table| table.build())
        .with_context(|| format!("loading route table {}", cli.table.display()))?;

    match &cli.command {
        Commands::Routes => write_routes(&router, cli.format, out)?,
        Commands::Dispatch { method, path } => {
            let method = parse_method(method)?;
            write_dispatch(&router.dispatch(&method, path), cli.format, out)?;
        }
        Commands::Path { name, values, json } => {
            let data = match json {
                Some(text) => serde_json::from_str(text).context("parsing --json data")?,
                None => Value::from(values.clone()),
            };
            let path = router.path_value(name, &data)?;
            match cli.format {
                OutputFormat::Text => writeln!(out, "{path}")?,
                OutputFormat::Json => writeln!(out, "{}", Value::String(path))?,
            }
        }
        Commands::Watch => {
            let shared = Arc::new(SharedRouter::new(router));
            let _watcher = watch_table(&cli.table, Arc::clone(&shared))?;
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let line = line?;
                let mut parts = line.split_whitespace();
                let Some(method) = parts.next() else {
                    continue;
                };
                let path = parts.next().unwrap_or_default();
                match parse_method(method) {
                    Ok(method) => {
                        write_dispatch(&shared.load().dispatch(&method, path), cli.format, out)?;
                    }
                    Err(err) => writeln!(out, "error: {err}")?,
                }
                out.flush()?;
            }
        }
    }
    Ok(())
}

fn write_routes<W: Write>(
    router: &Router<String>,
    format: OutputFormat,
    out: &mut W,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            for route in router.routes() {
                writeln!(
                    out,
                    "{:<7} /{} -> {} name={} middleware={:?}",
                    route.method().as_str(),
                    route.pattern(),
                    route.handler(),
                    route.name().unwrap_or("-"),
                    route.middleware()
                )?;
            }
        }
        OutputFormat::Json => {
            let rows: Vec<Value> = router
                .routes()
                .map(|route| {
                    serde_json::json!({
                        "method": route.method().as_str(),
                        "pattern": route.pattern(),
                        "handler": route.handler(),
                        "name": route.name(),
                        "middleware": route.middleware(),
                    })
                })
                .collect();
            writeln!(out, "{}", serde_json::to_string_pretty(&rows)?)?;
        }
    }
    Ok(())
}

fn write_dispatch<W: Write>(
    dispatch: &Dispatch<'_, String>,
    format: OutputFormat,
    out: &mut W,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            let options: Vec<&str> = dispatch.options.iter().map(|m| m.as_str()).collect();
            writeln!(
                out,
                "{} {} /{} route={} handler={} params={:?} middleware={:?} options={:?}",
                dispatch.code.as_u16(),
                dispatch.method,
                dispatch.path,
                dispatch.pattern().unwrap_or("-"),
                dispatch.handler().map(String::as_str).unwrap_or("-"),
                dispatch.parameters.as_slice(),
                dispatch.middleware,
                options
            )?;
        }
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(dispatch)?)?,
    }
    Ok(())
}
