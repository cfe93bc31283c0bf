//! Command-line interface for addressbook.
//!
//! This module provides the CLI structure for the `addrbook` binary.

mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AddCommand, ConfigCommand, GetCommand, ListCommand, NearbyCommand, OutputFormat,
    ServeCommand, UpdateCommand,
};

/// addrbook - A small address book with proximity search
///
/// Stores named addresses with optional coordinates in `SQLite` and finds
/// the ones within a great-circle radius of a point, from the command line
/// or over HTTP.
#[derive(Debug, Parser)]
#[command(name = "addrbook")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API
    Serve(ServeCommand),

    /// Add an address
    Add(AddCommand),

    /// Update fields of an address
    Update(UpdateCommand),

    /// Delete an address
    Delete {
        /// ID of the address to delete
        id: i64,
    },

    /// Show one address
    Get(GetCommand),

    /// List every stored address
    List(ListCommand),

    /// Find addresses within a radius of a point
    Nearby(NearbyCommand),

    /// View or check configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "addrbook");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_flags() {
        use crate::logging::Verbosity;

        assert_eq!(parse(&["addrbook", "list"]).verbosity(), Verbosity::Normal);
        assert_eq!(parse(&["addrbook", "-v", "list"]).verbosity(), Verbosity::Verbose);
        assert_eq!(parse(&["addrbook", "-vv", "list"]).verbosity(), Verbosity::Trace);
        assert_eq!(parse(&["addrbook", "-q", "-v", "list"]).verbosity(), Verbosity::Quiet);
    }

    #[test]
    fn test_parse_with_config() {
        let cli = parse(&["addrbook", "-c", "/custom/config.toml", "list"]);
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_serve() {
        let cli = parse(&["addrbook", "serve", "--bind", "0.0.0.0:8080"]);
        match cli.command {
            Command::Serve(cmd) => assert_eq!(cmd.bind.as_deref(), Some("0.0.0.0:8080")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_add_with_negative_coordinates() {
        let cli = parse(&[
            "addrbook",
            "add",
            "--name",
            "London",
            "--latitude",
            "51.5074",
            "--longitude",
            "-0.1278",
        ]);
        match cli.command {
            Command::Add(cmd) => {
                assert_eq!(cmd.name, "London");
                assert_eq!(cmd.longitude, Some(-0.1278));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_add_requires_both_coordinates() {
        let result = Cli::try_parse_from(["addrbook", "add", "--name", "X", "--latitude", "1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_update() {
        let cli = parse(&["addrbook", "update", "3", "--name", "Renamed"]);
        match cli.command {
            Command::Update(cmd) => {
                assert_eq!(cmd.id, 3);
                assert_eq!(cmd.name.as_deref(), Some("Renamed"));
                assert!(cmd.latitude.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_delete() {
        let cli = parse(&["addrbook", "delete", "42"]);
        assert!(matches!(cli.command, Command::Delete { id: 42 }));
    }

    #[test]
    fn test_parse_nearby() {
        let cli = parse(&[
            "addrbook",
            "nearby",
            "--latitude",
            "-33.86",
            "--longitude",
            "151.2",
            "--distance-km",
            "10",
            "--format",
            "json",
        ]);
        match cli.command {
            Command::Nearby(cmd) => {
                assert_eq!(cmd.latitude, -33.86);
                assert_eq!(cmd.distance_km, 10.0);
                assert_eq!(cmd.format, OutputFormat::Json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_config_show() {
        let cli = parse(&["addrbook", "config", "show", "--json"]);
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Show { json: true })
        ));
    }
}
