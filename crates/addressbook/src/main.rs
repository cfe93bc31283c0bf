//! `addrbook` - CLI for addressbook
//!
//! This binary runs the HTTP API and offers the same operations directly
//! against the local database.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::{bail, Context};
use clap::Parser;

use addressbook::cli::output::{render_address, render_addresses};
use addressbook::cli::{Cli, Command, ConfigCommand};
use addressbook::{find_nearby, init_logging, server, Config, Storage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone())?;

    match cli.command {
        Command::Serve(cmd) => {
            let bind: std::net::SocketAddr = match cmd.bind {
                Some(bind) => bind
                    .parse()
                    .with_context(|| format!("invalid --bind address '{bind}'"))?,
                None => config.bind_addr()?,
            };
            let storage = open_storage(&config)?;
            server::serve(bind, storage).await?;
        }
        Command::Add(cmd) => {
            let new = cmd.to_new_address()?;
            let address = open_storage(&config)?.create(&new)?;
            println!("Created address {}", address.id);
        }
        Command::Update(cmd) => {
            let update = cmd.to_update()?;
            match open_storage(&config)?.update(cmd.id, &update)? {
                Some(address) => println!("Updated address {}", address.id),
                None => bail!("Address {} not found", cmd.id),
            }
        }
        Command::Delete { id } => {
            if !open_storage(&config)?.delete(id)? {
                bail!("Address {id} not found");
            }
            println!("Address deleted successfully");
        }
        Command::Get(cmd) => match open_storage(&config)?.get(cmd.id)? {
            Some(address) => println!("{}", render_address(&address, cmd.format)?),
            None => bail!("Address {} not found", cmd.id),
        },
        Command::List(cmd) => {
            let storage = open_storage(&config)?;
            let addresses = storage.list()?;
            println!("{}", render_addresses(&addresses, cmd.format)?);
        }
        Command::Nearby(cmd) => {
            let (center, radius_km) = cmd.to_query()?;
            let storage = open_storage(&config)?;
            let matches = find_nearby(&storage, center, radius_km)?;
            println!("{}", render_addresses(&matches, cmd.format)?);
        }
        Command::Config(cmd) => handle_config(&config, cmd)?,
    }

    Ok(())
}

fn open_storage(config: &Config) -> anyhow::Result<Storage> {
    let path = config.database_path();
    Storage::open(&path).with_context(|| format!("opening address database {}", path.display()))
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Server]");
                println!("  Bind address:       {}", config.server.bind_addr);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
