//! Rendering addresses for the terminal.

use std::fmt::Write as _;

use crate::address::Address;
use crate::error::Result;

use super::OutputFormat;

/// Render a list of addresses in the requested format.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render_addresses(addresses: &[Address], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(addresses)?),
        OutputFormat::Plain => Ok(addresses
            .iter()
            .map(plain_line)
            .collect::<Vec<_>>()
            .join("\n")),
        OutputFormat::Table => Ok(table(addresses)),
    }
}

/// Render one address in the requested format.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render_address(address: &Address, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(address)?),
        OutputFormat::Plain => Ok(plain_line(address)),
        OutputFormat::Table => Ok(table(std::slice::from_ref(address))),
    }
}

fn location_text(address: &Address) -> String {
    address.location.map_or_else(
        || "-".to_string(),
        |c| format!("{:.6}, {:.6}", c.latitude(), c.longitude()),
    )
}

fn plain_line(address: &Address) -> String {
    format!("{}\t{}\t{}", address.id, address.name, location_text(address))
}

fn table(addresses: &[Address]) -> String {
    let name_width = addresses
        .iter()
        .map(|a| a.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("NAME".len());

    let mut out = String::new();
    let _ = writeln!(out, "{:>6}  {:<name_width$}  LOCATION", "ID", "NAME");
    for address in addresses {
        let _ = writeln!(
            out,
            "{:>6}  {:<name_width$}  {}",
            address.id,
            address.name,
            location_text(address)
        );
    }
    let suffix = if addresses.len() == 1 { "" } else { "es" };
    let _ = write!(out, "({} address{suffix})", addresses.len());
    out
}
