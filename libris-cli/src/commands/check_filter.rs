//! Check-filter command implementation

use super::load_filter;
use anyhow::Result;
use libris_core::filter::xml::to_xml;

/// Parse a filter file and print its expression and canonical XML
pub fn check_filter(path: &str) -> Result<()> {
    let filter = load_filter(path)?;
    println!("Expression: {}", filter);
    println!("XML:        {}", to_xml(&filter)?);
    Ok(())
}
