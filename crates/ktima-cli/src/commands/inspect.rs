use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use ktima_core::dimension_values;
use ktima_parser::load_table;

use super::load_config;

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Tabular source file to inspect
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// TOML configuration file (decides which columns are dimension
    /// candidates)
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Print the detected columns of one source plus the distinct values
/// of each present dimension candidate. This is the recovery aid for
/// a missing-column error: everything the sidebar selectors would
/// have shown, on the terminal.
pub fn handle_inspect(args: InspectArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let table = load_table(&args.file)?;

    println!(
        "{}: {} rows, {} columns",
        args.file.display(),
        table.height(),
        table.width()
    );
    println!("\nDetected columns:");
    for name in &table.columns {
        println!("  {name}");
    }

    let values = dimension_values(&table, &config.columns.dimensions);
    if values.is_empty() {
        println!("\nNo dimension candidates present in this source.");
        return Ok(());
    }

    println!("\nFilterable dimension values:");
    for (column, values) in values {
        println!("  {column} ({}):", values.len());
        for value in values {
            println!("    {value}");
        }
    }

    Ok(())
}
