use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};

use ktima_parser::scan_builtin_dir;

#[derive(Args, Debug)]
pub struct SourcesArgs {
    /// Built-in sources directory
    #[arg(long)]
    dir: PathBuf,
}

/// List the tabular files in a built-in sources directory together
/// with the year parsed from each file name. Files without a year
/// token are shown but cannot be selected with --years.
pub fn handle_sources(args: SourcesArgs) -> Result<()> {
    let listing = scan_builtin_dir(&args.dir)?;

    if listing.is_empty() {
        println!("No tabular files found in {}", args.dir.display());
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["file", "year"]);

    for source in &listing {
        let year = source
            .year
            .map(|year| year.to_string())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![source.path.display().to_string(), year]);
    }

    println!("{table}");
    Ok(())
}
