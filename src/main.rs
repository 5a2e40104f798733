use anyhow::Result;
use clap::Parser;
use gffcheck::{GffSchema, Gff3Validator};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gffcheck", version, about = "Validate GFF3 genome annotation files")]
struct Cli {
    /// GFF3 files to validate; gzip-compressed input is auto-detected
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Override the permissible feature types with a comma-separated list
    #[arg(long, value_delimiter = ',', value_name = "TYPE")]
    feature_types: Option<Vec<String>>,

    /// Print only the per-file finding counts, not the findings themselves
    #[arg(long)]
    summary_only: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let schema = match &cli.feature_types {
        Some(types) => GffSchema::with_feature_types(types.iter()),
        None => GffSchema::new(),
    };
    let validator = Gff3Validator::new(schema);

    let mut n_invalid = 0usize;
    for file in &cli.files {
        let report = validator.validate_file(file)?;
        info!(
            "validation run {} finished for {}",
            report.run_id().as_ref(),
            file.display()
        );
        if report.is_empty() {
            println!("{}: valid", file.display());
        } else {
            n_invalid += 1;
            println!("{}: {} findings", file.display(), report.total());
            if !cli.summary_only {
                print!("{}", report);
            }
        }
    }

    if n_invalid > 0 {
        std::process::exit(1);
    }
    Ok(())
}
