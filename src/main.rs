use anyhow::Context;
use clap::Parser;
use ctool::{normalize, pegs::Pegs, table};

mod options {
    use std::path::PathBuf;

    #[derive(Debug, clap::Parser)]
    #[clap(
        name = "ctool",
        about = "Normalize a spreadsheet of world currencies into sub units, bases and pegs"
    )]
    pub struct Args {
        /// The spreadsheet to read currencies from, using its first sheet. Files ending in `.csv` are read as CSV.
        #[clap(default_value = "data/currencies.xlsx")]
        pub input: PathBuf,
        /// The CSV file to write the normalized table to. It will be overwritten if it exists.
        #[clap(long, short = 'o', default_value = "format_currencies.csv")]
        pub output: PathBuf,
        /// The delimiter to use when the input is a CSV file.
        #[clap(long, short = 'd', default_value = ",")]
        pub delimiter: char,
        /// The name of the column with the ISO code of each currency.
        #[clap(long, default_value = "ISO")]
        pub iso_column: String,
        /// The name of the column with the free-text currency description.
        #[clap(long, default_value = "Currency")]
        pub currency_column: String,
        /// A RON file with the currency names that may follow `tied to:` and their ISO codes, replacing the built-in ones.
        #[clap(long, short = 'p')]
        pub pegs: Option<PathBuf>,
        /// Do not print the normalized table to stdout.
        #[clap(long, short = 'q')]
        pub quiet: bool,
    }
}

fn main() -> anyhow::Result<()> {
    let options::Args {
        input,
        output,
        delimiter,
        iso_column,
        currency_column,
        pegs,
        quiet,
    } = options::Args::parse();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let pegs = pegs
        .map(|path| {
            Pegs::from_path(&path)
                .with_context(|| format!("Could not load peg table from '{}'", path.display()))
        })
        .transpose()?
        .unwrap_or_default();
    let table = table::Table::from_path(&input, table::Options { delimiter })
        .with_context(|| format!("Could not load currencies from '{}'", input.display()))?;
    let normalized = ctool::normalize(
        &table,
        normalize::Options {
            iso_column,
            currency_column,
            pegs,
        },
    )?;

    if !quiet {
        normalized.write_table(std::io::BufWriter::new(std::io::stdout().lock()))?;
    }
    let out = std::fs::File::create(&output)
        .with_context(|| format!("Could not create output file at '{}'", output.display()))?;
    normalized
        .write_csv(std::io::BufWriter::new(out))
        .with_context(|| format!("Could not write normalized table to '{}'", output.display()))?;
    tracing::info!(
        rows = normalized.records.len(),
        path = %output.display(),
        "wrote normalized table"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    #[test]
    fn defaults_match_the_fixed_paths() {
        let args = crate::options::Args::parse_from(["ctool"]);
        assert_eq!(args.input, std::path::Path::new("data/currencies.xlsx"));
        assert_eq!(args.output, std::path::Path::new("format_currencies.csv"));
        assert_eq!(args.delimiter, ',');
        assert!(!args.quiet);
    }
}
