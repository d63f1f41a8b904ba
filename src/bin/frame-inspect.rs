//! TypedFrame CSV Inspector
//!
//! Loads a CSV file, prints the sniffed schema and the first rows.
//!
//! ```sh
//! cargo run --features cli --bin frame-inspect -- data.csv --head 5
//! cargo run --features cli --bin frame-inspect -- data.tsv --separator tab --types int32,string
//! ```

use std::path::PathBuf;

use clap::Parser;
use log::info;
use typedframe::{load_csv_from_path, CsvOptions, ElementType, Result};

#[derive(Parser, Debug)]
#[command(about = "Print the schema and first rows of a CSV file")]
struct Args {
    /// CSV file to load.
    path: PathBuf,

    /// Field separator (a single character, or `tab`).
    #[arg(long, default_value = ",", value_parser = parse_separator)]
    separator: char,

    /// Treat the first line as data rather than column names.
    #[arg(long)]
    no_header: bool,

    /// Number of rows scanned when guessing column types.
    #[arg(long, default_value_t = 10)]
    guess_rows: usize,

    /// Stop loading after this many rows.
    #[arg(long)]
    max_rows: Option<usize>,

    /// Number of rows to print.
    #[arg(long, default_value_t = 10)]
    head: usize,

    /// Explicit column types, comma separated (e.g. `int32,string,float64`).
    #[arg(long, value_delimiter = ',')]
    types: Vec<ElementType>,

    /// Print the rows as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

fn parse_separator(value: &str) -> std::result::Result<char, String> {
    match value {
        "tab" | "\\t" => Ok('\t'),
        _ => {
            let mut chars = value.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(c),
                _ => Err(format!("expected a single character, got '{}'", value)),
            }
        }
    }
}

impl Args {
    fn csv_options(&self) -> CsvOptions {
        CsvOptions {
            separator: self.separator,
            has_header: !self.no_header,
            guess_rows: self.guess_rows,
            max_rows: self.max_rows,
            column_types: (!self.types.is_empty()).then(|| self.types.clone()),
            ..CsvOptions::default()
        }
    }
}

fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let args = Args::parse();
    let table = load_csv_from_path(&args.path, &args.csv_options())?;
    info!(
        "loaded {}: {} rows x {} columns",
        args.path.display(),
        table.len(),
        table.column_count()
    );

    println!("Schema:");
    for column in table.columns() {
        println!(
            "  {:<24} {:<10} nulls={}",
            column.name(),
            column.element_type(),
            column.null_count()
        );
    }

    let preview = table.head(args.head);
    if args.json {
        println!("{}", preview.to_json()?);
        return Ok(());
    }

    println!();
    println!("{}", preview.column_names().join(" | "));
    for row in preview.rows() {
        let cells: Vec<String> = row.iter().map(|value| value.to_string()).collect();
        println!("{}", cells.join(" | "));
    }
    Ok(())
}
