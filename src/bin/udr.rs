use std::env;
use std::io::{self, Write};
use std::process;

use tabwriter::TabWriter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use udr::{DictReaderBuilder, Encoding, Key, Value};

fn main() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::WARN.into())
        .from_env_lossy();
    let subscriber = FmtSubscriber::builder()
        .with_writer(io::stderr)
        .with_env_filter(env_filter)
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("WARNING: could not set up logging: {}", err);
    }

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: {} <file> [encoding]", args[0]);
        process::exit(1);
    }

    if let Err(err) = run(&args[1], args.get(2).map(String::as_str)) {
        eprintln!("ERROR: {}", err);
        process::exit(1);
    }
}

fn run(path: &str, encoding: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let mut bldr = DictReaderBuilder::new();
    if let Some(label) = encoding {
        bldr.encoding(label.parse::<Encoding>()?);
    }
    let mut rdr = bldr.from_path(path)?;
    let fieldnames = rdr.fieldnames()?.to_vec();
    println!("Encoding: {}", rdr.encoding());

    let mut tw = TabWriter::new(io::stdout());
    writeln!(tw, "{}\t...", fieldnames.join("\t"))?;
    for row in rdr {
        let row = row?;
        let rest = match row.get_key(&Key::Unnamed) {
            Some(Value::Rest(rest)) => rest.join(","),
            _ => String::new(),
        };
        let mut cells: Vec<&str> = fieldnames
            .iter()
            .map(|name| row.get(name).and_then(Value::as_str).unwrap_or(""))
            .collect();
        cells.push(&rest);
        writeln!(tw, "{}", cells.join("\t"))?;
    }
    tw.flush()?;
    Ok(())
}
