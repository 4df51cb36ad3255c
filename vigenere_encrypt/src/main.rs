use anyhow::{Context, Result};
use clap::Parser;
use kasiski::alphabet::normalize;
use kasiski::vigenere::{decrypt, encrypt, Key};
use std::fs;
use std::fs::OpenOptions;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// text to encrypt, it is lowercased and stripped of anything but letters
    #[arg(short, long)]
    input: Option<String>,

    /// the file to read input from
    ///
    /// the program will read from stdin if neither input-file or input are set
    #[arg(long, conflicts_with = "input")]
    input_file: Option<PathBuf>,

    /// file to write the output to, -o=- => stdout
    #[arg(short, long, default_value_t = String::from("output.txt"))]
    output: String,

    /// force writing to the output file, even if it already exists
    #[arg(short, long, default_value_t = false)]
    force: bool,

    /// key to use, lowercase letters only
    #[arg(short, long)]
    key: String,

    /// decrypt instead of encrypting
    #[arg(short, long, default_value_t = false)]
    decrypt: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let args: Args = Args::try_parse()?;

    let key = Key::new(&args.key).with_context(|| format!("Invalid key {:?}.", args.key))?;

    // read in the input data
    let input = if let Some(input_str) = args.input {
        input_str
    } else if let Some(ref input_file) = args.input_file {
        fs::read_to_string(input_file)
            .with_context(|| format!("Reading from {input_file:?} to get input data."))?
    } else {
        let mut data = String::new();
        io::stdin().read_to_string(&mut data)?;
        data
    };
    let text = normalize(&input);
    debug!(letters = text.len(), decrypt = args.decrypt, "read input");

    let output = if args.decrypt {
        decrypt(text, &key)?
    } else {
        encrypt(text, &key)?
    };

    // choose whether to write to stdout or to a file
    let mut out: Box<dyn Write> = match args.output.as_str() {
        "-" => Box::new(std::io::stdout()),
        fname => Box::new(
            OpenOptions::new()
                .write(true)
                .create(true)
                .create_new(!args.force)
                .open(fname)
                .with_context(|| format!("Opening {fname:?} for writing output."))?,
        ),
    };

    out.write_all(output.as_bytes())?;

    // if writing to stdout write a newline
    if args.output == "-" {
        out.write_all(b"\n")?;
    }

    Ok(())
}
