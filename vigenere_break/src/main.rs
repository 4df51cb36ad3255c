use anyhow::{ensure, Context, Result};
use clap::{Parser, ValueEnum};
use kasiski::alphabet::{normalize, Ciphertext};
use kasiski::analysis::{analyze, Analysis, Evidence, Options};
use kasiski::ioc::{survey_key_lengths, IocVariant, RANDOM_IOC};
use kasiski::kasiski::{ngram_counts, NgramCount};
use kasiski::profile::FrequencyProfile;
use std::fs;
use std::fs::OpenOptions;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// ciphertext to break, anything other than letters is stripped
    #[arg(short, long)]
    input: Option<String>,

    /// the file to read the ciphertext from
    ///
    /// the program will read from stdin if neither input-file or input are set
    #[arg(long, conflicts_with = "input")]
    input_file: Option<PathBuf>,

    /// file to write the output to, -o=- => stdout
    #[arg(short, long, default_value_t = String::from("-"))]
    output: String,

    /// force writing to the output file, even if it already exists
    #[arg(short, long, default_value_t = false)]
    force: bool,

    /// letter frequency file, one `letter:probability` per line, defaults to english
    #[arg(long)]
    frequencies: Option<PathBuf>,

    /// repeated phrases to take deltas from, comma separated
    ///
    /// when unset every repeated n-gram of --ngram-length is used
    #[arg(short, long, value_delimiter = ',')]
    phrases: Vec<String>,

    /// length of the repeated n-grams to search for
    #[arg(short, long, default_value_t = 4, value_parser = clap::value_parser!(u8).range(3..=4))]
    ngram_length: u8,

    /// number of deltas to take the GCD of
    #[arg(short, long, default_value_t = 5)]
    top: usize,

    /// skip the kasiski examination and use this key length
    #[arg(short, long, conflicts_with = "phrases")]
    key_length: Option<usize>,

    /// index of coincidence normalisation
    #[arg(long, value_enum, default_value_t = Ioc::Unbiased)]
    ioc: Ioc,

    /// longest key length to include in the IC survey
    #[arg(long, default_value_t = 20)]
    max_key_length: usize,

    /// number of rows to show in the n-gram frequency tables
    #[arg(long, default_value_t = 15)]
    table_rows: usize,

    /// write the full analysis as JSON instead of the plaintext
    #[arg(long, default_value_t = false)]
    json: bool,

    /// print the intermediate tables to stderr
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(ValueEnum, Debug, Copy, Clone)]
enum Ioc {
    /// sum(n(n-1)) / N(N-1)
    Unbiased,
    /// sum(n^2) / N^2
    Squared,
}

impl From<Ioc> for IocVariant {
    fn from(value: Ioc) -> Self {
        match value {
            Ioc::Unbiased => IocVariant::Unbiased,
            Ioc::Squared => IocVariant::Squared,
        }
    }
}

fn main() -> Result<()> {
    let args: Args = Args::try_parse()?;

    let default_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    // read in the ciphertext
    let raw = if let Some(input_str) = args.input.clone() {
        input_str
    } else if let Some(ref input_file) = args.input_file {
        fs::read_to_string(input_file)
            .with_context(|| format!("Reading from {input_file:?} to get the ciphertext."))?
    } else {
        let mut data = String::new();
        io::stdin().read_to_string(&mut data)?;
        data
    };
    let ciphertext = Ciphertext::new(normalize(&raw))?;
    ensure!(!ciphertext.is_empty(), "The ciphertext has no letters in it.");

    let profile = match args.frequencies {
        Some(ref path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Reading letter frequencies from {path:?}."))?;
            FrequencyProfile::parse(&text)
                .with_context(|| format!("Parsing letter frequencies from {path:?}."))?
        }
        None => FrequencyProfile::english(),
    };

    let variant = IocVariant::from(args.ioc);
    if args.verbose > 0 {
        print_ngram_tables(&ciphertext, args.table_rows);
        print_survey(&ciphertext, args.max_key_length, variant, &profile);
    }

    let evidence = if let Some(m) = args.key_length {
        Evidence::KeyLength(m)
    } else if !args.phrases.is_empty() {
        Evidence::Phrases(args.phrases.clone())
    } else {
        Evidence::Repeats(args.ngram_length as usize)
    };
    let options = Options {
        top: args.top,
        variant,
    };
    let analysis = analyze(&ciphertext, &evidence, &profile, &options)
        .context("Try choosing phrases with --phrases or forcing a length with --key-length.")?;

    for phrase in &analysis.evidence.missing {
        warn!(%phrase, "phrase does not repeat, ignoring it");
    }
    if args.verbose > 0 {
        print_analysis(&analysis);
    }
    eprintln!(
        "Decrypting using key length={}, key={}",
        analysis.key_length, analysis.key
    );

    let output = if args.json {
        serde_json::to_string_pretty(&analysis)?
    } else {
        analysis.plaintext
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
    if args.output == "-" {
        out.write_all(b"\n")?;
    }

    Ok(())
}

/// The most frequent n-grams of every size from 1 to 4, those seen only once are dropped
fn ngram_tables(ciphertext: &Ciphertext, rows: usize) -> Vec<(&'static str, Vec<NgramCount>)> {
    [(1, "Monogram"), (2, "Digram"), (3, "Trigram"), (4, "Fourgram")]
        .into_iter()
        .map(|(n, label)| {
            let repeated = ngram_counts(ciphertext, n)
                .into_iter()
                .take_while(|c| c.count > 1)
                .take(rows)
                .collect();
            (label, repeated)
        })
        .collect()
}

fn print_ngram_tables(ciphertext: &Ciphertext, rows: usize) {
    for (label, table) in ngram_tables(ciphertext, rows) {
        eprintln!(" * {label} frequencies");
        for c in table {
            eprintln!("\t{}: {}", c.ngram, c.count);
        }
    }
}

fn print_survey(ciphertext: &Ciphertext, max: usize, variant: IocVariant, profile: &FrequencyProfile) {
    eprintln!(
        " * Mean IC by key length (expected ~{:.4}, random ~{RANDOM_IOC:.4})",
        profile.expected_ioc()
    );
    for score in survey_key_lengths(ciphertext, 1..=max, variant) {
        match score.mean_ioc {
            Some(ioc) => eprintln!("\t{:>3}: {ioc:.4}", score.key_length),
            None => eprintln!("\t{:>3}: -", score.key_length),
        }
    }
}

fn print_analysis(analysis: &Analysis) {
    if !analysis.evidence.matches.is_empty() {
        eprintln!(" * Deltas for repeated phrases");
        for m in &analysis.evidence.matches {
            eprintln!("\t{}: {}", m.ngram, m.delta);
        }
    }

    for (bin, (ioc, table)) in analysis.iocs.iter().zip(&analysis.mg_tables).enumerate() {
        let ioc = ioc.map_or_else(|| "-".to_string(), |ioc| format!("{ioc:.4}"));
        eprintln!(" * Bin {bin}: IC={ioc}");
        let best: Vec<String> = table
            .ranked()
            .into_iter()
            .take(5)
            .map(|(shift, mg)| format!("{}: {mg:.3}", char::from(b'a' + shift)))
            .collect();
        eprintln!("\t{}", best.join("\t"));
    }
}
