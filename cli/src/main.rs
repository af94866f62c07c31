use std::error::Error;
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use clap::{ArgAction, Parser};
use serde::Serialize;
use serde_json::Value;
use tiktoken_rs::cl100k_base;
use toon_codec::{Delimiter, Indent, ToonOptions};

#[derive(Parser, Debug)]
#[command(name = "toon", version, about = "TOON encoder/decoder")]
struct Args {
    /// Input file path (.json or .toon). Omit or use '-' to read from stdin.
    input: Option<String>,

    /// Output file path (prints to stdout if omitted).
    #[arg(short, long, value_name = "file")]
    output: Option<String>,

    /// Force encode mode (overrides auto-detection).
    #[arg(short = 'e', long)]
    encode: bool,

    /// Force decode mode (overrides auto-detection).
    #[arg(short = 'd', long)]
    decode: bool,

    /// Array delimiter: , (comma), \t (tab), | (pipe).
    #[arg(long, value_name = "char", value_parser = parse_delimiter)]
    delimiter: Option<Delimiter>,

    /// Indentation size (default: 2).
    #[arg(long, value_name = "number", default_value_t = 2)]
    indent: usize,

    /// Prefix array counts with '#'.
    #[arg(long = "length-marker")]
    length_marker: bool,

    /// Disable strict validation when decoding.
    #[arg(long = "no-strict", action = ArgAction::SetFalse, default_value_t = true)]
    strict: bool,

    /// Show token statistics.
    #[arg(long)]
    stats: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Encode,
    Decode,
}

#[derive(Debug)]
enum InputSource {
    Stdin,
    File(String),
}

fn main() {
    if let Err(err) = run() {
        eprintln!("ERROR  {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let (input_text, input_source) = read_input(args.input.as_deref())?;
    let mode = resolve_mode(&args, &input_source)?;
    let options = build_options(&args);

    match mode {
        Mode::Encode => run_encode(&args, &input_text, &options),
        Mode::Decode => run_decode(&args, &input_text, &options),
    }
}

fn build_options(args: &Args) -> ToonOptions {
    let mut options = ToonOptions::new()
        .with_indent(Indent::Spaces(args.indent))
        .with_length_marker(args.length_marker)
        .with_strict(args.strict);

    if let Some(delimiter) = args.delimiter {
        options = options.with_delimiter(delimiter);
    }

    options
}

fn run_encode(args: &Args, input: &str, options: &ToonOptions) -> Result<(), Box<dyn Error>> {
    let value: Value = serde_json::from_str(input)?;
    let toon = toon_codec::encode(&value, options)?;

    write_output(args.output.as_deref(), toon.as_bytes())?;

    if args.stats {
        print_stats(&value, &toon)?;
    }
    Ok(())
}

fn run_decode(args: &Args, input: &str, options: &ToonOptions) -> Result<(), Box<dyn Error>> {
    let value: Value = toon_codec::decode(input, options)?;

    let mut rendered = Vec::new();
    write_json(&mut rendered, &value, args.indent)?;
    write_output(args.output.as_deref(), &rendered)?;
    Ok(())
}

fn resolve_mode(args: &Args, input_source: &InputSource) -> Result<Mode, Box<dyn Error>> {
    if args.encode {
        return Ok(Mode::Encode);
    }

    if args.decode {
        return Ok(Mode::Decode);
    }

    match input_source {
        InputSource::Stdin => Ok(Mode::Encode),
        InputSource::File(path) => match Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => Ok(Mode::Encode),
            Some("toon") => Ok(Mode::Decode),
            _ => Err("unable to auto-detect mode; use --encode or --decode".into()),
        },
    }
}

fn read_input(input: Option<&str>) -> Result<(String, InputSource), Box<dyn Error>> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok((buf, InputSource::Stdin))
        }
        Some(path) => {
            let buf = fs::read_to_string(path)?;
            Ok((buf, InputSource::File(path.to_string())))
        }
    }
}

fn parse_delimiter(raw: &str) -> Result<Delimiter, String> {
    match raw {
        "," => Ok(Delimiter::Comma),
        "|" => Ok(Delimiter::Pipe),
        "\t" | "\\t" => Ok(Delimiter::Tab),
        _ => Err(format!(
            "invalid delimiter \"{raw}\"; valid delimiters are comma (,), tab (\\t), pipe (|)"
        )),
    }
}

fn write_output(path: Option<&str>, data: &[u8]) -> Result<(), Box<dyn Error>> {
    match path {
        Some(path) if path != "-" => {
            fs::write(path, data)?;
            Ok(())
        }
        _ => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(data)?;
            Ok(())
        }
    }
}

fn write_json(writer: &mut dyn Write, value: &Value, indent: usize) -> Result<(), Box<dyn Error>> {
    if indent == 0 {
        serde_json::to_writer(writer, value)?;
        return Ok(());
    }

    let indent_bytes = vec![b' '; indent];
    let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent_bytes);
    let mut serializer = serde_json::Serializer::with_formatter(writer, formatter);
    value.serialize(&mut serializer)?;
    Ok(())
}

fn print_stats(value: &Value, toon: &str) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string(value)?;
    let bpe = cl100k_base()?;
    let json_tokens = bpe.encode_with_special_tokens(&json).len();
    let toon_tokens = bpe.encode_with_special_tokens(toon).len();
    let saved = json_tokens as isize - toon_tokens as isize;
    let pct = if json_tokens > 0 {
        (saved as f64 / json_tokens as f64) * 100.0
    } else {
        0.0
    };

    println!();
    println!("Token estimates: ~{json_tokens} (JSON) -> ~{toon_tokens} (TOON)");
    println!("Saved ~{saved} tokens ({pct:.1}%)");
    Ok(())
}
