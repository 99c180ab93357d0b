use std::io::Read;
use std::path::PathBuf;

use clap::Parser;
use json_path_query::{jsonpath, tokenize, tokenize_strict, JsonPathOptions, ResultType, Token};
use serde_json::Value;
use tracing::{debug, Level};

/// Query a JSON document with a path expression.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path expression, e.g. `$.store.book[*].author`
    path: String,
    /// JSON document (string). Falls back to --file, then stdin.
    json: Option<String>,
    /// Read the JSON document from a file
    #[arg(long, short)]
    file: Option<PathBuf>,
    /// Shape of each result
    #[arg(long, value_enum, default_value_t = ResultType::Value)]
    result_type: ResultType,
    /// Keep only the first N results (0 keeps all)
    #[arg(long)]
    count: Option<usize>,
    /// Print a single result bare instead of inside an array
    #[arg(long)]
    no_wrap: bool,
    /// Reject expressions with characters or bounds the dialect does not know
    #[arg(long)]
    strict: bool,
    /// Print the compiled tokens instead of evaluating
    #[arg(long)]
    tokens: bool,
    /// More log output on stderr (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    // Parse CLI arguments.
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    // Compile the expression.
    let tokens: Vec<Token> = if args.strict {
        match tokenize_strict(&args.path) {
            Ok(t) => t,
            Err(e) => {
                eprintln!("Invalid path expression: {e}");
                std::process::exit(1);
            }
        }
    } else {
        tokenize(&args.path)
    };
    debug!(count = tokens.len(), "tokenized expression");

    if args.tokens {
        print_json(&serde_json::to_value(&tokens).unwrap_or(Value::Null));
        return;
    }

    // Parse input JSON.
    let data: Value = match read_document(&args).map(|text| serde_json::from_str(&text)) {
        Ok(Ok(v)) => v,
        Ok(Err(e)) => {
            eprintln!("Invalid JSON: {e}");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Cannot read input: {e}");
            std::process::exit(1);
        }
    };

    // Build options.
    let mut opts = JsonPathOptions::new()
        .json(data)
        .path(args.path.clone())
        .result_type(args.result_type)
        .wrap(!args.no_wrap);
    if let Some(n) = args.count {
        opts = opts.count(n);
    }

    // Query the path.
    let out = jsonpath(&opts).unwrap_or(Value::Null);

    // Output result.
    print_json(&out);
}

fn read_document(args: &Args) -> std::io::Result<String> {
    if let Some(json) = &args.json {
        return Ok(json.clone());
    }
    if let Some(file) = &args.file {
        return std::fs::read_to_string(file);
    }
    let mut buf = String::new();
    std::io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => {
            eprintln!("Cannot render output: {e}");
            std::process::exit(1);
        }
    }
}
