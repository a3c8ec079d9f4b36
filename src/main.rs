use clap::Parser;
use pathq::{CliError, EngineConfig, JsonPath, read_document, render_results};
use std::env;
use std::fs::File;
use std::io;
use std::path::PathBuf;

/// Run a JSONPath expression against a JSON document.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The JSONPath expression, e.g. `$.store.book[?(@.price < 10)].title`
    expression: String,

    /// JSON file to query; reads standard input when omitted
    file: Option<PathBuf>,

    /// Maximum nesting depth for recursive descent and filter groups
    #[arg(long, default_value_t = pathq::DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Print each match on a single line
    #[arg(long, default_value_t = false)]
    compact: bool,

    /// Print only the number of results
    #[arg(long, default_value_t = false)]
    count: bool,

    /// Fail on queries that abort instead of printing an empty result
    #[arg(long, default_value_t = false)]
    strict: bool,
}

fn main() -> Result<(), CliError> {
    if env::var("RUST_LOG").is_err() {
        unsafe {
            env::set_var("RUST_LOG", "pathq=info");
        }
    }
    env_logger::init();

    let args = Args::parse();

    let document = match &args.file {
        Some(path) => read_document(File::open(path)?)?,
        None => read_document(io::stdin().lock())?,
    };
    log::debug!("Document loaded, running '{}'", args.expression);

    let query = JsonPath::new(&document, args.expression.as_str())
        .with_config(EngineConfig::new().with_max_depth(args.max_depth));
    let results = if args.strict {
        query.try_evaluate()?
    } else {
        query.evaluate()?
    };
    log::info!("{} result(s) for '{}'", results.len(), query.expression());

    if args.count {
        println!("{}", results.len());
    } else if !results.is_empty() {
        println!("{}", render_results(&results, args.compact)?);
    }
    Ok(())
}
