/*!
This binary decides defeasible entailment for propositional knowledge bases in the style of Kraus, Lehmann and Magidor (KLM).

# Defeasible knowledge bases
A knowledge base consists of classical statements such as `b=>p` and defeasible implications such as `b~>f` ("birds typically fly").
The statements are ranked by how exceptional their antecedent is (BaseRank), and a query `α~>β` is decided by giving up the least typical statements until `α` is consistent with the rest.
Rational closure gives up entire ranks, lexicographic closure keeps as many statements of a rank as possible, and basic and minimal relevant closure only give up statements which are relevant to the conflict with `α`.

Classical entailment is decided by binary decision diagrams (<https://github.com/sybila/biodivine-lib-bdd>) or, for small signatures, by truth tables.

# Input-file format
One statement per line, lines starting with `#` are comments:
```plain
# birds and penguins
b=>p
p~>f
p~>w
b~>!f
```
With `--eval` the input file is an evaluation request in JSON instead.

# Usage
```plain
Usage: klm-closure [OPTIONS] <INPUT>

Arguments:
  <INPUT>  Input filename

Options:
      --rust_log <RUST_LOG>  Sets the verbosity to 'warn', 'info', 'debug' or 'trace' if -v and -q are not use [env: RUST_LOG=]
  -v...                      Sets log verbosity (multiple times means more verbose)
  -q                         Sets log verbosity to only errors
      --query <QUERY>        Queries to decide, may be given multiple times
      --baserank             Print the BaseRank ranking
      --rc                   Decide the queries with rational closure
      --lc                   Decide the queries with lexicographic closure
      --brc                  Decide the queries with basic relevant closure
      --mrc                  Decide the queries with minimal relevant closure
      --all                  Decide the queries with every closure operation, in parallel
      --justify              Compute the justifications of entailed queries
      --explain              Print the explanation of every computation
      --json                 Print the results in their JSON wire format
      --oracle <ORACLE>      Choose the classical entailment oracle [possible values: bdd, naive]
      --search <SEARCH>      Choose the rank search of rational closure [possible values: naive, binary, ternary]
      --subsets <SUBSETS>    Choose the subset enumeration of lexicographic closure [possible values: naive, powerset]
      --timeout <TIMEOUT>    Time budget of every computation in seconds
      --eval                 Treat the input as an evaluation request and print the timing reports
  -h, --help                 Print help
  -V, --version              Print version
```
 */

#![deny(
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![warn(
    missing_docs,
    unused_import_braces,
    unused_qualifications,
    unused_extern_crates,
    variant_size_differences
)]

use std::path::PathBuf;

use clap::builder::{PossibleValuesParser, TypedValueParser};
use clap::{ArgAction, Parser};
use serde::Serialize;
use strum::VariantNames;

use klm_closure::closure::{Algorithm, EntailmentResult, SearchVariant, SubsetVariant};
use klm_closure::datatypes::{Formula, KnowledgeBase};
use klm_closure::error::Result;
use klm_closure::evaluation::EvaluationRequest;
use klm_closure::oracle::OracleKind;
use klm_closure::parser::{parse_lines, parse_query};
use klm_closure::reasoner::{Reasoner, ReasonerConfig};

#[derive(Parser, Debug)]
#[command(name = "klm-closure", author, version, about)]
struct App {
    /// Input filename
    input: PathBuf,
    /// Sets the verbosity to 'warn', 'info', 'debug' or 'trace' if -v and -q are not use
    #[arg(long = "rust_log", env)]
    rust_log: Option<String>,
    /// Sets log verbosity (multiple times means more verbose)
    #[arg(short, action = ArgAction::Count, group = "verbosity")]
    verbose: u8,
    /// Sets log verbosity to only errors
    #[arg(short, group = "verbosity")]
    quiet: bool,
    /// Queries to decide, may be given multiple times
    #[arg(long)]
    query: Vec<String>,
    /// Print the BaseRank ranking
    #[arg(long)]
    baserank: bool,
    /// Decide the queries with rational closure
    #[arg(long)]
    rc: bool,
    /// Decide the queries with lexicographic closure
    #[arg(long)]
    lc: bool,
    /// Decide the queries with basic relevant closure
    #[arg(long)]
    brc: bool,
    /// Decide the queries with minimal relevant closure
    #[arg(long)]
    mrc: bool,
    /// Decide the queries with every closure operation, in parallel
    #[arg(long, conflicts_with_all = ["rc", "lc", "brc", "mrc"])]
    all: bool,
    /// Compute the justifications of entailed queries
    #[arg(long)]
    justify: bool,
    /// Print the explanation of every computation
    #[arg(long)]
    explain: bool,
    /// Print the results in their JSON wire format
    #[arg(long)]
    json: bool,
    /// Choose the classical entailment oracle
    #[arg(long, value_parser = PossibleValuesParser::new(OracleKind::VARIANTS.iter().copied()).try_map(|s| s.parse::<OracleKind>()))]
    oracle: Option<OracleKind>,
    /// Choose the rank search of rational closure
    #[arg(long, value_parser = PossibleValuesParser::new(SearchVariant::VARIANTS.iter().copied()).try_map(|s| s.parse::<SearchVariant>()))]
    search: Option<SearchVariant>,
    /// Choose the subset enumeration of lexicographic closure
    #[arg(long, value_parser = PossibleValuesParser::new(SubsetVariant::VARIANTS.iter().copied()).try_map(|s| s.parse::<SubsetVariant>()))]
    subsets: Option<SubsetVariant>,
    /// Time budget of every computation in seconds
    #[arg(long)]
    timeout: Option<u64>,
    /// Treat the input as an evaluation request and print the timing reports
    #[arg(long, conflicts_with_all = ["query", "baserank", "all", "rc", "lc", "brc", "mrc"])]
    eval: bool,
}

impl App {
    fn run(&self) -> Result<()> {
        let filter_level = match self.verbose {
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            3 => log::LevelFilter::Trace,
            _ => {
                if self.quiet {
                    log::LevelFilter::Error
                } else if let Some(rust_log) = self.rust_log.clone() {
                    match rust_log.as_str() {
                        "error" => log::LevelFilter::Error,
                        "info" => log::LevelFilter::Info,
                        "debug" => log::LevelFilter::Debug,
                        "trace" => log::LevelFilter::Trace,
                        _ => log::LevelFilter::Warn,
                    }
                } else {
                    log::LevelFilter::Warn
                }
            }
        };
        env_logger::builder().filter_level(filter_level).init();
        log::info!("Version: {}", clap::crate_version!());
        let input = std::fs::read_to_string(&self.input)?;

        if self.eval {
            return self.evaluate(&input);
        }

        let knowledge_base = parse_lines(&input)?.into_iter().collect::<KnowledgeBase>();
        log::info!("[Done] parsing {} statements", knowledge_base.len());
        let queries = self
            .query
            .iter()
            .map(|query| parse_query(query))
            .collect::<Result<Vec<Formula>>>()?;

        let reasoner = Reasoner::new(knowledge_base, self.config());
        let base_rank = reasoner.base_rank()?;
        if self.baserank || queries.is_empty() {
            if self.json {
                print_json(&base_rank)?;
            } else {
                print!("{}", base_rank.ranking);
            }
            if self.explain {
                print_json(&reasoner.explain_base_rank(&base_rank)?)?;
            }
        }

        for query in &queries {
            let results = if self.all {
                reasoner.entail_all(query, &base_rank)?
            } else {
                self.algorithms()
                    .into_iter()
                    .map(|algorithm| reasoner.entail(query, algorithm, &base_rank))
                    .collect::<Result<Vec<_>>>()?
            };
            for result in &results {
                self.print_result(result)?;
            }
        }
        Ok(())
    }

    fn config(&self) -> ReasonerConfig {
        let default = ReasonerConfig::default();
        ReasonerConfig {
            oracle: self.oracle.unwrap_or(default.oracle),
            timeout_ms: self.timeout.map(|secs| secs.saturating_mul(1000)),
            justification: self.justify,
            search: self.search.unwrap_or(default.search),
            subsets: self.subsets.unwrap_or(default.subsets),
        }
    }

    /// The selected closure operations, rational closure if none is selected.
    fn algorithms(&self) -> Vec<Algorithm> {
        let selected = Algorithm::ALL
            .into_iter()
            .zip([self.rc, self.lc, self.brc, self.mrc])
            .filter_map(|(algorithm, selected)| selected.then_some(algorithm))
            .collect::<Vec<_>>();
        if selected.is_empty() {
            vec![Algorithm::Rational]
        } else {
            selected
        }
    }

    fn print_result(&self, result: &EntailmentResult) -> Result<()> {
        if self.json {
            print_json(result)?;
        } else {
            let common = result.common();
            println!(
                "{}: {} {}",
                result.algorithm(),
                common.query_formula,
                if common.entailed {
                    "entailed"
                } else {
                    "not entailed"
                }
            );
            for justification in &common.justification {
                let rendered = justification
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>();
                println!("  {{{}}}", rendered.join(", "));
            }
        }
        if self.explain {
            print_json(&result.explain())?;
        }
        Ok(())
    }

    fn evaluate(&self, input: &str) -> Result<()> {
        let mut request: EvaluationRequest = serde_json::from_str(input)?;
        if let Some(oracle) = self.oracle {
            request.oracle = oracle;
        }
        if let Some(secs) = self.timeout {
            request.timeout_ms = Some(secs.saturating_mul(1000));
        }
        let reports = request.run()?;
        if self.json {
            print_json(&reports)?;
        } else {
            for report in &reports {
                println!(
                    "#{} {} statements, {} ranks, base rank {:.6}s",
                    report.index,
                    report.knowledge_base.len(),
                    report.ranks,
                    report.base_rank_time
                );
                for timing in &report.timings {
                    println!("  {}: {:.6}s", timing.implementation, timing.average_time);
                }
            }
        }
        Ok(())
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() {
    let app = App::parse();
    if let Err(err) = app.run() {
        log::error!("{} ({})", err, err.code());
        std::process::exit(1);
    }
}
