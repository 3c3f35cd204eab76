use clap::{Parser as ClapParser, Subcommand};
use formula_lang::cli::{self, CheckOptions, CheckResult, CliError};
use std::io::{self, Read};
use std::path::PathBuf;

#[derive(ClapParser)]
#[command(name = "formula")]
#[command(about = "Formula - parse and check rule expressions over typed entities")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an expression and print its canonical form
    Check {
        /// The expression (reads from stdin if not provided)
        expression: Option<String>,

        /// JSON catalog of variables and functions
        #[arg(short, long)]
        env: Option<PathBuf>,

        /// Print the expression tree as JSON
        #[arg(short, long)]
        json: bool,

        /// Pretty-print the JSON tree
        #[arg(short, long)]
        pretty: bool,
    },

    /// Print the tokens of an expression, one per line
    Tokens {
        /// The expression (reads from stdin if not provided)
        expression: Option<String>,
    },

    /// Show the language reference, or one category of it
    Docs {
        /// Category name: syntax, operators, functions, units, types
        category: Option<String>,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check {
            expression,
            env,
            json,
            pretty,
        } => run_check(expression, env, json, pretty),
        Commands::Tokens { expression } => run_tokens(expression),
        Commands::Docs { category: None } => {
            print!("{}", cli::get_docs_reference());
            Ok(())
        }
        Commands::Docs {
            category: Some(category),
        } => cli::get_doc_category(&category).map(|content| print!("{}", content)),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

/// The argument, or stdin when it is piped.
fn read_expression(expression: Option<String>) -> Result<String, CliError> {
    match expression {
        Some(s) => Ok(s),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer.trim_end().to_string())
        }
        None => Err(CliError::NoInput),
    }
}

fn run_check(
    expression: Option<String>,
    env: Option<PathBuf>,
    json: bool,
    pretty: bool,
) -> Result<(), CliError> {
    let expression = read_expression(expression)?;
    let catalog = env.map(std::fs::read_to_string).transpose()?;

    let options = CheckOptions {
        expression,
        catalog,
        json: json || pretty,
    };

    match cli::execute_check(&options)? {
        CheckResult::Canonical { text, .. } => println!("{}", text),
        CheckResult::Tree(tree) => {
            let json = if pretty {
                serde_json::to_string_pretty(&tree)
            } else {
                serde_json::to_string(&tree)
            }?;
            println!("{}", json);
        }
    }
    Ok(())
}

fn run_tokens(expression: Option<String>) -> Result<(), CliError> {
    let expression = read_expression(expression)?;
    for token in cli::execute_tokens(&expression)? {
        println!("{:?}", token);
    }
    Ok(())
}
