use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use log::{LevelFilter, debug};
use regexp_master_core::{ListOptions, build_regexp_from_list, parse_regexp, pcre_to_js};

#[derive(Parser)]
#[command(name = "regexp-master")]
#[command(about = "Regexp Master - Build, inspect and transpile regexps")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a regexp matching exactly the given words
    List {
        /// The words to match
        words: Vec<String>,
        /// Read additional words from a file, one per line
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Replace a literal substring by a raw regexp fragment (KEY=FRAGMENT)
        #[arg(short, long = "special", value_name = "KEY=FRAGMENT")]
        special: Vec<String>,
        /// Never emit the leading lookahead assertion
        #[arg(long)]
        no_lookahead: bool,
    },
    /// Tokenize a delimited PCRE pattern
    Parse {
        /// The pattern, delimiters and modifiers included
        pattern: String,
        /// Print the tokens as JSON
        #[arg(long)]
        json: bool,
    },
    /// Transpile a delimited PCRE pattern to a JavaScript regexp literal
    Js {
        /// The pattern, delimiters and modifiers included
        pattern: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    match cli.command {
        Commands::List {
            words,
            file,
            special,
            no_lookahead,
        } => cmd_list(words, file.as_deref(), &special, no_lookahead),
        Commands::Parse { pattern, json } => cmd_parse(&pattern, json),
        Commands::Js { pattern } => cmd_js(&pattern),
    }
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{} {}", "Error:".red().bold(), message);
    std::process::exit(1);
}

fn cmd_list(words: Vec<String>, file: Option<&Path>, special: &[String], no_lookahead: bool) {
    let mut words: Vec<Vec<u8>> = words.into_iter().map(String::into_bytes).collect();

    if let Some(path) = file {
        let content = match std::fs::read(path) {
            Ok(content) => content,
            Err(e) => fail(format!("could not read {}: {}", path.display(), e)),
        };
        words.extend(split_lines(&content));
    }
    debug!("building regexp from {} words", words.len());

    let mut options = ListOptions::new().disable_lookahead(no_lookahead);
    for pair in special {
        match pair.split_once('=') {
            Some((key, fragment)) if !key.is_empty() => {
                options = options.special_char(key, fragment);
            }
            _ => fail(format!("invalid special char {:?}, expected KEY=FRAGMENT", pair)),
        }
    }

    match build_regexp_from_list(words.as_slice(), &options) {
        Ok(regexp) => println!("{}", regexp.green()),
        Err(e) => fail(e),
    }
}

/// Split file content into lines, dropping a trailing `\r` and the final empty line
fn split_lines(content: &[u8]) -> Vec<Vec<u8>> {
    let content = content.strip_suffix(b"\n").unwrap_or(content);
    if content.is_empty() {
        return Vec::new();
    }
    content
        .split(|&b| b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line).to_vec())
        .collect()
}

fn cmd_parse(pattern: &str, json: bool) {
    let parsed = match parse_regexp(pattern) {
        Ok(parsed) => parsed,
        Err(e) => fail(e),
    };

    if json {
        match serde_json::to_string_pretty(&parsed) {
            Ok(output) => println!("{}", output),
            Err(e) => fail(e),
        }
        return;
    }

    println!("{}", "Parsed pattern:".bold());
    println!("  Delimiter: {}", parsed.delimiter.to_string().cyan());
    println!("  Modifiers: {}", parsed.modifiers.cyan());
    println!("  Regexp:    {}", parsed.regexp.yellow());
    println!();

    if parsed.tokens.is_empty() {
        println!("{}", "No tokens".dimmed());
        return;
    }

    println!("{}", "Tokens:".bold());
    for (i, token) in parsed.tokens.iter().enumerate() {
        let source = &parsed.regexp[token.pos..token.pos + token.len];
        println!(
            "  [{}] {}..{} {} {}",
            i,
            token.pos,
            token.pos + token.len,
            source.green(),
            token.kind
        );
    }
}

fn cmd_js(pattern: &str) {
    let (js, names) = match pcre_to_js(pattern) {
        Ok(result) => result,
        Err(e) => fail(e),
    };

    println!("{}", js.green());

    if !names.is_empty() {
        let mut names: Vec<_> = names.into_iter().collect();
        names.sort_by_key(|(_, group)| *group);

        println!();
        println!("{}", "Named groups:".bold());
        for (name, group) in names {
            println!("  {} = {}", name.cyan(), group);
        }
    }
}
