// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//    http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
use std::error::Error;
use std::fs;

use clap::{arg, Arg, ArgMatches, Command};
use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
//
use lllc::asm;
use lllc::lll::{self, Compiler, Node};
use lllc::util::ToHexString;

fn main() -> Result<(), Box<dyn Error>> {
    // Parse command-line arguments
    let matches = Command::new("lllc")
        .about("LLL Compiler")
        .version("0.1.0")
        .subcommand_required(true)
        .arg(arg!(--verbose "Show verbose output"))
        .subcommand(
            Command::new("compile")
                .about("Compile LLL code to EVM bytecode")
                .arg(Arg::new("file").required(true))
                .visible_alias("c"),
        )
        .subcommand(
            Command::new("assembly")
                .about("Lower LLL code to symbolic assembly")
                .arg(Arg::new("file").required(true))
                .visible_alias("a"),
        )
        .subcommand(
            Command::new("gas")
                .about("Estimate the gas consumption of LLL code")
                .arg(Arg::new("file").required(true))
                .visible_alias("g"),
        )
        .get_matches();
    // Extract top-level flags
    let verbose = matches.is_present("verbose");
    // Initialise logging
    if verbose {
        init_logging(LevelFilter::Debug);
    }
    // Dispatch on outcome
    let ok = match matches.subcommand() {
        Some(("compile", args)) => compile(args),
        Some(("assembly", args)) => assembly(args),
        Some(("gas", args)) => gas(args),
        _ => unreachable!(),
    }?;
    // Determine appropriate exit code
    let exitcode = if ok { 0 } else { 1 };
    // Done
    std::process::exit(exitcode);
}

/// Compile a given file all the way to bytecode.
fn compile(args: &ArgMatches) -> Result<bool, Box<dyn Error>> {
    let tree = read_tree(args)?;
    // Lower the tree into symbolic assembly
    let tokens = Compiler::new().compile(&tree)?;
    // Resolve labels and emit bytes
    let bytes = asm::encode(&tokens)?;
    // Print the final hex string
    println!("{}", bytes.to_hex_string());
    //
    Ok(true)
}

/// Lower a given file and print the token stream.
fn assembly(args: &ArgMatches) -> Result<bool, Box<dyn Error>> {
    let tree = read_tree(args)?;
    let tokens = Compiler::new().compile(&tree)?;
    let line: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
    println!("{}", line.join(" "));
    //
    Ok(true)
}

/// Estimate the gas consumption of a given file.
fn gas(args: &ArgMatches) -> Result<bool, Box<dyn Error>> {
    let tree = read_tree(args)?;
    println!("{}", lll::estimate(&tree)?);
    //
    Ok(true)
}

/// Read and parse the LLL file named by the subcommand argument.
fn read_tree(args: &ArgMatches) -> Result<Node, Box<dyn Error>> {
    // Extract the file to be compiled.
    let filename = args.get_one::<String>("file").unwrap();
    // Read the source file
    let input = fs::read_to_string(filename)?;
    // Parse source into a tree
    let tree = lll::parse(&input)?;
    //
    Ok(tree)
}

/// Initialise logging using a suitable pattern.
pub fn init_logging(level: LevelFilter) {
    let encoder = PatternEncoder::new("[{l}] {m}{n}");
    //
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(encoder))
        .build();
    //
    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(level))
        .unwrap();
    //
    let _handle = log4rs::init_config(config).unwrap();
}
