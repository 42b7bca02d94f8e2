mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Arg, ArgAction, ArgMatches, Command};
use javelin_core::{Compiler, Options, expand_sources, generate_error_report};
use log::{debug, error};

fn main() -> ExitCode {
    let cli = Command::new("javelin")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Lowers typed Java compilation units to LLVM-flavoured IR")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .help("Increase log output (-v info, -vv debug, -vvv trace)")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .global(true),
        );

    let cli = setup_cli(cli);
    let matches = cli.get_matches();
    output::init_logging(matches.get_count("verbose"));
    dispatch_commands(&matches)
}

/// Sets up the `build` subcommand and its options.
fn setup_cli(cli: Command) -> Command {
    cli.subcommand(
        Command::new("build")
            .about("Compile typed compilation units (JSON) to IR text files")
            .arg(
                Arg::new("inputs")
                    .help("Input files or glob patterns")
                    .required(true)
                    .num_args(1..)
                    .index(1),
            )
            .arg(
                Arg::new("output-ext")
                    .help("Extension of emitted files")
                    .short('o')
                    .long("output-ext")
                    .value_parser(clap::value_parser!(String))
                    .value_name("EXT")
                    .default_value("ll"),
            )
            .arg(
                Arg::new("entry-point")
                    .help("Class whose main(String[]) the generated main calls")
                    .long("entry-point")
                    .value_parser(clap::value_parser!(String))
                    .value_name("CLASS"),
            )
            .arg(
                Arg::new("dump-desugared")
                    .help("Print each unit's AST after desugaring")
                    .long("dump-desugared")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("output-dir")
                    .help("Directory for emitted files (defaults to next to each input)")
                    .short('d')
                    .long("output-dir")
                    .value_parser(clap::value_parser!(PathBuf))
                    .value_name("DIR"),
            )
            .arg(
                Arg::new("report")
                    .help("Print a table of goal statuses when done")
                    .long("report")
                    .action(ArgAction::SetTrue),
            ),
    )
}

fn dispatch_commands(matches: &ArgMatches) -> ExitCode {
    match matches.subcommand() {
        Some(("build", sub_m)) => build(sub_m),
        _ => {
            eprintln!("No valid subcommand was used. Use --help for more information.");
            ExitCode::FAILURE
        }
    }
}

fn options_from(matches: &ArgMatches) -> Options {
    let mut options = Options::default();
    if let Some(ext) = matches.get_one::<String>("output-ext") {
        options.output_ext = ext.trim_start_matches('.').to_string();
    }
    options.entry_point = matches.get_one::<String>("entry-point").cloned();
    options.dump_desugared = matches.get_flag("dump-desugared");
    options.output_dir = matches.get_one::<PathBuf>("output-dir").cloned();
    options
}

fn build(matches: &ArgMatches) -> ExitCode {
    let patterns: Vec<String> = matches.get_many::<String>("inputs").into_iter().flatten().cloned().collect();
    let sources = match expand_sources(&patterns) {
        Ok(sources) => sources,
        Err(err) => {
            eprintln!("{}", generate_error_report(&err));
            return ExitCode::FAILURE;
        }
    };
    let options = options_from(matches);
    debug!("{:?}", options);

    let mut compiler = Compiler::new(options);
    let jobs: Vec<_> = sources.iter().map(|source| compiler.add_input(source)).collect();

    let progress = output::unit_progress(jobs.len());
    let mut compiled = 0;
    for (job, source) in jobs.iter().zip(&sources) {
        progress.set_message(source.display().to_string());
        match compiler.compile_job(*job) {
            Ok(out) => {
                compiled += 1;
                progress.suspend(|| log::info!("{} -> {}", source.display(), out.display()));
            }
            Err(err) => progress.suspend(|| {
                error!("{} failed", source.display());
                eprintln!("{}", generate_error_report(&err));
            }),
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    if matches.get_flag("report") {
        println!("{}", output::title("Goals"));
        println!("{}", output::goal_table(&compiler.report()));
    }
    println!("{}", output::summary(compiled, jobs.len()));

    if compiled == jobs.len() { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}
