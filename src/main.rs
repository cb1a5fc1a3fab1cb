use clap::{Parser, Subcommand};

use commands::GlobalArgs;

#[derive(Debug, Clone, Copy)]
enum ResponseMode {
    Json,
    /// The transformed document itself is the output.
    RawDocument,
}

mod commands;
mod output;
mod tty;

use commands::{config, rename, table};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "fieldfix")]
#[command(version = VERSION)]
#[command(about = "Migrate legacy field names in energy aggregation JSON documents")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rename legacy keys in a JSON document
    #[command(visible_alias = "fix")]
    Rename(rename::RenameArgs),
    /// Show the effective rename table
    Table(table::TableArgs),
    /// Manage global fieldfix configuration
    Config(config::ConfigArgs),
}

fn response_mode(command: &Commands) -> ResponseMode {
    match command {
        Commands::Rename(args) if args.writes_document_to_stdout() => ResponseMode::RawDocument,
        _ => ResponseMode::Json,
    }
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let global = GlobalArgs {};

    match response_mode(&cli.command) {
        ResponseMode::RawDocument => match commands::run_raw(cli.command, &global) {
            Ok((document, exit_code)) => {
                if let Err(err) = output::print_raw(&document) {
                    let _ = output::print_result(Err(err));
                    return std::process::ExitCode::from(1);
                }
                std::process::ExitCode::from(exit_code_to_u8(exit_code))
            }
            Err(err) => {
                let (json_result, exit_code) =
                    output::map_cmd_result_to_json::<serde_json::Value>(Err(err));
                let _ = output::print_result(json_result);
                std::process::ExitCode::from(exit_code_to_u8(exit_code))
            }
        },
        ResponseMode::Json => {
            let (json_result, exit_code) = commands::run_json(cli.command, &global);
            let _ = output::print_result(json_result);
            std::process::ExitCode::from(exit_code_to_u8(exit_code))
        }
    }
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
