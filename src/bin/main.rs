use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::io::{AsyncReadExt, stdin, stdout};
use tower_lsp_server::{LspService, Server};

use seisho::formatter::{FormatOutcome, FormatRequest, invoke, parse_stderr};
use seisho::lsp::{Seisho, load_settings};

/// A language server bridging editors to an external formatter binary
#[derive(Parser)]
#[command(name = "seisho")]
#[command(version)]
#[command(about = "A language server bridging editors to an external formatter binary")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Format a file (or stdin) once and print the result to stdout
    Fmt {
        /// The file to format; reads stdin when omitted
        file: Option<PathBuf>,

        /// Formatter command to run (default: from configuration)
        #[arg(long)]
        formatter: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Fmt { file, formatter }) => {
            let exit_code = run_fmt(file, formatter).await;
            std::process::exit(exit_code);
        }
        None => {
            // Start LSP server over stdio (default behavior)
            let stdin = stdin();
            let stdout = stdout();

            let (service, socket) = LspService::new(Seisho::new);
            Server::new(stdin, stdout, socket).serve(service).await;
        }
    }
}

async fn run_fmt(file: Option<PathBuf>, formatter: Option<String>) -> i32 {
    let (text, working_dir, display_name) = match &file {
        Some(path) => match tokio::fs::read_to_string(path).await {
            Ok(text) => (
                text,
                path.parent().map(|dir| dir.to_path_buf()),
                path.display().to_string(),
            ),
            Err(err) => {
                eprintln!("Error: could not read {}: {}", path.display(), err);
                return 1;
            }
        },
        None => {
            let mut text = String::new();
            if let Err(err) = stdin().read_to_string(&mut text).await {
                eprintln!("Error: could not read stdin: {}", err);
                return 1;
            }
            (text, None, "<stdin>".to_string())
        }
    };

    let root = working_dir.clone();
    let mut settings = load_settings(root.as_deref(), None).settings;
    if let Some(command) = formatter {
        settings.command = command;
    }

    let request = FormatRequest::new(text).with_working_dir(working_dir);
    match invoke(&request, &settings.command, &settings.args).await {
        Ok(FormatOutcome::Formatted(formatted)) => {
            print!("{}", formatted);
            0
        }
        Ok(FormatOutcome::Failed { stderr, exit_code }) => {
            let errors = parse_stderr(&stderr);
            if errors.is_empty() {
                eprintln!("Error: {}", stderr.trim());
            } else {
                for error in errors {
                    // Back to the 1-based convention for terminal output
                    eprintln!(
                        "{}:{}:{}: {}",
                        display_name,
                        error.line + 1,
                        error.column + 1,
                        error.message
                    );
                }
            }
            if exit_code > 0 { exit_code } else { 1 }
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            eprintln!("{}", err.remediation(&settings.command));
            1
        }
    }
}
