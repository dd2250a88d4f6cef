//! Zoo cashier entry point.

use clap::Parser;
use std::process::ExitCode;

use zoo_cashier::cli::Cli;
use zoo_cashier::error::ApiError;
use zoo_cashier::{init_tracing, run};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let json = cli.json;

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<ApiError>() {
            Some(api) => {
                if json {
                    match serde_json::to_string_pretty(api) {
                        Ok(body) => println!("{}", body),
                        Err(_) => eprintln!("{}", api.message),
                    }
                } else {
                    eprintln!("{}", api.message);
                }
                ExitCode::from(api.code.exit_code() as u8)
            }
            None => {
                eprintln!("Erreur : {:#}", err);
                ExitCode::FAILURE
            }
        },
    }
}
