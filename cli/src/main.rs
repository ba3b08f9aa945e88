//! `tfh` - command retry, polling and teardown harness for infrastructure tests

use clap::Parser;
use tfh_cli::cli::Cli;
use tfh_cli::output::json;

#[tokio::main]
async fn main() {
    tfh_cli::infra::logging::init_tracing();
    let cli = Cli::parse();
    let json_out = cli.json;
    if let Err(e) = cli.run().await {
        match json_out
            .then(|| json::format_error(&format!("{e:#}"), json::error_code(&e)))
            .and_then(Result::ok)
        {
            Some(obj) => println!("{obj}"),
            None => eprintln!("Error: {e}"),
        }
        std::process::exit(1);
    }
}
