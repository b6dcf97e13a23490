use clap::Parser;

use nftlend::adapter::inbound::cli::command::{Cli, ColorChoice};
use nftlend::adapter::inbound::cli::output::{self, OutputConfig};
use nftlend::adapter::inbound::cli::{operator, run};
use nftlend::infrastructure::config::settings::Config;
use nftlend::infrastructure::operator::entry::Operator;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {}
    }
    output::configure(OutputConfig::new(cli.json, cli.quiet, cli.verbose));

    if operator::install(Box::new(Operator)).is_err() {
        output::error("CLI operator installed twice");
        std::process::exit(1);
    }

    // A broken config still gets logging; the command reports the error.
    let mut logging = Config::load(&cli.config)
        .map(|config| config.logging)
        .unwrap_or_default();
    logging.override_with(cli.log_level.as_deref(), cli.json_logs);
    logging.init();

    if let Err(e) = run::execute(&cli).await {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
