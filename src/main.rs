use clap::Parser;
use colored::*;
use std::process;

use mcp_health::cli::Args;
use mcp_health::config::Config;
use mcp_health::mcp::sse_client;
use mcp_health::ui::output;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();

    if args.no_color {
        colored::control::set_override(false);
    }

    let config = match Config::from_env_and_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            process::exit(1);
        }
    };

    mcp_health::logging::init(config.verbose);

    match sse_client::run(&config).await {
        Ok(reply) => {
            output::print_tool_output(&reply, "SYSTEM HEALTH REPORT");
        }
        Err(e) => {
            output::failure(&e);
            process::exit(1);
        }
    }
}
