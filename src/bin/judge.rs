// Match judge binary
//
// Plays one match between the agents at PLAYER1_URL and PLAYER2_URL with the
// reference rules engine and prints the summary and the game string.

use log::{error, info};
use std::env;
use std::process::ExitCode;
use std::time::Duration;

use lightcycle_arena::config::Config;
use lightcycle_arena::judge::{HttpAgentClient, Judge};
use lightcycle_arena::rules::StandardRules;

#[tokio::main]
async fn main() -> ExitCode {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let mut config = Config::load_or_default();
    config.apply_env_overrides();

    info!("Judge engine starting up, waiting for agents...");
    tokio::time::sleep(Duration::from_millis(config.judge.startup_delay_ms)).await;

    let timeout = config.judge.request_timeout();
    let clients = HttpAgentClient::new(config.judge.player1_url.clone(), timeout).and_then(
        |p1| HttpAgentClient::new(config.judge.player2_url.clone(), timeout).map(|p2| (p1, p2)),
    );
    let (p1, p2) = match clients {
        Ok(pair) => pair,
        Err(e) => {
            error!("Could not create HTTP clients: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let rules = match StandardRules::new(&config.rules) {
        Ok(rules) => rules,
        Err(e) => {
            error!("Invalid rules settings: {}", e);
            return ExitCode::FAILURE;
        }
    };
    match Judge::new(p1, p2, rules, config.judge.clone()).run().await {
        Ok(report) => {
            println!("{}", report.summary());
            println!("Game String: {}", report.move_log);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Match aborted: {}", e);
            ExitCode::FAILURE
        }
    }
}
