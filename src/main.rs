#[macro_use]
extern crate rocket;

use lightcycle_arena::bot::Bot;
use lightcycle_arena::config::Config;
use lightcycle_arena::server;
use log::info;
use std::env;

#[launch]
fn rocket() -> _ {
    // Lots of web hosting services expect you to bind to the port specified by the `PORT`
    // environment variable. However, Rocket looks at the `ROCKET_PORT` environment variable.
    // If we find a value for `PORT`, we set `ROCKET_PORT` to that value.
    if let Ok(port) = env::var("PORT") {
        env::set_var("ROCKET_PORT", &port);
    }

    // We default to 'info' level logging. But if the `RUST_LOG` environment variable is set,
    // we keep that value instead.
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }

    env_logger::init();

    // Load configuration once at startup
    let mut config = Config::load_or_default();
    config.apply_env_overrides();

    info!(
        "Starting light-cycle agent {} / {}...",
        config.agent.participant, config.agent.agent_name
    );

    server::build(Bot::new(config))
}
