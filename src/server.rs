// Rocket instance for the agent server

use rocket::fairing::AdHoc;
use rocket::{Build, Rocket};

use crate::bot::Bot;
use crate::handler;

/// Mounts the agent endpoints around one managed Bot
pub fn build(bot: Bot) -> Rocket<Build> {
    rocket::build()
        .manage(bot)
        .attach(AdHoc::on_response("Server ID Middleware", |_, res| {
            Box::pin(async move {
                res.set_raw_header("Server", "lightcycle-arena/agent");
            })
        }))
        .mount(
            "/",
            rocket::routes![
                handler::index,
                handler::send_state,
                handler::send_move,
                handler::end
            ],
        )
}
