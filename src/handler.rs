// HTTP handler bindings for the agent endpoints
//
// This module provides thin wrapper functions that bind Rocket HTTP routes
// to the Bot's core logic methods. Handlers are responsible for:
// - Deserializing incoming JSON requests
// - Extracting Bot instance from Rocket's managed state
// - Delegating to Bot methods
// - Serializing responses

use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{get, post};
use serde_json::{json, Value};

use crate::bot::Bot;
use crate::types::StateUpdate;

/// GET / endpoint
/// Returns agent identity
#[get("/")]
pub fn index(bot: &rocket::State<Bot>) -> Json<Value> {
    Json(bot.info())
}

/// POST /send-state endpoint
/// A missing, unparseable or empty body is a 400
#[post("/send-state", data = "<state>")]
pub fn send_state(
    bot: &rocket::State<Bot>,
    state: Option<Json<StateUpdate>>,
) -> (Status, Json<Value>) {
    let accepted = state.map_or(false, |Json(update)| bot.receive_state(update));
    if accepted {
        (Status::Ok, Json(json!({ "status": "state received" })))
    } else {
        (
            Status::BadRequest,
            Json(json!({ "error": "no valid state provided" })),
        )
    }
}

/// GET /send-move endpoint
/// Called up to twice per turn by the judge
#[get("/send-move?<player_number>&<attempt_number>&<random_moves_left>&<turn_count>")]
pub async fn send_move(
    bot: &rocket::State<Bot>,
    player_number: Option<u8>,
    attempt_number: Option<u32>,
    random_moves_left: Option<u32>,
    turn_count: Option<u32>,
) -> Json<Value> {
    log::debug!(
        "move request: attempt {:?}, {:?} random moves left",
        attempt_number,
        random_moves_left
    );
    Json(bot.get_move(player_number, turn_count).await)
}

/// POST /end endpoint
/// Called once when the match is over
#[post("/end", data = "<end_req>")]
pub fn end(bot: &rocket::State<Bot>, end_req: Option<Json<Value>>) -> Json<Value> {
    let result = end_req
        .as_ref()
        .and_then(|body| body.get("result"))
        .and_then(Value::as_str);
    bot.end(result);

    Json(json!({ "status": "acknowledged" }))
}
