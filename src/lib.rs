// Library exports for the light-cycle arena
// The agent server and the judge binary share these modules

pub mod bot;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod grid;
pub mod handler;
pub mod judge;
pub mod rules;
pub mod server;
pub mod territory;
pub mod trajectory;
pub mod types;
