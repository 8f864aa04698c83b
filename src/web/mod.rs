mod routes;
mod web_server;

pub use web_server::{build_services, AppState, WebServer};
