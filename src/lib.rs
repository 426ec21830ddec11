#![doc = "The `todolist` library crate."]
#![doc = ""]
#![doc = "Owner-scoped ToDo items behind stateless bearer-token authentication:"]
#![doc = "the token codec and request authenticator, field validation, the ownership"]
#![doc = "guard, the ToDo lifecycle engine, error aggregation, persistence adapters and"]
#![doc = "the actix-web routes. The binary (`main.rs`) wires these into a server."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod payload;
pub mod routes;
pub mod security;
pub mod state;
pub mod store;
pub mod todos;

pub use crate::error::{AppError, ErrorSet};
pub use crate::state::AppState;
