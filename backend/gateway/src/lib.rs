pub mod server;
pub mod ui;

pub use server::{build_router, start_server, AppState};
