pub mod error;
pub mod models;
pub mod response;
mod server;
pub mod services;
pub mod state;
pub(crate) mod utils;

pub use server::{migrate, prepare_storage, router, run};
