pub mod callback_server;
mod credential;
mod token_manager;

pub use credential::{Credential, TokenState};
pub use token_manager::TokenManager;
