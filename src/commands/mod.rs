pub mod authorize;
pub mod serve;
pub mod verify;
