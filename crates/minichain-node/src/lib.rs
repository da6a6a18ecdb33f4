pub mod constants;
pub mod server;
