pub mod server;
pub mod workers;
