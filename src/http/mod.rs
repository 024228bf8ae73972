pub mod dto;
pub mod router;
pub mod server;

pub use server::HttpServer;
