pub mod cache;
pub mod cli;
pub mod pipeline;
pub mod server;
pub mod source;
