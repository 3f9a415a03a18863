//! Network Module
//!
//! TCP server and client handling.
//!
//! ## Architecture
//! - Single acceptor thread
//! - One handler thread per connection, bounded by the connection limit
//! - Optional TLS termination and an AUTH gate in front of the engine

mod client;
mod connection;
mod server;
mod tls;

pub use client::Client;
pub use connection::Connection;
pub use server::Server;
