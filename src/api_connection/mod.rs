pub mod connection;
pub mod envelope;
