pub mod connection;
pub mod counters;
