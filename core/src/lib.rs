pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod message;
pub mod protocol;
pub mod uuid;
pub mod wire;
pub mod worker;

pub mod utils;

pub use client::BrokerClient;
pub use error::Error;
pub use message::{Frame, Message};
pub use worker::BrokerWorker;
