pub mod dispatcher;
pub mod endpoints;
pub mod error;
pub mod queue;
pub mod shutdown;
pub mod store;

pub use dispatcher::Dispatcher;
pub use error::Error;
pub use queue::Queue;
pub use store::Store;
