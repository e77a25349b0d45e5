pub mod coordinator;
pub mod protocol;
pub mod session;

pub use coordinator::SessionCoordinator;
