//! Process lifecycle: listener task, signal wait, orderly shutdown.

mod listener;
mod process;
mod signal;

pub use listener::ListenerHandle;
pub use process::ServerProcess;
pub use signal::shutdown_signal;
