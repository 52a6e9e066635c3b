//! Headless adapter core: service ports, adapters and the host that wires them.

pub mod services;

pub use services::{KernelMessage, KernelServiceContext, KernelServiceHost};
