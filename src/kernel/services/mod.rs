//! Services layer (ports + adapters).
//!
//! - `ports`: pure contracts/types the adapters are written against.
//! - `adapters`: OS/runtime specific implementations (IO/async).

pub mod adapters;
pub mod bus;
pub mod host;
pub mod ports;

pub use bus::{kernel_bus, KernelBusReceiver, KernelBusSender, KernelMessage};
pub use host::{BusFileOpener, KernelServiceContext, KernelServiceHost};
