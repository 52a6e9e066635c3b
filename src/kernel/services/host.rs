use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use crate::core::service::Result as ServiceResult;
use crate::core::{Service, ServiceRegistry};

use super::adapters::logger::LoggerRegistry;
use super::adapters::quick_open::FileOpener;
use super::bus::{kernel_bus, KernelBusReceiver, KernelBusSender, KernelMessage};
use super::ports::{AsyncExecutor, BoxFuture};
use std::sync::mpsc::TryRecvError;

pub struct KernelServiceHost {
    registry: ServiceRegistry,
    bus: KernelBusSender,
    rx: KernelBusReceiver,
    executor: Arc<dyn AsyncExecutor>,
}

#[derive(Clone)]
pub struct KernelServiceContext {
    bus: KernelBusSender,
    executor: Arc<dyn AsyncExecutor>,
}

impl KernelServiceHost {
    pub fn new(executor: Arc<dyn AsyncExecutor>) -> Self {
        let (bus, rx) = kernel_bus();
        Self {
            registry: ServiceRegistry::new(),
            bus,
            rx,
            executor,
        }
    }

    pub fn context(&self) -> KernelServiceContext {
        KernelServiceContext {
            bus: self.bus.clone(),
            executor: Arc::clone(&self.executor),
        }
    }

    pub fn register<S: Service + 'static>(&mut self, service: S) -> ServiceResult<()> {
        self.registry.register(service)
    }

    pub fn get<S: Service + 'static>(&self) -> Option<&S> {
        self.registry.get::<S>()
    }

    pub fn get_mut<S: Service + 'static>(&mut self) -> Option<&mut S> {
        self.registry.get_mut::<S>()
    }

    pub fn services(&self) -> &ServiceRegistry {
        &self.registry
    }

    pub fn services_mut(&mut self) -> &mut ServiceRegistry {
        &mut self.registry
    }

    /// Forwards level changes of the registered `LoggerRegistry` onto the bus.
    pub fn wire_registered_logger(&mut self) -> ServiceResult<()> {
        let context = self.context();
        let registry = self.registry.require_mut::<LoggerRegistry>()?;
        context.wire_logger_watcher(registry);
        Ok(())
    }

    pub fn try_recv(&mut self) -> Result<KernelMessage, TryRecvError> {
        self.rx.try_recv()
    }

    /// Drains the bus, tracing each message. Returns how many were handled.
    pub fn pump(&mut self) -> usize {
        let messages = self.rx.drain();
        for msg in &messages {
            match msg {
                KernelMessage::LogLevelChanged(event) => {
                    tracing::info!(
                        logger = %event.name,
                        old = %event.old_level,
                        new = %event.new_level,
                        "log level changed"
                    );
                }
                KernelMessage::OpenFile(path) => {
                    tracing::debug!(path = %path.display(), "open file requested");
                }
            }
        }
        messages.len()
    }
}

impl KernelServiceContext {
    pub fn send(&self, msg: KernelMessage) {
        let _ = self.bus.send(msg);
    }

    pub fn spawn(&self, task: BoxFuture<'static>) {
        self.executor.spawn(task);
    }

    pub fn spawn_future<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.executor.spawn(Box::pin(task));
    }

    pub fn executor(&self) -> Arc<dyn AsyncExecutor> {
        Arc::clone(&self.executor)
    }

    pub fn wire_logger_watcher(&self, registry: &mut LoggerRegistry) {
        let bus = self.bus.clone();
        registry.watcher().on_change(move |event| {
            let _ = bus.send(KernelMessage::LogLevelChanged(event.clone()));
        });
    }

    pub fn file_opener(&self) -> BusFileOpener {
        BusFileOpener {
            bus: self.bus.clone(),
        }
    }
}

/// Turns quick-open selections into `KernelMessage::OpenFile`.
#[derive(Clone)]
pub struct BusFileOpener {
    bus: KernelBusSender,
}

impl FileOpener for BusFileOpener {
    fn open_file(&self, path: &Path) {
        let _ = self.bus.send(KernelMessage::OpenFile(path.to_path_buf()));
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/services/host.rs"]
mod tests;
