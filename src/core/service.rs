use rustc_hash::FxHashMap;
use std::any::{Any, TypeId};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Service not found: {0}")]
    NotFound(&'static str),
    #[error("Service already registered: {0}")]
    AlreadyRegistered(&'static str),
}

pub trait Service: Any + Send {
    fn name(&self) -> &'static str;
}

struct Entry {
    name: &'static str,
    service: Box<dyn Any + Send>,
}

/// 显式注册的服务表：宿主在启动时逐个 `register`，之后按类型取用
pub struct ServiceRegistry {
    services: FxHashMap<TypeId, Entry>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self {
            services: FxHashMap::default(),
        }
    }

    pub fn register<S: Service>(&mut self, service: S) -> Result<()> {
        let type_id = TypeId::of::<S>();
        let name = service.name();
        if self.services.contains_key(&type_id) {
            return Err(ServiceError::AlreadyRegistered(name));
        }
        tracing::debug!(service = name, "service registered");
        self.services.insert(
            type_id,
            Entry {
                name,
                service: Box::new(service),
            },
        );
        Ok(())
    }

    pub fn get<S: Service>(&self) -> Option<&S> {
        self.services
            .get(&TypeId::of::<S>())
            .and_then(|entry| entry.service.downcast_ref::<S>())
    }

    pub fn get_mut<S: Service>(&mut self) -> Option<&mut S> {
        self.services
            .get_mut(&TypeId::of::<S>())
            .and_then(|entry| entry.service.downcast_mut::<S>())
    }

    pub fn require_mut<S: Service>(&mut self) -> Result<&mut S> {
        self.get_mut::<S>()
            .ok_or(ServiceError::NotFound(std::any::type_name::<S>()))
    }

    pub fn contains<S: Service>(&self) -> bool {
        self.services.contains_key(&TypeId::of::<S>())
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.services.values().map(|entry| entry.name).collect();
        names.sort_unstable();
        names
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
