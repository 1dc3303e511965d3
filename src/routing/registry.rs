//! Route registry and live route table.
//!
//! # Responsibilities
//! - Own the path → handler reference bookkeeping, in registration order
//! - Gate every insert on the registration preconditions
//! - Publish the loaded handler together with its bookkeeping entry
//! - Serve lock-free lookups to the dispatcher
//!
//! # Design Decisions
//! - Bookkeeping and live table are the same immutable `RouteTable`; a
//!   registration publishes a new table through `ArcSwap`, so readers see
//!   either the old table or the new one, never half of a registration
//! - Writers serialize on one mutex covering check, load and publish
//! - Tables are append-only: routes are never removed or replaced
//! - Handlers are never invoked here, so the lock is never held across a request

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwap;

use crate::config::{ServerConfig, ServiceConfig};
use crate::handler::{FileHandlerLoader, Handler, HandlerLoader};
use crate::observability::metrics;
use crate::routing::error::RegistrationError;
use crate::routing::path::{check_non_empty, check_syntax, PathDefect};

/// A path bound to a loaded handler.
pub struct RegisteredRoute {
    path: String,
    handler_ref: String,
    handler: Arc<dyn Handler>,
}

impl RegisteredRoute {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn handler_ref(&self) -> &str {
        &self.handler_ref
    }

    pub fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }
}

impl fmt::Debug for RegisteredRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredRoute")
            .field("path", &self.path)
            .field("handler_ref", &self.handler_ref)
            .finish_non_exhaustive()
    }
}

/// Immutable snapshot of all registered routes.
#[derive(Default)]
struct RouteTable {
    order: Vec<Arc<RegisteredRoute>>,
    by_path: HashMap<String, Arc<RegisteredRoute>>,
}

impl RouteTable {
    /// Copy of this table with `route` appended.
    fn with_route(&self, route: Arc<RegisteredRoute>) -> Self {
        let mut order = self.order.clone();
        let mut by_path = self.by_path.clone();
        by_path.insert(route.path.clone(), route.clone());
        order.push(route);
        Self { order, by_path }
    }
}

/// The process-wide route registry.
pub struct RouteRegistry {
    reserved: HashSet<String>,
    loader: Arc<dyn HandlerLoader>,
    table: ArcSwap<RouteTable>,
    write_lock: Mutex<()>,
}

impl RouteRegistry {
    /// Create an empty registry. `reserved` can never be registered.
    pub fn new<I, S>(reserved: I, loader: Arc<dyn HandlerLoader>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            reserved: reserved.into_iter().map(Into::into).collect(),
            loader,
            table: ArcSwap::from_pointee(RouteTable::default()),
            write_lock: Mutex::new(()),
        }
    }

    /// Registry reserving the configured and built-in paths, loading handler
    /// manifests from disk.
    pub fn from_config(config: &ServerConfig) -> Self {
        let loader = match &config.handler_root {
            Some(root) => FileHandlerLoader::with_root(root),
            None => FileHandlerLoader::new(),
        };
        Self::new(config.reserved_set(), Arc::new(loader))
    }

    /// Bind `path` to the handler loaded from `handler_ref`.
    ///
    /// Checks, in order: non-empty path, reserved path, duplicate path,
    /// path syntax, handler resolution. The first failure is returned and
    /// nothing is published.
    pub fn register(
        &self,
        path: &str,
        handler_ref: &str,
    ) -> Result<Arc<RegisteredRoute>, RegistrationError> {
        let result = self.try_register(path, handler_ref);
        match &result {
            Ok(route) => {
                metrics::record_registration("success");
                tracing::info!(
                    path = %route.path,
                    handler_ref = %route.handler_ref,
                    "Endpoint registered"
                );
            }
            Err(e) => {
                metrics::record_registration(e.kind());
                tracing::warn!(
                    path = %path,
                    handler_ref = %handler_ref,
                    reason = e.kind(),
                    error = %e,
                    "Registration rejected"
                );
            }
        }
        result
    }

    fn try_register(
        &self,
        path: &str,
        handler_ref: &str,
    ) -> Result<Arc<RegisteredRoute>, RegistrationError> {
        let malformed = |defect: PathDefect| RegistrationError::MalformedPath {
            path: path.to_string(),
            defect,
        };

        check_non_empty(path).map_err(malformed)?;
        if self.reserved.contains(path) {
            return Err(RegistrationError::ReservedPath {
                path: path.to_string(),
            });
        }

        // Poisoning cannot leave a half-published table behind.
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let current = self.table.load_full();
        if let Some(existing) = current.by_path.get(path) {
            return Err(RegistrationError::DuplicatePath {
                path: path.to_string(),
                existing: existing.handler_ref.clone(),
            });
        }

        check_syntax(path).map_err(malformed)?;

        let handler = self
            .loader
            .load(handler_ref)
            .map_err(|e| RegistrationError::from_load(path, e))?;

        let route = Arc::new(RegisteredRoute {
            path: path.to_string(),
            handler_ref: handler_ref.to_string(),
            handler,
        });
        let next = current.with_route(route.clone());
        metrics::set_registered_routes(next.order.len());
        self.table.store(Arc::new(next));

        Ok(route)
    }

    /// Register every service in order, stopping at the first failure.
    /// Services registered before the failure stay registered.
    pub fn register_all(&self, services: &[ServiceConfig]) -> Result<usize, RegistrationError> {
        for service in services {
            self.register(&service.path, &service.handler_ref)?;
        }
        Ok(services.len())
    }

    /// Route bound to exactly `path`, if any.
    pub fn lookup(&self, path: &str) -> Option<Arc<RegisteredRoute>> {
        self.table.load().by_path.get(path).cloned()
    }

    /// Registered paths in registration order. Reserved paths are not listed.
    pub fn list_endpoints(&self) -> Vec<String> {
        self.table
            .load()
            .order
            .iter()
            .map(|route| route.path.clone())
            .collect()
    }

    /// Registered routes in registration order.
    pub fn routes(&self) -> Vec<Arc<RegisteredRoute>> {
        self.table.load().order.clone()
    }

    /// True if `path` is reserved or registered.
    pub fn is_registered(&self, path: &str) -> bool {
        self.is_reserved(path) || self.table.load().by_path.contains_key(path)
    }

    pub fn is_reserved(&self, path: &str) -> bool {
        self.reserved.contains(path)
    }

    /// Reserved paths, sorted.
    pub fn reserved(&self) -> Vec<String> {
        let mut reserved: Vec<String> = self.reserved.iter().cloned().collect();
        reserved.sort();
        reserved
    }

    /// Number of registered routes.
    pub fn len(&self) -> usize {
        self.table.load().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for RouteRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteRegistry")
            .field("reserved", &self.reserved())
            .field("endpoints", &self.list_endpoints())
            .finish_non_exhaustive()
    }
}
