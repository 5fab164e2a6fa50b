//! This module provides the Juniper Context for Warpresolver queries. A context is created for
//! each request. It carries the resolver registry, the entity storage, the request variables, and
//! the cache metadata collected from the fields resolved so far.

use crate::engine::cache::CacheMetadata;
use crate::engine::config::ServerConfig;
use crate::engine::resolvers::ResolverRegistry;
use crate::engine::storage::EntityStorage;
use crate::engine::value::Value;
use crate::error::Error;
use juniper::Context;
use log::{debug, warn};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Juniper Context for Warpresolver's GraphQL queries.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use warpresolver::engine::cache::CacheMetadata;
/// use warpresolver::engine::context::ResolveContext;
/// use warpresolver::engine::resolvers::ResolverRegistry;
///
/// let ctx = ResolveContext::new(Arc::new(ResolverRegistry::new()));
/// ctx.add_cache_metadata(&CacheMetadata::new().with_tags(vec!["node:1"]));
///
/// assert!(ctx.cache_metadata().tags().contains("node:1"));
/// ```
#[derive(Debug)]
pub struct ResolveContext {
    server: Arc<ServerConfig>,
    registry: Arc<ResolverRegistry>,
    storage: Option<Arc<dyn EntityStorage>>,
    variables: HashMap<String, Value>,
    cache: Mutex<CacheMetadata>,
    deadline: Option<Instant>,
    aborted: AtomicBool,
    version: Option<String>,
}

impl ResolveContext {
    /// Creates a context with default server settings, no storage, no variables, no deadline,
    /// and empty cache metadata.
    pub fn new(registry: Arc<ResolverRegistry>) -> ResolveContext {
        ResolveContext {
            server: Arc::new(ServerConfig::default()),
            registry,
            storage: None,
            variables: HashMap::new(),
            cache: Mutex::new(CacheMetadata::new()),
            deadline: None,
            aborted: AtomicBool::new(false),
            version: None,
        }
    }

    pub fn with_server(mut self, server: Arc<ServerConfig>) -> Self {
        self.server = server;
        self
    }

    pub fn with_storage(mut self, storage: Option<Arc<dyn EntityStorage>>) -> Self {
        self.storage = storage;
        self
    }

    pub fn with_variables(mut self, variables: HashMap<String, Value>) -> Self {
        self.variables = variables;
        self
    }

    /// Seeds the metadata accumulator, typically with the server defaults
    pub fn with_cache_metadata(self, metadata: CacheMetadata) -> Self {
        self.add_cache_metadata(&metadata);
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_version(mut self, version: Option<String>) -> Self {
        self.version = version;
        self
    }

    pub fn server(&self) -> &ServerConfig {
        &self.server
    }

    pub fn registry(&self) -> &ResolverRegistry {
        &self.registry
    }

    /// Returns the entity storage back-end
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageNotFound`] if the engine was built without a storage back-end
    pub fn storage(&self) -> Result<&dyn EntityStorage, Error> {
        self.storage.as_deref().ok_or(Error::StorageNotFound)
    }

    pub fn variables(&self) -> &HashMap<String, Value> {
        &self.variables
    }

    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    /// Returns the version of the schema served, if one was provided when the engine was built
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Merges the metadata of a resolved field into the metadata of the response
    pub fn add_cache_metadata(&self, metadata: &CacheMetadata) {
        match self.cache.lock() {
            Ok(mut cache) => cache.merge(metadata),
            Err(poisoned) => {
                warn!("ResolveContext::add_cache_metadata -- recovering poisoned lock");
                poisoned.into_inner().merge(metadata)
            }
        }
    }

    /// Returns a snapshot of the metadata collected so far
    pub fn cache_metadata(&self) -> CacheMetadata {
        match self.cache.lock() {
            Ok(cache) => cache.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Fails if the request deadline has passed, and marks the request as aborted so that no
    /// cache metadata is reported for it.
    pub fn check_deadline(&self) -> Result<(), Error> {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                if !self.aborted.swap(true, Ordering::SeqCst) {
                    debug!("ResolveContext::check_deadline -- request deadline passed");
                }
                Err(Error::ExecutionTimedOut)
            }
            _ => Ok(()),
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }
}

impl Context for ResolveContext {}
