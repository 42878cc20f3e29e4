//! In-memory implementations of the storage interfaces.
//!
//! They behave like a small API server: resource versions are assigned on
//! every write, stale updates are rejected, creation timestamps are stamped on
//! raw documents, and duplicate creates fail with `AlreadyExists`.

use super::{AuthConfigSource, IndexKey, NamespaceStore, RawConfigStore, Resource, ResourceStore};
use crate::errors::{Result, ScmError};
use crate::model::ObjectMeta;
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

type Key = (String, String);

fn read_lock<V>(lock: &RwLock<V>) -> Result<RwLockReadGuard<'_, V>> {
    lock.read()
        .map_err(|_| ScmError::storage("store lock poisoned"))
}

fn write_lock<V>(lock: &RwLock<V>) -> Result<RwLockWriteGuard<'_, V>> {
    lock.write()
        .map_err(|_| ScmError::storage("store lock poisoned"))
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Typed object store for one resource kind
pub struct MemoryStore<T: Resource> {
    objects: RwLock<BTreeMap<Key, T>>,
    version: AtomicU64,
}

impl<T: Resource> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Resource> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(BTreeMap::new()),
            version: AtomicU64::new(0),
        }
    }

    fn next_version(&self) -> String {
        (self.version.fetch_add(1, Ordering::SeqCst) + 1).to_string()
    }

    /// Every stored object, ordered by namespace and name
    pub fn snapshot(&self) -> Result<Vec<T>> {
        Ok(read_lock(&self.objects)?.values().cloned().collect())
    }

    pub fn len(&self) -> usize {
        read_lock(&self.objects).map(|o| o.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl<T: Resource> ResourceStore<T> for MemoryStore<T> {
    async fn get(&self, namespace: &str, name: &str) -> Result<T> {
        read_lock(&self.objects)?
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| ScmError::not_found(format!("{} {}:{}", T::KIND, namespace, name)))
    }

    async fn create(&self, mut object: T) -> Result<T> {
        let key = {
            let meta = object.metadata();
            (meta.namespace.clone(), meta.name.clone())
        };
        if key.1.is_empty() {
            return Err(ScmError::validation(format!("{} name is required", T::KIND)));
        }

        let mut objects = write_lock(&self.objects)?;
        if objects.contains_key(&key) {
            return Err(ScmError::already_exists(format!(
                "{} {}:{}",
                T::KIND,
                key.0,
                key.1
            )));
        }

        let meta = object.metadata_mut();
        meta.resource_version = Some(self.next_version());
        if meta.uid.is_none() {
            meta.uid = Some(Uuid::new_v4().to_string());
        }
        objects.insert(key, object.clone());
        Ok(object)
    }

    async fn update(&self, mut object: T) -> Result<T> {
        let key = {
            let meta = object.metadata();
            (meta.namespace.clone(), meta.name.clone())
        };

        let mut objects = write_lock(&self.objects)?;
        let existing = objects
            .get(&key)
            .ok_or_else(|| ScmError::not_found(format!("{} {}:{}", T::KIND, key.0, key.1)))?;

        let current = existing.metadata().resource_version.clone();
        let uid = existing.metadata().uid.clone();
        if let Some(requested) = &object.metadata().resource_version {
            if Some(requested) != current.as_ref() {
                return Err(ScmError::conflict(format!(
                    "{} {}:{} was modified (have {}, stored {})",
                    T::KIND,
                    key.0,
                    key.1,
                    requested,
                    current.unwrap_or_default()
                )));
            }
        }

        let meta = object.metadata_mut();
        meta.resource_version = Some(self.next_version());
        meta.uid = uid;
        objects.insert(key, object.clone());
        Ok(object)
    }

    async fn delete(&self, namespace: &str, name: &str) -> Result<()> {
        write_lock(&self.objects)?
            .remove(&(namespace.to_string(), name.to_string()))
            .map(|_| ())
            .ok_or_else(|| ScmError::not_found(format!("{} {}:{}", T::KIND, namespace, name)))
    }

    async fn list_by_index(&self, key: &IndexKey) -> Result<Vec<T>> {
        Ok(read_lock(&self.objects)?
            .values()
            .filter(|object| object.index_keys().contains(key))
            .cloned()
            .collect())
    }
}

/// Cluster namespaces
#[derive(Default)]
pub struct MemoryNamespaceStore {
    namespaces: RwLock<BTreeMap<String, ObjectMeta>>,
}

impl MemoryNamespaceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        read_lock(&self.namespaces)
            .map(|n| n.contains_key(name))
            .unwrap_or(false)
    }
}

#[async_trait]
impl NamespaceStore for MemoryNamespaceStore {
    async fn get(&self, name: &str) -> Result<ObjectMeta> {
        read_lock(&self.namespaces)?
            .get(name)
            .cloned()
            .ok_or_else(|| ScmError::not_found(format!("namespace {name}")))
    }

    async fn create(&self, name: &str) -> Result<ObjectMeta> {
        let mut namespaces = write_lock(&self.namespaces)?;
        if namespaces.contains_key(name) {
            return Err(ScmError::already_exists(format!("namespace {name}")));
        }
        let meta = ObjectMeta {
            name: name.to_string(),
            uid: Some(Uuid::new_v4().to_string()),
            ..Default::default()
        };
        namespaces.insert(name.to_string(), meta.clone());
        Ok(meta)
    }
}

/// Provider configs kept as raw documents
#[derive(Default)]
pub struct MemoryConfigStore {
    documents: RwLock<BTreeMap<Key, Value>>,
    version: AtomicU64,
    writes: AtomicUsize,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_version(&self) -> String {
        (self.version.fetch_add(1, Ordering::SeqCst) + 1).to_string()
    }

    /// Seed a document the way provisioning would; metadata namespace and name are required
    pub fn insert(&self, mut document: Value) -> Result<()> {
        let (namespace, name) = document_key(&document)?;
        if let Some(metadata) = document.get_mut("metadata").and_then(Value::as_object_mut) {
            metadata.insert(
                "creationTimestamp".to_string(),
                Value::String(now_rfc3339()),
            );
            metadata.insert(
                "resourceVersion".to_string(),
                Value::String(self.next_version()),
            );
        }
        write_lock(&self.documents)?.insert((namespace, name), document);
        Ok(())
    }

    /// Number of successful `update_raw` calls
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

fn document_key(document: &Value) -> Result<Key> {
    let metadata = document
        .get("metadata")
        .ok_or_else(|| ScmError::validation("document has no metadata"))?;
    let field = |name: &str| {
        metadata
            .get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ScmError::validation(format!("document metadata has no {name}")))
    };
    Ok((field("namespace")?, field("name")?))
}

#[async_trait]
impl RawConfigStore for MemoryConfigStore {
    async fn get_raw(&self, namespace: &str, name: &str) -> Result<Value> {
        read_lock(&self.documents)?
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| ScmError::not_found(format!("config {namespace}:{name}")))
    }

    async fn update_raw(&self, namespace: &str, name: &str, mut document: Value) -> Result<Value> {
        let key = (namespace.to_string(), name.to_string());
        let mut documents = write_lock(&self.documents)?;
        let existing = documents
            .get(&key)
            .ok_or_else(|| ScmError::not_found(format!("config {namespace}:{name}")))?;

        let stored_meta = existing.get("metadata").cloned().unwrap_or(Value::Null);
        let stored_version = stored_meta.get("resourceVersion").cloned();
        let requested = document
            .get("metadata")
            .and_then(|m| m.get("resourceVersion"))
            .cloned();
        if let Some(requested) = requested {
            if Some(&requested) != stored_version.as_ref() {
                return Err(ScmError::conflict(format!(
                    "config {namespace}:{name} was modified"
                )));
            }
        }

        let version = self.next_version();
        let metadata = document
            .as_object_mut()
            .ok_or_else(|| ScmError::validation("config document is not an object"))?
            .entry("metadata")
            .or_insert_with(|| Value::Object(Default::default()));
        if let Some(metadata) = metadata.as_object_mut() {
            metadata.insert("namespace".to_string(), Value::String(namespace.to_string()));
            metadata.insert("name".to_string(), Value::String(name.to_string()));
            metadata.insert("resourceVersion".to_string(), Value::String(version));
            if let Some(created) = stored_meta.get("creationTimestamp") {
                metadata.insert("creationTimestamp".to_string(), created.clone());
            }
        }

        documents.insert(key, document.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(document)
    }
}

/// Cluster-scoped auth configs kept as raw documents
#[derive(Default)]
pub struct MemoryAuthConfigSource {
    documents: RwLock<BTreeMap<String, Value>>,
}

impl MemoryAuthConfigSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, name: &str, mut document: Value) -> Result<()> {
        if let Some(metadata) = document.get_mut("metadata").and_then(Value::as_object_mut) {
            metadata.insert(
                "creationTimestamp".to_string(),
                Value::String(now_rfc3339()),
            );
        }
        write_lock(&self.documents)?.insert(name.to_string(), document);
        Ok(())
    }
}

#[async_trait]
impl AuthConfigSource for MemoryAuthConfigSource {
    async fn get_raw(&self, name: &str) -> Result<Value> {
        read_lock(&self.documents)?
            .get(name)
            .cloned()
            .ok_or_else(|| ScmError::not_found(format!("auth config {name}")))
    }
}
