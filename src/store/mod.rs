//! Storage collaborator interfaces
//!
//! The engine never talks to a concrete API server. It consumes:
//! - [`ResourceStore`] for typed CRUD plus secondary index lookups
//! - [`NamespaceStore`] to ensure per-user namespaces
//! - [`RawConfigStore`] / [`AuthConfigSource`] for provider configs, which are
//!   read as raw documents and decoded in two stages (see [`unstructured`])
//!
//! [`memory`] provides thread-safe in-memory implementations.

pub mod config_store;
pub mod memory;
pub mod unstructured;

use crate::errors::Result;
use crate::model::{
    ObjectMeta, Pipeline, PipelineExecution, SourceCodeCredential, SourceCodeRepository,
    SourceCodeType,
};
use async_trait::async_trait;
use serde_json::Value;

pub use config_store::ConfigStore;
pub use memory::{MemoryAuthConfigSource, MemoryConfigStore, MemoryNamespaceStore, MemoryStore};

/// Secondary index keys
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndexKey {
    /// Everything scoped to a project (`cluster:project`)
    Project(String),
    /// Project plus provider type
    ProjectType(String, SourceCodeType),
    /// Repositories belonging to a credential (`namespace`, `name`)
    Credential(String, String),
}

impl IndexKey {
    pub fn for_credential(credential: &SourceCodeCredential) -> Self {
        IndexKey::Credential(
            credential.metadata.namespace.clone(),
            credential.metadata.name.clone(),
        )
    }
}

impl std::fmt::Display for IndexKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexKey::Project(project) => write!(f, "project={project}"),
            IndexKey::ProjectType(project, kind) => write!(f, "project={project},type={kind}"),
            IndexKey::Credential(ns, name) => write!(f, "credential={ns}:{name}"),
        }
    }
}

/// A stored object with metadata and index membership
pub trait Resource: Clone + Send + Sync + 'static {
    const KIND: &'static str;

    fn metadata(&self) -> &ObjectMeta;
    fn metadata_mut(&mut self) -> &mut ObjectMeta;
    fn index_keys(&self) -> Vec<IndexKey>;
}

impl Resource for Pipeline {
    const KIND: &'static str = "pipeline";

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }

    fn index_keys(&self) -> Vec<IndexKey> {
        vec![IndexKey::Project(self.spec.project_name.clone())]
    }
}

impl Resource for PipelineExecution {
    const KIND: &'static str = "pipelineExecution";

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }

    fn index_keys(&self) -> Vec<IndexKey> {
        vec![IndexKey::Project(self.spec.project_name.clone())]
    }
}

impl Resource for SourceCodeCredential {
    const KIND: &'static str = "sourceCodeCredential";

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }

    fn index_keys(&self) -> Vec<IndexKey> {
        vec![IndexKey::ProjectType(
            self.spec.project_name.clone(),
            self.spec.source_code_type,
        )]
    }
}

impl Resource for SourceCodeRepository {
    const KIND: &'static str = "sourceCodeRepository";

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }

    fn index_keys(&self) -> Vec<IndexKey> {
        vec![
            IndexKey::ProjectType(self.spec.project_name.clone(), self.spec.source_code_type),
            IndexKey::Credential(
                self.metadata.namespace.clone(),
                self.spec.source_code_credential_name.clone(),
            ),
        ]
    }
}

/// Typed CRUD over one resource kind
#[async_trait]
pub trait ResourceStore<T: Resource>: Send + Sync {
    async fn get(&self, namespace: &str, name: &str) -> Result<T>;

    /// Fails with `AlreadyExists` when the namespace/name pair is taken
    async fn create(&self, object: T) -> Result<T>;

    /// Fails with `Conflict` when the carried resource version is stale
    async fn update(&self, object: T) -> Result<T>;

    async fn delete(&self, namespace: &str, name: &str) -> Result<()>;

    async fn list_by_index(&self, key: &IndexKey) -> Result<Vec<T>>;
}

#[async_trait]
pub trait NamespaceStore: Send + Sync {
    async fn get(&self, name: &str) -> Result<ObjectMeta>;

    async fn create(&self, name: &str) -> Result<ObjectMeta>;
}

/// Provider configs as raw key-value documents
#[async_trait]
pub trait RawConfigStore: Send + Sync {
    async fn get_raw(&self, namespace: &str, name: &str) -> Result<Value>;

    async fn update_raw(&self, namespace: &str, name: &str, document: Value) -> Result<Value>;
}

/// Cluster-scoped authentication configs as raw documents
#[async_trait]
pub trait AuthConfigSource: Send + Sync {
    async fn get_raw(&self, name: &str) -> Result<Value>;
}
