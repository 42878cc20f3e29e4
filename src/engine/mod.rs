//! Provider-agnostic orchestration: credential upsert, repository sync and
//! the cascading cleanup behind `disable`.
//!
//! Adapters own a shared [`BaseProviderEngine`] and call into it. Differences
//! between providers are expressed as an [`AccountPolicy`] rather than as
//! separate copies of the flow.

pub mod naming;

use crate::errors::{Result, ScmError};
use crate::model::{
    Pipeline, PipelineExecution, ProviderConfig, SourceCodeCredential, SourceCodeRepository,
    SourceCodeType,
};
use crate::remote::{RemoteClientFactory, RemoteProviderClient};
use crate::store::{ConfigStore, IndexKey, NamespaceStore, ResourceStore};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Collections the engine reads and writes
#[derive(Clone)]
pub struct EngineStores {
    pub configs: ConfigStore,
    pub namespaces: Arc<dyn NamespaceStore>,
    pub pipelines: Arc<dyn ResourceStore<Pipeline>>,
    pub executions: Arc<dyn ResourceStore<PipelineExecution>>,
    pub credentials: Arc<dyn ResourceStore<SourceCodeCredential>>,
    pub repositories: Arc<dyn ResourceStore<SourceCodeRepository>>,
}

/// What a credential name is scoped by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameScope {
    /// Project name parsed out of the `cluster:project` project ID
    ProjectName,
    /// Namespace of the provider config resource
    ConfigNamespace,
}

/// Per-provider variation of the account-linking flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountPolicy {
    pub name_scope: NameScope,
    pub ensure_user_namespace: bool,
}

impl AccountPolicy {
    /// Bitbucket Cloud and Bitbucket Server
    pub const SHARED: AccountPolicy = AccountPolicy {
        name_scope: NameScope::ProjectName,
        ensure_user_namespace: true,
    };

    /// GitHub scopes names by config namespace and leaves the user namespace alone
    pub const GITHUB: AccountPolicy = AccountPolicy {
        name_scope: NameScope::ConfigNamespace,
        ensure_user_namespace: false,
    };
}

pub struct BaseProviderEngine {
    stores: EngineStores,
    remotes: Arc<dyn RemoteClientFactory>,
}

impl BaseProviderEngine {
    pub fn new(stores: EngineStores, remotes: Arc<dyn RemoteClientFactory>) -> Self {
        Self { stores, remotes }
    }

    pub fn configs(&self) -> &ConfigStore {
        &self.stores.configs
    }

    pub fn stores(&self) -> &EngineStores {
        &self.stores
    }

    fn remote(&self, config: &ProviderConfig) -> Result<Box<dyn RemoteProviderClient>> {
        self.remotes.create(config)
    }

    /// Log in with `code` and create or update the caller's credential
    pub async fn auth_add_account(
        &self,
        user_id: &str,
        code: &str,
        config: &ProviderConfig,
        project_id: &str,
        source_code_type: SourceCodeType,
    ) -> Result<SourceCodeCredential> {
        self.auth_add_account_with(
            AccountPolicy::SHARED,
            user_id,
            code,
            config,
            project_id,
            source_code_type,
        )
        .await
    }

    pub async fn auth_add_account_with(
        &self,
        policy: AccountPolicy,
        user_id: &str,
        code: &str,
        config: &ProviderConfig,
        project_id: &str,
        source_code_type: SourceCodeType,
    ) -> Result<SourceCodeCredential> {
        if user_id.is_empty() {
            return Err(ScmError::unauthenticated("missing caller identity"));
        }

        let remote = self.remote(config)?;
        let mut account = remote.login(code).await?;

        let scope = match policy.name_scope {
            NameScope::ProjectName => naming::project_name(project_id),
            NameScope::ConfigNamespace => config.metadata().namespace.as_str(),
        };
        account.metadata.name = naming::credential_name(
            scope,
            source_code_type.as_str(),
            &account.spec.login_name,
        );
        account.metadata.namespace = user_id.to_string();
        account.spec.user_name = user_id.to_string();
        account.spec.project_name = project_id.to_string();
        account.spec.source_code_type = source_code_type;

        if policy.ensure_user_namespace {
            self.ensure_namespace(user_id).await?;
        }

        self.upsert_credential(account).await
    }

    async fn ensure_namespace(&self, name: &str) -> Result<()> {
        match self.stores.namespaces.get(name).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_not_found() => match self.stores.namespaces.create(name).await {
                Ok(_) => {
                    info!("Created namespace {}", name);
                    Ok(())
                }
                Err(e) if e.is_already_exists() => {
                    warn!("Namespace {} was created concurrently", name);
                    Ok(())
                }
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        }
    }

    async fn upsert_credential(
        &self,
        mut account: SourceCodeCredential,
    ) -> Result<SourceCodeCredential> {
        match self.stores.credentials.create(account.clone()).await {
            Ok(created) => {
                info!("Created credential {}", created.metadata.key());
                Ok(created)
            }
            Err(e) if e.is_already_exists() => {
                warn!(
                    "Credential {} already exists, updating",
                    account.metadata.key()
                );
                let existing = self
                    .stores
                    .credentials
                    .get(&account.metadata.namespace, &account.metadata.name)
                    .await?;
                account.metadata.resource_version = existing.metadata.resource_version;
                let updated = self.stores.credentials.update(account).await?;
                info!("Updated credential {}", updated.metadata.key());
                Ok(updated)
            }
            Err(e) => Err(e),
        }
    }

    /// Replace every stored repository of `credential` with the admin subset
    /// of the remote listing. Returns the unfiltered remote listing.
    pub async fn refresh_repos_by_credential_and_config(
        &self,
        credential: &SourceCodeCredential,
        config: &ProviderConfig,
    ) -> Result<Vec<SourceCodeRepository>> {
        let remote = self.remote(config)?;
        let remote_repos = remote.list_repositories(credential).await?;

        let namespace = &credential.metadata.namespace;
        let key = IndexKey::for_credential(credential);
        debug!("Looking up repositories by {}", key);
        let existing = self.stores.repositories.list_by_index(&key).await?;
        for repo in &existing {
            self.stores
                .repositories
                .delete(namespace, &repo.metadata.name)
                .await?;
        }

        let mut created = 0usize;
        for repo in remote_repos.iter().filter(|r| r.spec.permissions.admin) {
            let mut repo = repo.clone();
            repo.metadata.name = naming::repository_name();
            repo.metadata.namespace = namespace.clone();
            repo.metadata.resource_version = None;
            repo.spec.source_code_credential_name = credential.metadata.name.clone();
            repo.spec.user_name = credential.spec.user_name.clone();
            repo.spec.source_code_type = credential.spec.source_code_type;
            repo.spec.project_name = credential.spec.project_name.clone();
            self.stores.repositories.create(repo).await?;
            created += 1;
        }

        info!(
            "Synced repositories for {}: removed {}, created {} of {} remote",
            credential.metadata.key(),
            existing.len(),
            created,
            remote_repos.len()
        );
        Ok(remote_repos)
    }

    /// Turn the provider off and, if it was on, remove everything it produced
    pub async fn disable_action(
        &self,
        namespace: &str,
        source_code_type: SourceCodeType,
    ) -> Result<()> {
        let mut config = self.stores.configs.get(namespace, source_code_type).await?;
        if !config.enabled() {
            debug!("{} is already disabled in {}", source_code_type, namespace);
            return Ok(());
        }

        config.set_enabled(false);
        let updated = self.stores.configs.update(&config).await?;
        info!("Disabled {} in {}", source_code_type, namespace);

        let project_id = updated.project_name();
        if !project_id.is_empty() {
            self.cleanup(project_id, source_code_type).await?;
        }
        Ok(())
    }

    /// Delete pipelines, executions, credentials and repositories of a project.
    /// Stops at the first failed delete.
    pub async fn cleanup(&self, project_id: &str, source_code_type: SourceCodeType) -> Result<()> {
        let by_project = IndexKey::Project(project_id.to_string());
        let by_type = IndexKey::ProjectType(project_id.to_string(), source_code_type);

        let pipelines = self.stores.pipelines.list_by_index(&by_project).await?;
        for p in &pipelines {
            self.stores
                .pipelines
                .delete(&p.metadata.namespace, &p.metadata.name)
                .await?;
        }

        let executions = self.stores.executions.list_by_index(&by_project).await?;
        for e in &executions {
            self.stores
                .executions
                .delete(&e.metadata.namespace, &e.metadata.name)
                .await?;
        }

        let credentials = self.stores.credentials.list_by_index(&by_type).await?;
        for c in &credentials {
            self.stores
                .credentials
                .delete(&c.metadata.namespace, &c.metadata.name)
                .await?;
        }

        let repositories = self.stores.repositories.list_by_index(&by_type).await?;
        for r in &repositories {
            self.stores
                .repositories
                .delete(&r.metadata.namespace, &r.metadata.name)
                .await?;
        }

        info!(
            "Cleaned up {} for {}: {} pipelines, {} executions, {} credentials, {} repositories",
            source_code_type,
            project_id,
            pipelines.len(),
            executions.len(),
            credentials.len(),
            repositories.len()
        );
        Ok(())
    }
}
