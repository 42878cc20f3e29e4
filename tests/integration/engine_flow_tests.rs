use super::test_helpers::*;
use scm_provider_sync::model::{
    ObjectMeta, Pipeline, PipelineExecution, PipelineExecutionSpec, PipelineSpec,
    SourceCodeCredential, SourceCodeType,
};
use scm_provider_sync::providers::ActionRequest;
use scm_provider_sync::store::{IndexKey, RawConfigStore, ResourceStore};
use serde_json::json;

fn pipeline(namespace: &str, name: &str, project: &str) -> Pipeline {
    Pipeline {
        metadata: ObjectMeta::named(namespace, name),
        spec: PipelineSpec {
            project_name: project.to_string(),
            ..Default::default()
        },
    }
}

fn execution(namespace: &str, name: &str, project: &str) -> PipelineExecution {
    PipelineExecution {
        metadata: ObjectMeta::named(namespace, name),
        spec: PipelineExecutionSpec {
            project_name: project.to_string(),
            ..Default::default()
        },
    }
}

fn credential(
    user: &str,
    name: &str,
    project: &str,
    source_code_type: SourceCodeType,
) -> SourceCodeCredential {
    let mut credential = SourceCodeCredential::new(source_code_type, name);
    credential.metadata = ObjectMeta::named(user, name);
    credential.spec.project_name = project.to_string();
    credential.spec.user_name = user.to_string();
    credential
}

/// Seed one project's worth of resources for `source_code_type`
async fn seed_project(harness: &Harness, project: &str, source_code_type: SourceCodeType) {
    let ns = project.rsplit(':').next().unwrap();
    let tag = source_code_type.as_str();

    harness
        .pipelines
        .create(pipeline(ns, &format!("pipe-{tag}"), project))
        .await
        .unwrap();
    harness
        .executions
        .create(execution(ns, &format!("pipe-{tag}-1"), project))
        .await
        .unwrap();
    let cred = credential("u-1", &format!("{ns}-{tag}-jdoe"), project, source_code_type);
    harness.credentials.create(cred.clone()).await.unwrap();

    let mut repository = repo(source_code_type, &format!("https://{tag}/{ns}.git"), true);
    repository.metadata = ObjectMeta::named("u-1", &format!("repo-{ns}-{tag}"));
    repository.spec.project_name = project.to_string();
    repository.spec.source_code_credential_name = cred.metadata.name.clone();
    harness.repositories.create(repository).await.unwrap();
}

#[tokio::test]
async fn test_disable_removes_everything_for_the_project() {
    let remote = RecordingFactory::new("jdoe");
    let harness = Harness::with_recorder(&remote);
    harness.seed_config(config_document(
        "p-1",
        SourceCodeType::Github,
        "local:p-1",
        json!({ "enabled": true }),
    ));
    seed_project(&harness, "local:p-1", SourceCodeType::Github).await;
    seed_project(&harness, "local:p-2", SourceCodeType::Github).await;

    let request = ActionRequest::new("disable", "p-1:github").with_user("u-1");
    let response = harness
        .registry
        .handle_config_action(SourceCodeType::Github, &request)
        .await;
    assert_eq!(response.status, 200);

    let stored = harness.configs.get_raw("p-1", "github").await.unwrap();
    assert_eq!(stored["enabled"], json!(false));

    let p1 = IndexKey::Project("local:p-1".to_string());
    let p1_github = IndexKey::ProjectType("local:p-1".to_string(), SourceCodeType::Github);
    assert!(harness.pipelines.list_by_index(&p1).await.unwrap().is_empty());
    assert!(harness.executions.list_by_index(&p1).await.unwrap().is_empty());
    assert!(harness.credentials.list_by_index(&p1_github).await.unwrap().is_empty());
    assert!(harness.repositories.list_by_index(&p1_github).await.unwrap().is_empty());

    // the other project is untouched
    assert_eq!(harness.pipelines.len(), 1);
    assert_eq!(harness.executions.len(), 1);
    assert_eq!(harness.credentials.len(), 1);
    assert_eq!(harness.repositories.len(), 1);
}

#[tokio::test]
async fn test_disable_keeps_other_provider_credentials() {
    let remote = RecordingFactory::new("jdoe");
    let harness = Harness::with_recorder(&remote);
    harness.seed_config(config_document(
        "p-1",
        SourceCodeType::BitbucketCloud,
        "local:p-1",
        json!({ "enabled": true }),
    ));
    seed_project(&harness, "local:p-1", SourceCodeType::BitbucketCloud).await;
    seed_project(&harness, "local:p-1", SourceCodeType::Github).await;

    harness
        .engine
        .disable_action("p-1", SourceCodeType::BitbucketCloud)
        .await
        .unwrap();

    // pipelines and executions are project-wide, credentials and repos are per type
    assert!(harness.pipelines.is_empty());
    assert!(harness.executions.is_empty());
    let remaining = harness.credentials.snapshot().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].spec.source_code_type, SourceCodeType::Github);
    assert_eq!(harness.repositories.len(), 1);
}

#[tokio::test]
async fn test_disable_when_already_disabled_writes_nothing() {
    let remote = RecordingFactory::new("jdoe");
    let harness = Harness::with_recorder(&remote);
    harness.seed_config(config_document(
        "p-1",
        SourceCodeType::Github,
        "local:p-1",
        json!({ "enabled": false }),
    ));
    seed_project(&harness, "local:p-1", SourceCodeType::Github).await;

    harness
        .engine
        .disable_action("p-1", SourceCodeType::Github)
        .await
        .unwrap();

    assert_eq!(harness.configs.write_count(), 0);
    assert_eq!(harness.pipelines.len(), 1);
    assert_eq!(harness.credentials.len(), 1);
    assert_eq!(harness.repositories.len(), 1);
}

#[tokio::test]
async fn test_disable_without_project_skips_cleanup() {
    let remote = RecordingFactory::new("jdoe");
    let harness = Harness::with_recorder(&remote);
    harness.seed_config(config_document(
        "p-1",
        SourceCodeType::Github,
        "",
        json!({ "enabled": true }),
    ));
    seed_project(&harness, "local:p-1", SourceCodeType::Github).await;

    harness
        .engine
        .disable_action("p-1", SourceCodeType::Github)
        .await
        .unwrap();

    assert_eq!(harness.configs.write_count(), 1);
    assert_eq!(harness.pipelines.len(), 1);
}

#[tokio::test]
async fn test_refresh_replaces_repositories_with_admin_subset() {
    let remote = RecordingFactory::new("jdoe");
    let harness = Harness::with_recorder(&remote);
    harness.seed_config(config_document(
        "p-1",
        SourceCodeType::BitbucketCloud,
        "local:p-1",
        json!({ "enabled": true }),
    ));

    remote.set_repos(vec![
        repo(SourceCodeType::BitbucketCloud, "https://bitbucket.org/a/one.git", true),
        repo(SourceCodeType::BitbucketCloud, "https://bitbucket.org/a/two.git", false),
        repo(SourceCodeType::BitbucketCloud, "https://bitbucket.org/a/three.git", true),
    ]);
    let login = ActionRequest::new("login", "p-1:bitbucketcloud")
        .with_user("u-1")
        .with_body(json!({ "code": "c1" }));
    let response = harness
        .registry
        .handle_provider_action(SourceCodeType::BitbucketCloud, &login)
        .await;
    assert_eq!(response.status, 200);

    let mut urls: Vec<String> = harness
        .repositories
        .snapshot()
        .unwrap()
        .into_iter()
        .map(|r| r.spec.url)
        .collect();
    urls.sort();
    assert_eq!(
        urls,
        vec![
            "https://bitbucket.org/a/one.git".to_string(),
            "https://bitbucket.org/a/three.git".to_string(),
        ]
    );

    // a second login with a shrunken remote list leaves only the new admin repo
    remote.set_repos(vec![repo(
        SourceCodeType::BitbucketCloud,
        "https://bitbucket.org/a/four.git",
        true,
    )]);
    let response = harness
        .registry
        .handle_provider_action(SourceCodeType::BitbucketCloud, &login)
        .await;
    assert_eq!(response.status, 200);

    let repos = harness.repositories.snapshot().unwrap();
    assert_eq!(repos.len(), 1);
    let repo = &repos[0];
    assert_eq!(repo.spec.url, "https://bitbucket.org/a/four.git");
    assert_eq!(repo.metadata.namespace, "u-1");
    assert!(repo.metadata.name.starts_with("repo-"));
    assert_eq!(repo.spec.source_code_credential_name, "p-1-bitbucketcloud-jdoe");
    assert_eq!(repo.spec.project_name, "local:p-1");
    assert_eq!(repo.spec.user_name, "u-1");
}

#[tokio::test]
async fn test_refresh_returns_unfiltered_remote_list() {
    let remote = RecordingFactory::new("jdoe");
    remote.set_repos(vec![
        repo(SourceCodeType::Github, "https://github.com/a/one.git", false),
        repo(SourceCodeType::Github, "https://github.com/a/two.git", true),
    ]);
    let harness = Harness::with_recorder(&remote);

    let mut cred = credential("u-1", "p-1-github-jdoe", "local:p-1", SourceCodeType::Github);
    cred.spec.login_name = "jdoe".to_string();
    let config = scm_provider_sync::model::ProviderConfig::Github(Default::default());

    let listed = harness
        .engine
        .refresh_repos_by_credential_and_config(&cred, &config)
        .await
        .unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(harness.repositories.len(), 1);
}

fn stored_credential(user: &str, name: &str, project: &str) -> SourceCodeCredential {
    let mut cred = credential(user, name, project, SourceCodeType::BitbucketCloud);
    cred.spec.login_name = "jdoe".to_string();
    cred
}

/// Seed `count` repositories already owned by `credential`
async fn seed_owned_repos(harness: &Harness, credential: &SourceCodeCredential, count: usize) {
    for i in 0..count {
        let mut repository = repo(
            SourceCodeType::BitbucketCloud,
            &format!("https://bitbucket.org/old/{i}.git"),
            true,
        );
        repository.metadata = ObjectMeta::named("u-1", &format!("repo-old-{i}"));
        repository.spec.project_name = credential.spec.project_name.clone();
        repository.spec.source_code_credential_name = credential.metadata.name.clone();
        harness.repositories.create(repository).await.unwrap();
    }
}

#[tokio::test]
async fn test_refresh_aborts_when_a_delete_fails() {
    let remote = RecordingFactory::new("jdoe");
    remote.set_repos(vec![repo(
        SourceCodeType::BitbucketCloud,
        "https://bitbucket.org/a/new.git",
        true,
    )]);
    let harness = Harness::with_recorder(&remote);
    let cred = stored_credential("u-1", "p-1-bitbucketcloud-jdoe", "local:p-1");
    seed_owned_repos(&harness, &cred, 2).await;
    let config = scm_provider_sync::model::ProviderConfig::BitbucketCloud(Default::default());

    harness.faults.repositories.fail_delete_at(2);
    let err = harness
        .engine
        .refresh_repos_by_credential_and_config(&cred, &config)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("injected delete failure"));

    // one old repo is gone, the other remains and nothing new was created
    let urls: Vec<String> = harness
        .repositories
        .snapshot()
        .unwrap()
        .into_iter()
        .map(|r| r.spec.url)
        .collect();
    assert_eq!(urls.len(), 1);
    assert!(urls[0].starts_with("https://bitbucket.org/old/"));
}

#[tokio::test]
async fn test_refresh_keeps_partial_creates_and_converges_on_retry() {
    let remote = RecordingFactory::new("jdoe");
    remote.set_repos(vec![
        repo(SourceCodeType::BitbucketCloud, "https://bitbucket.org/a/one.git", true),
        repo(SourceCodeType::BitbucketCloud, "https://bitbucket.org/a/two.git", false),
        repo(SourceCodeType::BitbucketCloud, "https://bitbucket.org/a/three.git", true),
        repo(SourceCodeType::BitbucketCloud, "https://bitbucket.org/a/four.git", true),
    ]);
    let harness = Harness::with_recorder(&remote);
    let cred = stored_credential("u-1", "p-1-bitbucketcloud-jdoe", "local:p-1");
    seed_owned_repos(&harness, &cred, 1).await;
    let config = scm_provider_sync::model::ProviderConfig::BitbucketCloud(Default::default());

    harness.faults.repositories.fail_create_at(2);
    assert!(harness
        .engine
        .refresh_repos_by_credential_and_config(&cred, &config)
        .await
        .is_err());

    // the old repo was removed, the first admin repo stays, the loop stopped after that
    let repos = harness.repositories.snapshot().unwrap();
    assert_eq!(repos.len(), 1);
    assert_eq!(repos[0].spec.url, "https://bitbucket.org/a/one.git");

    harness.faults.repositories.heal();
    harness
        .engine
        .refresh_repos_by_credential_and_config(&cred, &config)
        .await
        .unwrap();

    let mut urls: Vec<String> = harness
        .repositories
        .snapshot()
        .unwrap()
        .into_iter()
        .map(|r| r.spec.url)
        .collect();
    urls.sort();
    assert_eq!(
        urls,
        vec![
            "https://bitbucket.org/a/four.git".to_string(),
            "https://bitbucket.org/a/one.git".to_string(),
            "https://bitbucket.org/a/three.git".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_cleanup_stops_at_failed_delete_and_rerun_finishes() {
    let remote = RecordingFactory::new("jdoe");
    let harness = Harness::with_recorder(&remote);
    seed_project(&harness, "local:p-1", SourceCodeType::Github).await;

    harness.faults.executions.fail_delete_at(1);
    let err = harness
        .engine
        .cleanup("local:p-1", SourceCodeType::Github)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("injected delete failure"));

    // pipelines went first; nothing after the failing execution delete ran
    assert!(harness.pipelines.is_empty());
    assert_eq!(harness.executions.len(), 1);
    assert_eq!(harness.credentials.len(), 1);
    assert_eq!(harness.repositories.len(), 1);

    harness.faults.executions.heal();
    harness
        .engine
        .cleanup("local:p-1", SourceCodeType::Github)
        .await
        .unwrap();

    assert!(harness.executions.is_empty());
    assert!(harness.credentials.is_empty());
    assert!(harness.repositories.is_empty());
}
