//! Integration tests for github-ci
//!
//! These tests verify:
//! - Scanning and rewriting workflows against a mocked GitHub API
//! - Cache behaviour across repeated references
//! - The orchestrator's partial-failure handling

use github_ci::config::Config;
use github_ci::domain::VersionFormat;
use github_ci::progress::Progress;
use github_ci::registry::{GitHubClient, HttpClient};
use github_ci::resolver::{ActionResolver, Resolver};
use github_ci::update::UpgradeEngine;
use github_ci::workflow::{load_workflows, WorkflowWriter};
use mockito::{Matcher, Server, ServerGuard};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const HASH_V1_9: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
const HASH_V1_8: &str = "1111111111111111111111111111111111111111";
const HASH_V0_9: &str = "2222222222222222222222222222222222222222";

const CHECKOUT_TAGS: &str = r#"[
    {"name": "v1.9.0", "commit": {"sha": "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"}},
    {"name": "v1.8.0", "commit": {"sha": "1111111111111111111111111111111111111111"}},
    {"name": "v0.9.0", "commit": {"sha": "2222222222222222222222222222222222222222"}}
]"#;

const CHECKOUT_CONSTRAINT: &str = "[upgrade.actions.\"actions/checkout\"]\nconstraint = \"^1.0.0\"\n";

/// Test fixture directory creation helper
fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

fn write_workflow(dir: &Path, name: &str, content: &str) -> PathBuf {
    let workflows = dir.join("workflows");
    fs::create_dir_all(&workflows).unwrap();
    let path = workflows.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn resolver_for(server: &ServerGuard) -> ActionResolver<GitHubClient> {
    ActionResolver::new(GitHubClient::with_base_url(
        HttpClient::new().unwrap(),
        &server.url(),
    ))
}

mod upgrade_scenarios {
    use super::*;

    async fn mock_checkout_tags(server: &mut ServerGuard, hits: usize) -> mockito::Mock {
        server
            .mock("GET", "/repos/actions/checkout/tags")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(CHECKOUT_TAGS)
            .expect(hits)
            .create_async()
            .await
    }

    /// Constrained upgrade written as a tag
    #[tokio::test]
    async fn test_constrained_upgrade_tag_format() {
        let mut server = Server::new_async().await;
        let tags = mock_checkout_tags(&mut server, 1).await;

        let dir = create_test_dir();
        let path = write_workflow(
            dir.path(),
            "ci.yml",
            "jobs:\n  build:\n    steps:\n      - uses: actions/checkout@v3\n",
        );

        let resolver = resolver_for(&server);
        let config = Config::parse(CHECKOUT_CONSTRAINT, Path::new("cfg.toml")).unwrap();
        let engine = UpgradeEngine::new(&resolver, &config);

        let mut workflows = load_workflows(&dir.path().join("workflows")).unwrap();
        let outcome = engine.find_updates(&workflows, &Progress::disabled()).await;

        assert!(outcome.error.is_none());
        assert_eq!(outcome.decisions.len(), 1);
        assert_eq!(outcome.decisions[0].new_tag, "v1.9.0");
        assert_eq!(outcome.decisions[0].format, VersionFormat::Tag);

        WorkflowWriter::new(false).apply_all(&mut workflows, &outcome.decisions);

        tags.assert_async().await;
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "jobs:\n  build:\n    steps:\n      - uses: actions/checkout@v1.9.0\n"
        );
    }

    /// Constrained upgrade written as a commit SHA with the tag as comment
    #[tokio::test]
    async fn test_constrained_upgrade_hash_format() {
        let mut server = Server::new_async().await;
        let _tags = mock_checkout_tags(&mut server, 1).await;

        let dir = create_test_dir();
        let path = write_workflow(
            dir.path(),
            "ci.yml",
            "steps:\n  - uses: actions/checkout@v3\n",
        );

        let resolver = resolver_for(&server);
        let config = Config::parse(CHECKOUT_CONSTRAINT, Path::new("cfg.toml"))
            .unwrap()
            .with_format(VersionFormat::Hash);
        let engine = UpgradeEngine::new(&resolver, &config);

        let mut workflows = load_workflows(&path).unwrap();
        let outcome = engine.find_updates(&workflows, &Progress::disabled()).await;
        WorkflowWriter::new(false).apply_all(&mut workflows, &outcome.decisions);

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            format!("steps:\n  - uses: actions/checkout@{} # v1.9.0\n", HASH_V1_9)
        );
    }

    /// A hash already at the latest release is rewritten to tag form only
    #[tokio::test]
    async fn test_hash_at_latest_rewritten_to_tag() {
        let mut server = Server::new_async().await;
        // One listing for the reverse lookup, one for the constrained lookup
        let tags = mock_checkout_tags(&mut server, 2).await;

        let dir = create_test_dir();
        let path = write_workflow(
            dir.path(),
            "ci.yml",
            &format!("steps:\n  - uses: actions/checkout@{} # v1.9.0\n", HASH_V1_9),
        );

        let resolver = resolver_for(&server);
        let config = Config::parse(CHECKOUT_CONSTRAINT, Path::new("cfg.toml")).unwrap();
        let engine = UpgradeEngine::new(&resolver, &config);

        let mut workflows = load_workflows(&path).unwrap();
        let outcome = engine.find_updates(&workflows, &Progress::disabled()).await;

        assert_eq!(outcome.decisions.len(), 1);
        assert!(outcome.decisions[0].is_format_only());
        assert_eq!(outcome.decisions[0].warning, None);

        WorkflowWriter::new(false).apply_all(&mut workflows, &outcome.decisions);

        tags.assert_async().await;
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "steps:\n  - uses: actions/checkout@v1.9.0\n"
        );
    }

    /// Older pinned hashes resolve to their tag before comparison
    #[tokio::test]
    async fn test_old_hash_upgraded_in_hash_format() {
        let mut server = Server::new_async().await;
        let _tags = mock_checkout_tags(&mut server, 2).await;

        let dir = create_test_dir();
        let path = write_workflow(
            dir.path(),
            "ci.yml",
            &format!("steps:\n  - uses: actions/checkout@{} # v1.8.0\n", HASH_V1_8),
        );

        let resolver = resolver_for(&server);
        let config = Config::parse(CHECKOUT_CONSTRAINT, Path::new("cfg.toml"))
            .unwrap()
            .with_format(VersionFormat::Hash);
        let engine = UpgradeEngine::new(&resolver, &config);

        let mut workflows = load_workflows(&path).unwrap();
        let outcome = engine.find_updates(&workflows, &Progress::disabled()).await;

        assert_eq!(outcome.decisions.len(), 1);
        assert_eq!(outcome.decisions[0].current_version, "v1.8.0");
        WorkflowWriter::new(false).apply_all(&mut workflows, &outcome.decisions);

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            format!("steps:\n  - uses: actions/checkout@{} # v1.9.0\n", HASH_V1_9)
        );
        assert!(!written.contains(HASH_V0_9));
    }

    /// Unconstrained lookups go through the latest release
    #[tokio::test]
    async fn test_unconstrained_uses_latest_release() {
        let mut server = Server::new_async().await;
        let release = server
            .mock("GET", "/repos/actions/setup-go/releases/latest")
            .with_status(200)
            .with_body(r#"{"tag_name": "v5.0.1"}"#)
            .create_async()
            .await;
        let git_ref = server
            .mock("GET", "/repos/actions/setup-go/git/ref/tags/v5.0.1")
            .with_status(200)
            .with_body(format!(
                r#"{{"ref": "refs/tags/v5.0.1", "object": {{"sha": "{}", "type": "commit"}}}}"#,
                HASH_V1_9
            ))
            .create_async()
            .await;

        let dir = create_test_dir();
        let path = write_workflow(
            dir.path(),
            "ci.yml",
            "steps:\n  - uses: actions/setup-go@v4   # pinned by ops\n",
        );

        let resolver = resolver_for(&server);
        let config = Config::default().with_format(VersionFormat::Major);
        let engine = UpgradeEngine::new(&resolver, &config);

        let mut workflows = load_workflows(&path).unwrap();
        let outcome = engine.find_updates(&workflows, &Progress::disabled()).await;
        WorkflowWriter::new(false).apply_all(&mut workflows, &outcome.decisions);

        release.assert_async().await;
        git_ref.assert_async().await;
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "steps:\n  - uses: actions/setup-go@v5 # v5.0.1\n"
        );
    }
}

mod caching {
    use super::*;

    /// Identical constrained lookups hit the API once
    #[tokio::test]
    async fn test_repeated_reference_fetched_once() {
        let mut server = Server::new_async().await;
        let tags = server
            .mock("GET", "/repos/actions/checkout/tags")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(CHECKOUT_TAGS)
            .expect(1)
            .create_async()
            .await;

        let dir = create_test_dir();
        write_workflow(dir.path(), "a.yml", "steps:\n  - uses: actions/checkout@v3\n");
        write_workflow(dir.path(), "b.yml", "steps:\n  - uses: actions/checkout@v3\n");

        let resolver = resolver_for(&server);
        let config = Config::parse(CHECKOUT_CONSTRAINT, Path::new("cfg.toml")).unwrap();
        let engine = UpgradeEngine::new(&resolver, &config);

        let workflows = load_workflows(&dir.path().join("workflows")).unwrap();
        let outcome = engine.find_updates(&workflows, &Progress::disabled()).await;

        tags.assert_async().await;
        assert_eq!(outcome.decisions.len(), 2);
        let stats = resolver.cache_stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    /// Definitive "no matching tags" answers are cached too
    #[tokio::test]
    async fn test_no_matching_tags_cached_and_aborts() {
        let mut server = Server::new_async().await;
        let tags = server
            .mock("GET", "/repos/actions/checkout/tags")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(CHECKOUT_TAGS)
            .expect(1)
            .create_async()
            .await;

        let resolver = resolver_for(&server);
        for _ in 0..2 {
            let result = resolver
                .get_latest_version("actions", "checkout", "v3", "~7.1.0")
                .await;
            assert!(result.is_err());
        }

        tags.assert_async().await;
        assert_eq!(resolver.cache_stats().await.hits, 1);
    }
}

mod orchestration {
    use super::*;
    use clap::Parser;
    use github_ci::cli::CliArgs;
    use github_ci::orchestrator::Orchestrator;

    fn args(dir: &TempDir, extra: &[&str]) -> CliArgs {
        let mut argv = vec![
            "github-ci".to_string(),
            dir.path().join("workflows").display().to_string(),
            "-c".to_string(),
            dir.path().join("cfg.toml").display().to_string(),
        ];
        argv.extend(extra.iter().map(|a| a.to_string()));
        CliArgs::parse_from(argv)
    }

    /// A failing lookup keeps earlier decisions and writes nothing
    #[tokio::test]
    async fn test_failure_keeps_partial_results() {
        let mut server = Server::new_async().await;
        let _tags = server
            .mock("GET", "/repos/actions/checkout/tags")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(CHECKOUT_TAGS)
            .create_async()
            .await;
        let _broken = server
            .mock("GET", "/repos/actions/cache/releases/latest")
            .with_status(500)
            .create_async()
            .await;
        let _broken_tags = server
            .mock("GET", "/repos/actions/cache/tags")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let dir = create_test_dir();
        fs::write(dir.path().join("cfg.toml"), CHECKOUT_CONSTRAINT).unwrap();
        let content = "steps:\n  - uses: actions/checkout@v3\n  - uses: actions/cache@v3\n";
        let path = write_workflow(dir.path(), "ci.yml", content);

        let orchestrator = Orchestrator::with_api(args(&dir, &[]), server.url(), None);
        let result = orchestrator.run_with_progress(false).await.unwrap();

        assert_eq!(result.decisions.len(), 1);
        let error = result.error.as_ref().unwrap();
        assert_eq!(error.action, "actions/cache");
        assert!(result.write_results.is_empty());
        assert!(result.has_errors());
        assert_eq!(fs::read_to_string(&path).unwrap(), content);
    }

    /// Dry-run computes decisions without touching files
    #[tokio::test]
    async fn test_dry_run_leaves_files_unchanged() {
        let mut server = Server::new_async().await;
        let _tags = server
            .mock("GET", "/repos/actions/checkout/tags")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(CHECKOUT_TAGS)
            .create_async()
            .await;

        let dir = create_test_dir();
        fs::write(dir.path().join("cfg.toml"), CHECKOUT_CONSTRAINT).unwrap();
        let content = "steps:\n  - uses: actions/checkout@v3\n";
        let path = write_workflow(dir.path(), "ci.yml", content);

        let orchestrator =
            Orchestrator::with_api(args(&dir, &["--dry-run", "--format", "hash"]), server.url(), None);
        let result = orchestrator.run_with_progress(false).await.unwrap();

        assert!(result.dry_run);
        assert_eq!(result.decisions.len(), 1);
        assert_eq!(result.decisions[0].format, VersionFormat::Hash);
        assert_eq!(result.write_results.len(), 1);
        assert!(!result.write_results[0].file_modified);
        assert_eq!(fs::read_to_string(&path).unwrap(), content);
    }
}
