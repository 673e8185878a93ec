//! GitHub REST API access.

use std::collections::BTreeSet;

use serde::de::DeserializeOwned;
use url::Url;

use super::GitHubError;
use super::details::{
    BranchInfo, GitRef, GitRefs, RepositoryDetails, repository_url, tag_ref_url, tag_refs_url,
    tags_pointing_at,
};
use crate::config::{GITHUB_API_URL, GITHUB_TOKEN, ReadableKeyedConfiguration};

/// Public GitHub REST API.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const API_VERSION: &str = "2022-11-28";
const ACCEPT_JSON: &str = "application/vnd.github.v3+json";
const USER_AGENT: &str = "whichlicense";

/// The GitHub operations a resolver needs.
///
/// `Ok(None)` (or an empty set) means GitHub had nothing for the request;
/// errors are reserved for rejected credentials and failed downloads.
#[allow(async_fn_in_trait)]
pub trait GitHubApi: std::fmt::Debug + Send + Sync {
    async fn repository(
        &self,
        owner: &str,
        repository: &str,
        configuration: &dyn ReadableKeyedConfiguration,
    ) -> Result<Option<RepositoryDetails>, GitHubError>;

    /// Head commit SHA of `branch`.
    async fn branch_sha(
        &self,
        details: &RepositoryDetails,
        branch: &str,
        configuration: &dyn ReadableKeyedConfiguration,
    ) -> Result<Option<String>, GitHubError>;

    /// Object SHA `tag` points at.
    async fn tag_sha(
        &self,
        owner: &str,
        repository: &str,
        tag: &str,
        configuration: &dyn ReadableKeyedConfiguration,
    ) -> Result<Option<String>, GitHubError>;

    /// Tags pointing at `sha`.
    async fn tags_for_sha(
        &self,
        owner: &str,
        repository: &str,
        sha: &str,
        configuration: &dyn ReadableKeyedConfiguration,
    ) -> Result<BTreeSet<String>, GitHubError>;

    async fn download_archive(
        &self,
        url: &Url,
        configuration: &dyn ReadableKeyedConfiguration,
    ) -> Result<Option<Vec<u8>>, GitHubError>;
}

/// [`GitHubApi`] over HTTPS with `reqwest`.
///
/// Sends `github.token` as `Authorization: token <value>` when configured
/// and talks to `github.api_url` (default [`DEFAULT_API_URL`]).
///
/// Clones share one connection pool, so a resolution's lookups and its
/// archive download reuse connections.
#[derive(Debug, Clone, Default)]
pub struct GitHubClient {
    http: reqwest::Client,
}

impl GitHubClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configured API base URL without a trailing slash.
    pub fn api_url(configuration: &dyn ReadableKeyedConfiguration) -> &str {
        configuration
            .get_string(GITHUB_API_URL)
            .map(|url| url.trim_end_matches('/'))
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_API_URL)
    }

    /// Configured token, ignoring blank values.
    fn token(configuration: &dyn ReadableKeyedConfiguration) -> Option<&str> {
        configuration
            .get_string(GITHUB_TOKEN)
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }

    /// Issue a GET request.
    ///
    /// Returns `Ok(None)` for any status other than 200, and maps 401 and
    /// 403 to errors.
    async fn get(
        &self,
        url: &str,
        json: bool,
        configuration: &dyn ReadableKeyedConfiguration,
    ) -> Result<Option<reqwest::Response>, GitHubError> {
        let transport = |source| GitHubError::Transport {
            url: url.to_string(),
            source,
        };

        let mut request = self
            .http
            .get(url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header("X-GitHub-Api-Version", API_VERSION);
        if json {
            request = request.header(reqwest::header::ACCEPT, ACCEPT_JSON);
        }
        if let Some(token) = Self::token(configuration) {
            request = request.header(reqwest::header::AUTHORIZATION, format!("token {}", token));
        }

        let response = request.send().await.map_err(transport)?;

        match response.status().as_u16() {
            200 => Ok(Some(response)),
            401 => Err(GitHubError::Unauthorized),
            403 => Err(GitHubError::Forbidden),
            status => {
                tracing::debug!(url, status, "GitHub request returned no content");
                Ok(None)
            }
        }
    }

    /// GET and decode a JSON payload. Transport and decoding failures are
    /// logged with `failure` and treated as missing.
    async fn lookup<T: DeserializeOwned>(
        &self,
        url: &str,
        failure: &str,
        configuration: &dyn ReadableKeyedConfiguration,
    ) -> Result<Option<T>, GitHubError> {
        let response = match self.get(url, true, configuration).await {
            Ok(Some(response)) => response,
            Ok(None) => return Ok(None),
            Err(GitHubError::Transport { url, source }) => {
                tracing::error!(%url, error = %source, "{}", failure);
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        match response.json::<T>().await {
            Ok(payload) => Ok(Some(payload)),
            Err(err) => {
                tracing::error!(url, error = %err, "{}", failure);
                Ok(None)
            }
        }
    }
}

impl GitHubApi for GitHubClient {
    async fn repository(
        &self,
        owner: &str,
        repository: &str,
        configuration: &dyn ReadableKeyedConfiguration,
    ) -> Result<Option<RepositoryDetails>, GitHubError> {
        let url = repository_url(Self::api_url(configuration), owner, repository);
        tracing::trace!("Checking if \"{}/{}\" exists", owner, repository);

        self.lookup(
            &url,
            &format!(
                "Unable to verify the existence of \"{}/{}\" on GitHub",
                owner, repository
            ),
            configuration,
        )
        .await
    }

    async fn branch_sha(
        &self,
        details: &RepositoryDetails,
        branch: &str,
        configuration: &dyn ReadableKeyedConfiguration,
    ) -> Result<Option<String>, GitHubError> {
        let failure = format!("Failed to lookup commit sha for branch \"{}\"", branch);
        let Some(info) = self
            .lookup::<BranchInfo>(&details.branch_url(branch), &failure, configuration)
            .await?
        else {
            return Ok(None);
        };

        tracing::trace!("Checking if branch \"{}\" exists", branch);
        if info.name != branch {
            return Ok(None);
        }

        tracing::trace!("Found commit {} for branch \"{}\"", info.commit.sha, branch);
        Ok(Some(info.commit.sha))
    }

    async fn tag_sha(
        &self,
        owner: &str,
        repository: &str,
        tag: &str,
        configuration: &dyn ReadableKeyedConfiguration,
    ) -> Result<Option<String>, GitHubError> {
        let url = tag_ref_url(Self::api_url(configuration), owner, repository, tag);
        let failure = format!("Failed to lookup commit sha for tag \"{}\"", tag);

        let refs = self.lookup::<GitRefs>(&url, &failure, configuration).await?;

        tracing::trace!("Trying to find object sha for tag \"{}\"", tag);
        Ok(refs.and_then(|refs| refs.tag_sha(tag).map(str::to_string)))
    }

    async fn tags_for_sha(
        &self,
        owner: &str,
        repository: &str,
        sha: &str,
        configuration: &dyn ReadableKeyedConfiguration,
    ) -> Result<BTreeSet<String>, GitHubError> {
        let url = tag_refs_url(Self::api_url(configuration), owner, repository);
        let failure = format!("Failed to list tags of \"{}/{}\"", owner, repository);

        let refs = self
            .lookup::<Vec<GitRef>>(&url, &failure, configuration)
            .await?
            .unwrap_or_default();

        Ok(tags_pointing_at(&refs, sha))
    }

    async fn download_archive(
        &self,
        url: &Url,
        configuration: &dyn ReadableKeyedConfiguration,
    ) -> Result<Option<Vec<u8>>, GitHubError> {
        let Some(response) = self.get(url.as_str(), false, configuration).await? else {
            return Ok(None);
        };

        let bytes = response
            .bytes()
            .await
            .map_err(|source| GitHubError::Transport {
                url: url.to_string(),
                source,
            })?;

        tracing::trace!(%url, size = bytes.len(), "Archive downloaded");
        Ok(Some(bytes.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::future::Future;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::config::{KeyedConfiguration, KeyedConfigurationStore};
    use crate::sourcing::block_on;

    /// A request as seen by [`TestServer`]; header names are lowercased.
    #[derive(Debug, Clone)]
    struct Recorded {
        path: String,
        headers: HashMap<String, String>,
    }

    /// Minimal HTTP/1.1 server answering fixed routes; anything else is 404.
    struct TestServer {
        base: String,
        requests: Arc<Mutex<Vec<Recorded>>>,
    }

    impl TestServer {
        fn start(routes: Vec<(&'static str, u16, &'static str)>) -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            let base = format!("http://{}", listener.local_addr().unwrap());
            let requests = Arc::new(Mutex::new(Vec::new()));
            let recorded = Arc::clone(&requests);

            std::thread::spawn(move || {
                for stream in listener.incoming() {
                    let Ok(mut stream) = stream else { break };
                    let mut reader = BufReader::new(stream.try_clone().unwrap());

                    let mut request_line = String::new();
                    if reader.read_line(&mut request_line).is_err() {
                        continue;
                    }
                    let path = request_line
                        .split_whitespace()
                        .nth(1)
                        .unwrap_or("/")
                        .to_string();

                    let mut headers = HashMap::new();
                    loop {
                        let mut line = String::new();
                        if reader.read_line(&mut line).unwrap_or(0) == 0 {
                            break;
                        }
                        let line = line.trim_end();
                        if line.is_empty() {
                            break;
                        }
                        if let Some((name, value)) = line.split_once(':') {
                            headers.insert(
                                name.trim().to_ascii_lowercase(),
                                value.trim().to_string(),
                            );
                        }
                    }

                    let (status, body) = routes
                        .iter()
                        .find(|(route, _, _)| *route == path)
                        .map(|(_, status, body)| (*status, *body))
                        .unwrap_or((404, r#"{"message":"Not Found"}"#));
                    recorded.lock().unwrap().push(Recorded { path, headers });

                    let response = format!(
                        "HTTP/1.1 {} Test\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        body.len(),
                        body
                    );
                    let _ = stream.write_all(response.as_bytes());
                }
            });

            Self { base, requests }
        }

        fn config(&self) -> KeyedConfigurationStore {
            let mut config = KeyedConfigurationStore::new();
            config.set_string(GITHUB_API_URL, &self.base);
            config
        }

        fn details(&self) -> RepositoryDetails {
            RepositoryDetails {
                default_branch: "main".to_string(),
                branches_url: format!(
                    "{}/repos/whichlicense/core-libs/branches{{/branch}}",
                    self.base
                ),
                archive_url: format!(
                    "{}/repos/whichlicense/core-libs/{{archive_format}}{{/ref}}",
                    self.base
                ),
            }
        }

        fn requests(&self) -> Vec<Recorded> {
            self.requests.lock().unwrap().clone()
        }
    }

    fn run<F: Future>(future: F) -> F::Output {
        block_on(future).unwrap()
    }

    const REPOSITORY: &str = r#"{
        "full_name": "whichlicense/core-libs",
        "default_branch": "main",
        "branches_url": "https://api.github.com/repos/whichlicense/core-libs/branches{/branch}",
        "archive_url": "https://api.github.com/repos/whichlicense/core-libs/{archive_format}{/ref}"
    }"#;

    const TAGS: &str = r#"[
        { "ref": "refs/tags/v0.2.0", "object": { "sha": "aaa", "type": "commit" } },
        { "ref": "refs/tags/status", "object": { "sha": "bbb", "type": "commit" } },
        { "ref": "refs/tags/v0.2.1", "object": { "sha": "bbb", "type": "commit" } }
    ]"#;

    #[test]
    fn requests_carry_api_headers_and_token() {
        let server = TestServer::start(vec![("/repos/whichlicense/core-libs", 200, REPOSITORY)]);
        let mut config = server.config();
        config.set_string(GITHUB_TOKEN, "ghp_test");

        let details = run(GitHubClient::new().repository("whichlicense", "core-libs", &config))
            .unwrap()
            .unwrap();
        assert_eq!(details.default_branch, "main");

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        let headers = &requests[0].headers;
        assert_eq!(requests[0].path, "/repos/whichlicense/core-libs");
        assert_eq!(headers["accept"], "application/vnd.github.v3+json");
        assert_eq!(headers["x-github-api-version"], "2022-11-28");
        assert_eq!(headers["user-agent"], "whichlicense");
        assert_eq!(headers["authorization"], "token ghp_test");
    }

    #[test]
    fn blank_token_is_not_sent() {
        let server = TestServer::start(vec![("/repos/whichlicense/core-libs", 200, REPOSITORY)]);
        let mut config = server.config();
        config.set_string(GITHUB_TOKEN, "  ");

        run(GitHubClient::new().repository("whichlicense", "core-libs", &config))
            .unwrap()
            .unwrap();

        assert!(!server.requests()[0].headers.contains_key("authorization"));
    }

    #[test]
    fn status_codes_map_to_errors_or_missing() {
        let server = TestServer::start(vec![
            ("/repos/o/unauthorized", 401, "{}"),
            ("/repos/o/forbidden", 403, "{}"),
            ("/repos/o/broken", 500, "{}"),
        ]);
        let config = server.config();
        let client = GitHubClient::new();

        assert!(matches!(
            run(client.repository("o", "unauthorized", &config)),
            Err(GitHubError::Unauthorized)
        ));
        assert!(matches!(
            run(client.repository("o", "forbidden", &config)),
            Err(GitHubError::Forbidden)
        ));
        assert!(run(client.repository("o", "broken", &config)).unwrap().is_none());
        assert!(run(client.repository("o", "missing", &config)).unwrap().is_none());
    }

    #[test]
    fn undecodable_payload_is_missing() {
        let server = TestServer::start(vec![("/repos/o/r", 200, "not json")]);
        let config = server.config();

        assert!(run(GitHubClient::new().repository("o", "r", &config)).unwrap().is_none());
    }

    #[test]
    fn transport_failure_on_lookup_is_missing() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let mut config = KeyedConfigurationStore::new();
        config.set_string(GITHUB_API_URL, &base);

        assert!(run(GitHubClient::new().repository("o", "r", &config)).unwrap().is_none());
    }

    #[test]
    fn branch_sha_requires_matching_branch_name() {
        let server = TestServer::start(vec![
            (
                "/repos/whichlicense/core-libs/branches/main",
                200,
                r#"{ "name": "main", "commit": { "sha": "aaa" } }"#,
            ),
            (
                "/repos/whichlicense/core-libs/branches/renamed",
                200,
                r#"{ "name": "main", "commit": { "sha": "aaa" } }"#,
            ),
        ]);
        let config = server.config();
        let details = server.details();
        let client = GitHubClient::new();

        assert_eq!(
            run(client.branch_sha(&details, "main", &config)).unwrap(),
            Some("aaa".to_string())
        );
        assert_eq!(run(client.branch_sha(&details, "renamed", &config)).unwrap(), None);
        assert_eq!(run(client.branch_sha(&details, "gone", &config)).unwrap(), None);
    }

    #[test]
    fn tag_sha_reads_single_reference() {
        let server = TestServer::start(vec![(
            "/repos/o/r/git/ref/tags/v0.2.1",
            200,
            r#"{ "ref": "refs/tags/v0.2.1", "object": { "sha": "bbb", "type": "commit" } }"#,
        )]);
        let config = server.config();
        let client = GitHubClient::new();

        assert_eq!(
            run(client.tag_sha("o", "r", "v0.2.1", &config)).unwrap(),
            Some("bbb".to_string())
        );
        assert_eq!(run(client.tag_sha("o", "r", "v9", &config)).unwrap(), None);
    }

    #[test]
    fn tags_for_sha_filters_listing() {
        let server = TestServer::start(vec![("/repos/o/r/git/refs/tags", 200, TAGS)]);
        let config = server.config();

        let tags = run(GitHubClient::new().tags_for_sha("o", "r", "bbb", &config)).unwrap();
        assert_eq!(tags.into_iter().collect::<Vec<_>>(), vec!["v0.2.1".to_string()]);
    }

    #[test]
    fn tags_for_sha_is_empty_on_error_status() {
        let server = TestServer::start(vec![("/repos/o/r/git/refs/tags", 500, TAGS)]);
        let config = server.config();

        let tags = run(GitHubClient::new().tags_for_sha("o", "r", "bbb", &config)).unwrap();
        assert!(tags.is_empty());
    }

    #[test]
    fn download_archive_skips_json_accept_header() {
        let server = TestServer::start(vec![(
            "/repos/whichlicense/core-libs/zipball/aaa",
            200,
            "archive-bytes",
        )]);
        let config = server.config();
        let client = GitHubClient::new();
        let zipball = Url::parse(&server.details().zipball_url("aaa")).unwrap();
        let missing = Url::parse(&server.details().zipball_url("fff")).unwrap();

        assert_eq!(
            run(client.download_archive(&zipball, &config)).unwrap(),
            Some(b"archive-bytes".to_vec())
        );
        assert_eq!(run(client.download_archive(&missing, &config)).unwrap(), None);

        let requests = server.requests();
        assert_ne!(
            requests[0].headers.get("accept").map(String::as_str),
            Some(ACCEPT_JSON)
        );
        assert_eq!(requests[0].headers["x-github-api-version"], "2022-11-28");
    }

    #[test]
    fn api_url_defaults_to_public_github() {
        let config = KeyedConfigurationStore::new();
        assert_eq!(GitHubClient::api_url(&config), "https://api.github.com");
    }

    #[test]
    fn api_url_uses_configured_base_without_trailing_slash() {
        let mut config = KeyedConfigurationStore::new();
        config.set_string(GITHUB_API_URL, "https://ghe.example.com/api/v3/");

        assert_eq!(
            GitHubClient::api_url(&config),
            "https://ghe.example.com/api/v3"
        );
    }

    #[test]
    fn api_url_ignores_blank_setting() {
        let mut config = KeyedConfigurationStore::new();
        config.set_string(GITHUB_API_URL, "/");

        assert_eq!(GitHubClient::api_url(&config), DEFAULT_API_URL);
    }
}
