//! Blocking GitHub REST client.

use std::time::Duration;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::{
    CommitQuery, CommitsService, ContentsService, Description, RawCommit, ServiceError, Tree,
    TreeService,
};
use crate::config::Config;
use crate::types::RepoRef;

const ACCEPT: &str = "application/vnd.github+json";

/// Error body returned by the API on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Implements every remote capability against `api.github.com` (or a
/// compatible server configured through [`Config::api_url`]).
pub struct GithubClient {
    agent: ureq::Agent,
    api_url: String,
    token: Option<String>,
    user_agent: String,
}

impl GithubClient {
    pub fn new(config: &Config) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build();

        Self {
            agent,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            user_agent: config.user_agent.clone(),
        }
    }

    fn contents_url(&self, repo: &RepoRef, path: &str) -> String {
        let path = path.trim_matches('/');
        if path.is_empty() {
            format!("{}/repos/{}/{}/contents", self.api_url, repo.owner, repo.repo)
        } else {
            format!(
                "{}/repos/{}/{}/contents/{}",
                self.api_url,
                repo.owner,
                repo.repo,
                encode_path(path)
            )
        }
    }

    fn request(&self, method: &str, url: &str) -> ureq::Request {
        let mut req = self
            .agent
            .request(method, url)
            .set("User-Agent", &self.user_agent)
            .set("Accept", ACCEPT);
        if let Some(token) = &self.token {
            req = req.set("Authorization", &format!("Bearer {}", token));
        }
        req
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ServiceError> {
        let mut req = self.request("GET", url);
        for (key, value) in query {
            req = req.query(key, value);
        }

        log::debug!("GET {} {:?}", url, query);
        let body = match req.call() {
            Ok(response) => response.into_string()?,
            Err(err) => return Err(status_error(url, err)),
        };

        serde_json::from_str(&body).map_err(|source| ServiceError::InvalidResponse {
            url: url.to_string(),
            source,
        })
    }
}

impl ContentsService for GithubClient {
    fn exists(&self, repo: &RepoRef, path: &str) -> Result<bool, ServiceError> {
        let url = self.contents_url(repo, path);
        let mut req = self.request("HEAD", &url);
        if let Some(rev) = repo.revision_str() {
            req = req.query("ref", rev);
        }

        log::debug!("HEAD {}", url);
        match req.call() {
            Ok(_) => Ok(true),
            Err(ureq::Error::Status(404, _)) => Ok(false),
            Err(err) => Err(status_error(&url, err)),
        }
    }

    fn describe(&self, repo: &RepoRef, path: &str) -> Result<Description, ServiceError> {
        let url = self.contents_url(repo, path);
        match repo.revision_str() {
            Some(rev) => self.get_json(&url, &[("ref", rev)]),
            None => self.get_json(&url, &[]),
        }
    }
}

impl TreeService for GithubClient {
    fn describe_recursive(&self, repo: &RepoRef, revision: &str) -> Result<Tree, ServiceError> {
        let url = format!(
            "{}/repos/{}/{}/git/trees/{}",
            self.api_url,
            repo.owner,
            repo.repo,
            encode_path(revision)
        );
        self.get_json(&url, &[("recursive", "1")])
    }
}

impl CommitsService for GithubClient {
    fn list(&self, repo: &RepoRef, query: &CommitQuery) -> Result<Vec<RawCommit>, ServiceError> {
        let url = format!("{}/repos/{}/{}/commits", self.api_url, repo.owner, repo.repo);
        let page = query.page.to_string();
        let per_page = query.per_page.to_string();
        let path = query.path.trim_start_matches('/');

        let mut params = vec![
            ("page", page.as_str()),
            ("per_page", per_page.as_str()),
            ("path", path),
        ];
        if let Some(rev) = query.revision.as_deref() {
            params.push(("sha", rev));
        }

        self.get_json(&url, &params)
    }
}

fn status_error(url: &str, err: ureq::Error) -> ServiceError {
    match err {
        ureq::Error::Status(status, response) => {
            let body = response.into_string().unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            ServiceError::Status {
                status,
                url: url.to_string(),
                message,
            }
        }
        ureq::Error::Transport(t) => ServiceError::Transport(t.to_string()),
    }
}

/// Bytes escaped in URL path segments. `/` stays so nested paths keep their
/// separators.
const PATH_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

fn encode_path(path: &str) -> String {
    utf8_percent_encode(path, PATH_SET).to_string()
}
