//! Galaxy repository installation.
//!
//! Asks a Galaxy server to install every revision of an install list,
//! without tool, repository or resolver dependencies.

use serde::Serialize;
use serde_json::Value;
use shedmull_common::constants::GALAXY_INSTALL_ROUTE;
use shedmull_common::error::{Result, ShedmullError};

use crate::install_list::RepositoryInstall;

/// Result of a single install request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// Galaxy started installing the revision.
    Installed,
    /// Galaxy reported the revision as already installed.
    AlreadyInstalled,
}

/// Something that can install one repository revision.
pub trait RepositoryInstaller {
    /// Installs `revision` of `repo`.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects or cannot be reached.
    fn install(&self, repo: &RepositoryInstall, revision: &str) -> Result<InstallOutcome>;
}

/// Request body of the Galaxy install route.
#[derive(Debug, Serialize)]
struct InstallRequest<'a> {
    tool_shed_url: &'a str,
    name: &'a str,
    owner: &'a str,
    changeset_revision: &'a str,
    new_tool_panel_section_label: &'a str,
    install_tool_dependencies: bool,
    install_repository_dependencies: bool,
    install_resolver_dependencies: bool,
}

/// Galaxy API client authenticated by API key.
#[derive(Debug)]
pub struct GalaxyClient {
    base_url: String,
    api_key: String,
    http: reqwest::blocking::Client,
}

impl GalaxyClient {
    /// Creates a client for the Galaxy server at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            http: reqwest::blocking::Client::new(),
        }
    }

    fn install_url(&self) -> String {
        format!("{}/{GALAXY_INSTALL_ROUTE}", self.base_url)
    }
}

impl RepositoryInstaller for GalaxyClient {
    fn install(&self, repo: &RepositoryInstall, revision: &str) -> Result<InstallOutcome> {
        let url = self.install_url();
        tracing::info!(
            name = %repo.name,
            owner = %repo.owner,
            revision,
            "requesting repository install"
        );
        let body = InstallRequest {
            tool_shed_url: &repo.tool_shed_url,
            name: &repo.name,
            owner: &repo.owner,
            changeset_revision: revision,
            new_tool_panel_section_label: &repo.tool_panel_section_label,
            install_tool_dependencies: false,
            install_repository_dependencies: false,
            install_resolver_dependencies: false,
        };
        let response = self
            .http
            .post(&url)
            .header("x-api-key", &self.api_key)
            .json(&body)
            .send()
            .map_err(|e| ShedmullError::Http {
                url: url.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        let text = response.text().map_err(|e| ShedmullError::Http {
            url: url.clone(),
            message: format!("failed to read response body: {e}"),
        })?;
        if !status.is_success() {
            return Err(ShedmullError::Http {
                url,
                message: format!("HTTP {status}: {}", error_message(&text)),
            });
        }
        Ok(interpret_install_response(&text))
    }
}

/// Classifies a successful install response body.
///
/// Galaxy answers with a list of repositories when it installs something,
/// and with a `status`/`message` object when nothing needed installing.
#[must_use]
pub fn interpret_install_response(body: &str) -> InstallOutcome {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return InstallOutcome::Installed;
    };
    let message = value.get("message").and_then(Value::as_str).unwrap_or_default();
    if message.contains("already been installed") || message.contains("already installed") {
        InstallOutcome::AlreadyInstalled
    } else {
        InstallOutcome::Installed
    }
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("err_msg").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

/// Tally of an install run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallSummary {
    /// Revisions Galaxy started installing.
    pub installed: usize,
    /// Revisions already present.
    pub skipped: usize,
    /// `name@revision` and the error for every failed request.
    pub failed: Vec<(String, String)>,
}

/// Installs every revision of every repository, logging and counting
/// failures instead of stopping at the first.
pub fn install_all(installer: &dyn RepositoryInstaller, repos: &[RepositoryInstall]) -> InstallSummary {
    let mut summary = InstallSummary::default();
    for repo in repos {
        for revision in &repo.revisions {
            match installer.install(repo, revision) {
                Ok(InstallOutcome::Installed) => summary.installed += 1,
                Ok(InstallOutcome::AlreadyInstalled) => {
                    tracing::info!(name = %repo.name, revision = %revision, "already installed");
                    summary.skipped += 1;
                }
                Err(e) => {
                    tracing::error!(name = %repo.name, revision = %revision, error = %e, "install failed");
                    summary
                        .failed
                        .push((format!("{}@{revision}", repo.name), e.to_string()));
                }
            }
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    struct FakeInstaller {
        calls: RefCell<Vec<String>>,
    }

    impl RepositoryInstaller for FakeInstaller {
        fn install(&self, repo: &RepositoryInstall, revision: &str) -> Result<InstallOutcome> {
            self.calls.borrow_mut().push(format!("{}@{revision}", repo.name));
            match revision {
                "old" => Ok(InstallOutcome::AlreadyInstalled),
                "bad" => Err(ShedmullError::Http {
                    url: "http://galaxy".into(),
                    message: "HTTP 400".into(),
                }),
                _ => Ok(InstallOutcome::Installed),
            }
        }
    }

    fn repo(revisions: &[&str]) -> RepositoryInstall {
        RepositoryInstall {
            name: "fastp".into(),
            owner: "iuc".into(),
            tool_shed_url: "https://toolshed.g2.bx.psu.edu".into(),
            tool_panel_section_label: "Workbench Tools".into(),
            revisions: revisions.iter().map(|r| (*r).to_string()).collect(),
        }
    }

    #[test]
    fn install_all_continues_past_failures() {
        let installer = FakeInstaller {
            calls: RefCell::new(Vec::new()),
        };
        let summary = install_all(&installer, &[repo(&["bad", "new", "old"])]);
        assert_eq!(installer.calls.borrow().len(), 3);
        assert_eq!(summary.installed, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].0, "fastp@bad");
    }

    #[test]
    fn already_installed_message_is_recognised() {
        let body = r#"{"status": "ok", "message": "No repositories were installed, possibly because the selected repository has already been installed."}"#;
        assert_eq!(interpret_install_response(body), InstallOutcome::AlreadyInstalled);
    }

    #[test]
    fn repository_list_means_installed() {
        let body = r#"[{"name": "fastp", "status": "New"}]"#;
        assert_eq!(interpret_install_response(body), InstallOutcome::Installed);
    }

    #[test]
    fn error_message_prefers_err_msg() {
        assert_eq!(error_message(r#"{"err_msg": "bad key"}"#), "bad key");
        assert_eq!(error_message("plain failure\n"), "plain failure");
    }

    #[test]
    fn install_url_joins_route() {
        let client = GalaxyClient::new("https://usegalaxy.example/", "key");
        assert_eq!(
            client.install_url(),
            "https://usegalaxy.example/api/tool_shed_repositories/new/install_repository_revision"
        );
    }
}
