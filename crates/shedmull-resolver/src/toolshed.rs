//! ToolShed install-info API.

use serde::Deserialize;
use serde_json::Value;
use shedmull_common::constants::TOOLSHED_INSTALL_INFO_ROUTE;
use shedmull_common::error::{Result, ShedmullError};
use shedmull_common::types::Requirement;

/// Remote ToolShed queries.
pub trait ToolShedApi {
    /// Fetches the raw install information for one repository revision.
    ///
    /// The ToolShed answers with a heterogeneous list: the repository, its
    /// revision metadata, and the install dictionary.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not JSON.
    fn repository_revision_install_info(
        &self,
        toolshed: &str,
        name: &str,
        owner: &str,
        revision: &str,
    ) -> Result<Value>;
}

/// One installable tool of a revision.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidTool {
    /// Short tool id.
    pub id: String,
    /// Full ToolShed GUID.
    #[serde(default)]
    pub guid: Option<String>,
    /// Declared requirements.
    #[serde(default)]
    pub requirements: Vec<ToolRequirement>,
}

impl ValidTool {
    /// Whether this tool answers to `tool_id` (short id or GUID).
    #[must_use]
    pub fn matches(&self, tool_id: &str) -> bool {
        self.id == tool_id || self.guid.as_deref() == Some(tool_id)
    }
}

/// A requirement as the ToolShed reports it.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolRequirement {
    /// Package name.
    pub name: String,
    /// Version, absent for unversioned requirements.
    #[serde(default)]
    pub version: Option<String>,
    /// Requirement type; only `package` requirements are containerised.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl ToolRequirement {
    /// Whether this requirement names a package.
    #[must_use]
    pub fn is_package(&self) -> bool {
        self.kind.as_deref().is_none_or(|k| k == "package")
    }
}

impl From<&ToolRequirement> for Requirement {
    fn from(req: &ToolRequirement) -> Self {
        Self {
            name: req.name.clone(),
            version: req.version.clone().filter(|v| !v.is_empty()),
        }
    }
}

/// Revision metadata entry of an install-info response.
#[derive(Debug, Clone, Deserialize)]
pub struct RevisionInfo {
    /// Whether the revision can be installed.
    #[serde(default)]
    pub downloadable: bool,
    /// Changeset revision hash.
    #[serde(default)]
    pub changeset_revision: Option<String>,
    /// Installable tools; absent for repositories without tools.
    #[serde(default)]
    pub valid_tools: Option<Vec<ValidTool>>,
}

/// Extracts the revision metadata entries from a raw response.
///
/// Entries that are not objects or do not look like revision metadata are
/// ignored.
#[must_use]
pub fn parse_install_info(raw: &Value) -> Vec<RevisionInfo> {
    let Some(entries) = raw.as_array() else {
        tracing::warn!("install info response is not a list");
        return Vec::new();
    };
    entries
        .iter()
        .filter(|e| e.get("downloadable").is_some())
        .filter_map(|e| match serde_json::from_value::<RevisionInfo>(e.clone()) {
            Ok(info) => Some(info),
            Err(err) => {
                tracing::debug!(error = %err, "skipping unparsable revision entry");
                None
            }
        })
        .collect()
}

/// ToolShed client over HTTPS.
#[derive(Debug, Default)]
pub struct HttpToolShed {
    http: reqwest::blocking::Client,
}

impl HttpToolShed {
    /// Creates a client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Base URL for a ToolShed given as host or URL.
#[must_use]
pub fn toolshed_url(toolshed: &str) -> String {
    let trimmed = toolshed.trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

impl ToolShedApi for HttpToolShed {
    fn repository_revision_install_info(
        &self,
        toolshed: &str,
        name: &str,
        owner: &str,
        revision: &str,
    ) -> Result<Value> {
        let url = format!("{}/{TOOLSHED_INSTALL_INFO_ROUTE}", toolshed_url(toolshed));
        tracing::info!(%url, name, owner, revision, "querying ToolShed install info");
        let response = self
            .http
            .get(&url)
            .query(&[("name", name), ("owner", owner), ("changeset_revision", revision)])
            .send()
            .map_err(|e| ShedmullError::Http {
                url: url.clone(),
                message: e.to_string(),
            })?;
        if !response.status().is_success() {
            return Err(ShedmullError::Http {
                message: format!("HTTP {}", response.status()),
                url,
            });
        }
        response.json::<Value>().map_err(|e| ShedmullError::Http {
            url,
            message: format!("invalid JSON body: {e}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parse_keeps_only_revision_metadata() {
        let raw = json!([
            {"name": "bwa", "owner": "devteam"},
            {"downloadable": true, "changeset_revision": "abc", "valid_tools": [
                {"id": "bwa_mem", "guid": "ts/repos/devteam/bwa/bwa_mem/1", "requirements": [
                    {"name": "bwa", "version": "0.7.17", "type": "package"}
                ]}
            ]},
            {"bwa": ["desc", "url"]}
        ]);
        let revisions = parse_install_info(&raw);
        assert_eq!(revisions.len(), 1);
        let tools = revisions[0].valid_tools.as_ref().unwrap();
        assert_eq!(tools[0].requirements[0].version.as_deref(), Some("0.7.17"));
    }

    #[test]
    fn parse_non_list_yields_nothing() {
        assert!(parse_install_info(&json!({"err_msg": "nope"})).is_empty());
    }

    #[test]
    fn valid_tool_matches_id_or_guid() {
        let tool = ValidTool {
            id: "bwa_mem".into(),
            guid: Some("ts/repos/devteam/bwa/bwa_mem/1".into()),
            requirements: Vec::new(),
        };
        assert!(tool.matches("bwa_mem"));
        assert!(tool.matches("ts/repos/devteam/bwa/bwa_mem/1"));
        assert!(!tool.matches("bwa_aln"));
    }

    #[test]
    fn set_environment_requirement_is_not_a_package() {
        let req: ToolRequirement =
            serde_json::from_value(json!({"name": "PATH", "type": "set_environment"})).unwrap();
        assert!(!req.is_package());
        let req: ToolRequirement = serde_json::from_value(json!({"name": "bwa"})).unwrap();
        assert!(req.is_package());
    }

    #[test]
    fn requirement_conversion_treats_empty_version_as_missing() {
        let req: ToolRequirement =
            serde_json::from_value(json!({"name": "pigz", "version": "", "type": "package"})).unwrap();
        let requirement = Requirement::from(&req);
        assert_eq!(requirement.name, "pigz");
        assert!(requirement.version.is_none());
    }

    #[test]
    fn toolshed_url_adds_scheme_once() {
        assert_eq!(toolshed_url("toolshed.g2.bx.psu.edu"), "https://toolshed.g2.bx.psu.edu");
        assert_eq!(toolshed_url("http://localhost:9009/"), "http://localhost:9009");
    }
}
