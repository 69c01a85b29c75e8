//! Config entries whose values are interpolated before use.

use std::collections::HashMap;

use {
    serde::{Deserialize, Serialize},
    tracing::warn,
};

use crate::{env_subst::EnvSource, interpolate::Interpolator, user::TemplateUser};

/// An MCP server as declared in config: either a spawned process
/// (`command` + `args` + `env`) or a remote endpoint (`url` + `headers`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct McpServerEntry {
    /// Executable to spawn for stdio servers.
    pub command: Option<String>,

    /// Arguments passed to `command`.
    pub args: Vec<String>,

    /// Environment for the spawned process.
    pub env: HashMap<String, String>,

    /// Endpoint for remote servers.
    pub url: Option<String>,

    /// Extra HTTP headers sent to remote servers.
    pub headers: HashMap<String, String>,
}

impl McpServerEntry {
    /// Copy of this entry with `env`, `headers` and `url` interpolated.
    /// `command` and `args` are kept verbatim.
    pub fn interpolated<E: EnvSource>(
        &self,
        server: &str,
        interpolator: &Interpolator<E>,
        user: Option<&TemplateUser>,
    ) -> Self {
        let resolved = Self {
            command: self.command.clone(),
            args: self.args.clone(),
            env: interpolator.substitute_string_map(&self.env, user),
            url: self
                .url
                .as_deref()
                .map(|url| interpolator.substitute_value(url, user)),
            headers: interpolator.substitute_string_map(&self.headers, user),
        };
        resolved.warn_unresolved(server, interpolator);
        resolved
    }

    fn warn_unresolved<E: EnvSource>(&self, server: &str, interpolator: &Interpolator<E>) {
        let blocks = [("env", &self.env), ("headers", &self.headers)];
        for (block, map) in blocks {
            for (key, value) in map {
                for var in interpolator.unresolved(value) {
                    warn!(server, block, key = %key, var = %var, "unresolved env reference");
                }
            }
        }
        if let Some(url) = &self.url {
            for var in interpolator.unresolved(url) {
                warn!(server, var = %var, "unresolved env reference in url");
            }
        }
    }
}

/// MCP servers keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct McpServersConfig {
    #[serde(flatten)]
    pub servers: HashMap<String, McpServerEntry>,
}

impl McpServersConfig {
    pub fn get(&self, name: &str) -> Option<&McpServerEntry> {
        self.servers.get(name)
    }

    /// Every server with its values interpolated for `user`.
    pub fn interpolated<E: EnvSource>(
        &self,
        interpolator: &Interpolator<E>,
        user: Option<&TemplateUser>,
    ) -> Self {
        Self {
            servers: self
                .servers
                .iter()
                .map(|(name, entry)| (name.clone(), entry.interpolated(name, interpolator, user)))
                .collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use {super::*, serde_json::json};

    fn interpolator() -> Interpolator<HashMap<String, String>> {
        Interpolator::new(HashMap::from([
            ("GH_TOKEN".to_string(), "ghp_abc".to_string()),
            ("MCP_HOST".to_string(), "mcp.internal".to_string()),
        ]))
    }

    fn config() -> McpServersConfig {
        serde_json::from_value(json!({
            "github": {
                "command": "npx",
                "args": ["-y", "server-github", "${GH_TOKEN}"],
                "env": {
                    "GITHUB_TOKEN": "${GH_TOKEN}",
                    "OWNER": "{{LIBRECHAT_USER_USERNAME}}"
                }
            },
            "search": {
                "url": "https://${MCP_HOST}/sse",
                "headers": {
                    "Authorization": "Bearer ${SEARCH_KEY}",
                    "X-User-Id": "{{LIBRECHAT_USER_ID}}"
                }
            }
        }))
        .unwrap()
    }

    fn user() -> TemplateUser {
        TemplateUser {
            id: Some("u-1".into()),
            username: Some("ann".into()),
            ..Default::default()
        }
    }

    #[test]
    fn parses_both_server_kinds() {
        let cfg = config();
        assert_eq!(cfg.servers.len(), 2);
        let github = cfg.get("github").unwrap();
        assert_eq!(github.command.as_deref(), Some("npx"));
        assert!(github.headers.is_empty());
        let search = cfg.get("search").unwrap();
        assert!(search.command.is_none());
        assert_eq!(search.headers.len(), 2);
    }

    #[test]
    fn interpolates_env_block_but_not_args() {
        let cfg = config().interpolated(&interpolator(), Some(&user()));
        let github = cfg.get("github").unwrap();
        assert_eq!(github.env["GITHUB_TOKEN"], "ghp_abc");
        assert_eq!(github.env["OWNER"], "ann");
        assert_eq!(github.args[2], "${GH_TOKEN}");
    }

    #[test]
    fn interpolates_url_and_headers() {
        let cfg = config().interpolated(&interpolator(), Some(&user()));
        let search = cfg.get("search").unwrap();
        assert_eq!(search.url.as_deref(), Some("https://mcp.internal/sse"));
        assert_eq!(search.headers["Authorization"], "Bearer ${SEARCH_KEY}");
        assert_eq!(search.headers["X-User-Id"], "u-1");
    }

    #[test]
    fn without_user_placeholders_stay() {
        let cfg = config().interpolated(&interpolator(), None);
        let search = cfg.get("search").unwrap();
        assert_eq!(search.headers["X-User-Id"], "{{LIBRECHAT_USER_ID}}");
    }

    #[test]
    fn source_config_is_untouched() {
        let cfg = config();
        let _ = cfg.interpolated(&interpolator(), Some(&user()));
        assert_eq!(cfg, config());
    }
}
