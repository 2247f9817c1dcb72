use std::collections::{HashMap, HashSet};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::authz::config::GuardConfig;
use crate::authz::holder::Subject;
use crate::config::{expandenv, CommonConfig, PathSet};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "ServerConfig::default_bind")]
    pub bind: String,

    #[serde(default = "ServerConfig::default_keep_alive_secs")]
    pub keep_alive_secs: u64,

    #[serde(default = "ServerConfig::default_workers")]
    pub workers: u64,

    #[serde(default = "ServerConfig::default_log_level")]
    pub log_level: String,

    /// Principals, looked up by the bearer token of a request.
    #[serde(default = "ServerConfig::default_subjects")]
    pub subjects: Vec<SubjectConfig>,

    /// Dynamic resources, mapping a resource name to the roles allowed to
    /// access it.
    #[serde(default = "ServerConfig::default_resources")]
    pub resources: HashMap<String, Vec<String>>,

    #[serde(default = "ServerConfig::default_routes")]
    pub routes: Vec<RouteConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SubjectConfig {
    pub token: String,

    #[serde(flatten)]
    pub subject: Subject,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RouteConfig {
    pub path: String,

    #[serde(default = "RouteConfig::default_message")]
    pub message: String,

    /// Guards protecting the route, most general (controller level) first.
    #[serde(default)]
    pub guards: Vec<GuardConfig>,
}

impl CommonConfig for ServerConfig {
    fn default() -> Self {
        Self {
            bind: Self::default_bind(),
            keep_alive_secs: Self::default_keep_alive_secs(),
            workers: Self::default_workers(),
            log_level: Self::default_log_level(),
            subjects: Self::default_subjects(),
            resources: Self::default_resources(),
            routes: Self::default_routes(),
        }
    }

    fn complete(&mut self, _ps: &PathSet) -> Result<()> {
        self.bind = expandenv("bind", &self.bind)?;
        if self.bind.is_empty() {
            bail!("bind cannot be empty");
        }

        if !Self::LOG_LEVELS.contains(&self.log_level.as_str()) {
            bail!(
                "log_level must be one of {:?}, found '{}'",
                Self::LOG_LEVELS,
                self.log_level
            );
        }

        let mut tokens = HashSet::new();
        for subject in self.subjects.iter_mut() {
            subject.token = expandenv("token", &subject.token)
                .with_context(|| format!("subject '{}'", subject.subject.name))?;
            if subject.token.is_empty() {
                bail!("token of subject '{}' cannot be empty", subject.subject.name);
            }
            if !tokens.insert(subject.token.clone()) {
                bail!("token of subject '{}' is duplicated", subject.subject.name);
            }
        }

        let mut paths = HashSet::new();
        for route in self.routes.iter() {
            if !route.path.starts_with('/') {
                bail!("route path '{}' must start with '/'", route.path);
            }
            if !paths.insert(route.path.as_str()) {
                bail!("route path '{}' is duplicated", route.path);
            }
        }

        Ok(())
    }
}

impl ServerConfig {
    const LOG_LEVELS: [&'static str; 4] = ["error", "warn", "info", "debug"];

    pub fn default_bind() -> String {
        String::from("127.0.0.1:7881")
    }

    pub fn default_keep_alive_secs() -> u64 {
        0
    }

    pub fn default_workers() -> u64 {
        0
    }

    pub fn default_log_level() -> String {
        String::from("info")
    }

    pub fn default_subjects() -> Vec<SubjectConfig> {
        vec![]
    }

    pub fn default_resources() -> HashMap<String, Vec<String>> {
        HashMap::new()
    }

    pub fn default_routes() -> Vec<RouteConfig> {
        vec![]
    }
}

impl RouteConfig {
    pub fn default_message() -> String {
        String::from("ok")
    }
}
