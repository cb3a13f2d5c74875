//! Build metadata API client with read-through caching
//!
//! Three queries, each with its own lifetime in the cache:
//!
//! | query                      | key                          | ttl      |
//! |----------------------------|------------------------------|----------|
//! | versions of a project      | `{project}:versions`         | 7 days   |
//! | builds of a version        | `{project}:builds:{v}`       | 6 hours  |
//! | descriptor of one build    | `{project}:build:{v}:{b}`    | forever  |
//!
//! Failures and empty answers are never cached.

use crate::store::CacheStore;
use mcup_core::{
    BuildDescriptor, BuildSummary, Error, Result, BUILD_LIST_TTL_SECS, VERSION_LIST_TTL_SECS,
};
use mcup_utils::Transport;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub struct MetadataClient<'a> {
    store: &'a CacheStore,
    transport: &'a dyn Transport,
    api_base: String,
    project: String,
}

impl<'a> MetadataClient<'a> {
    pub fn new(
        store: &'a CacheStore,
        transport: &'a dyn Transport,
        api_base: impl Into<String>,
        project: impl Into<String>,
    ) -> Self {
        Self {
            store,
            transport,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            project: project.into(),
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    /// Known versions, oldest first
    pub fn versions(&self) -> Result<Vec<String>> {
        let key = format!("{}:versions", self.project);
        if let Some(cached) = self.store.get_as::<Vec<String>>(&key)? {
            return Ok(cached);
        }

        let url = self.project_url();
        let body = self.transport.fetch_json(&url)?;
        let versions: Vec<String> = match body.get("versions") {
            Some(list) => decode(&url, list.clone())?,
            None => return Err(Error::remote_data(&url, "response has no 'versions' list")),
        };

        self.remember(&key, &versions, Some(VERSION_LIST_TTL_SECS), !versions.is_empty())?;
        Ok(versions)
    }

    /// Builds of `version`, oldest first; an absent list is an empty one
    pub fn builds(&self, version: &str) -> Result<Vec<BuildSummary>> {
        let key = format!("{}:builds:{version}", self.project);
        if let Some(cached) = self.store.get_as::<Vec<BuildSummary>>(&key)? {
            return Ok(cached);
        }

        let url = format!("{}/builds", self.version_url(version));
        let body = self.transport.fetch_json(&url)?;
        let builds: Vec<BuildSummary> = match body.get("builds") {
            Some(list) if !list.is_null() => decode(&url, list.clone())?,
            _ => Vec::new(),
        };

        self.remember(&key, &builds, Some(BUILD_LIST_TTL_SECS), !builds.is_empty())?;
        Ok(builds)
    }

    /// Full descriptor of one build; published builds never change
    pub fn build(&self, version: &str, build: u64) -> Result<BuildDescriptor> {
        let key = format!("{}:build:{version}:{build}", self.project);
        if let Some(cached) = self.store.get_as::<BuildDescriptor>(&key)? {
            return Ok(cached);
        }

        let url = self.build_url(version, build);
        let descriptor: BuildDescriptor = decode(&url, self.transport.fetch_json(&url)?)?;

        self.remember(&key, &descriptor, None, true)?;
        Ok(descriptor)
    }

    /// URL of a build's artifact; `segment` is a file name or download key
    /// depending on the API
    pub fn download_url(&self, version: &str, build: u64, segment: &str) -> String {
        format!("{}/downloads/{segment}", self.build_url(version, build))
    }

    fn project_url(&self) -> String {
        format!("{}/projects/{}", self.api_base, self.project)
    }

    fn version_url(&self, version: &str) -> String {
        format!("{}/versions/{version}", self.project_url())
    }

    /// URL of one build's descriptor
    pub fn build_url(&self, version: &str, build: u64) -> String {
        format!("{}/builds/{build}", self.version_url(version))
    }

    fn remember<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl_secs: Option<u64>,
        worth_keeping: bool,
    ) -> Result<()> {
        if !worth_keeping {
            return Ok(());
        }
        match serde_json::to_value(value) {
            Ok(json) => self.store.set(key, json, ttl_secs),
            Err(e) => {
                tracing::warn!(key, error = %e, "not caching unserializable value");
                Ok(())
            }
        }
    }
}

fn decode<T: DeserializeOwned>(url: &str, value: serde_json::Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| Error::remote_data(url, e.to_string()))
}
