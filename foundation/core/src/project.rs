use async_trait::async_trait;

use gclite_metadata::MetadataClient;

/// Environment variable checked before any metadata probe runs.
pub const PROJECT_ENV_VAR: &str = "GCLOUD_PROJECT";

/// Set by the App Engine runtime, e.g. `s~my-app`.
pub const APP_ENGINE_ID_ENV: &str = "GAE_APPLICATION";

/// Ambient identity capability reporting the App Engine application ID.
pub trait AppIdentity: Send + Sync {
    fn application_id(&self) -> Option<String>;
}

/// Reads the identity the App Engine runtime injects into the environment,
/// stripping the partition prefix from the raw value.
#[derive(Debug, Default)]
pub struct EnvAppIdentity;

impl AppIdentity for EnvAppIdentity {
    fn application_id(&self) -> Option<String> {
        let raw = std::env::var(APP_ENGINE_ID_ENV).ok()?;
        let id = match raw.rsplit_once('~') {
            Some((_partition, id)) => id,
            None => raw.as_str(),
        };
        if id.is_empty() {
            None
        } else {
            Some(id.to_string())
        }
    }
}

/// A single best-effort source of the default project ID.
///
/// Probes swallow their own transport failures. Running outside the probed
/// environment is an expected outcome, not an error.
#[async_trait]
pub trait ProjectProbe: Send + Sync {
    async fn project_id(&self) -> Option<String>;
}

/// Asks the App Engine identity capability, when one is present.
pub struct AppEngineProbe {
    identity: Option<Box<dyn AppIdentity>>,
}

impl AppEngineProbe {
    pub fn new(identity: Option<Box<dyn AppIdentity>>) -> Self {
        Self { identity }
    }

    /// Installs the runtime-provided identity only when running on App Engine.
    pub fn detect() -> Self {
        let identity: Option<Box<dyn AppIdentity>> = if std::env::var(APP_ENGINE_ID_ENV).is_ok() {
            Some(Box::new(EnvAppIdentity))
        } else {
            None
        };
        Self { identity }
    }
}

#[async_trait]
impl ProjectProbe for AppEngineProbe {
    async fn project_id(&self) -> Option<String> {
        self.identity.as_ref()?.application_id()
    }
}

/// Asks the Compute Engine metadata service.
pub struct ComputeEngineProbe {
    client: MetadataClient,
}

impl ComputeEngineProbe {
    pub fn new(client: MetadataClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ProjectProbe for ComputeEngineProbe {
    async fn project_id(&self) -> Option<String> {
        match self.client.project_id().await {
            Ok(id) if !id.is_empty() => Some(id),
            Ok(_) => None,
            Err(err) => {
                tracing::debug!("compute engine metadata probe failed: {err}");
                None
            }
        }
    }
}

/// Determines the default project ID.
///
/// Sources are consulted in order: the explicitly supplied project, the
/// `GCLOUD_PROJECT` environment variable, then the configured probes.
/// Resolution never fails; exhausting every source yields `None`.
pub struct DefaultProjectResolver {
    env_var: String,
    probes: Vec<Box<dyn ProjectProbe>>,
}

impl Default for DefaultProjectResolver {
    fn default() -> Self {
        Self::new(vec![
            Box::new(AppEngineProbe::detect()),
            Box::new(ComputeEngineProbe::new(MetadataClient::new())),
        ])
    }
}

impl DefaultProjectResolver {
    pub fn new(probes: Vec<Box<dyn ProjectProbe>>) -> Self {
        Self {
            env_var: PROJECT_ENV_VAR.to_string(),
            probes,
        }
    }

    /// An explicitly supplied empty string counts as absent; resolution
    /// continues with the next source.
    pub async fn resolve(&self, project: Option<&str>) -> Option<String> {
        if let Some(project) = project.filter(|p| !p.is_empty()) {
            return Some(project.to_string());
        }
        if let Ok(project) = std::env::var(&self.env_var) {
            if !project.is_empty() {
                return Some(project);
            }
        }
        for probe in &self.probes {
            if let Some(project) = probe.project_id().await {
                return Some(project);
            }
        }
        tracing::debug!("no default project could be determined");
        None
    }
}
