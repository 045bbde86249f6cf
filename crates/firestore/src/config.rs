use std::time::Duration;

/// Production REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com";
pub const DEFAULT_DATABASE_ID: &str = "(default)";
/// Default timeout for API requests.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const PROJECT_ID_ENV: &str = "FIREBASE_PROJECT_ID";
const API_KEY_ENV: &str = "FIREBASE_API_KEY";
const DATABASE_ID_ENV: &str = "FIRESTORE_DATABASE_ID";
const EMULATOR_HOST_ENV: &str = "FIRESTORE_EMULATOR_HOST";
const ID_TOKEN_ENV: &str = "FIREBASE_ID_TOKEN";

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Connection parameters for the remote document database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirestoreConfig {
    pub project_id: String,
    pub database_id: String,
    pub api_key: Option<String>,
    /// Signed-in user's ID token, sent as a bearer token.
    pub id_token: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
}

impl FirestoreConfig {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            database_id: DEFAULT_DATABASE_ID.to_string(),
            api_key: None,
            id_token: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Reads the connection parameters from the environment.
    ///
    /// Returns `None` when no project id is set, which leaves the remote
    /// backend unconfigured. `FIRESTORE_EMULATOR_HOST` switches the base URL
    /// to the local emulator.
    pub fn from_env() -> Option<Self> {
        let project_id = env_value(PROJECT_ID_ENV)?;
        let mut config = Self::new(project_id);
        if let Some(database_id) = env_value(DATABASE_ID_ENV) {
            config.database_id = database_id;
        }
        config.api_key = env_value(API_KEY_ENV);
        config.id_token = env_value(ID_TOKEN_ENV);
        if let Some(host) = env_value(EMULATOR_HOST_ENV) {
            config.base_url = format!("http://{}", host.trim_end_matches('/'));
        }
        Some(config)
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim().trim_end_matches('/').to_string();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_id_token(mut self, id_token: impl Into<String>) -> Self {
        self.id_token = Some(id_token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `projects/{project}/databases/{database}/documents`
    pub fn documents_root(&self) -> String {
        format!(
            "projects/{}/databases/{}/documents",
            self.project_id, self.database_id
        )
    }
}
