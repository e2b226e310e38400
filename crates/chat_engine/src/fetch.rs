use std::time::Duration;

use chat_core::{CandidateSnapshot, Credential};
use chat_logging::chat_debug;
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use url::Url;

use crate::{FailureKind, FetchError};

/// Relative so that an `api_base` with a path prefix keeps it.
const CANDIDATE_DATA_PATH: &str = "api/candidate-data";

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub api_base: Url,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl FetchSettings {
    pub fn new(api_base: Url) -> Self {
        Self {
            api_base,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Backend collaborator serving the candidate snapshot.
#[async_trait::async_trait]
pub trait CandidateFetcher: Send + Sync {
    async fn fetch(&self, credential: &Credential) -> Result<CandidateSnapshot, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestCandidateFetcher {
    settings: FetchSettings,
    client: reqwest::Client,
}

impl ReqwestCandidateFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    fn endpoint(&self) -> Result<Url, FetchError> {
        self.settings
            .api_base
            .join(CANDIDATE_DATA_PATH)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))
    }
}

#[async_trait::async_trait]
impl CandidateFetcher for ReqwestCandidateFetcher {
    async fn fetch(&self, credential: &Credential) -> Result<CandidateSnapshot, FetchError> {
        let url = self.endpoint()?;
        chat_debug!("fetching candidate data from {}", url);

        let response = self
            .client
            .get(url)
            .bearer_auth(credential.expose())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        match status {
            StatusCode::FORBIDDEN => {
                return Err(FetchError::new(
                    FailureKind::IdentityUnverified,
                    status.to_string(),
                ));
            }
            StatusCode::UNAUTHORIZED => {
                return Err(FetchError::new(FailureKind::Unauthorized, status.to_string()));
            }
            _ if !status.is_success() => {
                return Err(FetchError::new(
                    FailureKind::HttpStatus(status.as_u16()),
                    status.to_string(),
                ));
            }
            _ => {}
        }

        let body = response.bytes().await.map_err(map_reqwest_error)?;
        CandidateSnapshot::from_json(&body)
            .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
