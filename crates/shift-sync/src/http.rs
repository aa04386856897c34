use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use shift_types::{AccountId, AccountIdentity, Peer, SessionState};
use tracing::debug;

use crate::config::RemoteConfig;
use crate::error::{SyncError, SyncResult};
use crate::transport::RemoteService;
use crate::wire::{self, ApiResponse};

/// [`RemoteService`] over JSON `POST` requests.
#[derive(Clone, Debug)]
pub struct HttpRemote {
    client: reqwest::Client,
    config: RemoteConfig,
}

impl HttpRemote {
    pub fn new(config: RemoteConfig) -> SyncResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .build()
            .map_err(|e| SyncError::Network(e.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    fn test_flag(&self) -> &'static str {
        wire::test_flag(self.config.test)
    }

    async fn post<B, T>(&self, endpoint: &str, body: &B) -> SyncResult<Option<T>>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = self.config.endpoint(endpoint);
        debug!(%url, "remote request");

        let resp = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SyncError::Timeout(self.config.timeout())
                } else {
                    SyncError::Network(e.to_string())
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SyncError::Status(status.as_u16()));
        }

        let envelope: ApiResponse<T> = resp
            .json()
            .await
            .map_err(|e| SyncError::Decode(e.to_string()))?;
        debug!(%url, is_error = envelope.is_error, message = %envelope.message, "remote response");
        envelope.into_data()
    }
}

#[async_trait]
impl RemoteService for HttpRemote {
    async fn register(&self, identity: &AccountIdentity) -> SyncResult<()> {
        let body = wire::RegisterRequest {
            key: &self.config.api_key,
            name: identity.name(),
            uuid: identity.id().as_str(),
            ruuid: identity.referrer_id().as_str(),
            country: &self.config.country,
            language: &self.config.language,
            test: self.test_flag(),
        };
        self.post::<_, serde_json::Value>(wire::REGISTER, &body)
            .await
            .map(drop)
    }

    async fn set_scooping(&self, id: &AccountId, session: SessionState) -> SyncResult<()> {
        let body = wire::SetScoopingRequest {
            key: &self.config.api_key,
            uuid: id.as_str(),
            scooping: session.as_secs(),
            test: self.test_flag(),
        };
        self.post::<_, serde_json::Value>(wire::SET_SCOOPING, &body)
            .await
            .map(drop)
    }

    async fn message(&self, name: &str) -> SyncResult<String> {
        let body = wire::MessageRequest {
            key: &self.config.api_key,
            name,
            test: self.test_flag(),
        };
        self.post::<_, String>(wire::MESSAGE, &body)
            .await?
            .ok_or_else(|| SyncError::Decode("message response carries no data".into()))
    }

    async fn mates(&self, id: &AccountId) -> SyncResult<Vec<Peer>> {
        let body = wire::MateListRequest {
            key: &self.config.api_key,
            uuid: id.as_str(),
            test: self.test_flag(),
        };
        Ok(self
            .post::<_, Vec<Peer>>(wire::MATE_LIST, &body)
            .await?
            .unwrap_or_default())
    }
}
