//! reqwest-backed GameFlowService.
//!
//! Talks to the client's local REST endpoint. How the endpoint address and
//! token are discovered is left to the caller; this adapter only needs them.

use anyhow::{Context, Result as AnyResult};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use super::types::{
    AccountProgress, Conversation, HonorBallot, Lobby, MatchmakingSearch, PatcherState,
    ReconnectAck, SelectionSession,
};
use super::{GameFlowService, Result};
use crate::config::ServiceConfig;
use crate::error::ServiceError;
use crate::phase::Phase;

const PHASE_PATH: &str = "/lol-gameflow/v1/gameflow-phase";
const RECONNECT_PATH: &str = "/lol-gameflow/v1/reconnect";
const LOBBY_PATH: &str = "/lol-lobby/v2/lobby";
const SEARCH_START_PATH: &str = "/lol-lobby/v2/lobby/matchmaking/search";
const PLAY_AGAIN_PATH: &str = "/lol-lobby/v2/play-again";
const SEARCH_STATE_PATH: &str = "/lol-matchmaking/v1/search";
const READY_CHECK_ACCEPT_PATH: &str = "/lol-matchmaking/v1/ready-check/accept";
const SELECTION_SESSION_PATH: &str = "/lol-champ-select/v1/session";
const FALLBACK_POOL_PATH: &str = "/lol-lobby-team-builder/champ-select/v1/pickable-champion-ids";
const CHAT_ME_PATH: &str = "/lol-chat/v1/me";
const CONVERSATIONS_PATH: &str = "/lol-chat/v1/conversations";
const HONOR_BALLOT_PATH: &str = "/lol-honor-v2/v1/ballot";
const HONOR_PLAYER_PATH: &str = "/lol-honor-v2/v1/honor-player";
const PATCHER_STATE_PATH: &str = "/patcher/v1/products/league_of_legends/state";

/// Basic-auth user the client expects alongside its session token.
const AUTH_USER: &str = "riot";

/// Game-client REST client
pub struct HttpGameFlowService {
    http: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpGameFlowService {
    pub fn new(config: &ServiceConfig) -> AnyResult<Self> {
        let base_url = url::Url::parse(&config.base_url)
            .with_context(|| format!("Invalid service base URL {}", config.base_url))?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            // The local client serves a self-signed certificate.
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let request = self
            .http
            .request(method, url)
            .header("Accept", "application/json");
        match &self.auth_token {
            Some(token) => request.basic_auth(AUTH_USER, Some(token)),
            None => request,
        }
    }

    /// Issue a command; any non-success status is an error.
    async fn send(&self, method: Method, path: &str, body: Option<Value>) -> Result<StatusCode> {
        let mut request = self.request(method, path);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::status(
                path,
                status.as_u16(),
                body.chars().take(200).collect::<String>(),
            ));
        }
        Ok(status)
    }

    /// GET and decode a JSON body.
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.request(Method::GET, path).send().await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ServiceError::status(
                path,
                status.as_u16(),
                text.chars().take(200).collect::<String>(),
            ));
        }

        serde_json::from_str(&text).map_err(|e| ServiceError::decode(path, e))
    }
}

#[derive(Deserialize)]
struct ChatMe {
    lol: ChatMeGame,
}

#[derive(Deserialize)]
struct ChatMeGame {
    level: Value,
}

/// The chat presence reports the level either as a number or a string.
fn parse_level(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[async_trait]
impl GameFlowService for HttpGameFlowService {
    async fn get_phase(&self) -> Result<Phase> {
        self.get(PHASE_PATH).await
    }

    async fn create_lobby(&self, queue_id: i64) -> Result<()> {
        self.send(Method::POST, LOBBY_PATH, Some(json!({ "queueId": queue_id })))
            .await
            .map(|_| ())
    }

    async fn get_lobby(&self) -> Result<Lobby> {
        self.get(LOBBY_PATH).await
    }

    async fn start_matchmaking_search(&self) -> Result<()> {
        self.send(Method::POST, SEARCH_START_PATH, None)
            .await
            .map(|_| ())
    }

    async fn get_matchmaking_search_state(&self) -> Result<MatchmakingSearch> {
        self.get(SEARCH_STATE_PATH).await
    }

    async fn accept_ready_check(&self) -> Result<()> {
        self.send(Method::POST, READY_CHECK_ACCEPT_PATH, None)
            .await
            .map(|_| ())
    }

    async fn get_selection_session(&self) -> Result<SelectionSession> {
        self.get(SELECTION_SESSION_PATH).await
    }

    async fn get_fallback_option_pool(&self) -> Result<Vec<i64>> {
        self.get(FALLBACK_POOL_PATH).await
    }

    async fn submit_selection_option(&self, action_id: i64, option_id: i64) -> Result<()> {
        let path = format!("{}/actions/{}", SELECTION_SESSION_PATH, action_id);
        self.send(Method::PATCH, &path, Some(json!({ "championId": option_id })))
            .await
            .map(|_| ())
    }

    async fn complete_selection_action(&self, action_id: i64, option_id: i64) -> Result<()> {
        let path = format!("{}/actions/{}/complete", SELECTION_SESSION_PATH, action_id);
        self.send(Method::POST, &path, Some(json!({ "championId": option_id })))
            .await
            .map(|_| ())
    }

    async fn reconnect(&self) -> Result<ReconnectAck> {
        let response = self.request(Method::POST, RECONNECT_PATH).send().await?;
        Ok(match response.status() {
            StatusCode::NO_CONTENT => ReconnectAck::Accepted,
            other => ReconnectAck::Rejected {
                status: other.as_u16(),
            },
        })
    }

    async fn get_account_progress(&self) -> Result<AccountProgress> {
        let me: ChatMe = self.get(CHAT_ME_PATH).await?;
        let level = parse_level(&me.lol.level)
            .ok_or_else(|| ServiceError::decode(CHAT_ME_PATH, "level is not a number"))?;
        Ok(AccountProgress { level })
    }

    async fn post_play_again(&self) -> Result<()> {
        self.send(Method::POST, PLAY_AGAIN_PATH, None)
            .await
            .map(|_| ())
    }

    async fn get_honor_ballot(&self) -> Result<HonorBallot> {
        self.get(HONOR_BALLOT_PATH).await
    }

    async fn submit_honor(&self, target_id: i64) -> Result<()> {
        self.send(
            Method::POST,
            HONOR_PLAYER_PATH,
            Some(json!({ "summonerId": target_id })),
        )
        .await
        .map(|_| ())
    }

    async fn get_conversations(&self) -> Result<Vec<Conversation>> {
        self.get(CONVERSATIONS_PATH).await
    }

    async fn post_chat_message(&self, conversation_id: &str, body: &str) -> Result<()> {
        let path = format!("{}/{}/messages", CONVERSATIONS_PATH, conversation_id);
        self.send(Method::POST, &path, Some(json!({ "body": body })))
            .await
            .map(|_| ())
    }

    async fn get_patcher_state(&self) -> Result<PatcherState> {
        self.get(PATCHER_STATE_PATH).await
    }
}
