//! GameFlowService trait: the only boundary between the driver and the
//! game-client REST service.

pub mod http;
pub mod types;

use async_trait::async_trait;

use crate::error::ServiceError;
use crate::phase::Phase;

pub use http::HttpGameFlowService;
pub use types::{
    AccountProgress, Conversation, HonorBallot, HonorCandidate, Lobby, MatchmakingSearch,
    PatcherState, ReconnectAck, SelectionAction, SelectionSession, HONOR_SKIP,
};

pub type Result<T> = std::result::Result<T, ServiceError>;

#[async_trait]
pub trait GameFlowService: Send + Sync {
    async fn get_phase(&self) -> Result<Phase>;

    async fn create_lobby(&self, queue_id: i64) -> Result<()>;

    async fn get_lobby(&self) -> Result<Lobby>;

    async fn start_matchmaking_search(&self) -> Result<()>;

    async fn get_matchmaking_search_state(&self) -> Result<MatchmakingSearch>;

    async fn accept_ready_check(&self) -> Result<()>;

    async fn get_selection_session(&self) -> Result<SelectionSession>;

    /// Option ids the local actor may pick without owning them.
    async fn get_fallback_option_pool(&self) -> Result<Vec<i64>>;

    /// Hover an option for a pending action.
    async fn submit_selection_option(&self, action_id: i64, option_id: i64) -> Result<()>;

    /// Lock in the hovered option.
    async fn complete_selection_action(&self, action_id: i64, option_id: i64) -> Result<()>;

    async fn reconnect(&self) -> Result<ReconnectAck>;

    async fn get_account_progress(&self) -> Result<AccountProgress>;

    async fn post_play_again(&self) -> Result<()>;

    async fn get_honor_ballot(&self) -> Result<HonorBallot>;

    /// `HONOR_SKIP` clears the screen without honoring anyone.
    async fn submit_honor(&self, target_id: i64) -> Result<()>;

    async fn get_conversations(&self) -> Result<Vec<Conversation>>;

    async fn post_chat_message(&self, conversation_id: &str, body: &str) -> Result<()>;

    async fn get_patcher_state(&self) -> Result<PatcherState>;
}
