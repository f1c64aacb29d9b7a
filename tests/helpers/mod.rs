//! Scripted service and recording collaborators shared by the integration
//! tests.
//!
//! Every test runs with tokio's clock paused, so pacing delays complete
//! instantly while `tokio::time::Instant` still measures them exactly.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use gameflow_driver::collaborators::{
    AccountSource, CompletionStore, Credentials, DialogueSource, GameSession, Launcher,
    RandomSource, SessionCollaborators, SessionHandle, UiAutomation,
};
use gameflow_driver::config::{DriverConfig, UiTarget};
use gameflow_driver::handlers::PhaseContext;
use gameflow_driver::service::types::{GameConfig, SearchError, SelectionTimer};
use gameflow_driver::service::{
    AccountProgress, Conversation, GameFlowService, HonorBallot, HonorCandidate, Lobby,
    MatchmakingSearch, PatcherState, ReconnectAck, SelectionAction, SelectionSession,
};
use gameflow_driver::{CollaboratorError, FlowError, Pacer, Phase, PhasePoller, ServiceError, SessionState};

// ---------------------------------------------------------------------------
// ScriptedService
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetPhase,
    CreateLobby(i64),
    GetLobby,
    StartSearch,
    GetSearch,
    AcceptReadyCheck,
    GetSelection,
    GetFallbackPool,
    SubmitOption { action_id: i64, option_id: i64 },
    CompleteAction { action_id: i64, option_id: i64 },
    Reconnect,
    GetAccountProgress,
    PlayAgain,
    GetHonorBallot,
    SubmitHonor(i64),
    GetConversations,
    PostChat { conversation_id: String, body: String },
    GetPatcherState,
}

#[derive(Default)]
struct Script {
    phases: VecDeque<Option<Phase>>,
    /// Returned once `phases` runs dry.
    sticky_phase: Option<Phase>,
    levels: VecDeque<Option<u32>>,
    last_level: Option<u32>,
    lobby: Option<Lobby>,
    search: Option<MatchmakingSearch>,
    selections: VecDeque<Option<SelectionSession>>,
    fallback_pool: Option<Vec<i64>>,
    reconnect_acks: VecDeque<ReconnectAck>,
    honor_ballots: VecDeque<Option<HonorBallot>>,
    conversations: Option<Vec<Conversation>>,
    fail_chat_post: bool,
    fail_complete_action: bool,
    patcher: VecDeque<Option<PatcherState>>,
    calls: Vec<Call>,
}

/// A `GameFlowService` that answers from queued responses.
///
/// `None` entries in a queue are failed calls.
#[derive(Default)]
pub struct ScriptedService {
    script: Mutex<Script>,
}

fn unavailable(path: &str) -> ServiceError {
    ServiceError::status(path, 503, "scripted failure")
}

impl ScriptedService {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<R>(&self, f: impl FnOnce(&mut Script) -> R) -> R {
        let mut script = self.script.lock().unwrap();
        f(&mut script)
    }

    pub fn phases<I: IntoIterator<Item = Phase>>(self, phases: I) -> Self {
        self.with(|s| s.phases.extend(phases.into_iter().map(Some)));
        self
    }

    pub fn phase_failures(self, count: usize) -> Self {
        self.with(|s| s.phases.extend(std::iter::repeat(None).take(count)));
        self
    }

    pub fn sticky_phase(self, phase: Phase) -> Self {
        self.with(|s| s.sticky_phase = Some(phase));
        self
    }

    pub fn levels<I: IntoIterator<Item = u32>>(self, levels: I) -> Self {
        self.with(|s| s.levels.extend(levels.into_iter().map(Some)));
        self
    }

    pub fn level_failures(self, count: usize) -> Self {
        self.with(|s| s.levels.extend(std::iter::repeat(None).take(count)));
        self
    }

    pub fn lobby_queue(self, queue_id: i64) -> Self {
        self.with(|s| {
            s.lobby = Some(Lobby {
                game_config: GameConfig { queue_id },
            })
        });
        self
    }

    pub fn dodge_penalty(self, seconds: f64) -> Self {
        self.with(|s| {
            s.search = Some(MatchmakingSearch {
                errors: vec![SearchError {
                    penalty_time_remaining: seconds,
                }],
            })
        });
        self
    }

    pub fn no_dodge(self) -> Self {
        self.with(|s| s.search = Some(MatchmakingSearch::default()));
        self
    }

    pub fn selections<I: IntoIterator<Item = SelectionSession>>(self, sessions: I) -> Self {
        self.with(|s| s.selections.extend(sessions.into_iter().map(Some)));
        self
    }

    pub fn selection_failure(self) -> Self {
        self.with(|s| s.selections.push_back(None));
        self
    }

    pub fn fallback_pool(self, ids: Vec<i64>) -> Self {
        self.with(|s| s.fallback_pool = Some(ids));
        self
    }

    pub fn reconnect_acks<I: IntoIterator<Item = ReconnectAck>>(self, acks: I) -> Self {
        self.with(|s| s.reconnect_acks.extend(acks));
        self
    }

    pub fn honor_ballot(self, ballot: HonorBallot) -> Self {
        self.with(|s| s.honor_ballots.push_back(Some(ballot)));
        self
    }

    pub fn honor_failures(self, count: usize) -> Self {
        self.with(|s| s.honor_ballots.extend(std::iter::repeat(None).take(count)));
        self
    }

    pub fn conversations(self, conversations: Vec<Conversation>) -> Self {
        self.with(|s| s.conversations = Some(conversations));
        self
    }

    pub fn fail_chat_post(self) -> Self {
        self.with(|s| s.fail_chat_post = true);
        self
    }

    pub fn fail_complete_action(self) -> Self {
        self.with(|s| s.fail_complete_action = true);
        self
    }

    pub fn patcher_states<I: IntoIterator<Item = PatcherState>>(self, states: I) -> Self {
        self.with(|s| s.patcher.extend(states.into_iter().map(Some)));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.with(|s| s.calls.clone())
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.with(|s| s.calls.iter().filter(|c| pred(c)).count())
    }

    /// Commands only, in issue order (reads filtered out).
    pub fn commands(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| {
                matches!(
                    c,
                    Call::CreateLobby(_)
                        | Call::StartSearch
                        | Call::AcceptReadyCheck
                        | Call::SubmitOption { .. }
                        | Call::CompleteAction { .. }
                        | Call::Reconnect
                        | Call::PlayAgain
                        | Call::SubmitHonor(_)
                        | Call::PostChat { .. }
                )
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.with(|s| s.calls.push(call));
    }
}

#[async_trait]
impl GameFlowService for ScriptedService {
    async fn get_phase(&self) -> Result<Phase, ServiceError> {
        self.with(|s| {
            s.calls.push(Call::GetPhase);
            match s.phases.pop_front() {
                Some(Some(phase)) => Ok(phase),
                Some(None) => Err(unavailable("phase")),
                None => s.sticky_phase.clone().ok_or_else(|| unavailable("phase")),
            }
        })
    }

    async fn create_lobby(&self, queue_id: i64) -> Result<(), ServiceError> {
        self.with(|s| {
            s.calls.push(Call::CreateLobby(queue_id));
            s.lobby = Some(Lobby {
                game_config: GameConfig { queue_id },
            });
        });
        Ok(())
    }

    async fn get_lobby(&self) -> Result<Lobby, ServiceError> {
        self.with(|s| {
            s.calls.push(Call::GetLobby);
            s.lobby.clone().ok_or_else(|| unavailable("lobby"))
        })
    }

    async fn start_matchmaking_search(&self) -> Result<(), ServiceError> {
        self.record(Call::StartSearch);
        Ok(())
    }

    async fn get_matchmaking_search_state(&self) -> Result<MatchmakingSearch, ServiceError> {
        self.with(|s| {
            s.calls.push(Call::GetSearch);
            s.search.clone().ok_or_else(|| unavailable("search"))
        })
    }

    async fn accept_ready_check(&self) -> Result<(), ServiceError> {
        self.record(Call::AcceptReadyCheck);
        Ok(())
    }

    async fn get_selection_session(&self) -> Result<SelectionSession, ServiceError> {
        self.with(|s| {
            s.calls.push(Call::GetSelection);
            s.selections
                .pop_front()
                .flatten()
                .ok_or_else(|| unavailable("selection"))
        })
    }

    async fn get_fallback_option_pool(&self) -> Result<Vec<i64>, ServiceError> {
        self.with(|s| {
            s.calls.push(Call::GetFallbackPool);
            s.fallback_pool.clone().ok_or_else(|| unavailable("pool"))
        })
    }

    async fn submit_selection_option(&self, action_id: i64, option_id: i64) -> Result<(), ServiceError> {
        self.record(Call::SubmitOption {
            action_id,
            option_id,
        });
        Ok(())
    }

    async fn complete_selection_action(
        &self,
        action_id: i64,
        option_id: i64,
    ) -> Result<(), ServiceError> {
        self.with(|s| {
            s.calls.push(Call::CompleteAction {
                action_id,
                option_id,
            });
            if s.fail_complete_action {
                Err(unavailable("complete"))
            } else {
                Ok(())
            }
        })
    }

    async fn reconnect(&self) -> Result<ReconnectAck, ServiceError> {
        self.with(|s| {
            s.calls.push(Call::Reconnect);
            Ok(s
                .reconnect_acks
                .pop_front()
                .unwrap_or(ReconnectAck::Rejected { status: 500 }))
        })
    }

    async fn get_account_progress(&self) -> Result<AccountProgress, ServiceError> {
        self.with(|s| {
            s.calls.push(Call::GetAccountProgress);
            match s.levels.pop_front() {
                Some(Some(level)) => {
                    s.last_level = Some(level);
                    Ok(AccountProgress { level })
                }
                Some(None) => Err(unavailable("progress")),
                None => s
                    .last_level
                    .map(|level| AccountProgress { level })
                    .ok_or_else(|| unavailable("progress")),
            }
        })
    }

    async fn post_play_again(&self) -> Result<(), ServiceError> {
        self.record(Call::PlayAgain);
        Ok(())
    }

    async fn get_honor_ballot(&self) -> Result<HonorBallot, ServiceError> {
        self.with(|s| {
            s.calls.push(Call::GetHonorBallot);
            s.honor_ballots
                .pop_front()
                .flatten()
                .ok_or_else(|| unavailable("ballot"))
        })
    }

    async fn submit_honor(&self, target_id: i64) -> Result<(), ServiceError> {
        self.record(Call::SubmitHonor(target_id));
        Ok(())
    }

    async fn get_conversations(&self) -> Result<Vec<Conversation>, ServiceError> {
        self.with(|s| {
            s.calls.push(Call::GetConversations);
            s.conversations.clone().ok_or_else(|| unavailable("conversations"))
        })
    }

    async fn post_chat_message(&self, conversation_id: &str, body: &str) -> Result<(), ServiceError> {
        self.with(|s| {
            s.calls.push(Call::PostChat {
                conversation_id: conversation_id.to_string(),
                body: body.to_string(),
            });
            if s.fail_chat_post {
                Err(unavailable("chat"))
            } else {
                Ok(())
            }
        })
    }

    async fn get_patcher_state(&self) -> Result<PatcherState, ServiceError> {
        self.with(|s| {
            s.calls.push(Call::GetPatcherState);
            s.patcher
                .pop_front()
                .flatten()
                .ok_or_else(|| unavailable("patcher"))
        })
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn action(action_id: i64, actor_id: i64, option: i64, completed: bool) -> SelectionAction {
    SelectionAction {
        action_id,
        actor_id,
        target_option_id: Some(option),
        completed,
    }
}

/// Selection session whose first action group is `actions`.
pub fn selection(local_actor_id: i64, actions: Vec<SelectionAction>) -> SelectionSession {
    SelectionSession {
        timer: SelectionTimer {
            phase: "BAN_PICK".into(),
            adjusted_time_left_in_phase: 30_000.0,
        },
        actions: vec![actions],
        local_actor_id,
    }
}

pub fn candidate(id: i64, name: &str) -> HonorCandidate {
    HonorCandidate {
        id,
        display_name: name.into(),
        champion_name: "Annie".into(),
    }
}

pub fn selection_channel(id: &str) -> Conversation {
    Conversation {
        id: id.into(),
        game_name: String::new(),
        game_tag: String::new(),
        kind: "championSelect".into(),
    }
}

pub fn direct_message(id: &str) -> Conversation {
    Conversation {
        id: id.into(),
        game_name: "Friend".into(),
        game_tag: "EUW".into(),
        kind: "chat".into(),
    }
}

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// Returns indices from a fixed sequence, cycling.
pub struct FixedRandom {
    sequence: Vec<usize>,
    next: Mutex<usize>,
}

impl FixedRandom {
    pub fn new(sequence: Vec<usize>) -> Self {
        Self {
            sequence,
            next: Mutex::new(0),
        }
    }
}

impl RandomSource for FixedRandom {
    fn pick_index(&self, len: usize) -> usize {
        let mut next = self.next.lock().unwrap();
        let value = self.sequence.get(*next % self.sequence.len().max(1)).copied().unwrap_or(0);
        *next += 1;
        value % len
    }
}

pub struct FixedDialogue(pub Option<String>);

impl DialogueSource for FixedDialogue {
    fn random_line(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Game collaborator that returns immediately and counts calls.
#[derive(Default)]
pub struct InstantGame {
    pub plays: Mutex<u32>,
}

#[async_trait]
impl GameSession for InstantGame {
    async fn play(&self, _service: &dyn GameFlowService, _pacer: &Pacer) -> Result<(), FlowError> {
        *self.plays.lock().unwrap() += 1;
        Ok(())
    }
}

/// UI that records clicks and optionally fails every one of them.
#[derive(Default)]
pub struct RecordingUi {
    pub fail: bool,
    pub clicks: Mutex<Vec<UiTarget>>,
}

impl RecordingUi {
    pub fn failing() -> Self {
        Self {
            fail: true,
            clicks: Mutex::new(Vec::new()),
        }
    }

    pub fn click_count(&self) -> usize {
        self.clicks.lock().unwrap().len()
    }
}

#[async_trait]
impl UiAutomation for RecordingUi {
    async fn click(
        &self,
        target: UiTarget,
        window_name: &str,
        _timeout: Duration,
    ) -> Result<(), CollaboratorError> {
        self.clicks.lock().unwrap().push(target);
        if self.fail {
            Err(CollaboratorError::WindowNotFound {
                window: window_name.to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[derive(Default)]
pub struct RecordingLauncher {
    pub fail_launch: bool,
    pub launched: Mutex<Vec<String>>,
    pub terminated: Mutex<Vec<u64>>,
}

impl RecordingLauncher {
    pub fn launches(&self) -> usize {
        self.launched.lock().unwrap().len()
    }

    pub fn terminations(&self) -> usize {
        self.terminated.lock().unwrap().len()
    }
}

#[async_trait]
impl Launcher for RecordingLauncher {
    async fn launch(&self, credentials: &Credentials) -> Result<SessionHandle, CollaboratorError> {
        if self.fail_launch {
            return Err(CollaboratorError::Process {
                reason: "scripted launch failure".into(),
            });
        }
        let mut launched = self.launched.lock().unwrap();
        launched.push(credentials.username.clone());
        Ok(SessionHandle {
            id: launched.len() as u64,
            account_id: credentials.username.clone(),
        })
    }

    async fn terminate(&self, handle: SessionHandle) -> Result<(), CollaboratorError> {
        self.terminated.lock().unwrap().push(handle.id);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingCompletions {
    pub done: Mutex<Vec<String>>,
}

#[async_trait]
impl CompletionStore for RecordingCompletions {
    async fn mark_done(&self, account_id: &str) -> Result<(), CollaboratorError> {
        self.done.lock().unwrap().push(account_id.to_string());
        Ok(())
    }
}

pub struct ListAccounts {
    pending: Mutex<VecDeque<Credentials>>,
}

impl ListAccounts {
    pub fn new(names: &[&str]) -> Self {
        Self {
            pending: Mutex::new(names.iter().map(|n| Credentials::new(*n, "pw")).collect()),
        }
    }
}

#[async_trait]
impl AccountSource for ListAccounts {
    async fn next_account(&self) -> Option<Credentials> {
        self.pending.lock().unwrap().pop_front()
    }
}

pub fn collaborators(
    random: Arc<dyn RandomSource>,
    dialogue: Option<&str>,
    ui: Arc<dyn UiAutomation>,
) -> SessionCollaborators {
    SessionCollaborators {
        game: Arc::new(InstantGame::default()),
        ui,
        dialogue: Arc::new(FixedDialogue(dialogue.map(str::to_string))),
        random,
    }
}

pub fn default_collaborators() -> SessionCollaborators {
    collaborators(
        Arc::new(FixedRandom::new(vec![0])),
        Some("mid"),
        Arc::new(RecordingUi::default()),
    )
}

// ---------------------------------------------------------------------------
// Handler harness
// ---------------------------------------------------------------------------

/// Owns everything a `PhaseContext` borrows.
pub struct Harness {
    pub config: DriverConfig,
    pub pacer: Pacer,
    pub collaborators: SessionCollaborators,
    pub poller: PhasePoller,
    pub state: SessionState,
}

impl Harness {
    pub fn new(config: DriverConfig) -> Self {
        Self::with_collaborators(config, default_collaborators())
    }

    pub fn with_collaborators(config: DriverConfig, collaborators: SessionCollaborators) -> Self {
        let poller = PhasePoller::new(&config.budgets, &config.timings);
        let state = SessionState::new(config.queue_id);
        Self {
            config,
            pacer: Pacer::detached(),
            collaborators,
            poller,
            state,
        }
    }

    pub fn ctx<'a>(&'a mut self, service: &'a ScriptedService) -> PhaseContext<'a> {
        PhaseContext {
            service,
            config: &self.config,
            pacer: &self.pacer,
            collaborators: &self.collaborators,
            poller: &mut self.poller,
            state: &mut self.state,
        }
    }
}
