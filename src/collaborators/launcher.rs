//! Starts the client as a child process.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::process::{Child, Command};

use super::{Credentials, Launcher, SessionHandle};
use crate::config::LaunchConfig;
use crate::error::CollaboratorError;

pub struct CommandLauncher {
    config: LaunchConfig,
    next_id: AtomicU64,
    children: Mutex<HashMap<u64, Child>>,
}

impl CommandLauncher {
    pub fn new(config: LaunchConfig) -> Self {
        Self {
            config,
            next_id: AtomicU64::new(1),
            children: Mutex::new(HashMap::new()),
        }
    }

    /// Substitute credential placeholders in the configured arguments.
    fn render_args(&self, credentials: &Credentials) -> Vec<String> {
        self.config
            .args
            .iter()
            .map(|arg| {
                arg.replace("{username}", &credentials.username)
                    .replace("{password}", &credentials.password)
            })
            .collect()
    }

    fn take_child(&self, id: u64) -> Option<Child> {
        let mut children = match self.children.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        children.remove(&id)
    }
}

#[async_trait]
impl Launcher for CommandLauncher {
    async fn launch(&self, credentials: &Credentials) -> Result<SessionHandle, CollaboratorError> {
        let child = Command::new(&self.config.program)
            .args(self.render_args(credentials))
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| CollaboratorError::Process {
                reason: format!("failed to spawn {}: {}", self.config.program, e),
            })?;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        {
            let mut children = match self.children.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            children.insert(id, child);
        }

        tracing::info!(
            account_id = credentials.account_id(),
            program = %self.config.program,
            "Client launched"
        );

        Ok(SessionHandle {
            id,
            account_id: credentials.account_id().to_string(),
        })
    }

    async fn terminate(&self, handle: SessionHandle) -> Result<(), CollaboratorError> {
        let Some(mut child) = self.take_child(handle.id) else {
            tracing::debug!(session = handle.id, "No child process to terminate");
            return Ok(());
        };
        match child.kill().await {
            Ok(()) => {
                tracing::info!(session = handle.id, account_id = %handle.account_id, "Client terminated");
                Ok(())
            }
            // Already exited on its own.
            Err(e) if e.kind() == std::io::ErrorKind::InvalidInput => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_args_substitutes_credentials() {
        let launcher = CommandLauncher::new(LaunchConfig {
            program: "launcher".into(),
            args: vec!["--user={username}".into(), "--pass".into(), "{password}".into()],
            startup_wait_secs: 0,
        });
        let args = launcher.render_args(&Credentials::new("smurf", "pw"));
        assert_eq!(args, vec!["--user=smurf", "--pass", "pw"]);
    }

    #[tokio::test]
    async fn test_spawn_failure_is_process_error() {
        let launcher = CommandLauncher::new(LaunchConfig {
            program: "/definitely/not/a/binary".into(),
            args: vec![],
            startup_wait_secs: 0,
        });
        let err = launcher
            .launch(&Credentials::new("smurf", "pw"))
            .await
            .unwrap_err();
        assert!(matches!(err, CollaboratorError::Process { .. }));
    }

    #[tokio::test]
    async fn test_terminate_unknown_handle_is_ok() {
        let launcher = CommandLauncher::new(LaunchConfig::default());
        launcher
            .terminate(SessionHandle {
                id: 42,
                account_id: "smurf".into(),
            })
            .await
            .unwrap();
    }
}
