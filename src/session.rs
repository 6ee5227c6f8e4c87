use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::models::{AuthChange, Session, User};
use crate::store::AuthProvider;

/// What views see of authentication.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub session: Option<Session>,
    /// True until the initial session lookup has finished.
    pub loading: bool,
}

impl SessionState {
    pub fn user(&self) -> Option<&User> {
        self.session.as_ref().map(|s| &s.user)
    }
}

/// Cheap read handle handed to views and handlers.
#[derive(Debug, Clone)]
pub struct SessionContext {
    rx: watch::Receiver<SessionState>,
}

impl SessionContext {
    pub fn state(&self) -> SessionState {
        self.rx.borrow().clone()
    }

    pub fn user(&self) -> Option<User> {
        self.rx.borrow().user().cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.rx.borrow().loading
    }

    /// Resolves once the initial lookup is done, returning the state at that point.
    pub async fn wait_ready(&mut self) -> SessionState {
        let ready = self
            .rx
            .wait_for(|state| !state.loading)
            .await
            .map(|state| state.clone());
        ready.unwrap_or_else(|_| self.state())
    }

    /// Waits for the next change pushed by the manager.
    pub async fn changed(&mut self) -> Option<SessionState> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}

/// Owns the subscription to provider session changes for the app's lifetime.
pub struct SessionManager {
    tx: Arc<watch::Sender<SessionState>>,
    listener: JoinHandle<()>,
}

impl SessionManager {
    pub fn start(provider: Arc<dyn AuthProvider>) -> Self {
        let (tx, _) = watch::channel(SessionState {
            session: None,
            loading: true,
        });
        let tx = Arc::new(tx);

        // Subscribe before the lookup so a change racing with it is not lost.
        let events = provider.subscribe();
        let listener = tokio::spawn(Self::run(provider, events, Arc::clone(&tx)));

        Self { tx, listener }
    }

    async fn run(
        provider: Arc<dyn AuthProvider>,
        mut events: broadcast::Receiver<AuthChange>,
        tx: Arc<watch::Sender<SessionState>>,
    ) {
        let session = match provider.get_session().await {
            Ok(session) => {
                debug!("current session: {:?}", session.as_ref().map(|s| &s.user.id));
                session
            }
            Err(err) => {
                error!("error getting session: {}", err);
                None
            }
        };
        tx.send_replace(SessionState {
            session,
            loading: false,
        });

        loop {
            match events.recv().await {
                Ok(change) => {
                    info!("auth state changed: {:?}", change.event);
                    tx.send_modify(|state| state.session = change.session);
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("missed {} auth events, re-reading session", skipped);
                    match provider.get_session().await {
                        Ok(session) => tx.send_modify(|state| state.session = session),
                        Err(err) => error!("error getting session: {}", err),
                    }
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    pub fn context(&self) -> SessionContext {
        SessionContext {
            rx: self.tx.subscribe(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.tx.borrow().clone()
    }

    /// Stops listening for provider changes.
    pub fn shutdown(self) {
        self.listener.abort();
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.listener.abort();
    }
}
