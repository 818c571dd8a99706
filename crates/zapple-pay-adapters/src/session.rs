//! Timer-driven wallet authorization session.
//!
//! A ticker task polls the status endpoint every `poll_interval`. Each tick
//! spawns its own poll so a slow response never delays the next tick; the
//! reconciler in `zapple_pay_core::session` decides which responses count.
//! Tearing down (or dropping) the session aborts the ticker and every
//! in-flight poll. Each teardown also bumps an epoch; a creation that was
//! still in flight when the epoch moved is discarded instead of polled.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use zapple_pay_core::{
    check_authorization, request_authorization, AuthToken, AuthorizationParams,
    AuthorizationRequest, AuthorizationSession, CreationError, PollOutcome, PollTicket,
    SessionEvent, SessionState, WalletAuthPort,
};

use crate::config::ZappleConfig;

fn lock_or_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!("session mutex was poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

#[derive(Default)]
struct Tasks {
    ticker: Option<JoinHandle<()>>,
    polls: Vec<JoinHandle<()>>,
}

pub struct WalletAuthSession<W: WalletAuthPort + 'static> {
    port: Arc<W>,
    core: Arc<Mutex<AuthorizationSession>>,
    token_tx: Arc<watch::Sender<Option<AuthToken>>>,
    // Bumped under the tasks lock by every teardown.
    epoch_tx: watch::Sender<u64>,
    tasks: Arc<Mutex<Tasks>>,
    poll_interval: Duration,
}

impl<W: WalletAuthPort + 'static> WalletAuthSession<W> {
    pub fn new(port: W, cfg: &ZappleConfig) -> Self {
        let (token_tx, _) = watch::channel(None);
        let (epoch_tx, _) = watch::channel(0);
        Self {
            port: Arc::new(port),
            core: Arc::new(Mutex::new(AuthorizationSession::new(cfg.poll_ordering))),
            token_tx: Arc::new(token_tx),
            epoch_tx,
            tasks: Arc::new(Mutex::new(Tasks::default())),
            poll_interval: cfg.poll_interval(),
        }
    }

    pub fn port(&self) -> &W {
        &self.port
    }

    pub fn state(&self) -> SessionState {
        lock_or_recover(&self.core).state()
    }

    pub fn request(&self) -> Option<AuthorizationRequest> {
        lock_or_recover(&self.core).request().cloned()
    }

    pub fn token(&self) -> Option<AuthToken> {
        self.token_tx.borrow().clone()
    }

    /// Receives `Some(token)` on approval and `None` when it is withdrawn.
    pub fn subscribe(&self) -> watch::Receiver<Option<AuthToken>> {
        self.token_tx.subscribe()
    }

    /// Resolves with the current token or the next one published.
    ///
    /// Returns `None` if the session is torn down (or restarted) first.
    pub async fn wait_for_token(&self) -> Option<AuthToken> {
        let mut token_rx = self.subscribe();
        let mut epoch_rx = self.epoch_tx.subscribe();
        tokio::select! {
            token = token_rx.wait_for(Option::is_some) => token.ok().and_then(|t| t.clone()),
            _ = epoch_rx.changed() => None,
        }
    }

    /// Creates an authorization for `params` and starts polling it.
    ///
    /// Any earlier request is torn down first. On failure the session stays idle.
    ///
    /// A teardown or another `start` while the service is still answering
    /// cancels this one: the created request is dropped unpolled and
    /// [`CreationError::Cancelled`] is returned.
    pub async fn start(
        &self,
        params: AuthorizationParams,
    ) -> Result<AuthorizationRequest, CreationError> {
        self.teardown();
        let epoch = *self.epoch_tx.borrow();
        let request = request_authorization(self.port.as_ref(), &params).await?;

        let mut tasks = lock_or_recover(&self.tasks);
        if *self.epoch_tx.borrow() != epoch {
            info!(id = %request.id, "wallet authorization cancelled while being created");
            return Err(CreationError::Cancelled);
        }
        {
            let mut core = lock_or_recover(&self.core);
            if let Err(e) = core.begin(request.clone()) {
                warn!(id = %request.id, "cannot begin wallet authorization: {e}");
                return Err(CreationError::Cancelled);
            }
            debug!(id = %request.id, ordering = ?core.ordering(), "polling wallet authorization");
        }

        tasks.ticker = Some(tokio::spawn(run_ticker(
            Arc::clone(&self.port),
            Arc::clone(&self.core),
            Arc::clone(&self.token_tx),
            Arc::clone(&self.tasks),
            self.poll_interval,
        )));
        Ok(request)
    }

    /// Stops polling and forgets the request. Safe to call repeatedly.
    pub fn teardown(&self) {
        let mut tasks = lock_or_recover(&self.tasks);
        self.epoch_tx.send_modify(|epoch| *epoch += 1);
        {
            let mut core = lock_or_recover(&self.core);
            let was = core.state();
            if let Err(e) = core.teardown() {
                warn!("wallet authorization teardown: {e}");
            }
            if was != SessionState::Idle {
                info!("wallet authorization session torn down");
            }
            self.token_tx.send_if_modified(|token| token.take().is_some());
        }
        if let Some(ticker) = tasks.ticker.take() {
            ticker.abort();
        }
        for poll in tasks.polls.drain(..) {
            poll.abort();
        }
    }
}

impl<W: WalletAuthPort + 'static> Drop for WalletAuthSession<W> {
    fn drop(&mut self) {
        self.teardown();
    }
}

async fn run_ticker<W: WalletAuthPort + 'static>(
    port: Arc<W>,
    core: Arc<Mutex<AuthorizationSession>>,
    token_tx: Arc<watch::Sender<Option<AuthToken>>>,
    tasks: Arc<Mutex<Tasks>>,
    period: Duration,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        // Lock order matches teardown: tasks, then core.
        let mut running = lock_or_recover(&tasks);
        let Some(ticket) = lock_or_recover(&core).issue_poll() else {
            debug!("no authorization held, ticker exiting");
            break;
        };
        debug!(sequence = ticket.sequence, id = %ticket.request_id, "polling wallet authorization");
        running.polls.retain(|poll| !poll.is_finished());
        running.polls.push(tokio::spawn(poll_once(
            Arc::clone(&port),
            Arc::clone(&core),
            Arc::clone(&token_tx),
            ticket,
        )));
    }
}

async fn poll_once<W: WalletAuthPort + 'static>(
    port: Arc<W>,
    core: Arc<Mutex<AuthorizationSession>>,
    token_tx: Arc<watch::Sender<Option<AuthToken>>>,
    ticket: PollTicket,
) {
    let status = check_authorization(port.as_ref(), &ticket.request_id).await;

    // Publish under the core lock so the channel never disagrees with the state.
    let mut core = lock_or_recover(&core);
    match core.apply_poll(&ticket, status) {
        Ok(PollOutcome::Applied {
            event: Some(event), ..
        }) => match event {
            SessionEvent::TokenEmitted(token) => {
                token_tx.send_replace(Some(token));
            }
            SessionEvent::TokenCleared => {
                token_tx.send_replace(None);
            }
        },
        Ok(_) => {}
        Err(e) => warn!(sequence = ticket.sequence, "poll result rejected: {e}"),
    }
}
