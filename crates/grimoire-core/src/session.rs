//! Session object and the async actor that serialises all mutations.
//!
//! [`HudSession`] couples one [`DisplayController`] with a host provider and
//! the active settings. Every mutation recomputes immediately and returns
//! the new view model, so callers never observe a stale view in the same
//! turn.
//!
//! [`spawn_session`] moves a session onto a tokio task. Callers talk to it
//! through a cloneable [`HudHandle`]; commands arrive on one `mpsc`
//! mailbox, view models leave on a `watch` channel. Flash expiry runs as a
//! spawned sleep that posts back into the same mailbox, and replacing or
//! cancelling the flash aborts that sleep.

use std::time::Duration;

use grimoire_types::{FlashId, FlashTicket, RecomputeReason, ViewModel};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::HudSettings;
use crate::controller::{ControllerError, DisplayController};
use crate::host::HostProvider;

/// Mailbox depth for the session actor.
const MAILBOX_CAPACITY: usize = 64;

/// Errors returned by [`HudHandle`] calls.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The session task has stopped.
    #[error("HUD session is closed")]
    Closed,

    /// The controller rejected the request.
    #[error("controller error: {source}")]
    Controller {
        /// The underlying controller error.
        #[from]
        source: ControllerError,
    },
}

/// One viewer's overlay state together with its inputs.
#[derive(Debug)]
pub struct HudSession<H> {
    controller: DisplayController,
    host: H,
    settings: HudSettings,
    enabled: bool,
    current: Option<ViewModel>,
}

impl<H: HostProvider> HudSession<H> {
    /// Create a session. Nothing is computed until the first refresh.
    pub fn new(host: H, settings: HudSettings) -> Self {
        let enabled = settings.display.enabled;
        Self {
            controller: DisplayController::new(),
            host,
            settings,
            enabled,
            current: None,
        }
    }

    /// The last published view model. `None` while disabled.
    pub const fn current(&self) -> Option<&ViewModel> {
        self.current.as_ref()
    }

    /// The display controller.
    pub const fn controller(&self) -> &DisplayController {
        &self.controller
    }

    /// Active settings.
    pub const fn settings(&self) -> &HudSettings {
        &self.settings
    }

    /// Whether the overlay is switched on.
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The host provider.
    pub const fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the host provider. Call [`refresh`](Self::refresh)
    /// afterwards to publish the change.
    pub const fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Recompute the view model.
    pub fn refresh(&mut self, reason: RecomputeReason) -> Option<ViewModel> {
        if !self.enabled {
            debug!(?reason, "overlay disabled, skipping recompute");
            self.current = None;
            return None;
        }
        let view = self
            .controller
            .request_recompute(&self.host, &self.settings);
        debug!(?reason, minified = view.is_minified, "view model recomputed");
        self.current = Some(view);
        self.current.clone()
    }

    /// Set or clear an override and recompute.
    pub fn set_override(
        &mut self,
        key: &str,
        value: Option<String>,
    ) -> Result<Option<ViewModel>, ControllerError> {
        self.controller.set_override(key, value)?;
        Ok(self.refresh(RecomputeReason::Override))
    }

    /// Flash a message on the date line and recompute.
    pub fn flash_message(
        &mut self,
        text: impl Into<String>,
        duration: Duration,
    ) -> (FlashTicket, Option<ViewModel>) {
        let ticket = self.controller.flash_message(text, duration);
        (ticket, self.refresh(RecomputeReason::Flash))
    }

    /// The configured flash duration.
    pub const fn flash_duration(&self) -> Duration {
        Duration::from_millis(self.settings.display.flash_duration_ms)
    }

    /// Clear flash `id` if it is still pending. Recomputes only when the
    /// flash was cleared.
    pub fn expire_flash(&mut self, id: FlashId) -> bool {
        let expired = self.controller.expire_flash(id);
        if expired {
            self.refresh(RecomputeReason::Flash);
        }
        expired
    }

    /// Disarm flash `id`, keeping its text on screen.
    pub fn cancel_flash(&mut self, id: FlashId) -> bool {
        self.controller.cancel_flash(id)
    }

    /// Collapse or expand the overlay and recompute.
    pub fn toggle_minified(&mut self) -> Option<ViewModel> {
        let minified = self.controller.toggle_minified();
        debug!(minified, "minified toggled");
        self.refresh(RecomputeReason::Minify)
    }

    /// Swap in new settings and recompute. The master switch follows the
    /// new settings.
    pub fn replace_settings(&mut self, settings: HudSettings) -> Option<ViewModel> {
        self.enabled = settings.display.enabled;
        self.settings = settings;
        self.refresh(RecomputeReason::Settings)
    }

    /// Turn the overlay on or off.
    pub fn set_enabled(&mut self, enabled: bool) -> Option<ViewModel> {
        self.enabled = enabled;
        self.refresh(RecomputeReason::Settings)
    }
}

/// Messages handled by the session actor.
enum HudCommand {
    Refresh {
        reason: RecomputeReason,
        reply: oneshot::Sender<Option<ViewModel>>,
    },
    SetOverride {
        key: String,
        value: Option<String>,
        reply: oneshot::Sender<Result<Option<ViewModel>, ControllerError>>,
    },
    Flash {
        text: String,
        duration: Option<Duration>,
        reply: oneshot::Sender<FlashTicket>,
    },
    ExpireFlash {
        id: FlashId,
    },
    CancelFlash {
        id: FlashId,
        reply: oneshot::Sender<bool>,
    },
    ToggleMinified {
        reply: oneshot::Sender<Option<ViewModel>>,
    },
    ReplaceSettings {
        settings: Box<HudSettings>,
        reply: oneshot::Sender<Option<ViewModel>>,
    },
    SetEnabled {
        enabled: bool,
        reply: oneshot::Sender<Option<ViewModel>>,
    },
    Shutdown,
}

/// Cloneable control surface for a running session.
#[derive(Debug, Clone)]
pub struct HudHandle {
    commands: mpsc::Sender<HudCommand>,
    views: watch::Receiver<Option<ViewModel>>,
}

impl core::fmt::Debug for HudCommand {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Refresh { .. } => "Refresh",
            Self::SetOverride { .. } => "SetOverride",
            Self::Flash { .. } => "Flash",
            Self::ExpireFlash { .. } => "ExpireFlash",
            Self::CancelFlash { .. } => "CancelFlash",
            Self::ToggleMinified { .. } => "ToggleMinified",
            Self::ReplaceSettings { .. } => "ReplaceSettings",
            Self::SetEnabled { .. } => "SetEnabled",
            Self::Shutdown => "Shutdown",
        };
        f.write_str(name)
    }
}

impl HudHandle {
    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> HudCommand,
    ) -> Result<T, SessionError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .await
            .map_err(|_closed| SessionError::Closed)?;
        response.await.map_err(|_closed| SessionError::Closed)
    }

    /// Recompute with the given reason.
    pub async fn refresh(&self, reason: RecomputeReason) -> Result<Option<ViewModel>, SessionError> {
        self.request(|reply| HudCommand::Refresh { reason, reply })
            .await
    }

    /// Set (`Some`) or clear (`None`) the override for `key`.
    pub async fn set_override(
        &self,
        key: impl Into<String>,
        value: Option<String>,
    ) -> Result<Option<ViewModel>, SessionError> {
        let key = key.into();
        let result = self
            .request(|reply| HudCommand::SetOverride { key, value, reply })
            .await?;
        Ok(result?)
    }

    /// Flash `text` for the configured duration.
    pub async fn flash_message(&self, text: impl Into<String>) -> Result<FlashTicket, SessionError> {
        let text = text.into();
        self.request(|reply| HudCommand::Flash {
            text,
            duration: None,
            reply,
        })
        .await
    }

    /// Flash `text` for `duration`.
    pub async fn flash_message_for(
        &self,
        text: impl Into<String>,
        duration: Duration,
    ) -> Result<FlashTicket, SessionError> {
        let text = text.into();
        self.request(|reply| HudCommand::Flash {
            text,
            duration: Some(duration),
            reply,
        })
        .await
    }

    /// Cancel the expiry of flash `id`, leaving its text pinned.
    pub async fn cancel_flash(&self, id: FlashId) -> Result<bool, SessionError> {
        self.request(|reply| HudCommand::CancelFlash { id, reply })
            .await
    }

    /// Collapse or expand the overlay.
    pub async fn toggle_minified(&self) -> Result<Option<ViewModel>, SessionError> {
        self.request(|reply| HudCommand::ToggleMinified { reply })
            .await
    }

    /// Swap in new settings.
    pub async fn replace_settings(
        &self,
        settings: HudSettings,
    ) -> Result<Option<ViewModel>, SessionError> {
        let settings = Box::new(settings);
        self.request(|reply| HudCommand::ReplaceSettings { settings, reply })
            .await
    }

    /// Turn the overlay on or off.
    pub async fn set_enabled(&self, enabled: bool) -> Result<Option<ViewModel>, SessionError> {
        self.request(|reply| HudCommand::SetEnabled { enabled, reply })
            .await
    }

    /// Watch published view models. `None` means the overlay is off.
    pub fn subscribe(&self) -> watch::Receiver<Option<ViewModel>> {
        self.views.clone()
    }

    /// The most recently published view model.
    pub fn current(&self) -> Option<ViewModel> {
        self.views.borrow().clone()
    }

    /// Stop the session task. Pending flash timers are aborted.
    pub async fn shutdown(&self) -> Result<(), SessionError> {
        self.commands
            .send(HudCommand::Shutdown)
            .await
            .map_err(|_closed| SessionError::Closed)
    }
}

/// Run `session` on a new tokio task.
///
/// The initial view is computed before this returns. The task ends when
/// [`HudHandle::shutdown`] is called or every handle is dropped, and hands
/// the session back through the [`JoinHandle`].
pub fn spawn_session<H>(mut session: HudSession<H>) -> (HudHandle, JoinHandle<HudSession<H>>)
where
    H: HostProvider + Send + 'static,
{
    let initial = session.refresh(RecomputeReason::Manual);
    let (commands, mailbox) = mpsc::channel(MAILBOX_CAPACITY);
    let (views_tx, views) = watch::channel(initial);
    let timers = commands.downgrade();

    let task = tokio::spawn(run_session(session, mailbox, timers, views_tx));
    info!("HUD session started");
    (HudHandle { commands, views }, task)
}

async fn run_session<H: HostProvider>(
    mut session: HudSession<H>,
    mut mailbox: mpsc::Receiver<HudCommand>,
    timers: mpsc::WeakSender<HudCommand>,
    views: watch::Sender<Option<ViewModel>>,
) -> HudSession<H> {
    let mut flash_timer: Option<JoinHandle<()>> = None;

    while let Some(command) = mailbox.recv().await {
        debug!(?command, "session command");
        match command {
            HudCommand::Refresh { reason, reply } => {
                let view = session.refresh(reason);
                publish(&views, view.clone());
                let _ = reply.send(view);
            }
            HudCommand::SetOverride { key, value, reply } => {
                let result = session.set_override(&key, value);
                if let Ok(view) = &result {
                    publish(&views, view.clone());
                    if session.controller().pending_flash().is_none() {
                        abort_timer(&mut flash_timer);
                    }
                }
                let _ = reply.send(result);
            }
            HudCommand::Flash {
                text,
                duration,
                reply,
            } => {
                let duration = duration.unwrap_or_else(|| session.flash_duration());
                let (ticket, view) = session.flash_message(text, duration);
                publish(&views, view);
                abort_timer(&mut flash_timer);
                flash_timer = Some(arm_flash_timer(timers.clone(), ticket.id, duration));
                let _ = reply.send(ticket);
            }
            HudCommand::ExpireFlash { id } => {
                if session.expire_flash(id) {
                    flash_timer = None;
                    publish(&views, session.current().cloned());
                }
            }
            HudCommand::CancelFlash { id, reply } => {
                let cancelled = session.cancel_flash(id);
                if cancelled {
                    abort_timer(&mut flash_timer);
                }
                let _ = reply.send(cancelled);
            }
            HudCommand::ToggleMinified { reply } => {
                let view = session.toggle_minified();
                publish(&views, view.clone());
                let _ = reply.send(view);
            }
            HudCommand::ReplaceSettings { settings, reply } => {
                let view = session.replace_settings(*settings);
                publish(&views, view.clone());
                let _ = reply.send(view);
            }
            HudCommand::SetEnabled { enabled, reply } => {
                let view = session.set_enabled(enabled);
                publish(&views, view.clone());
                let _ = reply.send(view);
            }
            HudCommand::Shutdown => break,
        }
    }

    abort_timer(&mut flash_timer);
    info!("HUD session stopped");
    session
}

fn arm_flash_timer(
    timers: mpsc::WeakSender<HudCommand>,
    id: FlashId,
    duration: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(duration).await;
        if let Some(commands) = timers.upgrade() {
            let _ = commands.send(HudCommand::ExpireFlash { id }).await;
        }
    })
}

fn abort_timer(timer: &mut Option<JoinHandle<()>>) {
    if let Some(handle) = timer.take() {
        handle.abort();
    }
}

fn publish(views: &watch::Sender<Option<ViewModel>>, next: Option<ViewModel>) {
    views.send_if_modified(|current| {
        if *current == next {
            false
        } else {
            *current = next;
            true
        }
    });
}
