//! Stdio loop: apply commands to the shared host and session, write views.
//!
//! Host-state commands mutate the [`SharedHost`] and then post a tagged
//! refresh, the same way the overlay reacts to host hooks. Control commands
//! go straight to the [`HudHandle`]. A separate task writes every published
//! view model to the output stream.

use std::time::Duration;

use grimoire_core::host::{CombatSnapshot, SharedHost, StaticHost};
use grimoire_core::presentation::{TruncationPolicy, present};
use grimoire_core::session::{HudHandle, SessionError};
use grimoire_types::{Combatant, RecomputeReason, ViewModel};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::DriverError;
use crate::protocol::{DriverCommand, OutputFormat};

/// Applies [`DriverCommand`]s to a host and its session.
#[derive(Debug, Clone)]
pub struct Driver {
    host: SharedHost,
    handle: HudHandle,
}

impl Driver {
    /// Create a driver over `host`, which `handle`'s session must read.
    pub const fn new(host: SharedHost, handle: HudHandle) -> Self {
        Self { host, handle }
    }

    /// The session handle.
    #[cfg(test)]
    pub const fn handle(&self) -> &HudHandle {
        &self.handle
    }

    /// Apply one command.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Session`] if the session rejects the command
    /// or has stopped, or [`DriverError::HostPoisoned`] if the host lock is
    /// poisoned.
    pub async fn apply(&self, command: DriverCommand) -> Result<(), DriverError> {
        if let Some(reason) = command.host_reason() {
            self.update_host(command)?;
            self.handle.refresh(reason).await?;
            return Ok(());
        }

        match command {
            DriverCommand::Override { field, value } => {
                self.handle.set_override(field, value).await?;
            }
            DriverCommand::Flash { text, duration_ms } => {
                let ticket = match duration_ms {
                    Some(ms) => {
                        self.handle
                            .flash_message_for(text, Duration::from_millis(ms))
                            .await?
                    }
                    None => self.handle.flash_message(text).await?,
                };
                info!(
                    flash_id = %ticket.id,
                    duration_ms = ticket.duration_ms,
                    expires_at = %ticket.expires_at,
                    "flash shown"
                );
            }
            DriverCommand::CancelFlash { id } => {
                let cancelled = self.handle.cancel_flash(id).await?;
                debug!(flash_id = %id, cancelled, "flash cancel requested");
            }
            DriverCommand::ToggleMinified => {
                self.handle.toggle_minified().await?;
            }
            DriverCommand::SetEnabled { enabled } => {
                self.handle.set_enabled(enabled).await?;
            }
            DriverCommand::Refresh => {
                self.handle.refresh(RecomputeReason::Manual).await?;
            }
            DriverCommand::SetWorldTime { .. }
            | DriverCommand::AdvanceTime { .. }
            | DriverCommand::SetScene { .. }
            | DriverCommand::MoveToken { .. }
            | DriverCommand::SetWeather { .. }
            | DriverCommand::SetDarkness { .. }
            | DriverCommand::SetCombat { .. }
            | DriverCommand::SetMusic { .. } => {}
        }
        Ok(())
    }

    fn update_host(&self, command: DriverCommand) -> Result<(), DriverError> {
        let mut host = self.host.write().map_err(|_poison| DriverError::HostPoisoned)?;
        apply_to_host(&mut host, command);
        Ok(())
    }
}

/// Mutate the host snapshot for a host-state command.
///
/// Scene-level commands create an empty scene when none is active.
fn apply_to_host(host: &mut StaticHost, command: DriverCommand) {
    match command {
        DriverCommand::SetWorldTime { seconds } => host.world_time = seconds,
        DriverCommand::AdvanceTime { seconds } => {
            host.world_time = host.world_time.saturating_add(seconds);
        }
        DriverCommand::SetScene { scene } => host.scene = scene,
        DriverCommand::MoveToken { token } => host.controlled_token = token,
        DriverCommand::SetWeather { weather } => {
            host.scene.get_or_insert_with(Default::default).weather = weather;
        }
        DriverCommand::SetDarkness { darkness } => {
            host.scene.get_or_insert_with(Default::default).darkness = darkness;
        }
        DriverCommand::SetCombat { started, combatant } => {
            host.combat = started.then(|| CombatSnapshot {
                started,
                combatant: combatant.map(|display_name| Combatant { display_name }),
            });
        }
        DriverCommand::SetMusic { track } => host.music = track,
        DriverCommand::Override { .. }
        | DriverCommand::Flash { .. }
        | DriverCommand::CancelFlash { .. }
        | DriverCommand::ToggleMinified
        | DriverCommand::SetEnabled { .. }
        | DriverCommand::Refresh => {}
    }
}

/// Render one published view for output.
///
/// # Errors
///
/// Returns [`DriverError::Json`] if the view cannot be serialized.
pub fn render(
    view: Option<&ViewModel>,
    format: OutputFormat,
    truncate_at: usize,
) -> Result<String, DriverError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(&view)?),
        OutputFormat::Text => {
            let Some(view) = view else {
                return Ok("(overlay disabled)\n".to_owned());
            };
            let policy = TruncationPolicy::for_view(view, truncate_at);
            let mut text = format!("[{}]\n", view.theme.css_class());
            for line in present(view, policy) {
                text.push_str(line.icon);
                text.push(' ');
                text.push_str(&line.text);
                text.push('\n');
            }
            Ok(text)
        }
    }
}

/// Write every published view to `output` until the session stops.
///
/// Returns the writer once the view channel closes.
///
/// # Errors
///
/// Returns [`DriverError::Io`] if writing fails.
pub async fn forward_views<W>(
    mut views: watch::Receiver<Option<ViewModel>>,
    mut output: W,
    format: OutputFormat,
    truncate_at: usize,
) -> Result<W, DriverError>
where
    W: AsyncWrite + Unpin,
{
    loop {
        let rendered = {
            let view = views.borrow_and_update();
            render((*view).as_ref(), format, truncate_at)?
        };
        output.write_all(rendered.as_bytes()).await?;
        output.write_all(b"\n").await?;
        output.flush().await?;

        if views.changed().await.is_err() {
            break;
        }
    }
    Ok(output)
}

/// Read commands from `input` until end of stream.
///
/// Malformed lines and rejected commands are logged and skipped. Only a
/// closed session or a failing reader ends the loop early.
///
/// # Errors
///
/// Returns [`DriverError::Io`] if reading fails, or
/// [`DriverError::Session`] if the session stops.
pub async fn read_commands<R>(driver: &Driver, input: R) -> Result<u64, DriverError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut applied: u64 = 0;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let command = match serde_json::from_str::<DriverCommand>(line) {
            Ok(command) => command,
            Err(e) => {
                warn!(error = %e, line, "skipping malformed command");
                continue;
            }
        };
        match driver.apply(command).await {
            Ok(()) => applied = applied.saturating_add(1),
            Err(DriverError::Session {
                source: SessionError::Closed,
            }) => {
                return Err(SessionError::Closed.into());
            }
            Err(e) => warn!(error = %e, "command rejected"),
        }
    }

    debug!(applied, "input closed");
    Ok(applied)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use grimoire_core::config::HudSettings;
    use grimoire_core::controller::DisplayController;
    use grimoire_core::host::SceneSnapshot;
    use grimoire_core::session::{HudSession, spawn_session};

    use grimoire_types::Theme;

    use super::*;

    fn driver() -> Driver {
        let host = StaticHost::at(0).shared();
        let session = HudSession::new(host.clone(), HudSettings::defaults().unwrap());
        let (handle, _task) = spawn_session(session);
        Driver::new(host, handle)
    }

    #[tokio::test]
    async fn host_commands_update_view() {
        let driver = driver();
        driver
            .apply(DriverCommand::SetScene {
                scene: Some(SceneSnapshot {
                    nav_name: Some("Neverwinter".to_owned()),
                    ..SceneSnapshot::default()
                }),
            })
            .await
            .unwrap();
        driver
            .apply(DriverCommand::AdvanceTime { seconds: 86_400 * 31 })
            .await
            .unwrap();
        driver
            .apply(DriverCommand::SetDarkness { darkness: 0.9 })
            .await
            .unwrap();
        driver
            .apply(DriverCommand::SetMusic {
                track: Some("Battle Hymn".to_owned()),
            })
            .await
            .unwrap();

        let view = driver.handle().current().unwrap();
        assert_eq!(view.location.as_deref(), Some("Neverwinter"));
        assert_eq!(view.date.as_deref(), Some("2 Alturiak, 1492 DR"));
        assert_eq!(view.lighting.as_deref(), Some("Dark"));
        assert_eq!(view.music.as_deref(), Some("Battle Hymn"));
    }

    #[tokio::test]
    async fn combat_and_override_precedence() {
        let driver = driver();
        driver
            .apply(DriverCommand::SetCombat {
                started: true,
                combatant: Some("Bruenor".to_owned()),
            })
            .await
            .unwrap();
        assert_eq!(
            driver.handle().current().unwrap().date.as_deref(),
            Some("Turn: Bruenor")
        );

        driver
            .apply(DriverCommand::Override {
                field: "date".to_owned(),
                value: Some("Midwinter".to_owned()),
            })
            .await
            .unwrap();
        assert_eq!(
            driver.handle().current().unwrap().date.as_deref(),
            Some("Midwinter")
        );

        driver
            .apply(DriverCommand::Override {
                field: "date".to_owned(),
                value: None,
            })
            .await
            .unwrap();
        driver
            .apply(DriverCommand::SetCombat {
                started: false,
                combatant: None,
            })
            .await
            .unwrap();
        assert_eq!(
            driver.handle().current().unwrap().date.as_deref(),
            Some("1 Hammer, 1492 DR")
        );
    }

    #[tokio::test]
    async fn rejected_override_is_an_error() {
        let driver = driver();
        let result = driver
            .apply(DriverCommand::Override {
                field: "sky".to_owned(),
                value: Some("green".to_owned()),
            })
            .await;
        assert!(matches!(result, Err(DriverError::Session { .. })));
    }

    #[test]
    fn weather_on_empty_host_creates_scene() {
        let mut host = StaticHost::at(0);
        apply_to_host(
            &mut host,
            DriverCommand::SetWeather {
                weather: Some("Snow".to_owned()),
            },
        );
        assert_eq!(host.scene.unwrap().weather.as_deref(), Some("Snow"));
    }

    #[test]
    fn advance_time_saturates() {
        let mut host = StaticHost::at(i64::MAX - 1);
        apply_to_host(&mut host, DriverCommand::AdvanceTime { seconds: 10 });
        assert_eq!(host.world_time, i64::MAX);
    }

    #[test]
    fn render_disabled_view() {
        assert_eq!(render(None, OutputFormat::Json, 24).unwrap(), "null");
        assert_eq!(
            render(None, OutputFormat::Text, 24).unwrap(),
            "(overlay disabled)\n"
        );
    }

    #[test]
    fn render_text_leads_with_theme_class() {
        let host = StaticHost::at(0);
        let mut settings = HudSettings::defaults().unwrap();
        settings.display.theme = Theme::Parchment;
        let view = DisplayController::new().request_recompute(&host, &settings);
        let text = render(Some(&view), OutputFormat::Text, 24).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("[theme-parchment]"));
        assert!(text.contains("1 Hammer, 1492 DR"));
    }

    #[tokio::test]
    async fn read_commands_skips_bad_lines() {
        let driver = driver();
        let input: &[u8] = b"{\"type\": \"set_world_time\", \"seconds\": 86400}\n\
            not json\n\
            \n\
            {\"type\": \"override\", \"field\": \"nope\", \"value\": \"x\"}\n\
            {\"type\": \"toggle_minified\"}\n";
        let applied = read_commands(&driver, input).await.unwrap();
        assert_eq!(applied, 2);
        let view = driver.handle().current().unwrap();
        assert!(view.is_minified);
        assert_eq!(view.date.as_deref(), Some("2 Hammer, 1492 DR"));
    }

    #[tokio::test]
    async fn forward_views_writes_final_view() {
        let host = StaticHost::at(0).shared();
        let session = HudSession::new(host.clone(), HudSettings::defaults().unwrap());
        let (handle, task) = spawn_session(session);
        let writer = tokio::spawn(forward_views(
            handle.subscribe(),
            Vec::new(),
            OutputFormat::Json,
            24,
        ));

        let driver = Driver::new(host, handle.clone());
        driver
            .apply(DriverCommand::SetWorldTime { seconds: 86_400 * 360 })
            .await
            .unwrap();
        handle.shutdown().await.unwrap();
        task.await.unwrap();
        drop(driver);
        drop(handle);

        let output = String::from_utf8(writer.await.unwrap().unwrap()).unwrap();
        let last = output.lines().last().unwrap();
        let view: ViewModel = serde_json::from_str(last).unwrap();
        assert_eq!(view.date.as_deref(), Some("1 Hammer, 1493 DR"));
    }
}
