//! Display state, configuration and session loop for the Grimoire HUD.
//!
//! This crate turns host state and settings into the overlay's view model.
//! The date and moon arithmetic lives in `grimoire-calendar`; everything
//! that decides what is shown, and when, lives here.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `grimoire-config.yaml` into
//!   validated [`HudSettings`].
//! - [`host`] -- [`HostProvider`] trait, [`StaticHost`] and [`SharedHost`].
//! - [`location`] -- Scene and region name lookup.
//! - [`overrides`] -- Per-field override map.
//! - [`controller`] -- [`DisplayController`]: overrides, flash and minify
//!   state, and view model assembly.
//! - [`session`] -- [`HudSession`] and the async actor behind [`HudHandle`].
//! - [`presentation`] -- Truncation policy, icons and line layout.
//!
//! [`HudSettings`]: config::HudSettings
//! [`HostProvider`]: host::HostProvider
//! [`StaticHost`]: host::StaticHost
//! [`SharedHost`]: host::SharedHost
//! [`DisplayController`]: controller::DisplayController
//! [`HudSession`]: session::HudSession
//! [`HudHandle`]: session::HudHandle

pub mod config;
pub mod controller;
pub mod host;
pub mod location;
pub mod overrides;
pub mod presentation;
pub mod session;
