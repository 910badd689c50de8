//! Shared type definitions for the Grimoire HUD.
//!
//! Types defined here are used by the engine, the display controller and
//! the binary driver, and flow to `TypeScript` via `ts-rs` for the overlay
//! renderer.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers
//! - [`enums`] -- Phase buckets, lighting levels, fields, themes, reasons
//! - [`structs`] -- View model and related snapshot structs

pub mod enums;
pub mod ids;
pub mod structs;

pub use enums::{HudField, LightingLevel, PhaseBucket, RecomputeReason, Theme};
pub use ids::FlashId;
pub use structs::{Combatant, FlashTicket, MoonView, ViewModel};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        use ts_rs::TS;

        let _ = crate::ids::FlashId::export_all();

        let _ = crate::enums::PhaseBucket::export_all();
        let _ = crate::enums::LightingLevel::export_all();
        let _ = crate::enums::HudField::export_all();
        let _ = crate::enums::Theme::export_all();
        let _ = crate::enums::RecomputeReason::export_all();

        let _ = crate::structs::Combatant::export_all();
        let _ = crate::structs::MoonView::export_all();
        let _ = crate::structs::ViewModel::export_all();
        let _ = crate::structs::FlashTicket::export_all();
    }
}
