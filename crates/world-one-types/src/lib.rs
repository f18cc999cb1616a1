//! Shared type definitions for the World One era system.
//!
//! This crate is the single source of truth for the era entity used across
//! the workspace. The JSON projection flows downstream to `TypeScript` via
//! `ts-rs` for the website.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe wrapper for the era surrogate key
//! - [`era`] -- The [`Era`] entity, its open-end sentinel, and the JSON DTO

pub mod era;
pub mod ids;

// Re-export all public types at crate root for convenience.
pub use era::{Era, EraDto, EraEnd, OPEN_END_TIME_SECS, open_end_time};
pub use ids::EraId;

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // The actual files are written to the `bindings/` directory
        // relative to the crate root.
        use ts_rs::TS;

        let _ = crate::era::EraDto::export_all();
    }
}
