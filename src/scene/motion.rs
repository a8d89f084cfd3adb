use bevy::prelude::*;

use crate::shared::MotionPreference;

pub const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

/// Reads the platform's reduced-motion setting once at startup.
pub fn detect_motion_preference(mut preference: ResMut<MotionPreference>) {
    preference.reduced = prefers_reduced_motion();
    if preference.reduced {
        info!("[Scene] Reduced motion requested, sparkles and bounce disabled");
    }
}

#[cfg(target_arch = "wasm32")]
fn prefers_reduced_motion() -> bool {
    web_sys::window()
        .and_then(|window| window.match_media(REDUCED_MOTION_QUERY).ok().flatten())
        .is_some_and(|query| query.matches())
}

/// Native builds have no media query; an env var stands in for it.
#[cfg(not(target_arch = "wasm32"))]
fn prefers_reduced_motion() -> bool {
    std::env::var("OSTRICH_REDUCED_MOTION").is_ok_and(|v| v == "1" || v == "true")
}
