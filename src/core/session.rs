//! Interactive desktop session detection.
//!
//! The resolution cascade only probes the native keychain when a graphical
//! session is present; in headless shells and CI the keychain either is
//! missing or blocks on an unlock prompt nobody can answer.

use crate::core::constants::env as vars;
use crate::core::env::Environment;

/// Whether the current process runs inside an interactive desktop session.
///
/// `GNOMAN_INTERACTIVE=1|0` overrides detection.
pub fn is_interactive(env: &Environment) -> bool {
    if let Some(forced) = env.flag(vars::INTERACTIVE) {
        return forced;
    }
    detect(env)
}

#[cfg(any(target_os = "macos", target_os = "windows"))]
fn detect(env: &Environment) -> bool {
    // The desktop is always there; remote and CI shells cannot unlock it.
    !(env.is_set("SSH_CONNECTION") || env.is_set("SSH_TTY") || env.is_set("CI"))
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn detect(env: &Environment) -> bool {
    if env.is_set("DISPLAY") || env.is_set("WAYLAND_DISPLAY") {
        return true;
    }
    matches!(
        env.non_empty("XDG_SESSION_TYPE").as_deref(),
        Some("x11") | Some("wayland")
    )
}
