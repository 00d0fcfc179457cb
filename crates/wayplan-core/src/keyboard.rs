//! Virtual-keyboard visibility coordination.
//!
//! Show/hide signals arrive from a platform-owned channel at unpredictable
//! times; the coordinator folds them into a two-state machine and derives the
//! bottom inset the conversation layout applies under the composer.

use tracing::warn;

/// Inset applied when the keyboard is visible; the keyboard itself already
/// reserves bottom space, so only a small gap remains.
const VISIBLE_INSET_IOS: f32 = 6.0;
const VISIBLE_INSET_ANDROID: f32 = 8.0;

/// Minimum inset with no keyboard on screen.
const HIDDEN_INSET_MIN: f32 = 16.0;

/// Raw notification from the platform keyboard subsystem.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyboardSignal {
    WillAppear { height: f32 },
    WillDisappear,
}

/// Platform class; the two supported classes use different composer insets
/// while the keyboard is up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Ios,
    Android,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(any(target_os = "ios", target_os = "macos")) {
            Platform::Ios
        } else {
            Platform::Android
        }
    }

    fn visible_inset(self) -> f32 {
        match self {
            Platform::Ios => VISIBLE_INSET_IOS,
            Platform::Android => VISIBLE_INSET_ANDROID,
        }
    }
}

/// Derived layout insets, in logical units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Insets {
    pub bottom_padding: f32,
}

/// Two-state machine: `Hidden` and `Visible(height)`.
///
/// Appear while visible is re-entrant and only updates the height; disappear
/// while hidden is an idempotent no-op. A disappear always forces the height
/// back to 0, whatever was reported before.
pub struct KeyboardCoordinator {
    platform: Platform,
    visible: bool,
    height: f32,
}

impl KeyboardCoordinator {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            visible: false,
            height: 0.0,
        }
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    /// Occluded height in logical units; 0 while hidden.
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Fold one platform signal into the state machine. The coordinator is
    /// mutated through this entry point only.
    pub fn apply(&mut self, signal: KeyboardSignal) {
        match signal {
            KeyboardSignal::WillAppear { height } => {
                self.visible = true;
                self.height = clamp_height(height);
            }
            KeyboardSignal::WillDisappear => {
                self.visible = false;
                self.height = 0.0;
            }
        }
    }

    /// Bottom padding for the conversation layout.
    ///
    /// Visible: a small platform constant, since the keyboard already reserves
    /// its own space. Hidden: the device safe-area inset, floored at a fixed
    /// minimum.
    pub fn insets(&self, safe_area_bottom: f32) -> Insets {
        let bottom_padding = if self.visible {
            self.platform.visible_inset()
        } else {
            safe_area_bottom.max(HIDDEN_INSET_MIN)
        };
        Insets { bottom_padding }
    }
}

/// Negative or non-finite platform heights are a local-recovery case: clamp
/// to 0 rather than letting a faulty value reach layout.
fn clamp_height(height: f32) -> f32 {
    if !height.is_finite() || height < 0.0 {
        warn!(height, "malformed keyboard height from platform, clamping to 0");
        0.0
    } else {
        height
    }
}
