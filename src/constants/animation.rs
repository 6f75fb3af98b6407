//! Blink / hit-flash constants (frame based).

/// Frames a single blink cycle lasts
pub const BLINK_FRAMES: u32 = 8;
/// Extra blink cycles played after the first on a hit
pub const BLINK_REPEATS: u32 = 2;
/// Frames per on/off phase within a blink cycle
pub const BLINK_PHASE_FRAMES: u32 = 2;
