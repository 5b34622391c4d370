/// timestep.rs
/// Fixed-substep integration constants
///
/// Frames arrive with whatever `dt` the host loop produces. The ball is always
/// integrated in fixed substeps so a delivery lands on the same pitch spot no
/// matter how the frames were sliced.

/// Physics substep (s): 240 Hz
pub const SUBSTEP_DT: f32 = 1.0 / 240.0;

/// Largest frame `dt` accepted by a tick (s). Longer frames are clamped so a
/// stalled host cannot fast-forward a delivery through the crease.
pub const MAX_FRAME_DT: f32 = 0.1;

/// Fixed frame used by headless simulation (s): 60 Hz
pub const HEADLESS_FRAME_DT: f32 = 1.0 / 60.0;

/// Upper bound on substeps per frame
pub const MAX_SUBSTEPS_PER_FRAME: u32 = (MAX_FRAME_DT / SUBSTEP_DT) as u32 + 1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substep_fits_frame_budget() {
        assert!(MAX_SUBSTEPS_PER_FRAME >= 24);
        assert!(HEADLESS_FRAME_DT > SUBSTEP_DT);
    }

    #[test]
    fn test_headless_frame_is_whole_number_of_substeps() {
        let ratio = HEADLESS_FRAME_DT / SUBSTEP_DT;
        assert!((ratio - 4.0).abs() < 1e-4);
    }
}
