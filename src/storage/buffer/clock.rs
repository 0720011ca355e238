use super::frame::FrameId;

/// The hand of the clock replacement policy. It survives across evictions so
/// every sweep resumes where the previous one stopped.
pub struct ClockHand {
    position: FrameId,
    n_frames: usize,
}

impl ClockHand {
    /// Starts on the last frame so the first advance lands on frame 0
    pub fn new(n_frames: usize) -> Self {
        assert!(n_frames > 0, "the clock needs at least one frame");
        ClockHand {
            position: n_frames - 1,
            n_frames,
        }
    }

    /// Moves the hand one frame forward, wrapping around, and returns the new position
    pub fn advance(&mut self) -> FrameId {
        self.position = (self.position + 1) % self.n_frames;
        self.position
    }

    pub fn position(&self) -> FrameId {
        self.position
    }
}
