use std::f64::consts::{FRAC_PI_2, PI};

/// Buffered, frame-stepped transition of one transform value.
///
/// Gestures add to `buffer`; each frame moves a time-proportional share of
/// the buffer into `current`. When the remaining buffer falls below
/// `epsilon` the value snaps to `target` exactly, so repeated quarter turns
/// never accumulate drift.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformAnimation {
    /// Value shown on screen, including the part already animated.
    current: f64,
    buffer: f64,
    /// Where the value lands once the buffer drains.
    target: f64,
    epsilon: f64,
    in_progress: bool,
}

/// Outcome of one animation frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Nothing was animating.
    Idle,
    Running,
    /// The buffer drained on this frame; the value is now committed.
    Finished,
}

impl TransformAnimation {
    pub fn new(value: f64, epsilon: f64) -> Self {
        Self {
            current: value,
            buffer: 0.0,
            target: value,
            epsilon,
            in_progress: false,
        }
    }

    pub fn value(&self) -> f64 {
        self.current
    }

    /// Value the animation converges to.
    pub fn committed(&self) -> f64 {
        self.target
    }

    pub fn buffer(&self) -> f64 {
        self.buffer
    }

    pub fn in_progress(&self) -> bool {
        self.in_progress
    }

    /// Queue a delta. Returns `true` when the caller has to start a frame
    /// loop; while one is running the delta merges into its buffer.
    pub fn push(&mut self, delta: f64) -> bool {
        self.buffer += delta;
        self.target += delta;
        if self.in_progress {
            return false;
        }
        self.in_progress = true;
        true
    }

    /// Advance by `elapsed_ms`. A full frame of `frame_ms` moves a quarter
    /// of the remaining buffer.
    pub fn step(&mut self, elapsed_ms: f64, frame_ms: f64) -> Step {
        if !self.in_progress {
            return Step::Idle;
        }
        let fraction = (elapsed_ms / (4.0 * frame_ms.max(f64::EPSILON))).clamp(0.0, 1.0);
        let moved = self.buffer * fraction;
        self.buffer -= moved;
        self.current += moved;
        if self.buffer.abs() < self.epsilon {
            self.settle();
            return Step::Finished;
        }
        Step::Running
    }

    /// Drain the buffer at once.
    pub fn settle(&mut self) {
        self.current = self.target;
        self.buffer = 0.0;
        self.in_progress = false;
    }
}

/// Rotation dial with `ticks` detents each way, `PI / ticks` radians apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RotationDial {
    tick: i32,
    ticks: i32,
}

impl RotationDial {
    pub fn new(ticks: u32) -> Self {
        Self {
            tick: 0,
            ticks: ticks.max(1) as i32,
        }
    }

    pub fn tick(&self) -> i32 {
        self.tick
    }

    pub fn ticks(&self) -> i32 {
        self.ticks
    }

    /// Move the dial. Returns the rotation delta in radians, zero when the
    /// clamped position did not change.
    pub fn set_tick(&mut self, tick: i32) -> f64 {
        let tick = tick.clamp(-self.ticks, self.ticks);
        let delta = (tick - self.tick) as f64 * PI / self.ticks as f64;
        self.tick = tick;
        delta
    }

    pub fn reset(&mut self) {
        self.tick = 0;
    }
}

pub const QUARTER_TURN: f64 = FRAC_PI_2;

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f64 = 16.0;

    fn run_to_end(anim: &mut TransformAnimation) -> usize {
        let mut frames = 0;
        while anim.step(FRAME, FRAME) == Step::Running {
            frames += 1;
            assert!(frames < 1000, "animation did not converge");
        }
        frames
    }

    #[test]
    fn quarter_turn_converges_exactly() {
        let mut rot = TransformAnimation::new(0.0, 0.005);
        assert!(rot.push(QUARTER_TURN));
        run_to_end(&mut rot);
        assert!(!rot.in_progress());
        assert_eq!(rot.value(), QUARTER_TURN);
        assert_eq!(rot.buffer(), 0.0);
    }

    #[test]
    fn four_quarter_turns_have_no_drift() {
        let mut rot = TransformAnimation::new(0.0, 0.005);
        let mut expected = 0.0;
        for _ in 0..4 {
            rot.push(QUARTER_TURN);
            run_to_end(&mut rot);
            expected += QUARTER_TURN;
            assert_eq!(rot.value(), expected);
        }
    }

    #[test]
    fn gesture_mid_animation_merges() {
        let mut rot = TransformAnimation::new(0.0, 0.005);
        assert!(rot.push(QUARTER_TURN));
        assert_eq!(rot.step(FRAME, FRAME), Step::Running);
        assert!(!rot.push(QUARTER_TURN), "second loop must not start");
        run_to_end(&mut rot);
        assert_eq!(rot.value(), 2.0 * QUARTER_TURN);
    }

    #[test]
    fn step_is_time_proportional() {
        let mut a = TransformAnimation::new(0.0, 0.005);
        let mut b = a;
        a.push(1.0);
        b.push(1.0);
        a.step(FRAME, FRAME);
        b.step(FRAME / 2.0, FRAME);
        assert!((a.value() - 0.25).abs() < 1e-12);
        assert!((b.value() - 0.125).abs() < 1e-12);
    }

    #[test]
    fn idle_step_does_nothing() {
        let mut a = TransformAnimation::new(1.0, 0.01);
        assert_eq!(a.step(FRAME, FRAME), Step::Idle);
        assert_eq!(a.value(), 1.0);
    }

    #[test]
    fn mirror_flip_lands_on_minus_one() {
        let mut m = TransformAnimation::new(1.0, 0.01);
        m.push(-2.0);
        run_to_end(&mut m);
        assert_eq!(m.value(), -1.0);
    }

    #[test]
    fn dial_clamps_and_reports_delta() {
        let mut dial = RotationDial::new(84);
        let d = dial.set_tick(42);
        assert!((d - PI / 2.0).abs() < 1e-12);
        let d = dial.set_tick(500);
        assert_eq!(dial.tick(), 84);
        assert!((d - PI / 2.0).abs() < 1e-12);
        assert_eq!(dial.set_tick(90), 0.0);
        dial.set_tick(-1000);
        assert_eq!(dial.tick(), -84);
    }
}
