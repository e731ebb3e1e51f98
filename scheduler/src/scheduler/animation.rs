use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationState {
    Idle,
    Playing,
    Paused,
}

/// Steps through an already computed schedule, revealing one slice per frame.
pub struct Animator {
    state: AnimationState,
    current_step: usize,
    total_steps: usize,
    speed: u8,
    last_frame: Instant,
}

impl Animator {
    pub const MIN_SPEED: u8 = 1;
    pub const MAX_SPEED: u8 = 10;
    pub const DEFAULT_SPEED: u8 = 5;

    pub fn with_speed(total_steps: usize, speed: u8) -> Self {
        Self {
            state: AnimationState::Idle,
            current_step: 0,
            total_steps,
            speed: speed.clamp(Animator::MIN_SPEED, Animator::MAX_SPEED),
            last_frame: Instant::now(),
        }
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    /// Number of slices currently revealed.
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    pub fn speed(&self) -> u8 {
        self.speed
    }

    pub fn is_finished(&self) -> bool {
        self.current_step >= self.total_steps
    }

    /// Speed 1 shows a slice every second, speed 10 every 100ms.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(1100 - u64::from(self.speed) * 100)
    }

    pub fn set_speed(&mut self, speed: u8) {
        self.speed = speed.clamp(Animator::MIN_SPEED, Animator::MAX_SPEED);
        // Restart the frame timer with the new interval
        self.last_frame = Instant::now();
    }

    pub fn faster(&mut self) {
        self.set_speed(self.speed.saturating_add(1));
    }

    pub fn slower(&mut self) {
        self.set_speed(self.speed.saturating_sub(1));
    }

    /// Starts playback, rewinding first if everything is already shown.
    pub fn play(&mut self) {
        if self.total_steps == 0 {
            return;
        }
        if self.is_finished() {
            self.current_step = 0;
        }
        self.state = AnimationState::Playing;
        self.last_frame = Instant::now();
        debug!(step = self.current_step, "animation playing");
    }

    pub fn pause(&mut self) {
        if self.state == AnimationState::Playing {
            self.state = AnimationState::Paused;
            debug!(step = self.current_step, "animation paused");
        }
    }

    pub fn toggle(&mut self) {
        match self.state {
            AnimationState::Playing => self.pause(),
            AnimationState::Idle | AnimationState::Paused => self.play(),
        }
    }

    /// Stops playback and reveals one more slice.
    pub fn step(&mut self) {
        if self.is_finished() {
            return;
        }
        self.state = AnimationState::Paused;
        self.current_step += 1;
    }

    pub fn reset(&mut self) {
        self.state = AnimationState::Idle;
        self.current_step = 0;
    }

    /// Reveals the next slice while playing. Playback stops on the last one.
    pub fn advance(&mut self) {
        if self.state != AnimationState::Playing {
            return;
        }
        self.current_step = (self.current_step + 1).min(self.total_steps);
        if self.is_finished() {
            self.state = AnimationState::Paused;
            debug!("animation finished");
        }
    }

    /// Advances if a frame interval has passed; returns whether it did.
    pub fn update(&mut self) -> bool {
        if self.state != AnimationState::Playing
            || self.last_frame.elapsed() < self.frame_interval()
        {
            return false;
        }
        self.last_frame = Instant::now();
        self.advance();
        true
    }
}
