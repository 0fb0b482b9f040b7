//! Per-camera state that persists between frames.

use std::collections::HashMap;

use rand::Rng;

/// Horizontal noise scroll per second of frame time.
pub const SCROLL_SPEED: f32 = 0.004;
/// Chance per frame of a random jump of the scroll position.
pub const JUMP_PROBABILITY: f32 = 0.01;

/// Host-assigned camera identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CameraId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CameraTemporalState {
    /// Always in [0, 1).
    pub horizontal_noise_pos: f32,
    pub last_frame: u64,
}

impl CameraTemporalState {
    pub fn advance<R: Rng + ?Sized>(&mut self, delta_time: f32, rng: &mut R) -> f32 {
        let mut pos = self.horizontal_noise_pos + delta_time * SCROLL_SPEED;
        if rng.gen::<f32>() < JUMP_PROBABILITY {
            pos += rng.gen::<f32>();
        }
        self.horizontal_noise_pos = wrap_unit(pos);
        self.horizontal_noise_pos
    }
}

/// `x mod 1` in [0, 1). Non-finite input resets to 0.
pub fn wrap_unit(x: f32) -> f32 {
    if !x.is_finite() {
        return 0.0;
    }
    let r = x - x.floor();
    // x slightly below an integer can round up to exactly 1.0
    if r >= 1.0 {
        0.0
    } else {
        r
    }
}

/// Temporal state keyed by camera, owned by the renderer.
///
/// Cameras that have not rendered for `max_idle_frames` frames are evicted.
#[derive(Debug)]
pub struct TemporalStateStore {
    states: HashMap<CameraId, CameraTemporalState>,
    max_idle_frames: u64,
}

impl TemporalStateStore {
    pub fn new(max_idle_frames: u64) -> Self {
        Self {
            states: HashMap::new(),
            max_idle_frames,
        }
    }

    /// Advance `camera`'s scroll position for `frame_index`, creating the
    /// state on first sight. Returns the new position.
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        camera: CameraId,
        frame_index: u64,
        delta_time: f32,
        rng: &mut R,
    ) -> f32 {
        let state = self.states.entry(camera).or_insert_with(|| {
            log::debug!("New VHS temporal state for camera {}", camera.0);
            CameraTemporalState {
                horizontal_noise_pos: 0.0,
                last_frame: frame_index,
            }
        });
        state.last_frame = frame_index;
        state.advance(delta_time, rng)
    }

    pub fn get(&self, camera: CameraId) -> Option<&CameraTemporalState> {
        self.states.get(&camera)
    }

    pub fn remove(&mut self, camera: CameraId) -> Option<CameraTemporalState> {
        self.states.remove(&camera)
    }

    /// Drop cameras idle for more than `max_idle_frames` as of `frame_index`.
    /// Returns the evicted cameras.
    pub fn evict_stale(&mut self, frame_index: u64) -> Vec<CameraId> {
        let max_idle = self.max_idle_frames;
        let evicted: Vec<CameraId> = self
            .states
            .iter()
            .filter(|(_, s)| frame_index.saturating_sub(s.last_frame) > max_idle)
            .map(|(camera, _)| *camera)
            .collect();
        for camera in &evicted {
            self.states.remove(camera);
        }
        if !evicted.is_empty() {
            log::debug!("Evicted {} idle VHS camera state(s)", evicted.len());
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
