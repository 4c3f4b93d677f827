//! Camera-distance dependent instance size

use crate::config::SceneScaleConfig;

/// Current instance scale; changes smaller than `epsilon` are ignored.
#[derive(Clone, Copy, Debug)]
pub struct SceneScale {
    config: SceneScaleConfig,
    current: f32,
}

impl SceneScale {
    pub fn new(config: SceneScaleConfig) -> Self {
        Self {
            config,
            current: 1.0,
        }
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn target(&self, camera_distance: f32) -> f32 {
        let c = &self.config;
        (camera_distance / c.reference_distance * c.radius_at_reference).clamp(c.min, c.max)
    }

    /// Returns true when the stored scale moved and a full resync is due.
    pub fn update(&mut self, camera_distance: f32) -> bool {
        let next = self.target(camera_distance);
        if (next - self.current).abs() < self.config.epsilon {
            return false;
        }
        self.current = next;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_at_reference_distance() {
        let mut scale = SceneScale::new(SceneScaleConfig::default());
        assert!(scale.update(800.0));
        assert!((scale.current() - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_scale_is_clamped() {
        let scale = SceneScale::new(SceneScaleConfig::default());
        assert_eq!(scale.target(10.0), 0.2);
        assert_eq!(scale.target(100_000.0), 1.5);
    }

    #[test]
    fn test_small_changes_are_ignored() {
        let mut scale = SceneScale::new(SceneScaleConfig::default());
        assert!(scale.update(800.0));
        assert!(!scale.update(800.0));
        assert!(!scale.update(800.0001));
        assert!(scale.update(900.0));
    }
}
