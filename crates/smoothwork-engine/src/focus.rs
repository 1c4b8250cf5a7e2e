//! Node focus support
//!
//! Centering the view is an optional host capability. The flash that
//! follows it is owned by the editor and happens with or without a camera.

use std::time::Duration;

use crate::constants::focus::{CAMERA_ANIMATION_MS, CAMERA_ZOOM};

/// How the camera should frame a focused node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    pub zoom: f64,
    pub duration: Duration,
}

impl Default for CameraView {
    fn default() -> Self {
        Self {
            zoom: CAMERA_ZOOM,
            duration: Duration::from_millis(CAMERA_ANIMATION_MS),
        }
    }
}

/// Why a camera could not move
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CameraError {
    /// The viewport is not mounted yet
    #[error("Camera viewport is not available")]
    Unavailable,
    /// The host refused or failed the move
    #[error("Camera move failed: {0}")]
    Failed(String),
}

/// A canvas viewport that can be re-centered
pub trait Camera {
    /// Center the view on a canvas point
    ///
    /// Errors are logged by the editor and otherwise ignored.
    fn set_center(&mut self, x: f64, y: f64, view: CameraView) -> Result<(), CameraError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_view() {
        let view = CameraView::default();
        assert_eq!(view.zoom, 1.35);
        assert_eq!(view.duration, Duration::from_millis(450));
    }

    #[test]
    fn test_camera_error_messages() {
        assert_eq!(
            CameraError::Unavailable.to_string(),
            "Camera viewport is not available"
        );
        assert_eq!(
            CameraError::Failed("animation busy".to_string()).to_string(),
            "Camera move failed: animation busy"
        );
    }
}
