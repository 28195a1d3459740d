use glam::{Mat4, Vec2};

/// A basic camera over a pixel-space viewport with a top-left origin
///
/// At the default position & zoom the view-projection is a plain
/// orthographic screen projection: one world unit per pixel, y growing
/// downward
pub struct Camera {
    position: Vec2,
    zoom: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl Camera {
    /// Set the camera's target position (top-left corner of the view)
    pub fn target(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Set zoom level, clamped between 0.1 & 10.0 to avoid insanity
    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.clamp(0.1, 10.0);
    }

    /// Returns the orthographic view-projection matrix for the current camera state
    pub fn view_proj(&self, screen_size: Vec2) -> Mat4 {
        let visible = screen_size / self.zoom;

        let left = self.position.x;
        let right = self.position.x + visible.x;
        let bottom = self.position.y + visible.y;
        let top = self.position.y;

        Mat4::orthographic_lh(left, right, bottom, top, 0.0, 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::vec2;

    #[test]
    fn view_proj_matrix() {
        // at rest the camera is a plain screen-space ortho projection
        let cam = Camera::default();

        let mat = cam.view_proj(vec2(800.0, 600.0));
        let expected = Mat4::orthographic_lh(0.0, 800.0, 600.0, 0.0, 0.0, 1000.0);
        assert_eq!(mat, expected);
    }

    #[test]
    fn panned_view_shifts_the_window() {
        let mut cam = Camera::default();
        cam.target(vec2(100.0, 50.0));

        let mat = cam.view_proj(vec2(800.0, 600.0));
        let expected = Mat4::orthographic_lh(100.0, 900.0, 650.0, 50.0, 0.0, 1000.0);
        assert_eq!(mat, expected);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut cam = Camera::default();
        cam.set_zoom(0.0);
        let narrow = cam.view_proj(vec2(100.0, 100.0));
        // allow for float fuzz from the zoom division
        assert!(narrow.abs_diff_eq(Mat4::orthographic_lh(0.0, 1000.0, 1000.0, 0.0, 0.0, 1000.0), 1e-3));

        cam.set_zoom(100.0);
        let wide = cam.view_proj(vec2(100.0, 100.0));
        assert!(wide.abs_diff_eq(Mat4::orthographic_lh(0.0, 10.0, 10.0, 0.0, 0.0, 1000.0), 1e-3));
    }
}
