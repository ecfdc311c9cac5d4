//! 2D camera for canvas-style simulations

use glam::{Mat4, Vec3};

/// 2D orthographic camera
#[derive(Debug, Clone)]
pub struct Camera2D {
    pub position: Vec3,
    /// Half of the visible height in world units
    pub zoom: f32,
    pub aspect_ratio: f32,
}

impl Camera2D {
    pub fn new(aspect_ratio: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            zoom: 1.0,
            aspect_ratio,
        }
    }

    /// Camera showing the whole `width` x `height` canvas anchored at the
    /// origin, letterboxed to `aspect_ratio`
    pub fn framing(width: f32, height: f32, aspect_ratio: f32) -> Self {
        let mut camera = Self::new(aspect_ratio);
        camera.position = Vec3::new(width / 2.0, height / 2.0, 0.0);
        camera.fit(width, height);
        camera
    }

    /// Pick the zoom that keeps a `width` x `height` area fully visible
    pub fn fit(&mut self, width: f32, height: f32) {
        let canvas_aspect = width / height;
        self.zoom = if self.aspect_ratio >= canvas_aspect {
            height / 2.0
        } else {
            width / (2.0 * self.aspect_ratio)
        };
    }

    /// Get the view-projection matrix
    pub fn view_projection(&self) -> Mat4 {
        let half_width = self.zoom * self.aspect_ratio;
        let half_height = self.zoom;

        let projection = Mat4::orthographic_rh(
            -half_width,
            half_width,
            -half_height,
            half_height,
            -1.0,
            1.0,
        );

        let view = Mat4::from_translation(-self.position);

        projection * view
    }

    pub fn update_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
    }
}

/// Camera uniform data for shaders
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub position: [f32; 4],
}

impl CameraUniform {
    pub fn from_camera_2d(camera: &Camera2D) -> Self {
        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            position: [camera.position.x, camera.position.y, camera.position.z, 1.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn test_framing_maps_corners_inside_clip_space() {
        let camera = Camera2D::framing(800.0, 400.0, 16.0 / 9.0);
        let vp = camera.view_projection();

        for corner in [[0.0, 0.0], [800.0, 0.0], [0.0, 400.0], [800.0, 400.0]] {
            let clip = vp * Vec4::new(corner[0], corner[1], 0.0, 1.0);
            assert!(clip.x.abs() <= 1.0 + 1e-5, "{:?}", clip);
            assert!(clip.y.abs() <= 1.0 + 1e-5, "{:?}", clip);
        }
    }

    #[test]
    fn test_fit_uses_limiting_axis() {
        // Wider window than canvas: height limits
        let wide = Camera2D::framing(800.0, 400.0, 3.0);
        assert_eq!(wide.zoom, 200.0);

        // Narrow window: width limits
        let narrow = Camera2D::framing(800.0, 400.0, 1.0);
        assert_eq!(narrow.zoom, 400.0);
    }
}
