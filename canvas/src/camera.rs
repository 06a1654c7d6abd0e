#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

/// A point in either screen or scene space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise difference `self - other`.
    #[must_use]
    pub fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    /// Component-wise sum `self + other`.
    #[must_use]
    pub fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }
}

/// Camera state for pan/zoom over the floor plan.
///
/// `pan_x` / `pan_y` are in CSS pixels.
/// `zoom` is a scale factor (1.0 = no zoom).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub pan_x: f64,
    pub pan_y: f64,
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { pan_x: 0.0, pan_y: 0.0, zoom: 1.0 }
    }
}

impl Camera {
    /// Convert a screen-space point (CSS pixels) to scene coordinates:
    /// subtract pan, divide by zoom.
    #[must_use]
    pub fn screen_to_scene(&self, screen: Point) -> Point {
        Point {
            x: (screen.x - self.pan_x) / self.zoom,
            y: (screen.y - self.pan_y) / self.zoom,
        }
    }

    /// Convert a scene-space point to screen coordinates (CSS pixels).
    #[must_use]
    pub fn scene_to_screen(&self, scene: Point) -> Point {
        Point {
            x: scene.x * self.zoom + self.pan_x,
            y: scene.y * self.zoom + self.pan_y,
        }
    }

    /// Convert a screen-space distance (pixels) to scene-space distance.
    #[must_use]
    pub fn screen_dist_to_scene(&self, screen_dist: f64) -> f64 {
        screen_dist / self.zoom
    }

    /// Translate the view by a screen-space delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx;
        self.pan_y += dy;
    }

    /// Set the zoom factor (clamped to `[min_zoom, max_zoom]`) while keeping the
    /// scene point under `anchor` (screen space) at the same screen position.
    pub fn zoom_at(&mut self, anchor: Point, zoom: f64, min_zoom: f64, max_zoom: f64) {
        let scene_pt = self.screen_to_scene(anchor);
        self.zoom = zoom.clamp(min_zoom, max_zoom);
        self.pan_x = anchor.x - scene_pt.x * self.zoom;
        self.pan_y = anchor.y - scene_pt.y * self.zoom;
    }
}
