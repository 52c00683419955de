use crate::Point;

/// A 3×3 affine matrix with named slots.
///
/// Row-major layout:
///
/// ```text
/// | scale_x  skew_x   translate_x |
/// | skew_y   scale_y  translate_y |
/// | persp_0  persp_1  persp_2     |
/// ```
///
/// `pre_*` operations apply in content space (before the current matrix), `post_*` operations
/// apply in screen space (after it).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Matrix {
    pub scale_x: f32,
    pub skew_x: f32,
    pub translate_x: f32,
    pub skew_y: f32,
    pub scale_y: f32,
    pub translate_y: f32,
    pub persp_0: f32,
    pub persp_1: f32,
    pub persp_2: f32,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix {
        scale_x: 1.0,
        skew_x: 0.0,
        translate_x: 0.0,
        skew_y: 0.0,
        scale_y: 1.0,
        translate_y: 0.0,
        persp_0: 0.0,
        persp_1: 0.0,
        persp_2: 1.0,
    };

    pub fn translation(dx: f32, dy: f32) -> Self {
        Self {
            translate_x: dx,
            translate_y: dy,
            ..Self::IDENTITY
        }
    }

    pub fn scale(sx: f32, sy: f32) -> Self {
        Self {
            scale_x: sx,
            scale_y: sy,
            ..Self::IDENTITY
        }
    }

    /// Scale by `(sx, sy)` keeping `pivot` fixed.
    pub fn scale_about(sx: f32, sy: f32, pivot: Point) -> Self {
        Self {
            scale_x: sx,
            scale_y: sy,
            translate_x: pivot.x - sx * pivot.x,
            translate_y: pivot.y - sy * pivot.y,
            ..Self::IDENTITY
        }
    }

    pub fn to_array(&self) -> [f32; 9] {
        [
            self.scale_x,
            self.skew_x,
            self.translate_x,
            self.skew_y,
            self.scale_y,
            self.translate_y,
            self.persp_0,
            self.persp_1,
            self.persp_2,
        ]
    }

    pub fn from_array(v: [f32; 9]) -> Self {
        Self {
            scale_x: v[0],
            skew_x: v[1],
            translate_x: v[2],
            skew_y: v[3],
            scale_y: v[4],
            translate_y: v[5],
            persp_0: v[6],
            persp_1: v[7],
            persp_2: v[8],
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// `self × other`.
    pub fn concat(&self, other: &Matrix) -> Matrix {
        let a = self.to_array();
        let b = other.to_array();
        let mut out = [0.0f32; 9];
        for row in 0..3 {
            for col in 0..3 {
                out[row * 3 + col] = (0..3).map(|k| a[row * 3 + k] * b[k * 3 + col]).sum();
            }
        }
        Matrix::from_array(out)
    }

    pub fn pre_translate(&mut self, dx: f32, dy: f32) {
        *self = self.concat(&Matrix::translation(dx, dy));
    }

    pub fn post_translate(&mut self, dx: f32, dy: f32) {
        *self = Matrix::translation(dx, dy).concat(self);
    }

    pub fn pre_scale(&mut self, sx: f32, sy: f32, pivot: Point) {
        *self = self.concat(&Matrix::scale_about(sx, sy, pivot));
    }

    pub fn post_scale(&mut self, sx: f32, sy: f32, pivot: Point) {
        *self = Matrix::scale_about(sx, sy, pivot).concat(self);
    }

    pub fn map_point(&self, p: Point) -> Point {
        let x = self.scale_x * p.x + self.skew_x * p.y + self.translate_x;
        let y = self.skew_y * p.x + self.scale_y * p.y + self.translate_y;
        let w = self.persp_0 * p.x + self.persp_1 * p.y + self.persp_2;
        if w != 0.0 && w != 1.0 {
            Point::new(x / w, y / w)
        } else {
            Point::new(x, y)
        }
    }

    /// Maps a content-space y coordinate (affine part only).
    pub fn map_y(&self, y: f32) -> f32 {
        self.scale_y * y + self.translate_y
    }

    /// Component-wise interpolation of all nine slots, `t` in `0..=1`.
    pub fn lerp(&self, target: &Matrix, t: f32) -> Matrix {
        let t = t.clamp(0.0, 1.0);
        let a = self.to_array();
        let b = target.to_array();
        let mut out = [0.0f32; 9];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = a[i] + (b[i] - a[i]) * t;
        }
        Matrix::from_array(out)
    }
}
