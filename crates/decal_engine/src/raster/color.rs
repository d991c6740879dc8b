/// Straight-alpha RGBA8 color, the pixel type of every buffer in the crate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    pub const BLACK: Self = Self::new(0, 0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn from_array(rgba: [u8; 4]) -> Self {
        Self::new(rgba[0], rgba[1], rgba[2], rgba[3])
    }

    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    pub const fn is_transparent(self) -> bool {
        self.a == 0
    }

    /// Channel-wise linear interpolation, `t` clamped to `[0, 1]`.
    #[inline]
    pub fn lerp(self, to: Self, t: f32) -> Self {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        Self::new(
            lerp_channel(self.r, to.r, t),
            lerp_channel(self.g, to.g, t),
            lerp_channel(self.b, to.b, t),
            lerp_channel(self.a, to.a, t),
        )
    }

    /// Composites `self` over `below`.
    ///
    /// Both inputs are straight alpha; they are premultiplied, combined with the
    /// "over" operator and normalized back to straight alpha.
    #[inline]
    pub fn over(self, below: Self) -> Self {
        let src_a = unit(self.a);
        let dst_a = unit(below.a);
        let out_a = src_a + dst_a * (1.0 - src_a);
        if out_a <= 0.0 {
            return Self::TRANSPARENT;
        }

        let channel = |src: u8, dst: u8| {
            let premultiplied = unit(src) * src_a + unit(dst) * dst_a * (1.0 - src_a);
            to_byte(premultiplied / out_a)
        };

        Self::new(
            channel(self.r, below.r),
            channel(self.g, below.g),
            channel(self.b, below.b),
            to_byte(out_a),
        )
    }

    /// Moves the color channels toward black by `amount` (0 keeps, 1 is black). Alpha is kept.
    #[inline]
    pub fn darkened(self, amount: f32) -> Self {
        Self::BLACK.lerp(self, 1.0 - amount).with_alpha(self.a)
    }
}

#[inline]
fn unit(channel: u8) -> f32 {
    channel as f32 / 255.0
}

#[inline]
fn to_byte(value: f32) -> u8 {
    (value * 255.0).clamp(0.0, 255.0).round() as u8
}

#[inline]
fn lerp_channel(from: u8, to: u8, t: f32) -> u8 {
    let value = from as f32 + (to as f32 - from as f32) * t;
    value.clamp(0.0, 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba8 = Rgba8::new(255, 0, 0, 255);

    #[test]
    fn opaque_over_anything_is_the_source() {
        let below = Rgba8::new(10, 200, 30, 90);
        assert_eq!(RED.over(below), RED);
        assert_eq!(RED.over(Rgba8::TRANSPARENT), RED);
    }

    #[test]
    fn transparent_over_keeps_destination() {
        let below = Rgba8::new(10, 200, 30, 90);
        assert_eq!(Rgba8::TRANSPARENT.over(below), below);
    }

    #[test]
    fn half_alpha_over_transparent_keeps_straight_color() {
        let half_red = Rgba8::new(255, 0, 0, 128);
        assert_eq!(half_red.over(Rgba8::TRANSPARENT), half_red);
    }

    #[test]
    fn half_alpha_over_opaque_mixes_colors() {
        let half_red = Rgba8::new(255, 0, 0, 128);
        let blue = Rgba8::new(0, 0, 255, 255);
        let out = half_red.over(blue);
        assert_eq!(out.a, 255);
        assert_eq!(out.r, 128);
        assert_eq!(out.b, 127);
    }

    #[test]
    fn lerp_endpoints_are_exact() {
        let from = Rgba8::new(1, 2, 3, 4);
        assert_eq!(from.lerp(RED, 0.0), from);
        assert_eq!(from.lerp(RED, 1.0), RED);
        assert_eq!(from.lerp(RED, 7.0), RED);
    }

    #[test]
    fn darkened_keeps_alpha() {
        let color = Rgba8::new(200, 100, 50, 77);
        assert_eq!(color.darkened(0.0), color);
        assert_eq!(color.darkened(1.0), Rgba8::new(0, 0, 0, 77));
        assert_eq!(color.darkened(0.5), Rgba8::new(100, 50, 25, 77));
    }
}
