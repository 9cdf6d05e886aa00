pub trait FloatExt {
    fn approximately_eq(self, other: Self) -> bool;

    /// Like [`FloatExt::approximately_eq`] with a caller-supplied tolerance.
    fn within(self, other: Self, tolerance: Self) -> bool;
}

impl FloatExt for f32 {
    fn approximately_eq(self, other: Self) -> bool {
        self.within(other, crate::EPSILON as f32)
    }

    fn within(self, other: Self, tolerance: Self) -> bool {
        (self - other).abs() <= tolerance
    }
}

impl FloatExt for f64 {
    fn approximately_eq(self, other: Self) -> bool {
        self.within(other, crate::EPSILON)
    }

    fn within(self, other: Self, tolerance: Self) -> bool {
        (self - other).abs() <= tolerance
    }
}
