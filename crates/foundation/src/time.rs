/// Seconds since the host clock started.
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd)]
pub struct Time(pub f64);

impl Time {
    pub const ZERO: Self = Time(0.0);

    pub fn seconds(self) -> f64 {
        self.0
    }

    /// Seconds from `earlier` to `self`; negative if `earlier` is later.
    pub fn since(self, earlier: Time) -> f64 {
        self.0 - earlier.0
    }
}
