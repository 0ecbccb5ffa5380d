/// Closed range `[min, max]` of valid ray parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Check `min <= t <= max`. NaN is never contained.
    #[inline]
    pub fn contains(&self, t: f32) -> bool {
        self.min <= t && t <= self.max
    }

    /// Same lower bound, upper bound lowered to `max`.
    ///
    /// Used to keep only hits closer than the best one found so far.
    #[inline]
    pub fn with_max(&self, max: f32) -> Self {
        Self::new(self.min, max)
    }

    /// True if no parameter satisfies the range (e.g. a shadow segment
    /// shorter than twice the ray epsilon).
    #[inline]
    pub fn is_empty(&self) -> bool {
        !(self.min <= self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_contains_endpoints() {
        let interval = Interval::new(0.5, 2.0);

        assert!(interval.contains(0.5));
        assert!(interval.contains(2.0));
        assert!(interval.contains(1.0));
        assert!(!interval.contains(0.49));
        assert!(!interval.contains(2.01));
        assert!(!interval.contains(f32::NAN));
    }

    #[test]
    fn test_interval_with_max() {
        let interval = Interval::new(1e-4, f32::INFINITY).with_max(3.0);
        assert_eq!(interval, Interval::new(1e-4, 3.0));
        assert!(!interval.contains(3.5));
    }

    #[test]
    fn test_interval_empty() {
        assert!(Interval::new(1.0, 0.0).is_empty());
        assert!(Interval::new(0.0, f32::NAN).is_empty());
        assert!(!Interval::new(1.0, 1.0).is_empty());
    }
}
