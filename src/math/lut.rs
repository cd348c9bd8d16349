use crate::util::Interval;

/// A lookup table of values sampled at regular intervals.
#[derive(Clone, Debug)]
pub struct LookupTable<T> {
    offset: f64,
    step: f64,
    values: Vec<T>,
}

impl<T> LookupTable<T> {
    /// Creates a lookup table whose entries are sampled at both ends of the
    /// range and at `count - 1` evenly spaced points in between.
    pub fn from_endpoints(range: Interval<f64>, count: usize, f: impl FnMut(f64) -> T) -> Self {
        let count = count.max(1);
        let step = range.length() / count as f64;
        let values = (0..=count).map(|i| range.lerp(i as f64 / count as f64)).map(f).collect();
        Self {
            offset: range.min - 0.5 * step,
            step,
            values,
        }
    }

    /// Samples the lookup table.
    pub fn sample(&self, x: f64) -> &T {
        let idx = (x - self.offset) / self.step;
        let idx = usize::min(idx as u32 as usize, self.values.len() - 1);
        &self.values[idx]
    }

    /// The number of entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::LookupTable;
    use crate::util::Interval;

    #[test]
    fn endpoint_lut_hits_both_ends() {
        let lut = LookupTable::from_endpoints(Interval::new(0.0, 1.0), 4, |x| x);
        assert_eq!(lut.len(), 5);
        assert_eq!(*lut.sample(0.0), 0.0);
        assert_eq!(*lut.sample(0.1), 0.0);
        assert_eq!(*lut.sample(0.2), 0.25);
        assert_eq!(*lut.sample(0.5), 0.5);
        assert_eq!(*lut.sample(0.9), 1.0);
        assert_eq!(*lut.sample(1.0), 1.0);
    }
}
