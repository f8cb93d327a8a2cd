use std::fmt::Display;

/// Running min / max / average of a series of counts.
#[derive(Clone, Debug, PartialEq)]
pub struct Stats {
    pub count: usize,
    pub sum: usize,
    pub min: usize,
    pub max: usize,
    pub avg: f32,
}

impl Stats {
    pub fn add_sample(&mut self, value: usize) {
        self.count += 1;
        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.avg += (value as f32 - self.avg) / (self.count as f32);
    }
}

impl Default for Stats {
    fn default() -> Self {
        Stats {
            count: 0,
            sum: 0,
            min: usize::MAX,
            max: 0,
            avg: 0.0,
        }
    }
}

impl Extend<usize> for Stats {
    fn extend<T: IntoIterator<Item = usize>>(&mut self, iter: T) {
        for value in iter {
            self.add_sample(value);
        }
    }
}

impl FromIterator<usize> for Stats {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
        let mut stats = Stats::default();
        stats.extend(iter);
        stats
    }
}

impl Display for Stats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            return write!(f, "no samples");
        }
        write!(
            f,
            "{} - {}; avg {:.1}; {} samples",
            self.min, self.max, self.avg, self.count
        )
    }
}
