//! Scales mapping data values to positions on a canvas.
//!
//! The arithmetic follows the conventions of the d3 scales, so that the
//! positions computed here can be fed to a browser renderer unchanged.

use crate::color::{interpolate_rd_yl_bu, Rgb};

/// Splits a continuous range into uniform bands, one per domain value.
#[derive(PartialEq, Debug, Clone)]
pub struct BandScale {
    domain: Vec<String>,
    start: f64,
    step: f64,
    bandwidth: f64,
}

impl BandScale {
    /// `padding` is used both between the bands and on the outer edges.
    pub fn new(domain: &[String], range: (f64, f64), padding: f64) -> BandScale {
        let (r0, r1) = range;
        let n = domain.len() as f64;
        let padding_inner = padding;
        let padding_outer = padding;
        let align = 0.5;
        let step = (r1 - r0) / (n - padding_inner + padding_outer * 2.0).max(1.0);
        let start = r0 + (r1 - r0 - step * (n - padding_inner)) * align;
        BandScale {
            domain: domain.to_vec(),
            start,
            step,
            bandwidth: step * (1.0 - padding_inner),
        }
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn domain(&self) -> &[String] {
        &self.domain
    }

    /// Start of the band of the given value, if it is in the domain.
    pub fn position(&self, value: &str) -> Option<f64> {
        self.domain
            .iter()
            .position(|d| d == value)
            .map(|idx| self.start + self.step * idx as f64)
    }
}

const E10: f64 = 7.0710678118654755; // sqrt(50)
const E5: f64 = 3.1622776601683795; // sqrt(10)
const E2: f64 = std::f64::consts::SQRT_2;

fn step_factor(error: f64) -> f64 {
    if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    }
}

/// Size of a round step splitting [start, stop] in about `count` intervals.
///
/// Negative values encode the inverse of a fractional step: -10 means 0.1.
fn tick_increment(start: f64, stop: f64, count: usize) -> f64 {
    let step = (stop - start) / count as f64;
    let power = step.log10().floor();
    let error = step / 10f64.powi(power as i32);
    let factor = step_factor(error);
    if power >= 0.0 {
        factor * 10f64.powi(power as i32)
    } else {
        -(10f64.powi(-power as i32)) / factor
    }
}

// (first index, last index, increment), with the same sign convention as tick_increment.
fn tick_spec(start: f64, stop: f64, count: f64) -> (f64, f64, f64) {
    let step = (stop - start) / count.max(0.0);
    let power = step.log10().floor();
    let error = step / 10f64.powi(power as i32);
    let factor = step_factor(error);
    let (mut i1, mut i2, inc);
    if power < 0.0 {
        let inv = 10f64.powi(-power as i32) / factor;
        i1 = (start * inv).round();
        i2 = (stop * inv).round();
        if i1 / inv < start {
            i1 += 1.0;
        }
        if i2 / inv > stop {
            i2 -= 1.0;
        }
        inc = -inv;
    } else {
        let step = 10f64.powi(power as i32) * factor;
        i1 = (start / step).round();
        i2 = (stop / step).round();
        if i1 * step < start {
            i1 += 1.0;
        }
        if i2 * step > stop {
            i2 -= 1.0;
        }
        inc = step;
    }
    if i2 < i1 && (0.5..2.0).contains(&count) {
        return tick_spec(start, stop, count * 2.0);
    }
    (i1, i2, inc)
}

/// Round values splitting [start, stop] in about `count` intervals.
pub fn ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if count == 0 || start.is_nan() || stop.is_nan() {
        return vec![];
    }
    if start == stop {
        return vec![start];
    }
    let (lo, hi) = if stop < start { (stop, start) } else { (start, stop) };
    let (i1, i2, inc) = tick_spec(lo, hi, count as f64);
    if !(i2 >= i1) {
        return vec![];
    }
    let n = (i2 - i1) as usize + 1;
    let mut res: Vec<f64> = (0..n)
        .map(|i| {
            let k = i1 + i as f64;
            if inc < 0.0 {
                k / -inc
            } else {
                k * inc
            }
        })
        .collect();
    if stop < start {
        res.reverse();
    }
    res
}

/// An affine map from a numeric domain to a numeric range.
#[derive(PartialEq, Debug, Clone)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> LinearScale {
        LinearScale { domain, range }
    }

    /// Extends the domain so that it starts and ends on round values.
    pub fn nice(self) -> LinearScale {
        let count = 10;
        let (mut start, mut stop) = self.domain;
        let reversed = stop < start;
        if reversed {
            std::mem::swap(&mut start, &mut stop);
        }
        if !(stop > start) || !stop.is_finite() || !start.is_finite() {
            return self;
        }
        let mut prestep: Option<f64> = None;
        for _ in 0..10 {
            let step = tick_increment(start, stop, count);
            if Some(step) == prestep {
                break;
            } else if step > 0.0 {
                start = (start / step).floor() * step;
                stop = (stop / step).ceil() * step;
            } else if step < 0.0 {
                start = (start * step).ceil() / step;
                stop = (stop * step).floor() / step;
            } else {
                break;
            }
            prestep = Some(step);
        }
        let domain = if reversed { (stop, start) } else { (start, stop) };
        LinearScale {
            domain,
            range: self.range,
        }
    }

    /// Maps a value of the domain into the range.
    ///
    /// A degenerate domain maps everything to the start of the range.
    pub fn apply(&self, x: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 {
            return r0;
        }
        r0 + (x - d0) / (d1 - d0) * (r1 - r0)
    }

    pub fn ticks(&self, count: usize) -> Vec<f64> {
        ticks(self.domain.0, self.domain.1, count)
    }
}

/// Maps a numeric domain onto the diverging red-yellow-blue color ramp.
#[derive(PartialEq, Debug, Clone)]
pub struct SequentialScale {
    pub domain: (f64, f64),
}

impl SequentialScale {
    pub fn new(domain: (f64, f64)) -> SequentialScale {
        SequentialScale { domain }
    }

    /// The color of a value. Values outside the domain get the color of the
    /// closest end, and NaN has no color.
    pub fn apply(&self, x: f64) -> Option<Rgb> {
        if x.is_nan() {
            return None;
        }
        let (d0, d1) = self.domain;
        let t = if d1 == d0 { 0.5 } else { (x - d0) / (d1 - d0) };
        Some(interpolate_rd_yl_bu(t))
    }
}
