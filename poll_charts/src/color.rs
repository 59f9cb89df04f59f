//! Colors of the parties and color transforms.

use crate::config::*;

/// A color with 8-bit channels.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn from_u32(n: u32) -> Rgb {
        Rgb {
            r: ((n >> 16) & 0xFF) as u8,
            g: ((n >> 8) & 0xFF) as u8,
            b: (n & 0xFF) as u8,
        }
    }

    /// Parses a `#RRGGBB` color. The case of the digits does not matter.
    pub fn from_hex(s: &str) -> Result<Rgb, ChartErrors> {
        let digits = s
            .strip_prefix('#')
            .filter(|d| d.len() == 6 && d.chars().all(|c| c.is_ascii_hexdigit()))
            .ok_or_else(|| ChartErrors::InvalidColor(s.to_string()))?;
        let n = u32::from_str_radix(digits, 16).map_err(|_| ChartErrors::InvalidColor(s.to_string()))?;
        Ok(Rgb::from_u32(n))
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// The color of each party. Fixed, it does not depend on the data.
pub fn party_color(party: PartyId) -> &'static str {
    match party {
        PartyId::Labour => "#DC241f",
        PartyId::Conservatives => "#0087DC",
        PartyId::LibDems => "#FDBB30",
        PartyId::Green => "#6AB023",
        PartyId::Reform => "#12B6CF",
        PartyId::Plaid => "#3F8428",
        PartyId::SNP => "#FDF38E",
        PartyId::Others => "#808080",
    }
}

// Rounds halves up, also for negative numbers.
fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

fn clamp_channel(x: f64) -> u8 {
    x.max(0.0).min(255.0) as u8
}

/// Shifts every channel of a color by `round(2.55 * percent)`.
///
/// Positive percentages lighten and negative ones darken. Channels are
/// clamped to [0, 255] and the result is written in upper case.
///
/// ```
/// use poll_charts::color::lighten;
/// assert_eq!(lighten("#0087DC", -20.0).unwrap(), "#0054A9");
/// ```
pub fn lighten(color: &str, percent: f64) -> Result<String, ChartErrors> {
    let c = Rgb::from_hex(color)?;
    let amt = round_half_up(2.55 * percent);
    let shifted = Rgb {
        r: clamp_channel(c.r as f64 + amt),
        g: clamp_channel(c.g as f64 + amt),
        b: clamp_channel(c.b as f64 + amt),
    };
    Ok(shifted.to_hex())
}

// Red-yellow-blue, 11 classes.
const RD_YL_BU: [u32; 11] = [
    0xa50026, 0xd73027, 0xf46d43, 0xfdae61, 0xfee090, 0xffffbf, 0xe0f3f8, 0xabd9e9, 0x74add1,
    0x4575b4, 0x313695,
];

fn basis(t1: f64, v0: f64, v1: f64, v2: f64, v3: f64) -> f64 {
    let t2 = t1 * t1;
    let t3 = t2 * t1;
    ((1.0 - 3.0 * t1 + 3.0 * t2 - t3) * v0
        + (4.0 - 6.0 * t2 + 3.0 * t3) * v1
        + (1.0 + 3.0 * t1 + 3.0 * t2 - 3.0 * t3) * v2
        + t3 * v3)
        / 6.0
}

/// Uniform B-spline through the values, for t in [0, 1].
fn basis_spline(values: &[f64], t: f64) -> f64 {
    let n = values.len() - 1;
    let (t, i) = if t <= 0.0 {
        (0.0, 0)
    } else if t >= 1.0 {
        (1.0, n - 1)
    } else {
        (t, (t * n as f64).floor() as usize)
    };
    let v1 = values[i];
    let v2 = values[i + 1];
    let v0 = if i > 0 { values[i - 1] } else { 2.0 * v1 - v2 };
    let v3 = if i < n - 1 { values[i + 2] } else { 2.0 * v2 - v1 };
    basis((t - i as f64 / n as f64) * n as f64, v0, v1, v2, v3)
}

/// The diverging red-yellow-blue color ramp: red at 0, pale yellow around
/// 0.5, blue at 1. The input is clamped to [0, 1].
pub fn interpolate_rd_yl_bu(t: f64) -> Rgb {
    let stops: Vec<Rgb> = RD_YL_BU.iter().map(|n| Rgb::from_u32(*n)).collect();
    let channel = |f: fn(&Rgb) -> u8| -> u8 {
        let values: Vec<f64> = stops.iter().map(|c| f(c) as f64).collect();
        clamp_channel(round_half_up(basis_spline(&values, t)))
    };
    Rgb {
        r: channel(|c| c.r),
        g: channel(|c| c.g),
        b: channel(|c| c.b),
    }
}
