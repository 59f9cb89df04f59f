//! Converts the aggregated views into chart primitives.
//!
//! Everything is computed in the coordinate system of the chart group: the
//! renderer is expected to translate the group by `translate` inside a canvas
//! of size `width` x `height`. Angles use the usual charting convention: 0 at
//! 12 o'clock, growing clockwise.

use std::f64::consts::PI;

use log::debug;

use crate::color::{lighten, party_color};
use crate::config::*;
use crate::scale::{BandScale, LinearScale, SequentialScale};

pub type Point = (f64, f64);

/// A labelled position along an axis.
#[derive(PartialEq, Debug, Clone)]
pub struct AxisTick {
    pub label: String,
    pub position: f64,
}

/// Formats a number with a fixed number of decimals.
///
/// The rounding is decided on the exact binary value: 0.35 is stored
/// slightly below 0.35 and gives `0.3`, while an exact half such as 0.25 is
/// rounded away from zero. The non-finite values are written `NaN`,
/// `Infinity` and `-Infinity`.
pub fn format_fixed(value: f64, digits: usize) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    // A finite f64 is m * 2^e: its exact decimal expansion has -e fractional digits.
    let raw_exp = ((value.to_bits() >> 52) & 0x7ff) as i32;
    let ulp_exp = if value == 0.0 {
        0
    } else if raw_exp == 0 {
        -1074
    } else {
        raw_exp - 1075
    };
    let exact_digits = (-ulp_exp).max(digits as i32 + 1) as usize;
    let expanded = format!("{:.*}", exact_digits, value.abs());
    let (int_part, frac_part) = expanded.split_once('.').unwrap_or((expanded.as_str(), ""));

    let mut kept: Vec<char> = int_part
        .chars()
        .chain(frac_part.chars().take(digits))
        .collect();
    let round_up = frac_part
        .as_bytes()
        .get(digits)
        .map_or(false, |d| *d >= b'5');
    if round_up {
        let mut idx = kept.len();
        loop {
            if idx == 0 {
                kept.insert(0, '1');
                break;
            }
            idx -= 1;
            if kept[idx] == '9' {
                kept[idx] = '0';
            } else {
                kept[idx] = ((kept[idx] as u8) + 1) as char;
                break;
            }
        }
    }

    let int_len = kept.len() - digits;
    let mut res = String::new();
    if value < 0.0 {
        res.push('-');
    }
    res.extend(kept[..int_len].iter());
    if digits > 0 {
        res.push('.');
        res.extend(kept[int_len..].iter());
    }
    res
}

fn format_tick(value: f64) -> String {
    format!("{}", value)
}

// ********* Bar chart *********

#[derive(PartialEq, Debug, Clone)]
pub struct Bar {
    pub party: PartyId,
    pub count: u64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub fill: String,
    pub highlight: String,
    pub label: String,
    pub label_pos: Point,
}

#[derive(PartialEq, Debug, Clone)]
pub struct BarChart {
    pub width: f64,
    pub height: f64,
    pub translate: Point,
    pub bars: Vec<Bar>,
    pub x_axis: Vec<AxisTick>,
    pub y_axis: Vec<AxisTick>,
}

/// One bar per party, sorted by decreasing number of seats.
pub fn bar_geometry(counts: &AggregateCount, layout: &BarLayout) -> Result<BarChart, ChartErrors> {
    let ranked = counts.ranked();
    let names: Vec<String> = ranked.iter().map(|(p, _)| p.label().to_string()).collect();
    let x = BandScale::new(&names, (0.0, layout.width), layout.padding);
    let max_count = ranked.iter().map(|(_, c)| *c).max().unwrap_or(0);
    let y = LinearScale::new((0.0, max_count as f64), (layout.height, 0.0)).nice();
    debug!("bar_geometry: parties: {:?} y domain: {:?}", names, y.domain);

    let mut bars: Vec<Bar> = Vec::new();
    for (party, count) in ranked.iter() {
        // Every party of the ranking is in the domain of the band scale.
        let bx = x.position(party.label()).unwrap_or(0.0);
        let by = y.apply(*count as f64);
        let fill = party_color(*party);
        bars.push(Bar {
            party: *party,
            count: *count,
            x: bx,
            y: by,
            width: x.bandwidth(),
            height: layout.height - by,
            fill: fill.to_string(),
            highlight: lighten(fill, layout.highlight_percent)?,
            label: count.to_string(),
            label_pos: (bx + x.bandwidth() / 2.0, by - layout.label_gap),
        });
    }

    let x_axis = names
        .iter()
        .map(|n| AxisTick {
            label: n.clone(),
            position: x.position(n).unwrap_or(0.0) + x.bandwidth() / 2.0,
        })
        .collect();
    let y_axis = y
        .ticks(10)
        .iter()
        .map(|v| AxisTick {
            label: format_tick(*v),
            position: y.apply(*v),
        })
        .collect();

    Ok(BarChart {
        width: layout.width + layout.canvas_extra,
        height: layout.height + layout.canvas_extra,
        translate: (layout.margin_left, layout.margin_top),
        bars,
        x_axis,
        y_axis,
    })
}

// ********* Pie chart *********

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum TextAnchor {
    Start,
    End,
}

#[derive(PartialEq, Debug, Clone)]
pub struct Wedge {
    pub party: PartyId,
    pub share: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    pub fill: String,
    pub highlight: String,
    /// Start, elbow and end of the line joining the wedge to its label.
    pub leader: [Point; 3],
    pub label_pos: Point,
    pub text_anchor: TextAnchor,
    pub label: String,
}

impl Wedge {
    pub fn mid_angle(&self) -> f64 {
        mid_angle(self.start_angle, self.end_angle)
    }
}

fn mid_angle(start_angle: f64, end_angle: f64) -> f64 {
    start_angle + (end_angle - start_angle) / 2.0
}

#[derive(PartialEq, Debug, Clone)]
pub struct PieChart {
    pub width: f64,
    pub height: f64,
    /// The center of the pie.
    pub translate: Point,
    pub radius: f64,
    pub wedges: Vec<Wedge>,
}

/// Start and end angles of the wedges of a pie, in the order of the values.
///
/// The wedges are contiguous and cover the full circle starting from 0.
/// Values that are not positive (NaN included) get an empty wedge and do
/// not count in the total. When `sort_by_value` is set, the angles are
/// handed out by decreasing value; the output still follows the input order.
pub fn pie_angles(values: &[f64], sort_by_value: bool) -> Vec<(f64, f64)> {
    let weight = |v: f64| if v > 0.0 { v } else { 0.0 };
    let sum: f64 = values.iter().map(|v| weight(*v)).sum();
    let k = if sum > 0.0 { 2.0 * PI / sum } else { 0.0 };

    let mut order: Vec<usize> = (0..values.len()).collect();
    if sort_by_value {
        order.sort_by(|a, b| weight(values[*b]).total_cmp(&weight(values[*a])));
    }

    let mut res = vec![(0.0, 0.0); values.len()];
    let mut a0 = 0.0;
    for idx in order {
        let a1 = a0 + weight(values[idx]) * k;
        res[idx] = (a0, a1);
        a0 = a1;
    }
    res
}

// Centroid of the ring between the two radii, for the given angle.
fn centroid(angle: f64, inner: f64, outer: f64) -> Point {
    let r = (inner + outer) / 2.0;
    let a = angle - PI / 2.0;
    (a.cos() * r, a.sin() * r)
}

fn side_sign(side: LabelSide) -> f64 {
    match side {
        LabelSide::Right => 1.0,
        LabelSide::Left => -1.0,
    }
}

pub fn pie_geometry(shares: &AggregateShare, layout: &PieLayout) -> Result<PieChart, ChartErrors> {
    let radius = layout.radius();
    let values: Vec<f64> = shares.shares.iter().map(|(_, s)| *s).collect();
    let angles = pie_angles(&values, layout.sort_by_value);
    let outer_r = radius * layout.outer_arc_factor;

    let mut wedges: Vec<Wedge> = Vec::new();
    for ((party, share), (start_angle, end_angle)) in shares.shares.iter().zip(angles) {
        let mid = mid_angle(start_angle, end_angle);
        let inner_c = centroid(mid, 0.0, radius);
        let outer_c = centroid(mid, outer_r, outer_r);
        let manual = layout.overrides.iter().find(|o| o.party == *party);
        let (side, line_dy, label_dy) = match manual {
            Some(o) => (o.side, o.line_offset, o.label_offset),
            None if mid < PI => (LabelSide::Right, 0.0, 0.0),
            None => (LabelSide::Left, 0.0, 0.0),
        };
        let sign = side_sign(side);
        let fill = party_color(*party);
        wedges.push(Wedge {
            party: *party,
            share: *share,
            start_angle,
            end_angle,
            fill: fill.to_string(),
            highlight: lighten(fill, layout.highlight_percent)?,
            leader: [
                inner_c,
                outer_c,
                (radius * layout.line_factor * sign, outer_c.1 + line_dy),
            ],
            label_pos: (radius * layout.label_factor * sign, outer_c.1 + label_dy),
            text_anchor: match side {
                LabelSide::Right => TextAnchor::Start,
                LabelSide::Left => TextAnchor::End,
            },
            label: format!("{}: {}%", party.label(), format_fixed(*share, 1)),
        });
    }
    debug!("pie_geometry: {} wedges, radius {}", wedges.len(), radius);

    Ok(PieChart {
        width: layout.width + layout.margin,
        height: layout.height + layout.margin,
        translate: (
            (layout.width + layout.margin) / 2.0,
            (layout.height + layout.margin) / 2.0,
        ),
        radius,
        wedges,
    })
}

// ********* Heatmap *********

#[derive(PartialEq, Debug, Clone)]
pub struct HeatCell {
    pub party: PartyId,
    pub region: String,
    pub value: f64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// No color when the value is NaN.
    pub fill: Option<String>,
    pub label: String,
    pub label_pos: Point,
}

#[derive(PartialEq, Debug, Clone)]
pub struct Heatmap {
    pub width: f64,
    pub height: f64,
    pub translate: Point,
    pub columns: Vec<AxisTick>,
    pub rows: Vec<AxisTick>,
    pub cells: Vec<HeatCell>,
}

/// One cell per (region, party) pair, regions first.
pub fn heatmap_geometry(profile: &RegionProfile, layout: &HeatmapLayout) -> Heatmap {
    let party_names: Vec<String> = PartyId::ALL
        .iter()
        .map(|p| p.short_label().to_string())
        .collect();
    let region_names: Vec<String> = profile.regions.iter().map(|r| r.region.clone()).collect();
    let x = BandScale::new(&party_names, (0.0, layout.width), layout.padding);
    let y = BandScale::new(&region_names, (0.0, layout.height()), layout.padding);
    let color = SequentialScale::new(layout.color_domain);

    let mut cells: Vec<HeatCell> = Vec::new();
    for rm in profile.regions.iter() {
        let cy = y.position(&rm.region).unwrap_or(0.0);
        for (party, value) in rm.means.iter() {
            let cx = x.position(party.short_label()).unwrap_or(0.0);
            cells.push(HeatCell {
                party: *party,
                region: rm.region.clone(),
                value: *value,
                x: cx,
                y: cy,
                width: x.bandwidth(),
                height: y.bandwidth(),
                fill: color.apply(*value).map(|c| c.to_hex()),
                label: format_fixed(*value, 1),
                label_pos: (cx + x.bandwidth() / 2.0, cy + y.bandwidth() / 2.0),
            });
        }
    }
    debug!(
        "heatmap_geometry: {} regions, {} cells",
        region_names.len(),
        cells.len()
    );

    let band_ticks = |scale: &BandScale| -> Vec<AxisTick> {
        scale
            .domain()
            .iter()
            .map(|n| AxisTick {
                label: n.clone(),
                position: scale.position(n).unwrap_or(0.0) + scale.bandwidth() / 2.0,
            })
            .collect()
    };

    Heatmap {
        width: layout.width + layout.margin.left + layout.margin.right,
        height: layout.outer_height,
        translate: (layout.margin.left, layout.margin.top),
        columns: band_ticks(&x),
        rows: band_ticks(&y),
        cells,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn fixed_formatting() {
        assert_eq!(format_fixed(0.25, 1), "0.3");
        assert_eq!(format_fixed(-0.25, 1), "-0.3");
        assert_eq!(format_fixed(12.34, 1), "12.3");
        assert_eq!(format_fixed(0.0, 1), "0.0");
        assert_eq!(format_fixed(f64::NAN, 1), "NaN");
    }

    #[test]
    fn fixed_formatting_uses_exact_value() {
        // Stored just below the half.
        assert_eq!(format_fixed(0.35, 1), "0.3");
        assert_eq!(format_fixed(1.45, 1), "1.4");
        assert_eq!(format_fixed(0.15, 1), "0.1");
        // Stored just above the half.
        assert_eq!(format_fixed(9.96, 1), "10.0");
        assert_eq!(format_fixed(2.5, 0), "3");
        assert_eq!(format_fixed(-0.04, 1), "-0.0");
        assert_eq!(format_fixed(40.0, 1), "40.0");
        assert_eq!(format_fixed(f64::NEG_INFINITY, 1), "-Infinity");
        assert_eq!(format_fixed(f64::INFINITY, 1), "Infinity");
    }

    #[test]
    fn bars_sorted_with_zero_height() {
        let counts = AggregateCount {
            counts: vec![
                (PartyId::Green, 5),
                (PartyId::Labour, 10),
                (PartyId::Reform, 0),
            ],
        };
        let chart = bar_geometry(&counts, &BarLayout::DEFAULT).unwrap();
        let order: Vec<PartyId> = chart.bars.iter().map(|b| b.party).collect();
        assert_eq!(order, vec![PartyId::Labour, PartyId::Green, PartyId::Reform]);

        let tallest = &chart.bars[0];
        assert_eq!(tallest.y, 0.0);
        assert_eq!(tallest.height, 300.0);
        assert_eq!(chart.bars[1].height, 150.0);
        assert_eq!(chart.bars[2].height, 0.0);

        // step = 400 / (3 - 0.1 + 0.2)
        let step = 400.0 / 3.1;
        assert!((tallest.width - step * 0.9).abs() < EPS);
        assert!((tallest.x - step * 0.1).abs() < EPS);
        assert!((chart.bars[1].x - step * 1.1).abs() < EPS);
        assert_eq!(tallest.label, "10");
        assert_eq!(tallest.label_pos.1, -5.0);
        assert_eq!(tallest.highlight, lighten(&tallest.fill, -20.0).unwrap());

        assert_eq!(chart.y_axis.len(), 11);
        assert_eq!(chart.y_axis[10].label, "10");
        assert_eq!(chart.y_axis[10].position, 0.0);
        assert_eq!(chart.width, 450.0);
        assert_eq!(chart.translate, (50.0, 10.0));
    }

    #[test]
    fn empty_bars() {
        let counts = AggregateCount { counts: vec![] };
        let chart = bar_geometry(&counts, &BarLayout::DEFAULT).unwrap();
        assert!(chart.bars.is_empty());
        assert!(chart.x_axis.is_empty());
    }

    #[test]
    fn pie_angles_are_proportional() {
        let angles = pie_angles(&[50.0, 30.0, 20.0], false);
        let spans: Vec<f64> = angles.iter().map(|(a0, a1)| a1 - a0).collect();
        assert_eq!(angles[0].0, 0.0);
        assert!((angles[0].1 - angles[1].0).abs() < EPS);
        assert!((angles[1].1 - angles[2].0).abs() < EPS);
        assert!((angles[2].1 - 2.0 * PI).abs() < EPS);
        assert!((spans[0] / spans[2] - 2.5).abs() < EPS);
        assert!((spans[1] / spans[2] - 1.5).abs() < EPS);
    }

    #[test]
    fn pie_angles_sorted_and_degenerate() {
        let angles = pie_angles(&[20.0, f64::NAN, 50.0, -3.0, 30.0], true);
        // 50 first, then 30, then 20.
        assert_eq!(angles[2].0, 0.0);
        assert!((angles[4].0 - angles[2].1).abs() < EPS);
        assert!((angles[0].0 - angles[4].1).abs() < EPS);
        assert!((angles[0].1 - 2.0 * PI).abs() < EPS);
        assert_eq!(angles[1].0, angles[1].1);
        assert_eq!(angles[3].0, angles[3].1);

        let empty = pie_angles(&[0.0, f64::NAN], false);
        assert_eq!(empty, vec![(0.0, 0.0), (0.0, 0.0)]);
    }

    fn shares(values: [f64; 8]) -> AggregateShare {
        AggregateShare {
            shares: PartyId::ALL.iter().cloned().zip(values).collect(),
        }
    }

    #[test]
    fn pie_labels_and_overrides() {
        let layout = PieLayout::default();
        let chart = pie_geometry(
            &shares([40.0, 34.0, 8.0, 5.0, 6.0, 1.0, 2.0, 4.0]),
            &layout,
        )
        .unwrap();
        assert_eq!(chart.radius, 150.0);
        assert_eq!(chart.translate, (550.0, 250.0));
        assert_eq!(chart.wedges.len(), 8);

        let con = &chart.wedges[0];
        assert_eq!(con.start_angle, 0.0);
        assert_eq!(con.label, "Conservatives: 40.0%");
        assert_eq!(con.text_anchor, TextAnchor::Start);
        assert!((con.label_pos.0 - 150.0 * 1.45).abs() < EPS);
        // The inner centroid sits at half the radius.
        let (cx, cy) = con.leader[0];
        assert!(((cx * cx + cy * cy).sqrt() - 75.0).abs() < EPS);
        let (ox, oy) = con.leader[1];
        assert!(((ox * ox + oy * oy).sqrt() - 195.0).abs() < EPS);

        // Labour is centered past pi: label on the left.
        let lab = &chart.wedges[1];
        assert!(lab.mid_angle() > PI);
        assert_eq!(lab.text_anchor, TextAnchor::End);
        assert!((lab.leader[2].0 + 150.0 * 1.4).abs() < EPS);

        // Plaid and Others are in the left half but forced to the right.
        let plaid = &chart.wedges[PartyId::Plaid.index()];
        assert!(plaid.mid_angle() > PI);
        assert_eq!(plaid.text_anchor, TextAnchor::Start);
        assert!((plaid.label_pos.0 - 150.0 * 1.45).abs() < EPS);
        let others = &chart.wedges[PartyId::Others.index()];
        assert!((others.leader[2].1 - (others.leader[1].1 - 15.0)).abs() < EPS);
        assert!((others.label_pos.1 - (others.leader[1].1 - 25.0)).abs() < EPS);
        // Wedges are laid out by decreasing share: Plaid is the smallest.
        assert!((others.start_angle - 0.93 * 2.0 * PI).abs() < 1e-6);
        assert!((plaid.end_angle - 2.0 * PI).abs() < 1e-6);
    }

    #[test]
    fn pie_wedges_ordered_by_share() {
        let mut values = [0.0; 8];
        values[PartyId::Conservatives.index()] = 20.0;
        values[PartyId::Labour.index()] = 40.0;
        let chart = pie_geometry(&shares(values), &PieLayout::default()).unwrap();
        let lab = &chart.wedges[PartyId::Labour.index()];
        let con = &chart.wedges[PartyId::Conservatives.index()];
        assert_eq!(lab.start_angle, 0.0);
        assert!((con.start_angle - lab.end_angle).abs() < EPS);
        assert!((con.end_angle - 2.0 * PI).abs() < EPS);

        let layout = PieLayout {
            sort_by_value: false,
            ..PieLayout::default()
        };
        let chart = pie_geometry(&shares(values), &layout).unwrap();
        let con = &chart.wedges[PartyId::Conservatives.index()];
        assert_eq!(con.start_angle, 0.0);
        assert!((con.end_angle - 2.0 * PI / 3.0).abs() < EPS);
    }

    #[test]
    fn pie_overrides_are_configurable() {
        let layout = PieLayout {
            overrides: vec![],
            ..PieLayout::default()
        };
        let chart = pie_geometry(
            &shares([40.0, 34.0, 8.0, 5.0, 6.0, 1.0, 2.0, 4.0]),
            &layout,
        )
        .unwrap();
        let plaid = &chart.wedges[PartyId::Plaid.index()];
        assert_eq!(plaid.text_anchor, TextAnchor::End);
    }

    #[test]
    fn heatmap_cells() {
        let profile = RegionProfile {
            regions: vec![
                RegionMeans {
                    region: "London".to_string(),
                    means: PartyId::ALL.iter().map(|p| (*p, 0.0)).collect(),
                },
                RegionMeans {
                    region: "Wales".to_string(),
                    means: PartyId::ALL
                        .iter()
                        .map(|p| (*p, if *p == PartyId::Plaid { 1.0 } else { f64::NAN }))
                        .collect(),
                },
            ],
        };
        let layout = HeatmapLayout::DEFAULT;
        let map = heatmap_geometry(&profile, &layout);
        assert_eq!(map.cells.len(), 16);
        assert_eq!(map.width, 550.0);
        assert_eq!(map.height, 400.0);
        assert_eq!(map.translate, (150.0, 10.0));
        assert_eq!(map.columns[0].label, "Con");
        assert_eq!(map.rows[1].label, "Wales");

        // x: step = 400 / (8 - 0.2 + 0.4), y: step = 340 / (2 - 0.2 + 0.4)
        let x_step = 400.0 / 8.2;
        let y_step = 340.0 / 2.2;
        let first = &map.cells[0];
        assert_eq!(first.party, PartyId::Conservatives);
        assert_eq!(first.region, "London");
        assert!((first.x - x_step * 0.2).abs() < EPS);
        assert!((first.y - y_step * 0.2).abs() < EPS);
        assert!((first.width - x_step * 0.8).abs() < EPS);
        assert!((first.height - y_step * 0.8).abs() < EPS);
        assert_eq!(first.fill, Some("#A50026".to_string()));
        assert_eq!(first.label, "0.0");

        let plaid = &map.cells[8 + PartyId::Plaid.index()];
        assert_eq!(plaid.fill, Some("#313695".to_string()));
        assert_eq!(plaid.label, "1.0");
        let missing = &map.cells[8];
        assert_eq!(missing.fill, None);
        assert_eq!(missing.label, "NaN");
    }
}
