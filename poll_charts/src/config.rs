// ********* Input data structures ***********

use std::collections::HashMap;
use std::error::Error;
use std::fmt::Display;

/// The parties tracked in the polling data.
///
/// The order of the variants is the canonical order used by the pie chart and
/// the heatmap columns.
#[allow(clippy::upper_case_acronyms)]
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum PartyId {
    Conservatives,
    Labour,
    LibDems,
    Green,
    Reform,
    Plaid,
    SNP,
    Others,
}

impl PartyId {
    pub const ALL: [PartyId; 8] = [
        PartyId::Conservatives,
        PartyId::Labour,
        PartyId::LibDems,
        PartyId::Green,
        PartyId::Reform,
        PartyId::Plaid,
        PartyId::SNP,
        PartyId::Others,
    ];

    /// The name displayed on the bar chart and the pie labels.
    pub fn label(&self) -> &'static str {
        match self {
            PartyId::Conservatives => "Conservatives",
            PartyId::Labour => "Labour",
            PartyId::LibDems => "Lib Dems",
            PartyId::Green => "Green",
            PartyId::Reform => "Reform",
            PartyId::Plaid => "Plaid",
            PartyId::SNP => "SNP",
            PartyId::Others => "Others",
        }
    }

    /// The compact name used for the heatmap columns.
    pub fn short_label(&self) -> &'static str {
        match self {
            PartyId::Conservatives => "Con",
            PartyId::Labour => "Lab",
            PartyId::LibDems => "LibDem",
            PartyId::Green => "Green",
            PartyId::Reform => "Reform",
            PartyId::Plaid => "Plaid",
            PartyId::SNP => "SNP",
            PartyId::Others => "Others",
        }
    }

    /// The spreadsheet column holding the vote share of this party.
    pub fn share_column(&self) -> &'static str {
        match self {
            PartyId::Conservatives => "ConShare",
            PartyId::Labour => "LabShare",
            PartyId::LibDems => "LibDemShare",
            PartyId::Green => "GreenShare",
            PartyId::Reform => "ReformShare",
            PartyId::Plaid => "PlaidShare",
            PartyId::SNP => "SNPShare",
            PartyId::Others => "OthersShare",
        }
    }

    /// Position of the party in the canonical order.
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Resolves a winner label as found in the spreadsheet.
    ///
    /// Accepts the display label, the short label and a few common spellings.
    pub fn from_label(s: &str) -> Option<PartyId> {
        let s = s.trim();
        if let Some(p) = PartyId::ALL
            .iter()
            .find(|p| p.label() == s || p.short_label() == s)
        {
            return Some(*p);
        }
        match s {
            "Conservative" | "Con." => Some(PartyId::Conservatives),
            "Lib Dem" | "Liberal Democrats" | "Liberal Democrat" => Some(PartyId::LibDems),
            "Green Party" => Some(PartyId::Green),
            "Reform UK" => Some(PartyId::Reform),
            "Plaid Cymru" => Some(PartyId::Plaid),
            "Scottish National Party" => Some(PartyId::SNP),
            "Other" => Some(PartyId::Others),
            _ => None,
        }
    }
}

impl Display for PartyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

pub const WINNER_COLUMN: &str = "Winner2024";
pub const REGION_COLUMN: &str = "Region";
pub const TOTAL_SHARE_COLUMN: &str = "TotalShare";

/// All the columns that a data source must provide.
pub fn required_columns() -> Vec<&'static str> {
    let mut cols = vec![WINNER_COLUMN, REGION_COLUMN];
    cols.extend(PartyId::ALL.iter().map(|p| p.share_column()));
    cols.push(TOTAL_SHARE_COLUMN);
    cols
}

/// A single cell, as decoded from a spreadsheet.
#[derive(PartialEq, Debug, Clone)]
pub enum RawValue {
    Number(f64),
    Text(String),
    Bool(bool),
    Empty,
}

/// A spreadsheet row, keyed by the header of each column.
pub type RawRecord = HashMap<String, RawValue>;

/// One electoral constituency.
#[derive(PartialEq, Debug, Clone)]
pub struct ConstituencyRecord {
    pub winner: PartyId,
    pub region: String,
    /// Vote shares in canonical party order. Values are not validated and may be NaN.
    pub shares: [f64; 8],
    pub total_share: f64,
}

impl ConstituencyRecord {
    pub fn share_of(&self, party: PartyId) -> f64 {
        self.shares[party.index()]
    }
}

// ******** Output data structures *********

/// Number of constituencies won by each party, in encounter order.
///
/// Parties that won nothing are absent.
#[derive(PartialEq, Debug, Clone)]
pub struct AggregateCount {
    pub counts: Vec<(PartyId, u64)>,
}

impl AggregateCount {
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|(_, c)| *c).sum()
    }

    /// The counts sorted by decreasing number of seats.
    ///
    /// Ties keep the encounter order.
    pub fn ranked(&self) -> Vec<(PartyId, u64)> {
        let mut res = self.counts.clone();
        res.sort_by(|a, b| b.1.cmp(&a.1));
        res
    }
}

/// Percentage of the total vote share, for every party in canonical order.
#[derive(PartialEq, Debug, Clone)]
pub struct AggregateShare {
    pub shares: Vec<(PartyId, f64)>,
}

/// Mean share of each party over the constituencies of one region.
#[derive(PartialEq, Debug, Clone)]
pub struct RegionMeans {
    pub region: String,
    pub means: Vec<(PartyId, f64)>,
}

/// One entry per region, in encounter order.
#[derive(PartialEq, Debug, Clone)]
pub struct RegionProfile {
    pub regions: Vec<RegionMeans>,
}

/// Errors that prevent a chart from being computed.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ChartErrors {
    InvalidColor(String),
    MissingColumn(String),
}

impl Error for ChartErrors {}

impl Display for ChartErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChartErrors::InvalidColor(c) => write!(f, "invalid color {:?}, expected #RRGGBB", c),
            ChartErrors::MissingColumn(c) => write!(f, "missing column {:?} in the header", c),
        }
    }
}

// ********* Configuration **********

/// What to do with the share values that could not be parsed.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum MissingValuePolicy {
    /// NaN values are kept: a single bad row turns a sum or a mean into NaN.
    Propagate,
    /// NaN values are ignored by sums, and means only count the valid values.
    Skip,
}

/// Side of the pie on which a label is placed.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum LabelSide {
    Left,
    Right,
}

/// A manual placement for the label of one party on the pie chart.
#[derive(PartialEq, Debug, Clone)]
pub struct LabelOverride {
    pub party: PartyId,
    pub side: LabelSide,
    /// Vertical offset of the end of the leader line.
    pub line_offset: f64,
    /// Vertical offset of the label text.
    pub label_offset: f64,
}

#[derive(PartialEq, Debug, Clone)]
pub struct BarLayout {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
    pub margin_left: f64,
    pub margin_top: f64,
    /// Space added to the chart size to get the size of the canvas.
    pub canvas_extra: f64,
    /// Percentage given to `lighten` for the hover color.
    pub highlight_percent: f64,
    /// Distance between the top of a bar and its value label.
    pub label_gap: f64,
}

impl BarLayout {
    pub const DEFAULT: BarLayout = BarLayout {
        width: 400.0,
        height: 300.0,
        padding: 0.1,
        margin_left: 50.0,
        margin_top: 10.0,
        canvas_extra: 50.0,
        highlight_percent: -20.0,
        label_gap: 5.0,
    };
}

#[derive(PartialEq, Debug, Clone)]
pub struct PieLayout {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
    pub outer_arc_factor: f64,
    pub line_factor: f64,
    pub label_factor: f64,
    pub highlight_percent: f64,
    /// Assign the angles by decreasing share, the largest wedge starting at
    /// 0. When unset, the angles follow the party order.
    pub sort_by_value: bool,
    pub overrides: Vec<LabelOverride>,
}

impl PieLayout {
    pub fn radius(&self) -> f64 {
        self.width.min(self.height) / 2.0
    }

    /// Placements that keep the small parties from colliding.
    pub fn default_overrides() -> Vec<LabelOverride> {
        vec![
            LabelOverride {
                party: PartyId::Plaid,
                side: LabelSide::Right,
                line_offset: 0.0,
                label_offset: 0.0,
            },
            LabelOverride {
                party: PartyId::Others,
                side: LabelSide::Right,
                line_offset: -15.0,
                label_offset: -25.0,
            },
        ]
    }
}

impl Default for PieLayout {
    fn default() -> Self {
        PieLayout {
            width: 900.0,
            height: 300.0,
            margin: 200.0,
            outer_arc_factor: 1.3,
            line_factor: 1.4,
            label_factor: 1.45,
            highlight_percent: -20.0,
            sort_by_value: true,
            overrides: PieLayout::default_overrides(),
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

#[derive(PartialEq, Debug, Clone)]
pub struct HeatmapLayout {
    pub width: f64,
    /// Height of the whole canvas, margins included.
    pub outer_height: f64,
    pub margin: Margin,
    pub padding: f64,
    pub color_domain: (f64, f64),
}

impl HeatmapLayout {
    pub const DEFAULT: HeatmapLayout = HeatmapLayout {
        width: 400.0,
        outer_height: 400.0,
        margin: Margin {
            top: 10.0,
            right: 0.0,
            bottom: 50.0,
            left: 150.0,
        },
        padding: 0.2,
        color_domain: (0.0, 1.0),
    };

    pub fn height(&self) -> f64 {
        self.outer_height - self.margin.top - self.margin.bottom
    }
}

/// All the settings that govern a report.
#[derive(PartialEq, Debug, Clone)]
pub struct ChartOptions {
    pub missing_values: MissingValuePolicy,
    pub bar: BarLayout,
    pub pie: PieLayout,
    pub heatmap: HeatmapLayout,
}

impl Default for ChartOptions {
    fn default() -> Self {
        ChartOptions {
            missing_values: MissingValuePolicy::Propagate,
            bar: BarLayout::DEFAULT,
            pie: PieLayout::default(),
            heatmap: HeatmapLayout::DEFAULT,
        }
    }
}
