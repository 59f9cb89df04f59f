use crate::charts::*;

use serde::{Deserialize, Serialize};

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    pub title: String,
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DataSource {
    pub provider: Option<String>,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "worksheetName")]
    pub worksheet_name: Option<String>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct LabelOverrideConfig {
    pub party: String,
    pub side: String,
    #[serde(rename = "lineOffset")]
    pub line_offset: Option<f64>,
    #[serde(rename = "labelOffset")]
    pub label_offset: Option<f64>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ReportOptions {
    #[serde(rename = "missingValues")]
    pub missing_values: Option<String>,
    #[serde(rename = "sortWedgesByValue")]
    pub sort_wedges_by_value: Option<bool>,
    #[serde(rename = "labelOverrides")]
    pub label_overrides: Option<Vec<LabelOverrideConfig>>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    #[serde(rename = "dataSource")]
    pub data_source: Option<DataSource>,
    pub options: Option<ReportOptions>,
}

impl ReportConfig {
    /// The configuration used when only an input file is given.
    pub fn from_input(input: Option<&str>) -> ReportConfig {
        let title = input
            .and_then(|p| Path::new(p).file_stem())
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_string();
        ReportConfig {
            output_settings: OutputSettings {
                title,
                output_path: None,
            },
            data_source: None,
            options: None,
        }
    }

    pub fn chart_options(&self) -> ChartResult<ChartOptions> {
        let mut res = ChartOptions::default();
        let opts = match &self.options {
            Some(x) => x,
            None => return Ok(res),
        };
        res.missing_values = match opts.missing_values.as_deref() {
            None | Some("propagate") => MissingValuePolicy::Propagate,
            Some("skip") => MissingValuePolicy::Skip,
            Some(x) => whatever!(
                "Unknown value for missingValues: {:?}, expected propagate or skip",
                x
            ),
        };
        res.pie.sort_by_value = opts.sort_wedges_by_value.unwrap_or(true);
        if let Some(overrides) = &opts.label_overrides {
            res.pie.overrides = overrides
                .iter()
                .map(read_label_override)
                .collect::<ChartResult<Vec<LabelOverride>>>()?;
        }
        debug!("chart_options: {:?}", res);
        Ok(res)
    }
}

fn read_label_override(lo: &LabelOverrideConfig) -> ChartResult<LabelOverride> {
    let party = match PartyId::from_label(&lo.party) {
        Some(p) => p,
        None => whatever!("Unknown party in labelOverrides: {:?}", lo.party),
    };
    let side = match lo.side.as_str() {
        "left" => LabelSide::Left,
        "right" => LabelSide::Right,
        x => whatever!("Unknown side in labelOverrides: {:?}, expected left or right", x),
    };
    Ok(LabelOverride {
        party,
        side,
        line_offset: lo.line_offset.unwrap_or(0.0),
        label_offset: lo.label_offset.unwrap_or(0.0),
    })
}

pub fn read_config(path: &str) -> ChartResult<ReportConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: ReportConfig = serde_json::from_str(&contents).context(ParsingJsonSnafu {})?;
    Ok(config)
}

pub fn read_reference(path: &str) -> ChartResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}
