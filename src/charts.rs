use log::{debug, info, warn};

use poll_charts::geometry::{bar_geometry, heatmap_geometry, pie_geometry};
use poll_charts::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::charts::config_reader::*;
use crate::charts::io_common::{guess_provider, simplify_file_name, Provider};
use crate::charts::summary::build_document_js;

pub mod config_reader;
pub mod io_common;
pub mod io_csv;
pub mod io_xlsx;
pub mod summary;

#[derive(Debug, Snafu)]
pub enum ChartError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The workbook {path} has no worksheet"))]
    EmptyExcel { path: String },
    #[snafu(display("The workbook {path} has no worksheet named {name:?}"))]
    MissingWorksheet { path: String, name: String },
    #[snafu(display("The worksheet of {path} has no header row"))]
    MissingHeader { path: String },
    #[snafu(display("Error opening file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno} of {path}"))]
    CsvLineParse {
        source: csv::Error,
        path: String,
        lineno: usize,
    },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing json"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing file {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Cannot read the polls in {path}: {source}"))]
    InvalidTable { source: ChartErrors, path: String },
    #[snafu(display("Cannot compute the charts: {source}"))]
    Geometry { source: ChartErrors },
    #[snafu(display("Unknown provider {provider:?}, expected xlsx or csv"))]
    UnknownProvider { provider: String },
    #[snafu(display("No input file: pass --input or --config"))]
    MissingInput {},
    #[snafu(display("The configuration file has no parent directory"))]
    MissingParentDir {},
    #[snafu(display("Difference detected between the computed charts and the reference {path}"))]
    ReferenceMismatch { path: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type ChartResult<T> = Result<T, ChartError>;

/// The input file, once the configuration and the command line are merged.
#[derive(PartialEq, Debug, Clone)]
struct InputSpec {
    path: PathBuf,
    provider: Provider,
    worksheet: Option<String>,
}

fn resolve_input(args: &Args, config: &ReportConfig, root: &Path) -> ChartResult<InputSpec> {
    // The command line path is relative to the current directory, the
    // configured one to the configuration file.
    let path = match (&args.input, &config.data_source) {
        (Some(p), _) => PathBuf::from(p),
        (None, Some(ds)) => root.join(&ds.file_path),
        (None, None) => return MissingInputSnafu {}.fail(),
    };
    let provider_name = args.input_type.clone().or_else(|| {
        config
            .data_source
            .as_ref()
            .and_then(|ds| ds.provider.clone())
    });
    let provider = match provider_name {
        Some(name) => {
            Provider::from_name(&name).context(UnknownProviderSnafu { provider: name })?
        }
        None => guess_provider(&path)?,
    };
    let worksheet = args.excel_worksheet_name.clone().or_else(|| {
        config
            .data_source
            .as_ref()
            .and_then(|ds| ds.worksheet_name.clone())
    });
    Ok(InputSpec {
        path,
        provider,
        worksheet,
    })
}

fn read_records(input: &InputSpec) -> ChartResult<Vec<ConstituencyRecord>> {
    let path = input.path.display().to_string();
    info!(
        "read_records: reading {} as {:?}",
        simplify_file_name(&path),
        input.provider
    );
    match input.provider {
        Provider::Xlsx => io_xlsx::read_excel_file(&path, input.worksheet.as_deref()),
        Provider::Csv => {
            if input.worksheet.is_some() {
                warn!("read_records: worksheet name ignored for the csv file {}", path);
            }
            io_csv::read_csv_file(&path)
        }
    }
}

/// The destination of the chart document, if any.
fn resolve_output(args: &Args, config: &ReportConfig, root: &Path) -> Option<String> {
    match (&args.out, &config.output_settings.output_path) {
        (Some(o), _) => Some(o.clone()),
        (None, Some(o)) if o == "stdout" => Some(o.clone()),
        (None, Some(o)) => Some(root.join(o).display().to_string()),
        (None, None) => None,
    }
}

fn write_output(out: &str, pretty_js: &str) -> ChartResult<()> {
    if out == "stdout" {
        println!("{}", pretty_js);
    } else {
        info!("write_output: writing {}", out);
        fs::write(out, pretty_js).context(WritingOutputSnafu { path: out })?;
    }
    Ok(())
}

/// Computes the aggregates and the geometry of the three charts.
pub fn compute_document(
    config: &ReportConfig,
    records: &[ConstituencyRecord],
    options: &ChartOptions,
) -> ChartResult<JSValue> {
    let seats = count_by_winner(records);
    let shares = share_by_party(records, options.missing_values);
    let regions = mean_share_by_region(records, options.missing_values);
    debug!("compute_document: seats: {:?}", seats);
    debug!("compute_document: shares: {:?}", shares);

    let bar = bar_geometry(&seats, &options.bar).context(GeometrySnafu {})?;
    let pie = pie_geometry(&shares, &options.pie).context(GeometrySnafu {})?;
    let heatmap = heatmap_geometry(&regions, &options.heatmap);

    Ok(build_document_js(
        config, &seats, &shares, &regions, &bar, &pie, &heatmap,
    ))
}

/// Runs a full report: reads the configuration and the polls, computes the
/// chart document, writes it and compares it with the reference.
pub fn run_report(args: &Args) -> ChartResult<JSValue> {
    let (config, root) = match &args.config {
        Some(config_path) => {
            let config = read_config(config_path)?;
            let root = Path::new(config_path.as_str())
                .parent()
                .context(MissingParentDirSnafu {})?
                .to_path_buf();
            (config, root)
        }
        None => (ReportConfig::from_input(args.input.as_deref()), PathBuf::new()),
    };
    info!("config: {:?}", config);

    let options = config.chart_options()?;
    let input = resolve_input(args, &config, &root)?;
    let records = read_records(&input)?;
    info!("run_report: {} constituencies", records.len());

    let result_js = compute_document(&config, &records, &options)?;
    let pretty_js = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;

    if let Some(out) = resolve_output(args, &config, &root) {
        write_output(&out, &pretty_js)?;
    }

    // The reference document, if provided for comparison
    if let Some(reference_p) = &args.reference {
        let reference = read_reference(reference_p)?;
        let pretty_js_reference =
            serde_json::to_string_pretty(&reference).context(ParsingJsonSnafu {})?;
        if pretty_js_reference != pretty_js {
            warn!("Found differences with the reference document");
            print_diff(pretty_js_reference.as_str(), pretty_js.as_str(), "\n");
            return ReferenceMismatchSnafu {
                path: reference_p.clone(),
            }
            .fail();
        }
    }

    Ok(result_js)
}
