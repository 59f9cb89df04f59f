// Primitives for reading Excel workbooks.

use calamine::{open_workbook, DataType, Reader, Xlsx};
use poll_charts::builder::Builder;

use crate::charts::{
    io_common::{clean_header, simplify_file_name},
    *,
};

fn to_raw(cell: &DataType) -> RawValue {
    match cell {
        DataType::Float(f) => RawValue::Number(*f),
        DataType::Int(i) => RawValue::Number(*i as f64),
        DataType::String(s) => RawValue::Text(s.clone()),
        DataType::Bool(b) => RawValue::Bool(*b),
        // Dates and formula errors are not shares.
        _ => RawValue::Empty,
    }
}

fn header_name(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.clone(),
        DataType::Empty => "".to_string(),
        x => x.to_string(),
    }
}

fn get_range(path: &str, worksheet: Option<&str>) -> ChartResult<calamine::Range<DataType>> {
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let wrange = match worksheet {
        Some(name) => workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu { path, name })?
            .context(OpeningExcelSnafu { path })?,
        None => workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu { path })?
            .context(OpeningExcelSnafu { path })?,
    };
    Ok(wrange)
}

/// Reads the polls from the given worksheet, or from the first one.
pub fn read_excel_file(
    path: &str,
    worksheet: Option<&str>,
) -> ChartResult<Vec<ConstituencyRecord>> {
    let wrange = get_range(path, worksheet)?;
    let mut iter = wrange.rows();

    let header_cells = iter.next().context(MissingHeaderSnafu { path })?;
    let header = clean_header(&header_cells.iter().map(header_name).collect::<Vec<String>>());
    debug!("read_excel_file: header: {:?}", header);
    let mut builder = Builder::new(&header).context(InvalidTableSnafu { path })?;

    for row in iter {
        let cells: Vec<RawValue> = row.iter().map(to_raw).collect();
        if cells.iter().all(|c| *c == RawValue::Empty) {
            // Trailing empty rows are common in hand-edited workbooks.
            continue;
        }
        builder.add_row(&cells);
    }
    if builder.is_empty() {
        warn!("read_excel_file: no rows after the header in {}", path);
    }
    info!(
        "read_excel_file: {} rows in {}",
        builder.len(),
        simplify_file_name(path)
    );
    Ok(builder.build())
}
