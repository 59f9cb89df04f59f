// Primitives for reading CSV files.

use poll_charts::builder::Builder;

use crate::charts::{
    io_common::{clean_header, simplify_file_name},
    *,
};

fn to_raw(cell: &str) -> RawValue {
    if cell.is_empty() {
        RawValue::Empty
    } else {
        RawValue::Text(cell.to_string())
    }
}

pub fn read_csv_file(path: &str) -> ChartResult<Vec<ConstituencyRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;

    let header_record = rdr.headers().context(CsvLineParseSnafu { path, lineno: 1_usize })?;
    let header = clean_header(&header_record.iter().collect::<Vec<&str>>());
    debug!("read_csv_file: header: {:?}", header);
    if header.iter().all(|h| h.is_empty()) {
        return MissingHeaderSnafu { path }.fail();
    }
    let mut builder = Builder::new(&header).context(InvalidTableSnafu { path })?;

    for (idx, line_r) in rdr.records().enumerate() {
        // The header is on the first line.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { path, lineno })?;
        let row: Vec<RawValue> = line.iter().map(to_raw).collect();
        builder.add_row(&row);
    }
    if builder.is_empty() {
        warn!("read_csv_file: no rows after the header in {}", path);
    }
    info!(
        "read_csv_file: {} rows in {}",
        builder.len(),
        simplify_file_name(path)
    );
    Ok(builder.build())
}
