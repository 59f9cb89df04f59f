pub use crate::config::*;

use std::collections::HashMap;

use log::debug;

/// A builder for adding spreadsheet rows one at a time.
///
/// The builder checks once that the header has all the required columns,
/// and then parses the rows positionally.
///
/// ```
/// pub use poll_charts::builder::Builder;
/// pub use poll_charts::RawValue;
/// # use poll_charts::ChartErrors;
///
/// let header: Vec<String> = poll_charts::required_columns()
///     .iter()
///     .map(|s| s.to_string())
///     .collect();
/// let mut builder = Builder::new(&header)?;
///
/// let mut row = vec![RawValue::Number(0.1); header.len()];
/// row[0] = RawValue::Text("Labour".to_string());
/// row[1] = RawValue::Text("London".to_string());
/// builder.add_row(&row);
///
/// let records = builder.build();
/// assert_eq!(records[0].winner, poll_charts::PartyId::Labour);
/// # Ok::<(), ChartErrors>(())
/// ```
pub struct Builder {
    pub(crate) _columns: HashMap<String, usize>,
    pub(crate) _records: Vec<ConstituencyRecord>,
}

impl Builder {
    pub fn new(header: &[String]) -> Result<Builder, ChartErrors> {
        let mut columns: HashMap<String, usize> = HashMap::new();
        for (idx, name) in header.iter().enumerate() {
            // The first column wins when a name is repeated.
            columns.entry(name.clone()).or_insert(idx);
        }
        for name in required_columns() {
            if !columns.contains_key(name) {
                return Err(ChartErrors::MissingColumn(name.to_string()));
            }
        }
        debug!("Builder::new: columns: {:?}", columns);
        Ok(Builder {
            _columns: columns,
            _records: Vec::new(),
        })
    }

    /// Adds a row. Cells are in the order of the header; missing trailing
    /// cells are treated as empty.
    pub fn add_row(&mut self, cells: &[RawValue]) {
        let row_idx = self._records.len();
        let columns = &self._columns;
        let record = crate::make_record(row_idx, |col| {
            columns.get(col).and_then(|idx| cells.get(*idx))
        });
        self._records.push(record);
    }

    pub fn len(&self) -> usize {
        self._records.len()
    }

    pub fn is_empty(&self) -> bool {
        self._records.is_empty()
    }

    pub fn build(self) -> Vec<ConstituencyRecord> {
        self._records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> Vec<String> {
        required_columns().iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn missing_column() {
        let mut h = header();
        h.retain(|c| c != "SNPShare");
        h.push("snpshare".to_string());
        assert_eq!(
            Builder::new(&h).err(),
            Some(ChartErrors::MissingColumn("SNPShare".to_string()))
        );
    }

    #[test]
    fn rows_in_order() {
        let mut h = vec!["Constituency".to_string()];
        h.extend(header());
        let mut builder = Builder::new(&h).unwrap();
        assert!(builder.is_empty());
        let mut row = vec![RawValue::Text("Islington North".to_string())];
        row.push(RawValue::Text("Labour".to_string()));
        row.push(RawValue::Text("London".to_string()));
        row.extend((0..8).map(|i| RawValue::Number(i as f64)));
        // Short row: TotalShare is missing
        builder.add_row(&row);
        let mut second = row.clone();
        second[1] = RawValue::Text("Green".to_string());
        second.push(RawValue::Text("28".to_string()));
        builder.add_row(&second);
        assert_eq!(builder.len(), 2);
        assert!(!builder.is_empty());

        let records = builder.build();
        assert_eq!(records[0].winner, PartyId::Labour);
        assert_eq!(records[0].share_of(PartyId::SNP), 6.0);
        assert!(records[0].total_share.is_nan());
        assert_eq!(records[1].winner, PartyId::Green);
        assert_eq!(records[1].total_share, 28.0);
    }
}
