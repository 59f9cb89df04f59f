mod config;
pub mod builder;
pub mod color;
pub mod geometry;
pub mod manual;
pub mod scale;

use log::{debug, info, warn};

use std::collections::HashMap;

pub use crate::config::*;

// **** Row parsing ****

/// Parses a string the way a browser `parseFloat` does.
///
/// Leading whitespace is skipped and the longest numeric prefix is read, so
/// `"12.5%"` gives 12.5. A string without a numeric prefix gives NaN.
pub fn parse_float(s: &str) -> f64 {
    let t = s.trim_start();
    let b = t.as_bytes();
    let mut idx = 0;
    let mut negative = false;
    if let Some(&sign) = b.first() {
        if sign == b'+' || sign == b'-' {
            negative = sign == b'-';
            idx += 1;
        }
    }
    if t[idx..].starts_with("Infinity") {
        return if negative {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }
    let int_start = idx;
    while idx < b.len() && b[idx].is_ascii_digit() {
        idx += 1;
    }
    let int_digits = idx - int_start;
    let mut frac_digits = 0;
    if idx < b.len() && b[idx] == b'.' {
        let mut end = idx + 1;
        while end < b.len() && b[end].is_ascii_digit() {
            end += 1;
        }
        frac_digits = end - idx - 1;
        if int_digits > 0 || frac_digits > 0 {
            idx = end;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return f64::NAN;
    }
    // The exponent only counts when it has digits.
    if idx < b.len() && (b[idx] == b'e' || b[idx] == b'E') {
        let mut end = idx + 1;
        if end < b.len() && (b[end] == b'+' || b[end] == b'-') {
            end += 1;
        }
        let exp_start = end;
        while end < b.len() && b[end].is_ascii_digit() {
            end += 1;
        }
        if end > exp_start {
            idx = end;
        }
    }
    t[..idx].parse::<f64>().unwrap_or(f64::NAN)
}

/// Coerces a cell to a number. Anything that is not numeric becomes NaN.
pub fn coerce_number(cell: Option<&RawValue>) -> f64 {
    match cell {
        Some(RawValue::Number(x)) => *x,
        Some(RawValue::Text(s)) => parse_float(s),
        Some(RawValue::Bool(_)) | Some(RawValue::Empty) | None => f64::NAN,
    }
}

fn coerce_text(cell: Option<&RawValue>) -> String {
    match cell {
        Some(RawValue::Text(s)) => s.clone(),
        Some(RawValue::Number(x)) => x.to_string(),
        Some(RawValue::Bool(b)) => b.to_string(),
        Some(RawValue::Empty) | None => "".to_string(),
    }
}

/// Builds a record from a lookup function over the columns.
///
/// Unknown winners are attributed to `Others`, so that every row counts
/// towards exactly one party.
pub(crate) fn make_record<'a, F>(row_idx: usize, lookup: F) -> ConstituencyRecord
where
    F: Fn(&str) -> Option<&'a RawValue>,
{
    let winner_s = coerce_text(lookup(WINNER_COLUMN));
    let winner = match PartyId::from_label(&winner_s) {
        Some(p) => p,
        None => {
            warn!(
                "make_record: row {}: unknown winner {:?}, counted as {}",
                row_idx,
                winner_s,
                PartyId::Others
            );
            PartyId::Others
        }
    };
    let mut shares = [f64::NAN; 8];
    for p in PartyId::ALL.iter() {
        shares[p.index()] = coerce_number(lookup(p.share_column()));
    }
    let record = ConstituencyRecord {
        winner,
        region: coerce_text(lookup(REGION_COLUMN)),
        shares,
        total_share: coerce_number(lookup(TOTAL_SHARE_COLUMN)),
    };
    if record.shares.iter().any(|x| x.is_nan()) {
        debug!("make_record: row {}: non-numeric share: {:?}", row_idx, record);
    }
    record
}

/// Normalizes raw spreadsheet rows into constituency records.
///
/// No row is dropped and the order is preserved.
pub fn parse_records(raw: &[RawRecord]) -> Vec<ConstituencyRecord> {
    info!("parse_records: parsing {} rows", raw.len());
    raw.iter()
        .enumerate()
        .map(|(idx, r)| make_record(idx, |col| r.get(col)))
        .collect()
}

// **** Aggregation ****

fn sum_values<I: Iterator<Item = f64>>(values: I, policy: MissingValuePolicy) -> f64 {
    match policy {
        MissingValuePolicy::Propagate => values.sum(),
        MissingValuePolicy::Skip => values.filter(|x| !x.is_nan()).sum(),
    }
}

fn mean_values<I: Iterator<Item = f64>>(values: I, policy: MissingValuePolicy) -> f64 {
    let mut total = 0.0;
    let mut count: usize = 0;
    for x in values {
        if policy == MissingValuePolicy::Skip && x.is_nan() {
            continue;
        }
        total += x;
        count += 1;
    }
    if count == 0 {
        f64::NAN
    } else {
        total / count as f64
    }
}

/// Number of constituencies won by each party.
///
/// The parties are listed in the order in which they first appear.
pub fn count_by_winner(records: &[ConstituencyRecord]) -> AggregateCount {
    let mut counts: Vec<(PartyId, u64)> = Vec::new();
    for r in records.iter() {
        if let Some(e) = counts.iter_mut().find(|(p, _)| *p == r.winner) {
            e.1 += 1;
        } else {
            counts.push((r.winner, 1));
        }
    }
    debug!("count_by_winner: {:?}", counts);
    AggregateCount { counts }
}

/// Share of the total vote of each party, in percent.
///
/// The total is the sum of the `TotalShare` column. A zero total is not
/// special-cased and gives NaN or infinite shares.
pub fn share_by_party(records: &[ConstituencyRecord], policy: MissingValuePolicy) -> AggregateShare {
    let total = sum_values(records.iter().map(|r| r.total_share), policy);
    let shares: Vec<(PartyId, f64)> = PartyId::ALL
        .iter()
        .map(|p| {
            let s = sum_values(records.iter().map(|r| r.share_of(*p)), policy);
            (*p, s / total * 100.0)
        })
        .collect();
    debug!("share_by_party: total: {} shares: {:?}", total, shares);
    AggregateShare { shares }
}

/// Mean share of each party in each region.
///
/// Regions are listed in the order in which they first appear.
pub fn mean_share_by_region(
    records: &[ConstituencyRecord],
    policy: MissingValuePolicy,
) -> RegionProfile {
    let mut region_idx: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Vec<&ConstituencyRecord>)> = Vec::new();
    for r in records.iter() {
        let idx = *region_idx.entry(r.region.as_str()).or_insert_with(|| {
            groups.push((r.region.as_str(), Vec::new()));
            groups.len() - 1
        });
        groups[idx].1.push(r);
    }

    let regions: Vec<RegionMeans> = groups
        .iter()
        .map(|(region, group)| RegionMeans {
            region: region.to_string(),
            means: PartyId::ALL
                .iter()
                .map(|p| (*p, mean_values(group.iter().map(|r| r.share_of(*p)), policy)))
                .collect(),
        })
        .collect();
    debug!("mean_share_by_region: {} regions", regions.len());
    RegionProfile { regions }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(winner: PartyId, region: &str, shares: [f64; 8]) -> ConstituencyRecord {
        ConstituencyRecord {
            winner,
            region: region.to_string(),
            shares,
            total_share: shares.iter().sum(),
        }
    }

    fn sample() -> Vec<ConstituencyRecord> {
        vec![
            record(
                PartyId::Labour,
                "London",
                [0.2, 0.5, 0.1, 0.1, 0.05, 0.0, 0.0, 0.05],
            ),
            record(
                PartyId::Conservatives,
                "South East",
                [0.4, 0.3, 0.15, 0.05, 0.1, 0.0, 0.0, 0.0],
            ),
            record(
                PartyId::Labour,
                "London",
                [0.1, 0.6, 0.1, 0.1, 0.1, 0.0, 0.0, 0.0],
            ),
            record(
                PartyId::Plaid,
                "Wales",
                [0.1, 0.2, 0.05, 0.05, 0.2, 0.4, 0.0, 0.0],
            ),
        ]
    }

    #[test]
    fn parse_float_reads_numeric_prefix() {
        assert_eq!(parse_float("12.5"), 12.5);
        assert_eq!(parse_float("  12.5%"), 12.5);
        assert_eq!(parse_float("-3e2x"), -300.0);
        assert_eq!(parse_float("4e"), 4.0);
        assert_eq!(parse_float(".5"), 0.5);
        assert_eq!(parse_float("5."), 5.0);
        assert_eq!(parse_float("+7"), 7.0);
        assert_eq!(parse_float("-Infinity"), f64::NEG_INFINITY);
        assert_eq!(parse_float(" +Infinity%"), f64::INFINITY);
        assert_eq!(parse_float("Infinity"), f64::INFINITY);
        assert!(parse_float("-+Infinity").is_nan());
        assert!(parse_float("abc").is_nan());
        assert!(parse_float("").is_nan());
        assert!(parse_float(".").is_nan());
        assert!(parse_float("-").is_nan());
    }

    #[test]
    fn parse_keeps_bad_rows() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut row: RawRecord = HashMap::new();
        row.insert(WINNER_COLUMN.to_string(), RawValue::Text("Labour".to_string()));
        row.insert(REGION_COLUMN.to_string(), RawValue::Text("London".to_string()));
        row.insert("ConShare".to_string(), RawValue::Text("n/a".to_string()));
        row.insert("LabShare".to_string(), RawValue::Number(0.45));
        row.insert("GreenShare".to_string(), RawValue::Text("0.1".to_string()));
        row.insert("ReformShare".to_string(), RawValue::Empty);
        row.insert("PlaidShare".to_string(), RawValue::Bool(true));
        let mut second = row.clone();
        second.insert(WINNER_COLUMN.to_string(), RawValue::Text("Monster Raving Loony".to_string()));

        let records = parse_records(&[row, second]);
        assert_eq!(records.len(), 2);
        let r = &records[0];
        assert_eq!(r.winner, PartyId::Labour);
        assert_eq!(r.region, "London");
        assert!(r.share_of(PartyId::Conservatives).is_nan());
        assert_eq!(r.share_of(PartyId::Labour), 0.45);
        assert_eq!(r.share_of(PartyId::Green), 0.1);
        assert!(r.share_of(PartyId::Reform).is_nan());
        assert!(r.share_of(PartyId::Plaid).is_nan());
        // Missing columns
        assert!(r.share_of(PartyId::SNP).is_nan());
        assert!(r.total_share.is_nan());
        assert_eq!(records[1].winner, PartyId::Others);
    }

    #[test]
    fn total_share_reads_numeric_prefix() {
        let mut row: RawRecord = HashMap::new();
        row.insert(WINNER_COLUMN.to_string(), RawValue::Text("Labour".to_string()));
        row.insert(TOTAL_SHARE_COLUMN.to_string(), RawValue::Text("100%".to_string()));
        let records = parse_records(&[row]);
        assert_eq!(records[0].total_share, 100.0);
    }

    #[test]
    fn winner_aliases() {
        assert_eq!(PartyId::from_label("Lib Dems"), Some(PartyId::LibDems));
        assert_eq!(PartyId::from_label("Reform UK"), Some(PartyId::Reform));
        assert_eq!(PartyId::from_label(" SNP "), Some(PartyId::SNP));
        assert_eq!(PartyId::from_label("Con"), Some(PartyId::Conservatives));
        assert_eq!(PartyId::from_label("labour"), None);
    }

    #[test]
    fn counts_sum_to_records() {
        let records = sample();
        let counts = count_by_winner(&records);
        assert_eq!(counts.total(), records.len() as u64);
        assert_eq!(
            counts.counts,
            vec![
                (PartyId::Labour, 2),
                (PartyId::Conservatives, 1),
                (PartyId::Plaid, 1)
            ]
        );
        // Absent parties are not zero-filled
        assert!(counts.counts.iter().all(|(p, _)| *p != PartyId::SNP));
    }

    #[test]
    fn ranked_is_stable() {
        let counts = AggregateCount {
            counts: vec![
                (PartyId::Green, 1),
                (PartyId::Labour, 3),
                (PartyId::Reform, 1),
                (PartyId::SNP, 3),
            ],
        };
        let ranked: Vec<PartyId> = counts.ranked().iter().map(|(p, _)| *p).collect();
        assert_eq!(
            ranked,
            vec![PartyId::Labour, PartyId::SNP, PartyId::Green, PartyId::Reform]
        );
    }

    #[test]
    fn shares_sum_to_hundred() {
        let records = sample();
        let shares = share_by_party(&records, MissingValuePolicy::Propagate);
        assert_eq!(shares.shares.len(), 8);
        let total: f64 = shares.shares.iter().map(|(_, s)| s).sum();
        assert!((total - 100.0).abs() < 1e-9, "total: {}", total);
        let lab = shares.shares[PartyId::Labour.index()].1;
        assert!((lab - 1.6 / 4.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn shares_with_zero_total() {
        let records = vec![record(PartyId::Labour, "London", [0.0; 8])];
        let shares = share_by_party(&records, MissingValuePolicy::Propagate);
        assert!(shares.shares.iter().all(|(_, s)| s.is_nan()));
    }

    #[test]
    fn missing_values_policy() {
        let mut records = sample();
        records[0].shares[PartyId::Green.index()] = f64::NAN;

        let propagated = share_by_party(&records, MissingValuePolicy::Propagate);
        assert!(propagated.shares[PartyId::Green.index()].1.is_nan());
        assert!(!propagated.shares[PartyId::Labour.index()].1.is_nan());

        let skipped = share_by_party(&records, MissingValuePolicy::Skip);
        assert!(!skipped.shares[PartyId::Green.index()].1.is_nan());

        let profile = mean_share_by_region(&records, MissingValuePolicy::Skip);
        let london = &profile.regions[0];
        assert_eq!(london.region, "London");
        // Only the second London row has a valid value.
        assert_eq!(london.means[PartyId::Green.index()].1, 0.1);

        let profile = mean_share_by_region(&records, MissingValuePolicy::Propagate);
        assert!(profile.regions[0].means[PartyId::Green.index()].1.is_nan());
    }

    #[test]
    fn one_entry_per_region() {
        let records = sample();
        let profile = mean_share_by_region(&records, MissingValuePolicy::Propagate);
        let names: Vec<&str> = profile.regions.iter().map(|r| r.region.as_str()).collect();
        assert_eq!(names, vec!["London", "South East", "Wales"]);
        let london = &profile.regions[0];
        assert!((london.means[PartyId::Labour.index()].1 - 0.55).abs() < 1e-12);
        assert!((london.means[PartyId::Conservatives.index()].1 - 0.15).abs() < 1e-12);
        let wales = &profile.regions[2];
        assert_eq!(wales.means[PartyId::Plaid.index()].1, 0.4);
    }

    #[test]
    fn aggregators_are_pure() {
        let records = sample();
        assert_eq!(count_by_winner(&records), count_by_winner(&records));
        let a = share_by_party(&records, MissingValuePolicy::Propagate);
        let b = share_by_party(&records, MissingValuePolicy::Propagate);
        for ((_, x), (_, y)) in a.shares.iter().zip(b.shares.iter()) {
            assert_eq!(x.to_bits(), y.to_bits());
        }
        let a = mean_share_by_region(&records, MissingValuePolicy::Propagate);
        let b = mean_share_by_region(&records, MissingValuePolicy::Propagate);
        assert_eq!(a, b);
    }
}
