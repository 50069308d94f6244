use criterion::{Criterion, criterion_group, criterion_main};
use price_series::processing::{detect, normalize, parse_date_smart};
use price_series::types::RawTable;
use std::hint::black_box;

const REGIONS: usize = 300;
const MONTHS: usize = 240;

fn month_headers() -> Vec<String> {
    (0..MONTHS)
        .map(|i| format!("{}-{:02}", 2000 + i / 12, i % 12 + 1))
        .collect()
}

fn wide_table() -> RawTable {
    let mut header = vec!["RegionName".to_string()];
    header.extend(month_headers());
    let records: Vec<Vec<String>> = (0..REGIONS)
        .map(|r| {
            let mut record = vec![format!("Metro {r:03}")];
            record.extend((0..MONTHS).map(|m| format!("{:.2}", 100.0 + r as f64 * 0.5 + m as f64 * 0.1)));
            record
        })
        .collect();
    RawTable::from_text_rows(&header, &records)
}

fn long_table() -> RawTable {
    let headers = month_headers();
    let mut records = Vec::with_capacity(REGIONS * MONTHS);
    for r in 0..REGIONS {
        for (m, date) in headers.iter().enumerate() {
            records.push(vec![
                format!("Metro {r:03}"),
                date.replace('-', "/"),
                format!("{:.2}", 100.0 + m as f64 * 0.1),
            ]);
        }
    }
    RawTable::from_text_rows(&["city".to_string(), "date".to_string(), "index".to_string()], &records)
}

fn bench_normalize_wide_300x240(c: &mut Criterion) {
    let table = wide_table();
    let schema = detect(&table.header).expect("wide header");

    c.bench_function("normalize_wide_300x240", |b| {
        b.iter(|| {
            let _ = normalize(black_box(&table.rows), black_box(&schema)).expect("normalize");
        })
    });
}

fn bench_normalize_long_72k(c: &mut Criterion) {
    let table = long_table();
    let schema = detect(&table.header).expect("long header");

    c.bench_function("normalize_long_72k", |b| {
        b.iter(|| {
            let _ = normalize(black_box(&table.rows), black_box(&schema)).expect("normalize");
        })
    });
}

fn bench_parse_date_mixed(c: &mut Criterion) {
    let inputs = ["2020-01", "2020/01/31", "202001", "2020", "January 15, 2020", "Jan 2020"];

    c.bench_function("parse_date_mixed", |b| {
        b.iter(|| {
            for s in inputs {
                let _ = parse_date_smart(black_box(s));
            }
        })
    });
}

criterion_group!(
    benches,
    bench_normalize_wide_300x240,
    bench_normalize_long_72k,
    bench_parse_date_mixed
);
criterion_main!(benches);
