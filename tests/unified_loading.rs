use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use price_series::config::{DuplicatePolicy, LoadConfig};
use price_series::ingestion::{load_from_path, read_table_from_path, InputFormat, LoadOptions};
use price_series::processing::Orientation;
use price_series::scenes::{Scene, SceneKind, Session};
use price_series::LoadError;

fn tmp_file(ext: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("price-series-unified-{nanos}.{ext}"))
}

#[test]
fn csv_and_json_are_inferred_from_the_extension() {
    let opts = LoadOptions::default();

    let wide = load_from_path("tests/fixtures/cities_wide.csv", &opts).unwrap();
    assert_eq!(wide.schema.orientation(), Orientation::Wide);
    assert_eq!(wide.index.region_count(), 3);

    let long = load_from_path("tests/fixtures/cities_long.json", &opts).unwrap();
    assert_eq!(long.schema.orientation(), Orientation::Long);
    assert_eq!(long.index.len(), 3);
}

#[test]
fn explicit_format_overrides_the_extension() {
    let path = tmp_file("txt");
    std::fs::copy("tests/fixtures/cities_long.csv", &path).unwrap();

    let err = load_from_path(&path, &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, LoadError::Format { .. }));
    assert!(err.to_string().contains("cannot infer format from extension 'txt'"));

    let opts = LoadOptions {
        format: Some(InputFormat::Csv),
        ..Default::default()
    };
    let loaded = load_from_path(&path, &opts).unwrap();
    assert_eq!(loaded.index.len(), 4);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn extension_matching_is_case_insensitive() {
    assert_eq!(InputFormat::from_extension("CSV"), Some(InputFormat::Csv));
    assert_eq!(InputFormat::from_extension("ndjson"), Some(InputFormat::Json));
    assert_eq!(InputFormat::from_extension("pq"), Some(InputFormat::Parquet));
    assert_eq!(InputFormat::from_extension("xlsx"), Some(InputFormat::Excel));
    assert_eq!(InputFormat::from_extension("tsv"), None);
}

#[cfg(not(feature = "excel"))]
#[test]
fn excel_without_feature_is_a_format_error() {
    let opts = LoadOptions {
        format: Some(InputFormat::Excel),
        ..Default::default()
    };
    let err = load_from_path("tests/fixtures/cities_wide.csv", &opts).unwrap_err();
    assert!(err.to_string().contains("excel ingestion not enabled"));
}

#[test]
fn config_from_json_changes_detection_and_duplicates() {
    let path = tmp_file("csv");
    std::fs::write(
        &path,
        "Market,When,Level\nX,2021-01,1\nX,2021-01,2\nX,2021-02,3\n",
    )
    .unwrap();

    // Default synonyms know none of these headers.
    let err = load_from_path(&path, &LoadOptions::default()).unwrap_err();
    assert_eq!(err.user_message(), "cannot read this file's structure");

    let config = LoadConfig::from_json_str(
        r#"{
            "detector": {
                "region_synonyms": ["market"],
                "date_synonyms": ["when"],
                "value_synonyms": ["level"]
            },
            "normalize": { "duplicates": "keep_last" }
        }"#,
    )
    .unwrap();
    assert_eq!(config.normalize.duplicates, DuplicatePolicy::KeepLast);

    let opts = LoadOptions {
        config,
        ..Default::default()
    };
    let loaded = load_from_path(&path, &opts).unwrap();
    let values: Vec<f64> = loaded.index.get("X").unwrap().iter().map(|o| o.value).collect();
    assert_eq!(values, vec![2.0, 3.0]);
    assert_eq!(loaded.index.report().duplicates_removed, 1);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn raw_table_can_be_read_without_normalizing() {
    let table = read_table_from_path("tests/fixtures/no_structure.csv", &LoadOptions::default()).unwrap();
    assert_eq!(table.header, vec!["City", "2020-01", "2020-02", "Region2"]);
    assert_eq!(table.row_count(), 1);
}

#[test]
fn loaded_index_drives_all_three_scenes() {
    let loaded = load_from_path("tests/fixtures/cities_wide.csv", &LoadOptions::default()).unwrap();
    let index = &loaded.index;
    let mut session = Session::new(index);
    assert_eq!(session.selected_region(), Some("New York"));

    match session.scene(index) {
        Some(Scene::Trend(trend)) => {
            let regions: Vec<&str> = trend.lines.iter().map(|l| l.region).collect();
            assert_eq!(regions, vec!["New York", "Los Angeles", "Chicago"]);
        }
        other => panic!("expected trend scene, got {other:?}"),
    }

    session.set_scene(SceneKind::Snapshot);
    match session.scene(index) {
        Some(Scene::Snapshot(snapshot)) => {
            assert_eq!(snapshot.bars[0].region, "Los Angeles");
            assert_eq!(snapshot.bars[0].value, 322.0);
            assert_eq!(snapshot.y_domain, (0.0, 322.0));
        }
        other => panic!("expected snapshot scene, got {other:?}"),
    }

    assert!(session.select_region(index, "Chicago"));
    session.set_scene(SceneKind::Drilldown);
    match session.scene(index) {
        Some(Scene::Drilldown(drill)) => {
            assert_eq!(drill.first.label, "2020-01");
            assert_eq!(drill.last.label, "2020-06");
            assert_eq!(drill.last.value, 185.0);
        }
        other => panic!("expected drilldown scene, got {other:?}"),
    }
}

#[test]
fn long_csv_export_reloads_to_the_same_observations() {
    let loaded = load_from_path("tests/fixtures/cities_wide.csv", &LoadOptions::default()).unwrap();

    let path = tmp_file("csv");
    let file = std::fs::File::create(&path).unwrap();
    loaded.index.write_long_csv(file).unwrap();

    let reloaded = load_from_path(&path, &LoadOptions::default()).unwrap();
    assert_eq!(reloaded.schema.orientation(), Orientation::Long);
    assert_eq!(reloaded.index.observations(), loaded.index.observations());

    let _ = std::fs::remove_file(&path);
}
