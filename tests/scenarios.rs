//! End-to-end checks of the load pipeline and the window rules.

use std::fs;

use chrono::NaiveDate;
use tickview::app::pipeline;
use tickview::domain::{DateWindow, Observation, WindowEdge};
use tickview::io::export::{ExportFormat, write_view};
use tickview::io::source::{FileSource, SourceSpec, TextSource};
use tickview::session::ViewerSession;
use tickview::view::project;
use tickview::window::{InvalidWindowEdit, default_window, validate_edit};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn window(start: NaiveDate, end: NaiveDate) -> DateWindow {
    DateWindow::new(start, end).unwrap()
}

const THREE_ROWS: &str = "\
Date,TICKER,Close_Price_Raw
2023-01-01,AAA,10.0
2023-02-01,AAA,12.0
2023-01-15,BBB,5.0
";

#[test]
fn three_row_table_groups_sorts_and_windows() {
    let load = pipeline::load(&TextSource::new("inline", THREE_ROWS)).unwrap();

    assert_eq!(load.map.keys(), vec!["AAA", "BBB"]);
    let aaa = load.map.get("AAA").unwrap();
    assert_eq!(
        aaa.observations(),
        &[
            Observation::new(d(2023, 1, 1), 10.0),
            Observation::new(d(2023, 2, 1), 12.0),
        ]
    );

    let w = default_window(aaa).unwrap();
    assert_eq!(w, window(d(2023, 1, 1), d(2023, 2, 1)));
    assert_eq!(project(aaa, w).profitability_delta(), 2.0);
}

#[test]
fn end_edit_below_one_month_is_rejected() {
    let current = window(d(2023, 1, 1), d(2023, 2, 1));
    let err = validate_edit(Some(&current), WindowEdge::End, "2023-01-10").unwrap_err();
    assert_eq!(err, InvalidWindowEdit::TooShort { months: 0 });
}

#[test]
fn start_edit_beyond_sixty_months_is_rejected() {
    let current = window(d(2020, 1, 1), d(2023, 1, 1));
    let err = validate_edit(Some(&current), WindowEdge::Start, "2010-01-01").unwrap_err();
    assert!(matches!(err, InvalidWindowEdit::TooLong { .. }));
}

#[test]
fn empty_date_and_bad_price_rows_are_dropped() {
    let text = "\
Date,TICKER,Close_Price_Raw
,AAA,9.0
2023-01-01,AAA,abc
2023-01-02,AAA,11.0
";
    let load = pipeline::load(&TextSource::new("inline", text)).unwrap();
    assert_eq!(load.dropped.len(), 2);
    assert_eq!(
        load.map.get("AAA").unwrap().observations(),
        &[Observation::new(d(2023, 1, 2), 11.0)]
    );
}

#[test]
fn session_keeps_window_after_rejected_edit() {
    let load = pipeline::load(&TextSource::new("inline", THREE_ROWS)).unwrap();
    let mut session = ViewerSession::with_map(load.map);

    let before = session.window().copied();
    assert!(session.edit_window(WindowEdge::End, "2023-01-10").is_err());
    assert_eq!(session.window().copied(), before);

    assert!(session.select("BBB"));
    let slice = session.view().unwrap();
    assert_eq!(slice.len(), 1);
    assert_eq!(slice.profitability_delta(), 0.0);
}

#[test]
fn failed_load_leaves_no_keys() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.csv");

    let mut session = ViewerSession::new();
    assert!(session.state().is_loading());
    session.finish_load(pipeline::load(&FileSource::new(&missing)).map(|out| out.map));

    assert!(session.keys().is_empty());
    assert!(session.view().is_none());
}

#[test]
fn file_source_with_aliased_headers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prices.csv");
    fs::write(
        &path,
        "\u{feff}Symbol, date ,Close\nXYZ,2023/03/01,3.5\nXYZ,01/02/2023,3.0\n",
    )
    .unwrap();

    let source = SourceSpec::parse(path.to_str().unwrap()).into_source();
    let load = pipeline::load(source.as_ref()).unwrap();
    let xyz = load.map.get("XYZ").unwrap();
    assert_eq!(xyz.bounds(), Some((d(2023, 2, 1), d(2023, 3, 1))));
}

#[test]
fn export_round_trips_through_csv_ingest() {
    let load = pipeline::load(&TextSource::new("inline", THREE_ROWS)).unwrap();
    let aaa = load.map.get("AAA").unwrap();
    let slice = project(aaa, aaa.full_window().unwrap());

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("aaa.csv");
    write_view(&out, &slice, ExportFormat::Csv).unwrap();

    let reloaded = pipeline::load(&FileSource::new(&out)).unwrap();
    assert_eq!(reloaded.map.get("AAA").unwrap(), aaa);

    let json_out = dir.path().join("aaa.json");
    write_view(&json_out, &slice, ExportFormat::Json).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&fs::read_to_string(&json_out).unwrap()).unwrap();
    assert_eq!(doc["key"], "AAA");
    assert_eq!(doc["points"], 2);
    assert_eq!(doc["profitability_delta"], 2.0);
}
