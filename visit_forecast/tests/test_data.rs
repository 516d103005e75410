use polars::prelude::*;
use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::{tempdir, NamedTempFile};
use visit_forecast::data::DroppedRow;
use visit_forecast::{ForecastError, HistoryTable, SiteHistory, TimeSeriesPoint};

fn write_csv(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file.flush().unwrap();
    file
}

#[test]
fn test_history_from_csv() {
    let file = write_csv(&[
        "site,year,month,value",
        "Acadia,2020,1,100",
        "Acadia,2020,2,110.5",
        "Zion,2020,1,300",
    ]);

    let table = HistoryTable::from_csv(file.path()).unwrap();

    assert_eq!(table.len(), 3);
    assert!(table.dropped().is_empty());
    assert_eq!(table.rows()[1].site, "Acadia");
    assert_eq!(table.rows()[1].point, TimeSeriesPoint::new(2020, 2, 110.5).unwrap());
}

#[test]
fn test_history_column_aliases() {
    let file = write_csv(&[
        "ParkName,Region,Year,Month,target_visits",
        " Bryce Canyon ,IM,2019,12,4500",
        "Bryce Canyon,IM,2020.0,1,3900",
    ]);

    let table = HistoryTable::from_csv(file.path()).unwrap();

    assert_eq!(table.len(), 2);
    assert_eq!(table.rows()[0].site, "Bryce Canyon");
    assert_eq!(table.rows()[1].point.year, 2020);
    assert_eq!(table.rows()[1].point.value, 3900.0);
}

#[test]
fn test_malformed_rows_are_dropped_and_counted() {
    let file = write_csv(&[
        "site,year,month,value",
        "Acadia,2020,1,100",
        "Acadia,20x0,2,110",
        "Acadia,2020,13,120",
        ",2020,4,130",
        "Acadia,2020,5,",
        "Acadia,2020,6,160",
    ]);

    let table = HistoryTable::from_csv(file.path()).unwrap();

    assert_eq!(table.len(), 2);
    let lines: Vec<usize> = table.dropped().iter().map(|d| d.line).collect();
    assert_eq!(lines, vec![3, 4, 5, 6]);
}

#[test]
fn test_missing_file_is_fatal() {
    let result = HistoryTable::from_csv("nonexistent_history.csv");
    assert!(matches!(result, Err(ForecastError::FatalConfiguration(_))));
}

#[test]
fn test_unreadable_history_is_fatal() {
    let dir = tempdir().unwrap();

    let result = HistoryTable::from_csv(dir.path());
    assert!(matches!(result, Err(ForecastError::FatalConfiguration(_))));
}

#[test]
fn test_missing_column_is_fatal() {
    let file = write_csv(&["site,year,visitors_per_day", "Acadia,2020,100"]);

    match HistoryTable::from_csv(file.path()) {
        Err(ForecastError::FatalConfiguration(msg)) => assert!(msg.contains("month")),
        other => panic!("Expected FatalConfiguration, got {:?}", other),
    }
}

#[test]
fn test_history_from_dataframe() {
    let df = DataFrame::new(vec![
        Series::new("ParkName", vec!["Acadia", "Acadia", "Zion"]),
        Series::new("Year", vec![2020i32, 2020, 2020]),
        Series::new("Month", vec![1i32, 2, 1]),
        Series::new("RecreationVisits", vec![Some(100.0), None, Some(300.0)]),
    ])
    .unwrap();

    let table = HistoryTable::from_dataframe(&df).unwrap();

    assert_eq!(table.len(), 2);
    assert_eq!(table.dropped().len(), 1);
    assert_eq!(table.dropped()[0].line, 2);
    assert_eq!(table.rows()[1].site, "Zion");
}

#[test]
fn test_sites_are_grouped_and_sorted() {
    let file = write_csv(&[
        "site,year,month,value",
        "zion,2020,2,2",
        "Acadia,2020,1,1",
        "Zion ,2020,1,1",
        "ACADIA,2020,2,2",
    ]);

    let table = HistoryTable::from_csv(file.path()).unwrap();
    let sites = table.sites();

    let names: Vec<&str> = sites.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Acadia", "zion"]);
    assert_eq!(sites[0].key, "acadia");
    assert_eq!(sites[0].points.len(), 2);
    assert_eq!(sites[1].points.len(), 2);
}

#[test]
fn test_site_history_sorts_points() {
    let points = vec![
        TimeSeriesPoint::new(2020, 2, 20.0).unwrap(),
        TimeSeriesPoint::new(2019, 12, 5.0).unwrap(),
        TimeSeriesPoint::new(2020, 1, 10.0).unwrap(),
    ];

    let history = SiteHistory::new("Acadia", points).unwrap();

    assert_eq!(history.values(), vec![5.0, 10.0, 20.0]);
    assert_eq!(history.last_period(), Some((2020, 2)));
}

#[test]
fn test_site_history_rejects_duplicates_and_gaps() {
    let duplicate = vec![
        TimeSeriesPoint::new(2020, 1, 1.0).unwrap(),
        TimeSeriesPoint::new(2020, 1, 2.0).unwrap(),
    ];
    assert!(matches!(
        SiteHistory::new("A", duplicate),
        Err(ForecastError::InvalidHistory(_))
    ));

    let gap = vec![
        TimeSeriesPoint::new(2020, 1, 1.0).unwrap(),
        TimeSeriesPoint::new(2020, 3, 2.0).unwrap(),
    ];
    assert!(matches!(
        SiteHistory::new("A", gap),
        Err(ForecastError::InvalidHistory(_))
    ));
}

#[test]
fn test_site_history_from_values_wraps_years() {
    let history = SiteHistory::from_values("A", 2019, 11, &[1.0, 2.0, 3.0]).unwrap();
    let periods: Vec<(i32, u32)> = history.points().iter().map(|p| p.period()).collect();

    assert_eq!(periods, vec![(2019, 11), (2019, 12), (2020, 1)]);
}

#[test]
fn test_point_validation() {
    assert!(TimeSeriesPoint::new(2020, 0, 1.0).is_err());
    assert!(TimeSeriesPoint::new(2020, 13, 1.0).is_err());
    assert!(TimeSeriesPoint::new(2020, 6, f64::NAN).is_err());
}

#[test]
fn test_with_dropped_rows() {
    let table = HistoryTable::from_rows(Vec::new()).with_dropped(vec![DroppedRow {
        line: 7,
        reason: "bad value".to_string(),
    }]);

    assert!(table.is_empty());
    assert_eq!(table.dropped().len(), 1);
}
