// End-to-end: DigiMV workbooks on disk → Master → xlsx → Master again.
// Run with: cargo test -p digimv-io --test roundtrip

use digimv_engine::{build_master, load_master, MasterConfig, MatchStrategy, Table, Value};
use digimv_io::csv::load_reference;
use digimv_io::xlsx::{read_master, read_source_workbook, write_master, write_workbook};
use digimv_io::{IoError, Upload};

fn t(s: &str) -> Value {
    Value::from(s)
}

fn part_upload(name: &str, rows: &[(&str, &str, &str, &str, f64, f64)]) -> Upload {
    let base = Table::from_rows(
        ["Code", "Name", "qNawKvk", "PostalCode", "Town"],
        rows.iter()
            .map(|(code, name, pc, town, _, _)| vec![t(code), t(name), t("12345678"), t(pc), t(town)])
            .collect(),
    );
    let types = Table::from_rows(
        ["Code", "qTypeWTZaZorg_13", "qTypeWTZaZorg_8"],
        rows.iter().map(|(code, ..)| vec![t(code), t("ja"), t("nee")]).collect(),
    );
    let finance = Table::from_rows(
        ["Code", "qTotaalBaten_0"],
        rows.iter()
            .map(|(code, _, _, _, revenue, _)| vec![t(code), Value::Number(*revenue)])
            .collect(),
    );
    let staff = Table::from_rows(
        ["Code", "qPersTotTot_AantalFte"],
        rows.iter().map(|(code, _, _, _, _, fte)| vec![t(code), Value::Number(*fte)]).collect(),
    );
    let bytes = write_workbook(&[
        ("RowData_01", &base),
        ("RowData_09", &types),
        ("RowData_10", &finance),
        ("RowData_15", &staff),
    ])
    .unwrap();
    Upload::new(name, bytes)
}

fn reference_upload() -> Upload {
    let csv = "straat;huisnummer;postcode;woonplaats;provincie;lat;lon\n\
               Stationsplein;1;1309AA;Almere;Flevoland;52.41681018;5.22054682\n\
               Vredenburg;40;3511BD;Utrecht;Utrecht;52,0928;5,1136\n";
    Upload::new("Nederland.csv", csv.as_bytes().to_vec())
}

fn build() -> Table {
    let config = MasterConfig::default();
    let parts = [
        part_upload(
            "deel1.xlsx",
            &[
                ("A1", "Zorg A", "1309 aa", "Almere", 2_000_000.0, 40.0),
                ("A2", "Zorg B", "9999ZZ", "Nergens", 90_000_000.0, 10.0),
            ],
        ),
        part_upload("deel2.xlsx", &[("B1", "Zorg C", "3511BD", "Utrecht", 5_000_000.0, 100.0)]),
    ];
    let sources: Vec<_> = parts
        .iter()
        .enumerate()
        .map(|(i, upload)| read_source_workbook(upload, i as u32 + 1, &config.layout).unwrap())
        .collect();
    let reference = load_reference(&reference_upload(), MatchStrategy::Exact).unwrap();

    let build = build_master(&sources, Some(&reference), &config).unwrap();
    assert_eq!(build.stats.geo_matched, 2);
    assert_eq!(build.stats.geo_unmatched, 1);
    build.table
}

#[test]
fn build_from_workbooks() {
    let table = build();
    assert_eq!(table.len(), 3);

    // Sorted by revenue, highest first
    let names: Vec<String> = table.column_values("Naam").iter().map(|v| v.display()).collect();
    assert_eq!(names, vec!["Zorg B", "Zorg C", "Zorg A"]);

    assert_eq!(table.get(0, "Provincie"), &Value::Empty);
    assert_eq!(table.get(0, "lat"), &Value::Empty);
    assert_eq!(table.get(1, "Provincie"), &t("Utrecht"));
    assert_eq!(table.get(1, "lat"), &Value::Number(52.0928));
    assert_eq!(table.get(2, "lon"), &Value::Number(5.22054682));

    assert_eq!(table.get(0, "Is_VVT"), &Value::Bool(true));
    assert_eq!(table.get(0, "Is_GGZ"), &Value::Bool(false));
    // 90M / 10 fte is far above the band, 5M / 100 sits inside it
    assert_eq!(table.get(0, "FTE_Betrouwbaar"), &Value::Bool(false));
    assert_eq!(table.get(1, "FTE_Betrouwbaar"), &Value::Bool(true));
}

#[test]
fn export_then_load_is_identity() {
    let built = build();
    let bytes = write_master(&built).unwrap();
    let read = read_master(&Upload::new("DigiMV_Export_20240101_1200.xlsx", bytes)).unwrap();

    let loaded = load_master("export", read.clone(), None, &Default::default()).unwrap();
    assert_eq!(loaded.table, built);

    let reference = load_reference(&reference_upload(), MatchStrategy::Exact).unwrap();
    let rejoined = load_master("export", read, Some(&reference), &Default::default()).unwrap();
    assert_eq!(rejoined.table, built);
}

#[test]
fn missing_base_sheet_is_reported() {
    let other = Table::from_rows(["Code"], vec![vec![t("A")]]);
    let upload = Upload::new("leeg.xlsx", write_workbook(&[("Blad1", &other)]).unwrap());
    let config = MasterConfig::default();
    let source = read_source_workbook(&upload, 1, &config.layout).unwrap();
    assert!(source.sheets.is_empty());

    let err = build_master(&[source], None, &config).unwrap_err();
    assert_eq!(err.to_string(), "leeg.xlsx: missing sheet 'RowData_01'");
}

#[test]
fn malformed_part_is_malformed_file() {
    let upload = Upload::new("deel1.xlsx", b"PK\x03\x04 truncated".to_vec());
    let err = read_source_workbook(&upload, 1, &MasterConfig::default().layout).unwrap_err();
    assert!(matches!(err, IoError::MalformedFile { ref file, .. } if file == "deel1.xlsx"));
}
