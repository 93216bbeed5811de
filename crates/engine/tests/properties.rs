// Property tests for BUILD_MASTER.
// Run with: cargo test -p digimv-engine --test properties

use digimv_engine::{build_master, MasterConfig, MatchStrategy, ReferenceIndex, SourceWorkbook, Table, Value};
use proptest::prelude::*;

const PROVINCES: [&str; 4] = ["Flevoland", "Utrecht", "Zeeland", "Drenthe"];

fn postcode() -> impl Strategy<Value = String> {
    // Small space so generated sources and references collide often.
    (1000u32..1010, prop::sample::select(vec!["AA", "ab", "Zz"]), prop::bool::ANY).prop_map(
        |(digits, letters, spaced)| {
            if spaced {
                format!("{digits} {letters}")
            } else {
                format!("{digits}{letters}")
            }
        },
    )
}

fn part(part: u32, postcodes: &[String]) -> SourceWorkbook {
    let rows = postcodes
        .iter()
        .enumerate()
        .map(|(i, pc)| {
            vec![
                Value::from(format!("{part}-{i}")),
                Value::from(format!("Zorg {part}-{i}")),
                Value::from(pc.as_str()),
            ]
        })
        .collect();
    SourceWorkbook::new(part, format!("part{part}.xlsx"))
        .with_sheet("RowData_01", Table::from_rows(["Code", "Name", "PostalCode"], rows))
}

fn reference(postcodes: &[String]) -> ReferenceIndex {
    let rows = postcodes
        .iter()
        .enumerate()
        .map(|(i, pc)| {
            vec![
                Value::from(pc.as_str()),
                Value::from(PROVINCES[i % PROVINCES.len()]),
                Value::Number(52.0 + i as f64 / 100.0),
                Value::Number(5.0 + i as f64 / 100.0),
            ]
        })
        .collect();
    let table = Table::from_rows(["postcode", "provincie", "lat", "lon"], rows);
    ReferenceIndex::from_table("ref", &table, MatchStrategy::Exact).unwrap()
}

fn normalized(pc: &str) -> String {
    pc.chars().filter(|c| !c.is_whitespace()).collect::<String>().to_uppercase()
}

proptest! {
    #[test]
    fn row_count_is_sum_of_parts(
        parts in prop::collection::vec(prop::collection::vec(postcode(), 0..20), 1..4),
        refs in prop::collection::vec(postcode(), 0..15),
    ) {
        let sources: Vec<SourceWorkbook> = parts
            .iter()
            .enumerate()
            .map(|(i, pcs)| part(i as u32 + 1, pcs))
            .collect();
        let expected: usize = parts.iter().map(Vec::len).sum();
        let index = reference(&refs);

        let build = build_master(&sources, Some(&index), &MasterConfig::default()).unwrap();
        prop_assert_eq!(build.table.len(), expected);
        prop_assert_eq!(build.stats.geo_matched + build.stats.geo_unmatched, expected);
    }

    #[test]
    fn geography_matches_reference_or_is_unset(
        pcs in prop::collection::vec(postcode(), 1..20),
        refs in prop::collection::vec(postcode(), 0..15),
    ) {
        let index = reference(&refs);
        let build = build_master(&[part(1, &pcs)], Some(&index), &MasterConfig::default()).unwrap();
        let table = &build.table;

        for row in 0..table.len() {
            let pc = table.get(row, "Postcode").display();
            let first_match = refs.iter().position(|r| normalized(r) == normalized(&pc));
            match first_match {
                Some(i) => {
                    prop_assert_eq!(table.get(row, "Provincie"), &Value::from(PROVINCES[i % PROVINCES.len()]));
                    prop_assert_eq!(table.get(row, "lat").as_f64(), Some(52.0 + i as f64 / 100.0));
                    prop_assert_eq!(table.get(row, "lon").as_f64(), Some(5.0 + i as f64 / 100.0));
                }
                None => {
                    prop_assert!(table.get(row, "Provincie").is_empty());
                    prop_assert!(table.get(row, "lat").is_empty());
                    prop_assert!(table.get(row, "lon").is_empty());
                }
            }
        }
    }
}

#[test]
fn reference_without_lat_fails() {
    let table = Table::from_rows(
        ["postcode", "provincie", "lon"],
        vec![vec![Value::from("1309AA"), Value::from("Flevoland"), Value::from("5.2")]],
    );
    let err = ReferenceIndex::from_table("Nederland.csv", &table, MatchStrategy::Exact).unwrap_err();
    assert!(matches!(
        err,
        digimv_engine::MasterError::MissingColumn { ref columns, .. } if columns == &vec!["lat".to_string()]
    ));
}
