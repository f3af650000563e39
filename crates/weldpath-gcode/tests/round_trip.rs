//! Encode/parse round trips through G-code text

use proptest::prelude::*;
use weldpath_core::{CoordinateTable, Point};
use weldpath_gcode::{encode, parse_str, GcodeEncoder, ParseMode};

const TOLERANCE: f64 = 0.0005 + 1e-9;

fn arb_table() -> impl Strategy<Value = CoordinateTable> {
    let point = (-500.0f64..500.0, -500.0f64..500.0, 0.0f64..200.0)
        .prop_map(|(x, y, z)| Point::new(x, y, z));
    prop::collection::vec(prop::collection::vec(point, 1..6), 1..12).prop_map(|lines| {
        let mut table = CoordinateTable::new();
        for (i, points) in lines.into_iter().enumerate() {
            for point in points {
                table.push(i as u32 + 1, point);
            }
        }
        table
    })
}

proptest! {
    #[test]
    fn parse_recovers_encoded_table(table in arb_table()) {
        let text = GcodeEncoder::new().encode(&table).unwrap();
        let parsed = parse_str(&text, ParseMode::Strict).unwrap();

        prop_assert_eq!(parsed.len(), table.len());
        for (original, recovered) in table.rows().iter().zip(parsed.rows()) {
            prop_assert_eq!(original.line_index, recovered.line_index);
            prop_assert!((original.point - recovered.point).abs().max_element() <= TOLERANCE);
        }
    }
}

#[test]
fn test_origin_shift_survives_round_trip() {
    let mut table = CoordinateTable::new();
    table.push(1, Point::new(0.0, 3.0, 0.0));
    table.push(1, Point::new(24.0, 3.0, 0.0));

    let text = encode(&table, Some(&[10.0, 20.0, 5.0])).unwrap();
    let parsed = parse_str(&text, ParseMode::Strict).unwrap();
    assert_eq!(parsed.rows()[0].point, Point::new(10.0, 23.0, 5.0));
    assert_eq!(parsed.rows()[1].point, Point::new(34.0, 23.0, 5.0));
}

#[test]
fn test_degenerate_line_survives_round_trip() {
    let mut table = CoordinateTable::new();
    table.push(1, Point::new(1.0, 1.0, 0.0));
    table.push(2, Point::new(2.0, 2.0, 0.0));
    table.push(2, Point::new(3.0, 2.0, 0.0));

    let parsed = parse_str(&GcodeEncoder::new().encode(&table).unwrap(), ParseMode::Strict).unwrap();
    let lines = parsed.lines();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].is_degenerate());
    assert_eq!(lines[1].points.len(), 2);
}

#[test]
fn test_arbitrary_indices_are_renumbered_densely() {
    let mut table = CoordinateTable::new();
    table.push(40, Point::new(0.0, 0.0, 0.0));
    table.push(40, Point::new(1.0, 0.0, 0.0));
    table.push(7, Point::new(0.0, 1.0, 0.0));
    table.push(7, Point::new(1.0, 1.0, 0.0));

    let parsed = parse_str(&GcodeEncoder::new().encode(&table).unwrap(), ParseMode::Strict).unwrap();
    let indices: Vec<u32> = parsed.rows().iter().map(|r| r.line_index).collect();
    assert_eq!(indices, vec![1, 1, 2, 2]);
    assert_eq!(parsed, table.renumbered(0));
}
