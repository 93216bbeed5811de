//! Projection of a Master table onto map markers.
//!
//! The map widget itself belongs to the host; it only needs positions,
//! marker styling and a view centre, which this module computes.

use serde::Serialize;

use crate::schema;
use crate::table::Table;

/// Geographic centre of the Netherlands.
pub const DEFAULT_CENTER: (f64, f64) = (52.1326, 5.2913);
pub const DEFAULT_ZOOM: u8 = 7;
pub const SELECTED_ZOOM: u8 = 12;
pub const DEFAULT_MAX_MARKERS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerColor {
    Blue,
    Green,
    Orange,
    Red,
    Gray,
    DarkRed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
    pub code: String,
    pub name: String,
    pub place: String,
    pub postcode: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fte: Option<f64>,
    pub color: MarkerColor,
    pub radius: u8,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub center: (f64, f64),
    pub zoom: u8,
    pub points: Vec<MapPoint>,
}

/// Markers for the first `max_rows` rows that carry both coordinates.
/// A selected code is highlighted and centres the view when it has a
/// position.
pub fn map_view(table: &Table, selected: Option<&str>, max_rows: usize) -> MapView {
    let (center, zoom) = selected
        .and_then(|code| {
            (0..table.len())
                .find(|&row| table.get(row, schema::CODE).display() == code)
                .and_then(|row| position(table, row))
        })
        .map(|pos| (pos, SELECTED_ZOOM))
        .unwrap_or((DEFAULT_CENTER, DEFAULT_ZOOM));

    let points = (0..table.len().min(max_rows))
        .filter_map(|row| {
            let (lat, lon) = position(table, row)?;
            let code = table.get(row, schema::CODE).display();
            let revenue = table.get(row, schema::REVENUE_TOTAL).as_f64();
            let is_selected = selected.is_some_and(|s| s == code);

            let (color, radius) = if is_selected {
                (MarkerColor::DarkRed, 18)
            } else {
                (marker_color(table, row), marker_radius(revenue))
            };

            Some(MapPoint {
                name: table.get(row, schema::NAME).display(),
                place: table.get(row, schema::PLACE).display(),
                postcode: table.get(row, schema::POSTCODE).display(),
                fte: table.get(row, schema::FTE_TOTAL).as_f64(),
                code,
                lat,
                lon,
                revenue,
                color,
                radius,
                selected: is_selected,
            })
        })
        .collect();

    MapView { center, zoom, points }
}

fn position(table: &Table, row: usize) -> Option<(f64, f64)> {
    let lat = table.get(row, schema::LAT).as_f64()?;
    let lon = table.get(row, schema::LON).as_f64()?;
    Some((lat, lon))
}

/// First true care-type flag decides the colour.
fn marker_color(table: &Table, row: usize) -> MarkerColor {
    let colors = [MarkerColor::Blue, MarkerColor::Green, MarkerColor::Orange, MarkerColor::Red];
    schema::CARE_TYPE_COLUMNS
        .iter()
        .zip(colors)
        .find(|(col, _)| table.get(row, col).as_bool() == Some(true))
        .map(|(_, color)| color)
        .unwrap_or(MarkerColor::Gray)
}

fn marker_radius(revenue: Option<f64>) -> u8 {
    let revenue = revenue.unwrap_or(0.0);
    if revenue > 100_000_000.0 {
        12
    } else if revenue > 50_000_000.0 {
        9
    } else if revenue > 10_000_000.0 {
        6
    } else {
        4
    }
}
