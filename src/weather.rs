use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::panel::{Panel, PanelProducer};

const DEGREE: char = '\u{00B0}';
const STATION_NAME_MAX: usize = 20;

/// Latest observed conditions. Produced upstream of the ticker; every field is
/// optional so a partially-populated observation still drives the rotation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct WeatherSnapshot {
    pub station_name: Option<String>,
    pub temperature: Option<i32>,
    pub temperature_unit: String,
    pub heat_index: Option<i32>,
    pub wind_chill: Option<i32>,
    pub humidity: Option<u32>,
    pub dew_point: Option<i32>,
    pub wind_direction: String,
    pub wind_speed: Option<u32>,
    pub wind_unit: String,
    pub wind_gust: Option<u32>,
    pub visibility: Option<f32>,
    pub visibility_unit: String,
    pub ceiling: Option<u32>,
    pub ceiling_unit: String,
}

pub fn load_snapshot(path: &Path) -> Result<WeatherSnapshot> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed reading snapshot {}", path.display()))?;
    serde_json::from_str(&raw).context("invalid snapshot json")
}

pub fn baseline_producers() -> Vec<PanelProducer> {
    vec![
        Box::new(station_panel),
        Box::new(temperature_panel),
        Box::new(humidity_panel),
        Box::new(wind_panel),
        Box::new(visibility_panel),
    ]
}

fn station_panel(data: &WeatherSnapshot) -> Option<Panel> {
    let name = data.station_name.as_deref().map(clean_station_name)?;
    if name.is_empty() {
        return None;
    }
    Some(Panel::plain(format!("Conditions at {name}")))
}

fn temperature_panel(data: &WeatherSnapshot) -> Option<Panel> {
    let unit = &data.temperature_unit;
    let mut text = format!("Temp: {}{DEGREE}{unit}", data.temperature?);
    // A zero reading means the station reported nothing useful.
    if let Some(heat_index) = data.heat_index.filter(|v| *v != 0) {
        text.push_str(&format!("    Heat Index: {heat_index}{DEGREE}{unit}"));
    } else if let Some(wind_chill) = data.wind_chill.filter(|v| *v != 0) {
        text.push_str(&format!("    Wind Chill: {wind_chill}{DEGREE}{unit}"));
    }
    Some(Panel::plain(text))
}

fn humidity_panel(data: &WeatherSnapshot) -> Option<Panel> {
    Some(Panel::plain(format!(
        "Humidity: {}%   Dewpoint: {}{DEGREE}{}",
        data.humidity?, data.dew_point?, data.temperature_unit
    )))
}

fn wind_panel(data: &WeatherSnapshot) -> Option<Panel> {
    let speed = data.wind_speed?;
    let mut text = if speed > 0 {
        format!("Wind: {} {speed} {}", data.wind_direction, data.wind_unit)
    } else {
        "Wind: Calm".to_string()
    };
    if let Some(gust) = data.wind_gust.filter(|gust| *gust > 0) {
        text.push_str(&format!("  Gusts to {gust}"));
    }
    Some(Panel::plain(text))
}

fn visibility_panel(data: &WeatherSnapshot) -> Option<Panel> {
    let visibility = data.visibility?;
    let ceiling = match data.ceiling {
        None | Some(0) => "Unlimited".to_string(),
        Some(ceiling) => format!("{ceiling} {}", data.ceiling_unit),
    };
    Some(Panel::plain(format!(
        "Visib: {visibility} {}  Ceiling: {ceiling}",
        data.visibility_unit
    )))
}

fn clean_station_name(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(STATION_NAME_MAX).collect()
}
