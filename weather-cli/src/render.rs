//! Text rendering of the results panel and map status.

use std::io::{self, Write};

use weather_core::{AppState, RequestState, TileLayer, WeatherReport};

pub fn panel(state: &AppState, tiles: &TileLayer, out: &mut impl Write) -> io::Result<()> {
    if let Some(advisory) = &state.advisory {
        writeln!(out, "! {advisory}")?;
    }
    if let Some(error) = &state.error {
        writeln!(out, "✗ {error}")?;
    }
    if state.request.is_loading() {
        writeln!(out, "… loading")?;
    }

    match &state.report {
        Some(report) => report_section(report, state.is_stale(), out)?,
        None if state.request == RequestState::Idle => writeln!(out, "No location selected yet.")?,
        None => {}
    }

    writeln!(out)?;
    writeln!(
        out,
        "Map    {}  zoom {}  (marker at {})",
        state.viewport.center,
        state.viewport.zoom,
        state.viewport.marker()
    )?;
    writeln!(out, "Tile   {}", tiles.url(state.viewport.center_tile()))?;

    Ok(())
}

fn report_section(report: &WeatherReport, stale: bool, out: &mut impl Write) -> io::Result<()> {
    let current = &report.current;

    if stale {
        writeln!(out, "{}  (stale: shown for {})", current.location_name, report.coordinate)?;
    } else {
        writeln!(out, "{}", current.location_name)?;
    }
    writeln!(
        out,
        "{}  {}°C  {}",
        current.icon().glyph(),
        current.rounded_temperature(),
        capitalize_words(&current.description)
    )?;
    writeln!(
        out,
        "Wind Speed {} m/s    Humidity {}%",
        current.wind_speed, current.humidity_percent
    )?;

    let strip = report.forecast.daily_strip();
    if strip.is_empty() {
        return Ok(());
    }

    let offset = report.forecast.utc_offset_seconds;
    writeln!(out)?;
    writeln!(out, "5-Day Forecast")?;

    let days: Vec<String> = strip.iter().map(|e| format!("{:^7}", e.weekday_label(offset))).collect();
    let icons: Vec<String> = strip.iter().map(|e| format!("{:^7}", e.icon().glyph())).collect();
    let temps: Vec<String> = strip
        .iter()
        .map(|e| format!("{:^7}", format!("{}°C", e.rounded_temperature())))
        .collect();

    writeln!(out, "{}", days.concat().trim_end())?;
    writeln!(out, "{}", icons.concat().trim_end())?;
    writeln!(out, "{}", temps.concat().trim_end())?;

    Ok(())
}

/// "scattered clouds" -> "Scattered Clouds"
fn capitalize_words(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
