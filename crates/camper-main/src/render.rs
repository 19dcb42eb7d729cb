// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of CamperDash.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Plain-text rendering of dashboard frames.

use camper_core::display::BoardRow;
use camper_core::{
    Band, CamperPanel, ChartPlan, ClimatePanel, Color, Gauge, HistoryFrame, Indicator,
    MarkerTrack, MessageBoard, PowerPanel, Readout, SensorCatalog, StatusLine,
};

const BAR_WIDTH: usize = 20;
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

fn tag(color: Color) -> String {
    format!("{:<14}", format!("[{}]", color.as_str()))
}

fn indicator(item: &Indicator) -> String {
    format!("  {}{}", tag(item.presentation.color()), item.label)
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
fn gauge(item: &Gauge) -> String {
    match item.fraction {
        Some(fraction) => {
            let fraction = fraction.clamp(0.0, 1.0);
            let filled = (fraction * BAR_WIDTH as f64).round() as usize;
            format!(
                "  {}{:<16}|{}{}| {:.0}%",
                tag(item.presentation.color()),
                item.label,
                "#".repeat(filled),
                "-".repeat(BAR_WIDTH - filled),
                fraction * 100.0
            )
        }
        None => format!(
            "  {}{:<16}|{}| Unknown",
            tag(item.presentation.color()),
            item.label,
            "?".repeat(BAR_WIDTH)
        ),
    }
}

fn readout(item: &Readout) -> String {
    format!(
        "  {}{:<16}{}",
        tag(item.presentation.color()),
        item.label,
        item.text
    )
}

pub fn camper(panel: &CamperPanel) -> String {
    [
        "Camper".to_owned(),
        indicator(&panel.household),
        indicator(&panel.pump),
        gauge(&panel.water),
        gauge(&panel.waste),
        indicator(&panel.mains),
        readout(&panel.starter_voltage),
        readout(&panel.household_voltage),
    ]
    .join("\n")
}

fn readouts(title: &str, items: &[Readout]) -> String {
    std::iter::once(title.to_owned())
        .chain(items.iter().map(readout))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn power(panel: &PowerPanel) -> String {
    readouts("Power", &panel.readouts)
}

pub fn climate(panel: &ClimatePanel) -> String {
    readouts("Climate", &panel.readouts)
}

pub fn status_line(line: &StatusLine) -> String {
    format!("{}{}", tag(line.color), line.text)
}

fn board_row(row: &BoardRow) -> String {
    if row.stamp.is_empty() {
        format!("  {}", row.text)
    } else {
        format!("  {}{}  {}", tag(row.color), row.stamp, row.text)
    }
}

pub fn board(board: &MessageBoard) -> String {
    std::iter::once("Messages".to_owned())
        .chain(
            board
                .rows
                .iter()
                .filter(|row| !row.text.is_empty())
                .map(board_row),
        )
        .collect::<Vec<_>>()
        .join("\n")
}

fn band(band: &Band, unit: &str) -> String {
    format!(
        "  {}  min {:.2}{unit}  mean {:.2}{unit}  max {:.2}{unit}  ({} samples)",
        band.start.format(TIME_FORMAT),
        band.min,
        band.mean,
        band.max,
        band.count
    )
}

fn markers(track: &MarkerTrack) -> String {
    match (track.times.first(), track.times.last()) {
        (Some(first), Some(last)) => format!(
            "  {:<16}{} times, first {}, last {}",
            track.value,
            track.times.len(),
            first.format(TIME_FORMAT),
            last.format(TIME_FORMAT)
        ),
        _ => format!("  {:<16}never", track.value),
    }
}

pub fn history(frame: &HistoryFrame) -> String {
    let Some(selection) = &frame.selection else {
        let mut lines = vec!["History: no entity selected".to_owned()];
        if !frame.available.is_empty() {
            lines.push(format!("  Available: {}", frame.available.join(", ")));
        }
        return lines.join("\n");
    };

    let unit = frame.unit.as_deref().unwrap_or_default();
    let mut lines = vec![if unit.is_empty() {
        format!("History: {selection}")
    } else {
        format!("History: {selection} [{unit}]")
    }];

    match &frame.plan {
        ChartPlan::Empty => lines.push("  No data".to_owned()),
        ChartPlan::Bands(bands) => lines.extend(bands.iter().map(|b| band(b, unit))),
        ChartPlan::Markers(tracks) => lines.extend(tracks.iter().map(markers)),
    }
    lines.join("\n")
}

pub fn sensors(catalog: &SensorCatalog) -> String {
    if catalog.is_empty() {
        return "No sensors reported".to_owned();
    }

    let mut lines = Vec::new();
    for sensor in catalog.sensors() {
        lines.push(format!("{} (id {})", sensor.name, sensor.id));
        for entity in &sensor.entities {
            let unit = entity
                .unit
                .as_deref()
                .map(|u| format!(" [{u}]"))
                .unwrap_or_default();
            lines.push(format!(
                "  {}_{}{unit}  (entity {})",
                sensor.name, entity.name, entity.id
            ));
        }
    }
    lines.join("\n")
}

pub fn help() -> &'static str {
    "Commands:
  tab <status|history|messages>   switch the visible view
  toggle <household|pump>         flip a switch
  set <household|pump> <STATE>    request a specific state
  select <KEY>|none               choose the history entity
  help                            show this text
  quit                            exit"
}
