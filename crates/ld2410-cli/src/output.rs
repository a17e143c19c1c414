use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use ld2410_client::Report;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct ReportOutput {
    present: bool,
    moving: bool,
    stationary: bool,
    motion_distance_cm: u16,
    motion_energy: u8,
    standstill_distance_cm: u16,
    standstill_energy: u8,
    detection_distance_cm: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    photosensitive_value: Option<u8>,
}

pub fn print_report(report: &Report, format: OutputFormat) {
    let basic = report.basic;
    let out = ReportOutput {
        present: basic.target_status.present(),
        moving: basic.target_status.moving(),
        stationary: basic.target_status.stationary(),
        motion_distance_cm: basic.motion_distance,
        motion_energy: basic.motion_energy,
        standstill_distance_cm: basic.standstill_distance,
        standstill_energy: basic.standstill_energy,
        detection_distance_cm: basic.detection_distance,
        photosensitive_value: report.engineering.map(|e| e.photosensitive_value),
    };
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["PRESENT", "MOVING", "STATIC", "DISTANCE", "ENERGY"])
                .add_row(vec![
                    out.present.to_string(),
                    format_target(out.moving, out.motion_distance_cm),
                    format_target(out.stationary, out.standstill_distance_cm),
                    format!("{} cm", out.detection_distance_cm),
                    format!("{}% / {}%", out.motion_energy, out.standstill_energy),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "present={} moving={} ({} cm, {}%) static={} ({} cm, {}%) detection={} cm",
                out.present,
                out.moving,
                out.motion_distance_cm,
                out.motion_energy,
                out.stationary,
                out.standstill_distance_cm,
                out.standstill_energy,
                out.detection_distance_cm,
            );
        }
    }
}

/// Print one labeled key/value section, e.g. the `info` summary.
pub fn print_fields(fields: &[(&str, String)], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let map: serde_json::Map<String, serde_json::Value> = fields
                .iter()
                .map(|(key, value)| {
                    (
                        key.to_string(),
                        serde_json::Value::String(value.to_string()),
                    )
                })
                .collect();
            println!(
                "{}",
                serde_json::to_string(&map).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"]);
            for (key, value) in fields {
                table.add_row(vec![key.to_string(), value.to_string()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for (key, value) in fields {
                println!("{key}: {value}");
            }
        }
    }
}

fn format_target(detected: bool, distance: u16) -> String {
    if detected {
        format!("yes ({distance} cm)")
    } else {
        "no".to_string()
    }
}
