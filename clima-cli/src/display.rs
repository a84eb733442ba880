use std::io::Write;

use chrono::Local;
use clima_core::{DisplaySink, WeatherRecord, icon};

/// Writes weather to stdout, either as text or as JSON.
#[derive(Debug, Default)]
pub struct TerminalDisplay {
    json: bool,
}

impl TerminalDisplay {
    pub fn new(json: bool) -> Self {
        Self { json }
    }
}

impl DisplaySink for TerminalDisplay {
    fn show_record(&self, record: &WeatherRecord) {
        let text = if self.json {
            serde_json::to_string_pretty(record).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
        } else {
            format_record(record, &Local::now().format("%H:%M").to_string())
        };
        print_block(&text);
    }

    fn show_message(&self, message: &str) {
        let text = if self.json {
            serde_json::json!({ "error": message }).to_string()
        } else {
            message.to_string()
        };
        print_block(&text);
    }
}

fn print_block(text: &str) {
    let mut out = std::io::stdout().lock();
    // Nothing sensible to do if stdout is gone.
    let _ = writeln!(out, "{text}");
    let _ = out.flush();
}

fn format_record(record: &WeatherRecord, updated_at: &str) -> String {
    format!(
        "{}\n{}°  {} {}\nupdated {updated_at}",
        record.city,
        record.temperature_celsius,
        glyph(&record.icon_id),
        record.icon_id,
    )
}

fn glyph(icon_id: &str) -> &'static str {
    match icon_id {
        icon::THUNDERSTORM_ICON => "⛈",
        icon::DRIZZLE_ICON => "🌦",
        icon::RAIN_ICON => "🌧",
        icon::SNOW_ICON => "❄",
        icon::ATMOSPHERE_ICON => "🌫",
        icon::CLEAR_ICON => "☀",
        icon::CLOUDS_ICON => "☁",
        _ => "?",
    }
}
