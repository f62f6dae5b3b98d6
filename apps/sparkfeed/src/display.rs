//! Output rendering and formatting

use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use console::{Style, Term};
use serde::Serialize;
use sparkfeed_appcast::{Appcast, AppcastItem};
use sparkfeed_config::{Sourced, UpdateCadence, UpdaterSettingsSnapshot};
use sparkfeed_errors::Error;
use sparkfeed_types::SigningValidationStatus;
use std::io;
use std::time::Duration;

/// Settings plus the outcome of the cadence check
#[derive(Serialize)]
pub struct SettingsReport {
    pub bundle_identifier: String,
    #[serde(flatten)]
    pub snapshot: UpdaterSettingsSnapshot,
    pub cadence: CadenceReport,
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CadenceReport {
    Ok(UpdateCadence),
    Violated { message: String },
}

impl From<Result<UpdateCadence, Error>> for CadenceReport {
    fn from(result: Result<UpdateCadence, Error>) -> Self {
        match result {
            Ok(cadence) => Self::Ok(cadence),
            Err(e) => Self::Violated {
                message: e.to_string(),
            },
        }
    }
}

/// Output renderer for CLI results
#[derive(Clone)]
pub struct OutputRenderer {
    /// Use JSON output format
    json_output: bool,
    /// Terminal instance
    term: Term,
}

impl OutputRenderer {
    /// Create new output renderer
    pub fn new(json_output: bool) -> Self {
        Self {
            json_output,
            term: Term::stdout(),
        }
    }

    pub fn render_appcast(&self, appcast: &Appcast) -> io::Result<()> {
        if self.json_output {
            return render_json(appcast);
        }

        println!(
            "Signature: {}",
            self.style_status(appcast.signing_validation_status())
        );
        println!();

        if appcast.is_empty() {
            println!("No items in feed.");
            return Ok(());
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        table.set_header(vec![
            Cell::new("Version").add_attribute(Attribute::Bold),
            Cell::new("Title").add_attribute(Attribute::Bold),
            Cell::new("Published").add_attribute(Attribute::Bold),
            Cell::new("Channel").add_attribute(Attribute::Bold),
            Cell::new("Flags").add_attribute(Attribute::Bold),
            Cell::new("Download").add_attribute(Attribute::Bold),
        ]);

        for item in appcast {
            table.add_row(vec![
                Cell::new(item.display_version_or_version()),
                Cell::new(item.title.as_deref().unwrap_or("-")),
                Cell::new(
                    item.pub_date
                        .map(|d| d.format("%Y-%m-%d").to_string())
                        .unwrap_or_else(|| "-".to_string()),
                ),
                Cell::new(item.channel.as_deref().unwrap_or("-")),
                format_flags(item),
                Cell::new(
                    item.enclosure
                        .as_ref()
                        .map_or_else(|| "-".to_string(), |e| e.url.to_string()),
                ),
            ]);
        }

        println!("{table}");
        Ok(())
    }

    pub fn render_settings(&self, report: &SettingsReport) -> io::Result<()> {
        if self.json_output {
            return render_json(report);
        }

        println!("{}", self.style_heading(&report.bundle_identifier));
        println!();

        let snapshot = &report.snapshot;
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        table.set_header(vec![
            Cell::new("Setting").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
            Cell::new("Source").add_attribute(Attribute::Bold),
        ]);

        table.add_row(bool_row(
            "automatically-checks-for-updates",
            snapshot.automatically_checks_for_updates,
        ));
        table.add_row(interval_row(
            "update-check-interval",
            snapshot.update_check_interval,
        ));
        table.add_row(bool_row(
            "automatically-downloads-updates",
            snapshot.automatically_downloads_updates,
        ));
        table.add_row(vec![
            Cell::new("allows-automatic-updates-option"),
            Cell::new(
                snapshot
                    .allows_automatic_updates_option
                    .map_or_else(|| "unspecified".to_string(), |v| v.to_string()),
            ),
            Cell::new("bundle"),
        ]);
        table.add_row(vec![
            Cell::new("allows-automatic-updates"),
            Cell::new(snapshot.allows_automatic_updates.to_string()),
            Cell::new("derived"),
        ]);
        table.add_row(interval_row(
            "impatient-update-check-interval",
            snapshot.impatient_update_check_interval,
        ));
        table.add_row(bool_row(
            "sends-system-profile",
            snapshot.sends_system_profile,
        ));
        table.add_row(vec![
            Cell::new("feed-url"),
            Cell::new(
                snapshot
                    .feed_url
                    .as_ref()
                    .map_or_else(|| "-".to_string(), ToString::to_string),
            ),
            Cell::new("-"),
        ]);

        println!("{table}");
        println!();

        match &report.cadence {
            CadenceReport::Ok(_) => println!("[OK] Check cadence is consistent"),
            CadenceReport::Violated { message } => println!("[WARN] {message}"),
        }
        Ok(())
    }

    pub fn render_success_message(&self, message: &str) -> io::Result<()> {
        if self.json_output {
            return render_json(&serde_json::json!({ "message": message }));
        }
        println!("{message}");
        Ok(())
    }

    fn style_status(&self, status: SigningValidationStatus) -> String {
        let text = status.to_string();
        if !self.supports_color() {
            return text;
        }
        let style = match status {
            SigningValidationStatus::Succeeded => Style::new().green(),
            SigningValidationStatus::Failed => Style::new().red().bold(),
            SigningValidationStatus::Skipped => Style::new().yellow(),
        };
        style.apply_to(text).to_string()
    }

    fn style_heading(&self, text: &str) -> String {
        if self.supports_color() {
            Style::new().bold().apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn supports_color(&self) -> bool {
        self.term.features().colors_supported()
    }
}

fn render_json<T: Serialize + ?Sized>(value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
    println!("{json}");
    Ok(())
}

fn format_flags(item: &AppcastItem) -> Cell {
    if item.critical {
        Cell::new("critical").fg(Color::Red)
    } else if item.informational {
        Cell::new("informational").fg(Color::Yellow)
    } else {
        Cell::new("-")
    }
}

fn bool_row(name: &str, setting: Sourced<bool>) -> Vec<Cell> {
    vec![
        Cell::new(name),
        Cell::new(setting.value.to_string()),
        Cell::new(setting.source.to_string()),
    ]
}

fn interval_row(name: &str, setting: Sourced<Duration>) -> Vec<Cell> {
    vec![
        Cell::new(name),
        Cell::new(format_interval(setting.value)),
        Cell::new(setting.source.to_string()),
    ]
}

/// Format an interval as seconds with a coarse human-readable suffix
fn format_interval(interval: Duration) -> String {
    const MINUTE: u64 = 60;
    const HOUR: u64 = 60 * MINUTE;
    const DAY: u64 = 24 * HOUR;

    let secs = interval.as_secs();
    if secs >= DAY && secs % DAY == 0 {
        format!("{secs}s ({}d)", secs / DAY)
    } else if secs >= HOUR && secs % HOUR == 0 {
        format!("{secs}s ({}h)", secs / HOUR)
    } else if secs >= MINUTE && secs % MINUTE == 0 {
        format!("{secs}s ({}m)", secs / MINUTE)
    } else {
        format!("{secs}s")
    }
}
