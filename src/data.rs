//! Sales ledger: bag formats, log entries and the CSV-backed action log
//!
//! The ledger is an append-only log of counter actions (sales, bag
//! conversions, anything else) with a single "undo last" escape hatch.
//! [`BagFormat`] is the one closed set of package sizes; the trainer and the
//! forecast engine key everything on it, so a label mismatch between the
//! components cannot silently drop data.

use crate::error::Result;
use crate::weather::WeatherClass;
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

/// The three package sizes sold at the counter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum BagFormat {
    #[serde(rename = "250g")]
    Small,
    #[serde(rename = "1kg")]
    Medium,
    #[serde(rename = "2kg")]
    Large,
}

impl BagFormat {
    /// Every format, in display order.
    pub const ALL: [BagFormat; 3] = [BagFormat::Small, BagFormat::Medium, BagFormat::Large];

    /// Counter label, also the `detail` value stored on sale rows.
    pub fn label(&self) -> &'static str {
        match self {
            BagFormat::Small => "250g",
            BagFormat::Medium => "1kg",
            BagFormat::Large => "2kg",
        }
    }

    /// Parse a counter label. Returns `None` for anything outside the set.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "250g" => Some(BagFormat::Small),
            "1kg" => Some(BagFormat::Medium),
            "2kg" => Some(BagFormat::Large),
            _ => None,
        }
    }

    /// Mass of one bag in kilograms.
    pub fn mass_kg(&self) -> f64 {
        match self {
            BagFormat::Small => 0.25,
            BagFormat::Medium => 1.0,
            BagFormat::Large => 2.0,
        }
    }
}

impl fmt::Display for BagFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Kind of action recorded on a ledger row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    #[serde(rename = "SALE")]
    Sale,
    #[serde(rename = "CONVERSION")]
    Conversion,
    #[serde(rename = "OTHER")]
    Other,
}

/// One row of the action log. Immutable once written; removable only as
/// "undo last".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: NaiveDateTime,
    pub action: ActionKind,
    /// Bag format label for sales, free text otherwise.
    pub detail: String,
    /// Weather class observed when the row was written.
    pub weather: WeatherClass,
}

impl LogEntry {
    /// Build a sale row for the given format.
    pub fn sale(timestamp: NaiveDateTime, format: BagFormat, weather: WeatherClass) -> Self {
        Self {
            timestamp,
            action: ActionKind::Sale,
            detail: format.label().to_string(),
            weather,
        }
    }

    /// Build a conversion row.
    pub fn conversion(timestamp: NaiveDateTime, detail: &str, weather: WeatherClass) -> Self {
        Self {
            timestamp,
            action: ActionKind::Conversion,
            detail: detail.to_string(),
            weather,
        }
    }

    /// The bag format this row refers to, when the detail parses as one.
    pub fn format(&self) -> Option<BagFormat> {
        BagFormat::from_label(&self.detail)
    }
}

/// Same-day counter statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayStats {
    /// Units sold per format.
    pub sales: BTreeMap<BagFormat, u32>,
    /// Hour with the most sales, if any sale was recorded.
    pub peak_hour: Option<u32>,
    /// Best-selling format, if any sale was recorded.
    pub top_format: Option<BagFormat>,
    /// Total mass sold in kilograms.
    pub total_mass_kg: f64,
    /// Number of conversion actions.
    pub conversions: u32,
}

const LEDGER_HEADER: [&str; 4] = ["timestamp", "action", "detail", "weather"];

/// CSV-backed append log of counter actions.
#[derive(Debug)]
pub struct Ledger {
    path: PathBuf,
}

impl Ledger {
    /// Open a ledger at `path`, creating an empty one when the file is
    /// missing.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let ledger = Self {
            path: path.as_ref().to_path_buf(),
        };
        if !ledger.path.exists() {
            ledger.write_all(&[])?;
        }
        Ok(ledger)
    }

    /// Append one row to the log.
    pub fn append(&self, entry: &LogEntry) -> Result<()> {
        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.serialize(entry)?;
        writer.flush()?;
        Ok(())
    }

    /// Remove the most recently inserted row and return it, or `None` when
    /// the log is empty.
    pub fn undo_last(&self) -> Result<Option<LogEntry>> {
        let mut entries = self.read_all()?;
        let removed = entries.pop();
        if removed.is_some() {
            self.write_all(&entries)?;
        }
        Ok(removed)
    }

    /// Units sold per format on `date`. Every format is present in the map,
    /// zero when nothing sold.
    pub fn sales_for_date(&self, date: NaiveDate) -> Result<BTreeMap<BagFormat, u32>> {
        let mut sales: BTreeMap<BagFormat, u32> =
            BagFormat::ALL.iter().map(|f| (*f, 0)).collect();
        for entry in self.read_all()? {
            if entry.action != ActionKind::Sale || entry.timestamp.date() != date {
                continue;
            }
            if let Some(format) = entry.format() {
                *sales.entry(format).or_insert(0) += 1;
            }
        }
        Ok(sales)
    }

    /// The `n` most recent rows, newest first.
    pub fn recent_actions(&self, n: usize) -> Result<Vec<LogEntry>> {
        let entries = self.read_all()?;
        Ok(entries.into_iter().rev().take(n).collect())
    }

    /// Every sale row in the log, oldest first. Input to the trainer.
    pub fn sale_records(&self) -> Result<Vec<LogEntry>> {
        let entries = self.read_all()?;
        Ok(entries
            .into_iter()
            .filter(|e| e.action == ActionKind::Sale)
            .collect())
    }

    /// Counter statistics for `date`.
    pub fn day_stats(&self, date: NaiveDate) -> Result<DayStats> {
        let mut sales: BTreeMap<BagFormat, u32> =
            BagFormat::ALL.iter().map(|f| (*f, 0)).collect();
        let mut per_hour: BTreeMap<u32, u32> = BTreeMap::new();
        let mut conversions = 0;

        for entry in self.read_all()? {
            if entry.timestamp.date() != date {
                continue;
            }
            match entry.action {
                ActionKind::Sale => {
                    if let Some(format) = entry.format() {
                        *sales.entry(format).or_insert(0) += 1;
                        *per_hour.entry(entry.timestamp.hour()).or_insert(0) += 1;
                    }
                }
                ActionKind::Conversion => conversions += 1,
                ActionKind::Other => {}
            }
        }

        // Earliest hour wins a tie.
        let peak_hour = per_hour
            .iter()
            .fold(None, |best: Option<(u32, u32)>, (&hour, &count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((hour, count)),
            })
            .map(|(hour, _)| hour);

        let top_format = sales
            .iter()
            .fold(None, |best: Option<(BagFormat, u32)>, (&format, &count)| {
                match best {
                    Some((_, best_count)) if best_count >= count => best,
                    _ if count > 0 => Some((format, count)),
                    _ => best,
                }
            })
            .map(|(format, _)| format);

        let total_mass_kg = sales
            .iter()
            .map(|(format, &count)| format.mass_kg() * f64::from(count))
            .sum();

        Ok(DayStats {
            sales,
            peak_hour,
            top_format,
            total_mass_kg,
            conversions,
        })
    }

    fn read_all(&self) -> Result<Vec<LogEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut entries = Vec::new();
        for record in reader.deserialize() {
            entries.push(record?);
        }
        Ok(entries)
    }

    /// Rewrite the whole log. Goes through a sibling temp file and a rename
    /// so concurrent readers never observe a truncated log.
    fn write_all(&self, entries: &[LogEntry]) -> Result<()> {
        let tmp = self.path.with_extension("tmp");
        {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_path(&tmp)?;
            writer.write_record(LEDGER_HEADER)?;
            for entry in entries {
                writer.serialize(entry)?;
            }
            writer.flush()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
