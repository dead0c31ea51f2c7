//! Report writers.

use std::io::Write;

use anyhow::{Context, Result};
use clap::ValueEnum;

use crate::record::{ProbeRecord, ProbeStatus};

/// Report encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One JSON array of records.
    Json,
    /// Header row plus one line per file.
    Csv,
    /// Aligned columns for terminals.
    #[default]
    Table,
}

/// Encode `records` into `out`.
pub fn write_report<W: Write>(
    records: &[ProbeRecord],
    format: OutputFormat,
    pretty: bool,
    mut out: W,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            if pretty {
                serde_json::to_writer_pretty(&mut out, records)
            } else {
                serde_json::to_writer(&mut out, records)
            }
            .context("failed to encode JSON report")?;
            writeln!(out)?;
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(&mut out);
            for record in records {
                writer.serialize(record).context("failed to encode CSV row")?;
            }
            writer.flush()?;
        }
        OutputFormat::Table => write_table(records, &mut out)?,
    }
    out.flush()?;
    Ok(())
}

const HEADERS: [&str; 7] = ["TAG", "CH", "PAT", "ORD", "INS", "SONG", "PATH"];

fn table_row(record: &ProbeRecord) -> [String; 7] {
    let count = |value: Option<usize>| value.map_or_else(|| "-".to_string(), |v| v.to_string());
    let song = match record.status {
        ProbeStatus::Decoded => record.song_name.clone().unwrap_or_default(),
        ProbeStatus::Unrecognised => "(unrecognised)".to_string(),
        ProbeStatus::Error => format!("error: {}", record.error.as_deref().unwrap_or("unknown")),
    };
    [
        record.tag.unwrap_or("-").to_string(),
        count(record.channels),
        count(record.patterns),
        count(record.order_length),
        count(record.instruments),
        song,
        record.path.clone(),
    ]
}

fn write_table<W: Write>(records: &[ProbeRecord], out: &mut W) -> Result<()> {
    let rows: Vec<[String; 7]> = records.iter().map(table_row).collect();
    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: &[&str]| {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        padded.join("  ").trim_end().to_string()
    };
    writeln!(out, "{}", line(&HEADERS))?;
    for row in &rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        writeln!(out, "{}", line(&cells))?;
    }

    let decoded = records.iter().filter(|r| r.status == ProbeStatus::Decoded).count();
    writeln!(out, "\n{decoded} of {} files recognised", records.len())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use trackerkit_formats::Registry;

    fn records() -> Vec<ProbeRecord> {
        let registry = Registry::standard();
        let mut sunvox = b"SVOX".to_vec();
        sunvox.resize(16, 0);
        vec![
            crate::probe_bytes(&registry, Path::new("drift.sunvox"), &sunvox),
            crate::probe_bytes(&registry, Path::new("readme.txt"), b"just text"),
        ]
    }

    fn render(format: OutputFormat, pretty: bool) -> String {
        let mut out = Vec::new();
        write_report(&records(), format, pretty, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_json_report() {
        let value: serde_json::Value = serde_json::from_str(&render(OutputFormat::Json, true)).unwrap();
        assert_eq!(value[0]["status"], "decoded");
        assert_eq!(value[0]["tag"], "SUNVOX");
        assert_eq!(value[0]["policy"], "delegated");
        assert_eq!(value[1]["status"], "unrecognised");
        assert!(value[1]["tag"].is_null());
    }

    #[test]
    fn test_csv_report() {
        let text = render(OutputFormat::Csv, false);
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some(
                "path,status,tag,format,policy,song_name,channels,patterns,order_length,\
                 instruments,sampled_instruments,note_density,error"
            )
        );
        assert!(lines.next().unwrap().starts_with("drift.sunvox,decoded,SUNVOX,SunVox,delegated,"));
        assert_eq!(lines.next(), Some("readme.txt,unrecognised,,,,,,,,,,,"));
    }

    #[test]
    fn test_table_report() {
        let text = render(OutputFormat::Table, false);
        assert!(text.starts_with("TAG"));
        assert!(text.contains("drift (SunVox) [SUNVOX]"));
        assert!(text.contains("(unrecognised)"));
        assert!(text.trim_end().ends_with("1 of 2 files recognised"));
    }
}
