use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;
use chrono::{DateTime, TimeZone};

use crate::{configuration::TableFormat, domain::game_review::CrawlOutcome};

pub const RESULT_TABLE_HEADERS: [&str; 5] = ["query", "url", "rate", "review", "error"];

/// `result_<YYYYMMDDHHMMSS>.<ext>`
pub fn result_file_name<Tz>(created_at: &DateTime<Tz>, format: TableFormat) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!(
        "result_{}.{}",
        created_at.format("%Y%m%d%H%M%S"),
        format.extension()
    )
}

/// Writes one row per outcome into a timestamped file under `output_directory`,
/// creating the directory if needed. Returns the written path.
pub fn write_result_table<Tz>(
    outcomes: &[CrawlOutcome],
    output_directory: &Path,
    format: TableFormat,
    created_at: &DateTime<Tz>,
) -> anyhow::Result<PathBuf>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    fs::create_dir_all(output_directory).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            output_directory.display()
        )
    })?;

    let path = output_directory.join(result_file_name(created_at, format));
    let file = File::create(&path)
        .with_context(|| format!("Failed to create result file: {}", path.display()))?;

    let mut writer = BufWriter::new(file);
    write_table(&mut writer, outcomes, format.separator())
        .and_then(|_| writer.flush())
        .with_context(|| format!("Failed to write result file: {}", path.display()))?;

    log::info!("Wrote {} rows to {}", outcomes.len(), path.display());

    Ok(path)
}

pub fn write_table<W: Write>(w: &mut W, outcomes: &[CrawlOutcome], sep: char) -> io::Result<()> {
    write_row(w, &RESULT_TABLE_HEADERS, sep)?;

    for outcome in outcomes {
        let review = &outcome.review;
        let row = [
            review.query.clone(),
            review.canonical_url().unwrap_or_default().to_string(),
            review
                .rating_percent()
                .map(|rate| rate.to_string())
                .unwrap_or_default(),
            review
                .review_count()
                .map(|count| count.to_string())
                .unwrap_or_default(),
            outcome.failure.clone().unwrap_or_default(),
        ];
        write_row(w, &row, sep)?;
    }

    Ok(())
}

fn needs_quotes(field: &str, sep: char) -> bool {
    field.contains(sep) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

fn write_row<W: Write, S: AsRef<str>>(w: &mut W, row: &[S], sep: char) -> io::Result<()> {
    for (i, cell) in row.iter().enumerate() {
        if i > 0 {
            write!(w, "{}", sep)?;
        }
        let cell = cell.as_ref();
        if needs_quotes(cell, sep) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            write!(w, "{}", cell)?;
        }
    }
    writeln!(w)
}
