use log::info;
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use zip::write::FileOptions;

use crate::error::Result;
use crate::model::WeekId;

pub const ARCHIVE_NAME: &str = "all_weeks.zip";

/// Uloží surová data týdne beze změny do `dir`.
pub fn write_week_file(dir: &Path, week: &WeekId, payload: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(week.file_name());
    fs::write(&path, payload)?;
    info!("Týden {} uložen do '{}' ({} B).", week, path.display(), payload.len());
    Ok(path)
}

/// Sestaví zip v paměti, jeden komprimovaný soubor na týden pojmenovaný podle týdne.
pub fn build_archive(entries: &[(WeekId, String)]) -> Result<Vec<u8>> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    for (week, payload) in entries {
        zip.start_file(week.as_str(), options)?;
        zip.write_all(payload.as_bytes())?;
    }
    Ok(zip.finish()?.into_inner())
}

pub fn write_archive(dir: &Path, entries: &[(WeekId, String)]) -> Result<PathBuf> {
    let bytes = build_archive(entries)?;
    fs::create_dir_all(dir)?;
    let path = dir.join(ARCHIVE_NAME);
    fs::write(&path, bytes)?;
    info!("Archiv '{}' uložen ({} týdnů).", path.display(), entries.len());
    Ok(path)
}
