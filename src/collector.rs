use std::{collections::HashSet, fmt::Debug, io::BufWriter, path::Path};

use anyhow::Context;
use fs_err::File;
use itertools::Itertools;
use log::{info, warn};
use rust_xlsxwriter::Workbook;

use crate::record::EventRecord;

pub const SHEET_NAME: &str = "Events";

/// The records scraped in one run.
#[derive(Debug, Default)]
pub struct Collector {
    records: HashSet<EventRecord>,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, record: EventRecord) {
        self.records.insert(record);
    }

    pub fn reset(&mut self) {
        self.records.clear();
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// Records in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &EventRecord> {
        self.records.iter()
    }

    /// Records ordered by event ID, as they are exported.
    pub fn sorted(&self) -> Vec<&EventRecord> {
        self.records
            .iter()
            .sorted_by_key(|record| record.event_id())
            .collect()
    }

    /// Writes all records as a table, one row per record, with a header row.
    ///
    /// `.csv` and `.tsv` paths get delimited text, any other path a one-sheet
    /// Excel workbook.
    pub fn export<P: AsRef<Path> + Debug>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        let written = match delimiter_for(path) {
            Some(delimiter) => self.write_delimited(path, delimiter),
            None => self.write_xlsx(path),
        };
        written.with_context(|| {
            format!("While trying to export {} records to {path:?}", self.count())
        })?;
        info!("Exported {} records to {path:?}", self.count());
        Ok(())
    }

    fn write_xlsx(&self, path: &Path) -> anyhow::Result<()> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_NAME)?;
        for (col, name) in (0..).zip(EventRecord::COLUMNS) {
            sheet.write_string(0, col, name)?;
        }
        for (row, record) in (1..).zip(self.sorted()) {
            sheet.write_string(row, 0, record.title().as_str())?;
            sheet.write_number(row, 1, f64::from(u32::from(record.event_id())))?;
            sheet.write_string(row, 2, record.result_flag().as_str())?;
            sheet.write_boolean(row, 3, record.has_recommendation())?;
            sheet.write_string(row, 4, cell_text(record.recommendation_text()))?;
            sheet.write_string(row, 5, record.link().as_str())?;
        }
        workbook.save(path)?;
        Ok(())
    }

    fn write_delimited(&self, path: &Path, delimiter: u8) -> anyhow::Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .from_writer(BufWriter::new(File::create(path)?));
        writer.write_record(EventRecord::COLUMNS)?;
        for record in self.sorted() {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Excel refuses cells longer than this many characters.
const MAX_CELL_CHARS: usize = 32_767;

fn cell_text(text: &str) -> &str {
    match text.char_indices().nth(MAX_CELL_CHARS) {
        Some((end, _)) => {
            warn!("Truncating a recommendation of {} characters", text.chars().count());
            &text[..end]
        }
        None => text,
    }
}

fn delimiter_for(path: &Path) -> Option<u8> {
    match path.extension().and_then(|x| x.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => Some(b'\t'),
        Some(ext) if ext.eq_ignore_ascii_case("csv") => Some(b','),
        _ => None,
    }
}
