//! Intermediate store backed by `part-r-NNNNN` text files

use super::IntermediateStore;
use crate::codec::{self, InputLine};
use crate::error::TriadResult;
use crate::graph::{PairKey, Payload};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

const PART_PREFIX: &str = "part-r-";

/// Writes intermediate records as part files in one directory.
///
/// Records are cut into `parts` contiguous chunks, one file each, and read
/// back in file-name order.
///
/// Unless the store is kept, drop removes only what the store itself made:
/// the `part-r-*` files, plus the directory when [`DirectoryStore::temporary`]
/// created it or when `new` created it and it is left empty. Other files in
/// a caller's directory are never touched.
#[derive(Debug)]
pub struct DirectoryStore {
    path: PathBuf,
    parts: usize,
    keep: bool,
    created: bool,
    owned: bool,
}

impl DirectoryStore {
    /// Use `path`, creating it if missing
    pub fn new(path: impl AsRef<Path>, parts: usize) -> TriadResult<Self> {
        let path = path.as_ref().to_path_buf();
        let created = !path.exists();
        fs::create_dir_all(&path)?;
        info!("Intermediate store at {:?}", path);
        Ok(Self {
            path,
            parts: parts.max(1),
            keep: false,
            created,
            owned: false,
        })
    }

    /// A fresh, uniquely named directory under the system temp directory
    pub fn temporary(parts: usize) -> TriadResult<Self> {
        let path = std::env::temp_dir().join(format!("triadflow-{}", Uuid::new_v4()));
        let mut store = Self::new(path, parts)?;
        store.owned = true;
        Ok(store)
    }

    pub fn keep(mut self, keep: bool) -> Self {
        self.keep = keep;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Part files in name order
    pub fn part_files(&self) -> TriadResult<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.path)?.flatten() {
            if let Some(filename) = entry.file_name().to_str() {
                if filename.starts_with(PART_PREFIX) {
                    files.push(entry.path());
                }
            }
        }
        files.sort();
        Ok(files)
    }
}

impl IntermediateStore for DirectoryStore {
    fn write(&mut self, records: &[(PairKey, Payload)]) -> TriadResult<u64> {
        for stale in self.part_files()? {
            fs::remove_file(stale)?;
        }

        let chunk = records.len().div_ceil(self.parts).max(1);
        let mut written = 0u64;
        let mut part = 0usize;
        let mut chunks = records.chunks(chunk).peekable();
        // an empty stage still leaves one (empty) part file behind
        if chunks.peek().is_none() {
            File::create(self.path.join(format!("{}{:05}", PART_PREFIX, 0)))?;
        }
        for slice in chunks {
            let file_path = self.path.join(format!("{}{:05}", PART_PREFIX, part));
            let mut writer = BufWriter::new(File::create(&file_path)?);
            for (key, payload) in slice {
                writeln!(writer, "{}", codec::format_intermediate(key, payload))?;
            }
            writer.flush()?;
            debug!("Wrote {} records to {:?}", slice.len(), file_path);
            written += slice.len() as u64;
            part += 1;
        }
        Ok(written)
    }

    fn read(&mut self) -> TriadResult<Vec<InputLine>> {
        let mut lines = Vec::new();
        let mut number = 0u64;
        for file_path in self.part_files()? {
            let reader = BufReader::new(File::open(&file_path)?);
            for line in reader.lines() {
                number += 1;
                lines.push(InputLine::new(number, line?));
            }
        }
        Ok(lines)
    }
}

impl Drop for DirectoryStore {
    fn drop(&mut self) {
        if self.keep {
            return;
        }
        if self.owned {
            if let Err(e) = fs::remove_dir_all(&self.path) {
                warn!("Could not remove intermediate directory {:?}: {}", self.path, e);
            }
            return;
        }
        match self.part_files() {
            Ok(files) => {
                for file in files {
                    if let Err(e) = fs::remove_file(&file) {
                        warn!("Could not remove part file {:?}: {}", file, e);
                    }
                }
            }
            Err(e) => warn!("Could not list intermediate directory {:?}: {}", self.path, e),
        }
        // fails harmlessly when anything else lives there
        if self.created && fs::remove_dir(&self.path).is_ok() {
            debug!("Removed intermediate directory {:?}", self.path);
        }
    }
}
