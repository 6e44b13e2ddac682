//! Ordered class-name table backing a project's `classes.txt`.
//!
//! Line N of the file names class index N. Indices registered beyond the current
//! end of the table leave vacant slots behind them, written out as [`PLACEHOLDER`]
//! so that every later line keeps its index.

use log::debug;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{Error, Result};

/// Name written for a class index that has not been assigned yet.
pub const PLACEHOLDER: &str = "__placeholder__";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassTable {
    slots: Vec<Option<String>>,
}

impl ClassTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a table from a classes file. A missing file yields an empty table.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No classes file at {}, starting empty", path.display());
            return Ok(Self::new());
        }
        let content = fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    /// Parse classes file content. Blank lines and the placeholder are vacant slots.
    pub fn parse(content: &str) -> Self {
        let slots = content
            .lines()
            .map(|line| {
                let name = line.trim_end_matches('\r');
                if name.trim().is_empty() || name == PLACEHOLDER {
                    None
                } else {
                    Some(name.to_string())
                }
            })
            .collect();
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_occupied(&self, index: usize) -> bool {
        matches!(self.slots.get(index), Some(Some(_)))
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.slots.get(index).and_then(|slot| slot.as_deref())
    }

    /// Assign `name` to `index`, growing the table with vacant slots as needed.
    ///
    /// Returns `Ok(true)` if the table changed and `Ok(false)` if the index already
    /// held the same name. An index held by a different name is a
    /// [`Error::ClassCollision`] and leaves the table unchanged.
    pub fn register(&mut self, index: usize, name: &str) -> Result<bool> {
        if let Some(existing) = self.name(index) {
            if existing == name {
                return Ok(false);
            }
            return Err(Error::ClassCollision {
                index,
                existing: existing.to_string(),
                incoming: name.to_string(),
            });
        }

        if self.slots.len() <= index {
            self.slots.resize(index + 1, None);
        }
        self.slots[index] = Some(name.to_string());
        Ok(true)
    }

    /// Render the table in classes file format, one line per index with a trailing newline.
    pub fn to_text(&self) -> String {
        let mut text = String::with_capacity(self.slots.len() * 16);
        for slot in &self.slots {
            text.push_str(slot.as_deref().unwrap_or(PLACEHOLDER));
            text.push('\n');
        }
        text
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        writer.write_all(self.to_text().as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}
