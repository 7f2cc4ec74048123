//! Partitioned export: one numbered file per row group

use std::path::PathBuf;

use rayon::prelude::*;
use serde::Serialize;

use crate::error::{CsvError, CsvResult};
use crate::writer::TabularWriter;

/// Default bound on concurrent partition writers
pub const DEFAULT_MAX_WRITERS: usize = 20;

const PLACEHOLDERS: [&str; 2] = ["{}", "{0}"];

/// File name template with a single offset placeholder (`{}` or `{0}`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePattern {
    prefix: String,
    suffix: String,
}

impl FilePattern {
    /// Parse a pattern such as `orders_{}.csv`
    pub fn parse(pattern: &str) -> CsvResult<Self> {
        let mut found: Option<(usize, &str)> = None;
        let mut count = 0;
        for placeholder in PLACEHOLDERS {
            for (pos, _) in pattern.match_indices(placeholder) {
                count += 1;
                found = Some((pos, placeholder));
            }
        }

        match (count, found) {
            (1, Some((pos, placeholder))) => Ok(Self {
                prefix: pattern[..pos].to_string(),
                suffix: pattern[pos + placeholder.len()..].to_string(),
            }),
            (0, _) => Err(CsvError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: "no offset placeholder".into(),
            }),
            _ => Err(CsvError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: format!("{} placeholders, expected one", count),
            }),
        }
    }

    /// Substitute an offset into the pattern
    pub fn render(&self, offset: u32) -> String {
        format!("{}{}{}", self.prefix, offset, self.suffix)
    }
}

impl std::str::FromStr for FilePattern {
    type Err = CsvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Where and how row groups are written
#[derive(Debug, Clone)]
pub struct PartitionPlan {
    /// Folder the partition files land in
    pub root: PathBuf,
    /// File name template
    pub pattern: FilePattern,
    /// Offset of group 0 when no explicit offsets are given
    pub base_offset: u32,
    /// Explicit per-group offsets; overrides `base_offset` when non-empty
    pub offsets: Vec<u32>,
    /// Maximum number of files written at once
    pub max_writers: usize,
}

impl PartitionPlan {
    /// Plan with sequential offsets starting at `base_offset`
    pub fn new<P: Into<PathBuf>>(root: P, pattern: FilePattern, base_offset: u32) -> Self {
        Self {
            root: root.into(),
            pattern,
            base_offset,
            offsets: Vec::new(),
            max_writers: DEFAULT_MAX_WRITERS,
        }
    }

    /// Use explicit offsets instead of sequential ones
    pub fn with_offsets(mut self, offsets: Vec<u32>) -> Self {
        self.offsets = offsets;
        self
    }

    /// Offset for the group at `index`
    pub fn offset_for(&self, index: usize) -> CsvResult<u32> {
        if self.offsets.is_empty() {
            return u32::try_from(index)
                .ok()
                .and_then(|step| self.base_offset.checked_add(step))
                .ok_or(CsvError::OffsetOverflow {
                    index,
                    base: self.base_offset,
                });
        }
        self.offsets
            .get(index)
            .copied()
            .ok_or(CsvError::MissingOffset {
                index,
                available: self.offsets.len(),
            })
    }

    /// Output path for an offset
    pub fn path_for(&self, offset: u32) -> PathBuf {
        self.root.join(self.pattern.render(offset))
    }
}

/// Result of writing one group
#[derive(Debug)]
pub struct PartitionOutcome {
    /// Position of the group in the input
    pub index: usize,
    /// Offset substituted into the file name, if one was resolved
    pub offset: Option<u32>,
    /// Target file, if one was resolved
    pub path: Option<PathBuf>,
    /// Whether the file was written
    pub result: CsvResult<()>,
}

impl PartitionOutcome {
    /// Check if the group was written
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

impl TabularWriter {
    /// Write each group to its own file, at most `plan.max_writers` at a time.
    ///
    /// Every group is attempted. A failed group does not stop the others,
    /// and no written file is rolled back. Outcomes come back in group order.
    pub fn write_partitioned<T>(&self, groups: &[Vec<T>], plan: &PartitionPlan) -> Vec<PartitionOutcome>
    where
        T: Serialize + Sync,
    {
        let mut options = self.options().clone();
        options.write_header = true;
        let writer = TabularWriter::new(options);

        tracing::info!(
            groups = groups.len(),
            root = %plan.root.display(),
            "starting partitioned export"
        );

        let write_group = |(index, group): (usize, &Vec<T>)| writer.write_group(index, group, plan);

        let outcomes: Vec<PartitionOutcome> = match build_pool(plan.max_writers) {
            Some(pool) => pool.install(|| groups.par_iter().enumerate().map(write_group).collect()),
            None => groups.iter().enumerate().map(write_group).collect(),
        };

        let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
        if failed > 0 {
            tracing::warn!(failed, total = outcomes.len(), "partitioned export incomplete");
        }
        outcomes
    }

    fn write_group<T: Serialize>(&self, index: usize, group: &[T], plan: &PartitionPlan) -> PartitionOutcome {
        let offset = match plan.offset_for(index) {
            Ok(offset) => offset,
            Err(e) => {
                tracing::warn!(index, error = %e, "partition skipped");
                return PartitionOutcome {
                    index,
                    offset: None,
                    path: None,
                    result: Err(e),
                };
            }
        };

        let path = plan.path_for(offset);
        let result = self.write(group, &path);
        match &result {
            Ok(()) => tracing::debug!(index, offset, path = %path.display(), "partition written"),
            Err(e) => tracing::warn!(index, offset, path = %path.display(), error = %e, "partition failed"),
        }

        PartitionOutcome {
            index,
            offset: Some(offset),
            path: Some(path),
            result,
        }
    }
}

/// Pool bounded to `max_writers`; `None` means run on the caller thread
fn build_pool(max_writers: usize) -> Option<rayon::ThreadPool> {
    let threads = max_writers.max(1);
    match rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("tabula-writer-{}", i))
        .build()
    {
        Ok(pool) => Some(pool),
        Err(e) => {
            tracing::warn!(error = %e, "writer pool unavailable, writing inline");
            None
        }
    }
}

/// Split rows into groups of at most `size` rows
pub fn chunk<T: Clone>(rows: &[T], size: usize) -> Vec<Vec<T>> {
    rows.chunks(size.max(1)).map(<[T]>::to_vec).collect()
}
