use crate::core::split::Subset;
use std::fs;
use std::io;
use std::path::PathBuf;

/// Name of the summary file written into the split directory.
pub const REPORT_FILE: &str = "split_log.txt";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubsetCounts {
    pub train: usize,
    pub val: usize,
    pub test: usize,
}

impl SubsetCounts {
    pub fn get(&self, subset: Subset) -> usize {
        match subset {
            Subset::Train => self.train,
            Subset::Val => self.val,
            Subset::Test => self.test,
        }
    }

    pub fn set(&mut self, subset: Subset, count: usize) {
        match subset {
            Subset::Train => self.train = count,
            Subset::Val => self.val = count,
            Subset::Test => self.test = count,
        }
    }

    pub fn total(&self) -> usize {
        self.train + self.val + self.test
    }
}

/// Outcome of a split run.
///
/// `assigned` comes from the shuffle; `on_disk` is recounted from the
/// destination folders afterwards and also includes files left there by
/// earlier runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitReport {
    pub assigned: SubsetCounts,
    pub on_disk: SubsetCounts,
    pub report_path: PathBuf,
}

impl SplitReport {
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("Dataset Split Results:\n");
        for subset in Subset::ALL {
            out.push_str(&format!(
                "{}: {} files\n",
                subset.title(),
                self.assigned.get(subset)
            ));
        }
        out.push_str("\nImages per subset directory:\n");
        for subset in Subset::ALL {
            out.push_str(&format!(
                "{}: {} images\n",
                subset.dir_name(),
                self.on_disk.get(subset)
            ));
        }
        out
    }

    /// Overwrite the report file with [`SplitReport::render`].
    pub fn write(&self) -> io::Result<()> {
        fs::write(&self.report_path, self.render())
    }
}
