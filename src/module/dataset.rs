//! Labeled dataset storage.
//!
//! Owns the on-disk layout: one directory per label under the dataset
//! root, each holding uniquely numbered image files. Directories are
//! created lazily on first capture and never deleted here.

pub mod name;

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::module::camera::Frame;
use crate::module::error::CaptureError;

/// A dataset class label.
///
/// Invariant: non-empty and restricted to ASCII letters, digits, `-`
/// and `_`, so it is always safe as a directory name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label(String);

impl Label {
    /// Normalizes and validates an operator-supplied label: trims,
    /// collapses internal whitespace runs to a single `_`, then rejects
    /// anything outside the allowed character set.
    pub fn parse(raw: &str) -> Result<Self, CaptureError> {
        let mut normalized = String::new();
        let mut in_gap = false;
        for c in raw.trim().chars() {
            if c.is_whitespace() {
                in_gap = true;
                continue;
            }
            if in_gap && !normalized.is_empty() {
                normalized.push('_');
            }
            in_gap = false;
            normalized.push(c);
        }
        let valid = !normalized.is_empty()
            && normalized
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(CaptureError::InvalidLabel(raw.to_owned()));
        }
        Ok(Label(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One persisted frame: label, sequence number and the final path.
#[derive(Debug, Clone)]
pub struct CaptureRecord {
    pub label: Label,
    pub seq: u64,
    pub path: PathBuf,
}

/// On-disk dataset store rooted at an externally configured path.
pub struct DatasetStore {
    root: PathBuf,
    // Per-label guard: the scan-then-allocate sequence in persist is a
    // critical section, or a stray double-trigger could hand two frames
    // the same number. Labels are independent, so no cross-label lock.
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl DatasetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Directory holding the records of one label.
    pub fn label_dir(&self, label: &Label) -> PathBuf {
        self.root.join(label.as_str())
    }

    fn label_lock(&self, label: &Label) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap();
        locks.entry(label.as_str().to_owned()).or_default().clone()
    }

    /// Persists a frame under the next free name for the label.
    ///
    /// The frame is encoded to a hidden temporary file and renamed into
    /// place, so a crash mid-write never leaves a corrupt file visible
    /// under the final name.
    pub fn persist(&self, label: &Label, frame: &Frame) -> Result<CaptureRecord, CaptureError> {
        let dir = self.label_dir(label);
        fs::create_dir_all(&dir).map_err(|e| CaptureError::storage(label.as_str(), e))?;

        let lock = self.label_lock(label);
        let _held = lock.lock().unwrap();

        let seq = name::next_seq(&dir).map_err(|e| CaptureError::storage(label.as_str(), e))?;
        let final_path = dir.join(name::file_name(seq));
        let tmp_path = dir.join(name::tmp_name(seq));

        if let Err(e) = frame.image.save_with_format(&tmp_path, image::ImageFormat::Png) {
            let _ = fs::remove_file(&tmp_path);
            return Err(CaptureError::storage(label.as_str(), e));
        }
        fs::rename(&tmp_path, &final_path).map_err(|e| CaptureError::storage(label.as_str(), e))?;

        log::debug!("Persisted {}", final_path.display());
        Ok(CaptureRecord {
            label: label.clone(),
            seq,
            path: final_path,
        })
    }

    /// Number of records on disk for a label, by directory listing.
    /// Used to seed session counters so counts survive restarts.
    pub fn count_for(&self, label: &Label) -> Result<u64, CaptureError> {
        let dir = self.label_dir(label);
        if !dir.is_dir() {
            return Ok(0);
        }
        let mut count = 0;
        for entry in fs::read_dir(&dir).map_err(|e| CaptureError::storage(label.as_str(), e))? {
            let entry = entry.map_err(|e| CaptureError::storage(label.as_str(), e))?;
            if name::seq_of(&entry.path()).is_some() {
                count += 1;
            }
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;
    use std::path::Path;

    fn scratch(name: &str) -> PathBuf {
        let dir = PathBuf::from("/tmp/snaplabeltest/dataset").join(name);
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn frame() -> Frame {
        Frame {
            image: RgbImage::new(8, 8),
        }
    }

    #[test]
    fn label_normalization() {
        assert_eq!(Label::parse("cat").unwrap().as_str(), "cat");
        assert_eq!(Label::parse("  my cat ").unwrap().as_str(), "my_cat");
        assert_eq!(Label::parse("a \t b").unwrap().as_str(), "a_b");
        assert!(matches!(
            Label::parse(""),
            Err(CaptureError::InvalidLabel(_))
        ));
        assert!(matches!(
            Label::parse("   "),
            Err(CaptureError::InvalidLabel(_))
        ));
        assert!(matches!(
            Label::parse("bad/label"),
            Err(CaptureError::InvalidLabel(_))
        ));
    }

    #[test]
    fn sequential_persists_are_gap_free() {
        let store = DatasetStore::new(scratch("sequential"));
        let label = Label::parse("cat").unwrap();
        for expected in 0..3 {
            let record = store.persist(&label, &frame()).unwrap();
            assert_eq!(record.seq, expected);
            assert!(record.path.ends_with(format!("cat/00000{}.png", expected)));
            assert!(record.path.is_file());
        }
        assert_eq!(store.count_for(&label).unwrap(), 3);
    }

    #[test]
    fn count_survives_new_store_instance() {
        let root = scratch("restart");
        let label = Label::parse("dog").unwrap();
        {
            let store = DatasetStore::new(&root);
            store.persist(&label, &frame()).unwrap();
            store.persist(&label, &frame()).unwrap();
        }
        // A fresh store (fresh process) sees the true history.
        let store = DatasetStore::new(&root);
        assert_eq!(store.count_for(&label).unwrap(), 2);
        let record = store.persist(&label, &frame()).unwrap();
        assert_eq!(record.seq, 2);
    }

    #[test]
    fn labels_have_independent_sequences() {
        let store = DatasetStore::new(scratch("independent"));
        let cat = Label::parse("cat").unwrap();
        let dog = Label::parse("dog").unwrap();
        store.persist(&cat, &frame()).unwrap();
        store.persist(&cat, &frame()).unwrap();
        let record = store.persist(&dog, &frame()).unwrap();
        assert_eq!(record.seq, 0);
        assert_eq!(store.count_for(&cat).unwrap(), 2);
        assert_eq!(store.count_for(&dog).unwrap(), 1);
    }

    #[test]
    fn allocation_is_max_plus_one_after_deletion() {
        let store = DatasetStore::new(scratch("maxplusone"));
        let label = Label::parse("cat").unwrap();
        store.persist(&label, &frame()).unwrap();
        let second = store.persist(&label, &frame()).unwrap();
        fs::remove_file(&second.path).unwrap();
        let third = store.persist(&label, &frame()).unwrap();
        // Deleting the top record frees its number: the next persist
        // is max-existing-plus-one, so 000001 is handed out again.
        // Numbers below the surviving max stay unused forever.
        assert_eq!(third.seq, 1);
        assert!(third.path.ends_with("000001.png"));
    }

    #[test]
    fn concurrent_same_label_allocations_are_unique() {
        use std::thread;

        let store = Arc::new(DatasetStore::new(scratch("concurrent")));
        let label = Label::parse("cat").unwrap();

        // Several capture triggers racing on one label: the per-label
        // lock must serialize scan-then-allocate so every frame gets
        // its own number.
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                let label = label.clone();
                thread::spawn(move || store.persist(&label, &frame()).unwrap().seq)
            })
            .collect();
        let mut seqs: Vec<u64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        seqs.sort_unstable();

        assert_eq!(seqs, (0..8).collect::<Vec<u64>>());
        assert_eq!(store.count_for(&label).unwrap(), 8);
    }

    #[test]
    fn failed_encode_leaves_nothing_visible() {
        let store = DatasetStore::new(scratch("atomic"));
        let label = Label::parse("cat").unwrap();
        store.persist(&label, &frame()).unwrap();

        // A zero-sized frame cannot be encoded as PNG.
        let broken = Frame {
            image: RgbImage::new(0, 0),
        };
        let res = store.persist(&label, &broken);
        assert!(matches!(res, Err(CaptureError::Storage { .. })));

        // Only the one good record is visible, no temp leftovers.
        let entries: Vec<_> = fs::read_dir(store.label_dir(&label))
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(entries, vec!["000000.png"]);
        assert_eq!(store.count_for(&label).unwrap(), 1);
    }

    #[test]
    fn persist_fails_cleanly_on_unwritable_root() {
        // The root path is an existing file, so the label directory
        // cannot be created.
        let blocker = Path::new("/tmp/snaplabeltest/dataset-blocker");
        let _ = fs::remove_file(blocker);
        fs::create_dir_all(blocker.parent().unwrap()).unwrap();
        fs::write(blocker, b"x").unwrap();

        let store = DatasetStore::new(blocker);
        let label = Label::parse("cat").unwrap();
        assert!(matches!(
            store.persist(&label, &frame()),
            Err(CaptureError::Storage { .. })
        ));
    }
}
