//! Collision-free file naming inside a label directory.
//!
//! Records are named by a zero-padded sequence number plus the fixed
//! image extension, so lexicographic and numeric order coincide.
//! Allocation is max-existing-plus-one: numbers below the current max
//! are never handed out again, so deletions leave permanent gaps.

use std::fs;
use std::io;
use std::path::Path;

use crate::module::define;

/// Record file name for a sequence number, e.g. `000042.png`.
pub fn file_name(seq: u64) -> String {
    format!(
        "{:0width$}.{}",
        seq,
        define::capture::IMG_EXT,
        width = define::capture::SEQ_WIDTH
    )
}

/// Hidden temporary name used while a record is being encoded. The
/// `.tmp` extension keeps it invisible to `seq_of`.
pub fn tmp_name(seq: u64) -> String {
    format!(
        ".{:0width$}.{}.tmp",
        seq,
        define::capture::IMG_EXT,
        width = define::capture::SEQ_WIDTH
    )
}

/// Sequence number of an existing record file, or `None` for temp and
/// foreign files.
pub fn seq_of(path: &Path) -> Option<u64> {
    if path.extension()? != define::capture::IMG_EXT {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    if stem.len() != define::capture::SEQ_WIDTH {
        return None;
    }
    stem.parse().ok()
}

/// Next free sequence number for a label directory: max existing plus
/// one, or 0 when the directory is empty or absent.
pub fn next_seq(dir: &Path) -> io::Result<u64> {
    if !dir.is_dir() {
        return Ok(0);
    }
    let mut next = 0;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if let Some(seq) = seq_of(&entry.path()) {
            next = next.max(seq + 1);
        }
    }
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn scratch(name: &str) -> PathBuf {
        let dir = PathBuf::from("/tmp/snaplabeltest/name").join(name);
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn fresh_dir_starts_at_zero() {
        let dir = scratch("fresh");
        assert_eq!(next_seq(&dir).unwrap(), 0);
        // An absent directory behaves like an empty one.
        assert_eq!(next_seq(&dir.join("missing")).unwrap(), 0);
    }

    #[test]
    fn next_is_max_plus_one() {
        let dir = scratch("maxplus");
        fs::write(dir.join("000000.png"), b"x").unwrap();
        fs::write(dir.join("000007.png"), b"x").unwrap();
        assert_eq!(next_seq(&dir).unwrap(), 8);
    }

    #[test]
    fn foreign_files_are_ignored() {
        let dir = scratch("foreign");
        fs::write(dir.join("000003.png"), b"x").unwrap();
        fs::write(dir.join("notes.txt"), b"x").unwrap();
        fs::write(dir.join("123.png"), b"x").unwrap(); // wrong width
        fs::write(dir.join(".000009.png.tmp"), b"x").unwrap();
        assert_eq!(next_seq(&dir).unwrap(), 4);
    }

    #[test]
    fn names_sort_lexicographically() {
        assert_eq!(file_name(0), "000000.png");
        assert_eq!(file_name(42), "000042.png");
        assert!(file_name(9) < file_name(10));
        assert_eq!(seq_of(Path::new("/data/cat/000042.png")), Some(42));
        assert_eq!(seq_of(Path::new("/data/cat/.000042.png.tmp")), None);
    }
}
