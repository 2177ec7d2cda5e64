//! # Relocate Module
//!
//! Executes move plans on the filesystem.
//!
//! Files are renamed in place when possible and copied, verified and then
//! deleted when the rename crosses filesystems. A plan whose destinations
//! overlap its own sources is carried out through staging names so that no
//! source is replaced before it has been moved.

use crate::core::dedup::{MovePlan, PlannedMove};
use crate::error::{OrganizeError, Result};
use crate::events::{Event, EventSender, RelocateEvent};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// What to do when a destination is held by a file outside the plan
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Refuse the whole plan with `MoveFailed`
    #[default]
    Fail,
    /// Replace the existing file
    Overwrite,
}

/// Outcome of executing one plan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveReport {
    /// Files that changed location
    pub moved: usize,
    /// Files that already had their destination path
    pub already_in_place: usize,
    /// Whether staging names were used
    pub staged: bool,
}

/// Moves files according to plans
pub struct Relocator {
    conflict_policy: ConflictPolicy,
    same_file: fn(&Path, &Path) -> bool,
    events: EventSender,
}

impl Relocator {
    pub fn new(events: EventSender) -> Self {
        Self {
            conflict_policy: ConflictPolicy::default(),
            same_file: same_file_on_disk,
            events,
        }
    }

    pub fn conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.conflict_policy = policy;
        self
    }

    /// Replace the check deciding whether two existing paths are one file
    #[cfg(test)]
    fn with_same_file(mut self, same_file: fn(&Path, &Path) -> bool) -> Self {
        self.same_file = same_file;
        self
    }

    /// Execute every move of `plan`
    pub fn execute(&self, plan: &MovePlan) -> Result<MoveReport> {
        let mut report = MoveReport::default();

        let mut pending = Vec::with_capacity(plan.moves.len());
        for planned in &plan.moves {
            if planned.from == planned.to {
                report.already_in_place += 1;
                self.events.send(Event::Relocate(RelocateEvent::AlreadyInPlace {
                    path: planned.from.clone(),
                }));
            } else {
                pending.push(planned);
            }
        }

        self.check_conflicts(&pending)?;

        let overlapping = pending.iter().enumerate().any(|(i, planned)| {
            pending
                .iter()
                .enumerate()
                .any(|(j, other)| i != j && self.occupies(&other.from, &planned.to))
        });
        if overlapping {
            self.execute_staged(plan, &pending)?;
            report.staged = true;
        } else {
            for planned in &pending {
                self.relocate(&planned.from, &planned.to)?;
            }
        }

        report.moved = pending.len();
        Ok(report)
    }

    /// Whether the file at `source` currently sits at `destination`.
    ///
    /// Differently spelled paths can name one file, e.g. `IMG_1.JPG` and
    /// `IMG_1.jpg` on a case-insensitive filesystem.
    fn occupies(&self, source: &Path, destination: &Path) -> bool {
        source == destination || (destination.exists() && (self.same_file)(source, destination))
    }

    /// Fail before touching anything if a destination is held by a stranger
    fn check_conflicts(&self, pending: &[&PlannedMove]) -> Result<()> {
        if self.conflict_policy == ConflictPolicy::Overwrite {
            return Ok(());
        }

        match pending.iter().find(|planned| {
            planned.to.exists() && !pending.iter().any(|m| self.occupies(&m.from, &planned.to))
        }) {
            Some(planned) => Err(OrganizeError::MoveFailed {
                from: planned.from.clone(),
                to: planned.to.clone(),
                reason: "destination already exists".to_string(),
            }),
            None => Ok(()),
        }
    }

    fn execute_staged(&self, plan: &MovePlan, pending: &[&PlannedMove]) -> Result<()> {
        tracing::debug!(
            "Destinations of {} overlap its sources; moving through staging names",
            plan.key
        );
        self.events.send(Event::Relocate(RelocateEvent::Staged {
            key: plan.key.to_string(),
            files: pending.len(),
        }));

        let dir = match pending.first() {
            Some(planned) => staging_dir(&planned.to)?,
            None => return Ok(()),
        };

        let mut staged = Vec::with_capacity(pending.len());
        for (i, planned) in pending.iter().enumerate() {
            let staging = dir.join(i.to_string());
            if let Err(e) = move_file(&planned.from, &staging) {
                restore(pending, &staged, 0, &dir);
                return Err(e);
            }
            staged.push(staging);
        }

        for (relocated, (staging, planned)) in staged.iter().zip(pending).enumerate() {
            if let Err(e) = self.relocate(staging, &planned.to) {
                restore(pending, &staged, relocated, &dir);
                return Err(e);
            }
        }

        remove_staging_dir(&dir);
        Ok(())
    }

    fn relocate(&self, from: &Path, to: &Path) -> Result<()> {
        move_file(from, to)?;
        tracing::debug!("Moved {} to {}", from.display(), to.display());
        self.events.send(Event::Relocate(RelocateEvent::Moved {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
        }));
        Ok(())
    }
}

fn same_file_on_disk(a: &Path, b: &Path) -> bool {
    same_file::is_same_file(a, b).unwrap_or(false)
}

/// Create a fresh staging directory next to `destination`.
///
/// `create_dir` fails on an existing name, so a returned directory belongs
/// to this call alone.
fn staging_dir(destination: &Path) -> Result<PathBuf> {
    let parent = destination.parent().unwrap_or(Path::new(""));
    let mut attempt = 0usize;
    loop {
        let candidate = parent.join(format!(
            ".photo-organizer-{}-{}.staging",
            std::process::id(),
            attempt
        ));
        match fs::create_dir(&candidate) {
            Ok(()) => return Ok(candidate),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(OrganizeError::fs(candidate, e)),
        }
    }
}

/// Undo a staged plan that failed part way.
///
/// `staged[i]` holds the file of `pending[i]`, except that the first
/// `relocated` files have already reached their destination.
fn restore(pending: &[&PlannedMove], staged: &[PathBuf], relocated: usize, dir: &Path) {
    for (planned, staging) in pending.iter().zip(staged).take(relocated).rev() {
        if let Err(e) = move_file(&planned.to, staging) {
            tracing::error!("Could not take back {}: {}", planned.to.display(), e);
        }
    }

    let mut stranded = false;
    for (planned, staging) in pending.iter().zip(staged) {
        if let Err(e) = move_file(staging, &planned.from) {
            tracing::error!("Could not restore {}: {}", planned.from.display(), e);
            stranded = true;
        }
    }

    if stranded {
        tracing::error!("Unrestored files are left in {}", dir.display());
    } else {
        remove_staging_dir(dir);
    }
}

fn remove_staging_dir(dir: &Path) {
    if let Err(e) = fs::remove_dir(dir) {
        tracing::warn!("Could not remove staging directory {}: {}", dir.display(), e);
    }
}

/// Move a single file, creating the destination directory if needed
pub fn move_file(from: &Path, to: &Path) -> Result<()> {
    let failed = |reason: String| OrganizeError::MoveFailed {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        reason,
    };

    if let Some(parent) = to.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| OrganizeError::fs(parent, e))?;
        }
    }

    fs::rename(from, to)
        .or_else(|rename_error| {
            // rename fails across filesystems, fall back to copy+delete
            // with size verification before deleting the source
            let source_size = fs::metadata(from)?.len();
            fs::copy(from, to)?;

            let dest_size = fs::metadata(to)?.len();
            if dest_size != source_size {
                let _ = fs::remove_file(to);
                return Err(io::Error::new(
                    io::ErrorKind::Other,
                    format!(
                        "copy verification failed after rename error ({}): source {} bytes, dest {} bytes",
                        rename_error, source_size, dest_size
                    ),
                ));
            }

            fs::remove_file(from)
        })
        .map_err(|e| failed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dedup::MoveRole;
    use crate::core::resolver::CanonicalKey;
    use crate::events::{null_sender, EventChannel};
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.join(name);
        File::create(&path).unwrap().write_all(bytes).unwrap();
        path
    }

    fn plan(key: &str, moves: &[(&Path, &Path)]) -> MovePlan {
        MovePlan {
            key: CanonicalKey::new(key),
            moves: moves
                .iter()
                .map(|(from, to)| PlannedMove {
                    from: from.to_path_buf(),
                    to: to.to_path_buf(),
                    role: MoveRole::Unique,
                })
                .collect(),
        }
    }

    #[test]
    fn moves_files_to_destinations() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir(&src).unwrap();
        let a = write(&src, "a.jpg", b"a");
        let dest = temp.path().join("k.jpg");

        let (sender, receiver) = EventChannel::new();
        let report = Relocator::new(sender).execute(&plan("k", &[(&a, &dest)])).unwrap();

        assert_eq!(report.moved, 1);
        assert!(!a.exists());
        assert_eq!(fs::read(&dest).unwrap(), b"a");
        assert!(receiver
            .drain()
            .iter()
            .any(|e| matches!(e, Event::Relocate(RelocateEvent::Moved { .. }))));
    }

    #[test]
    fn creates_missing_destination_directory() {
        let temp = TempDir::new().unwrap();
        let a = write(temp.path(), "a.jpg", b"a");
        let dest = temp.path().join("out").join("k.jpg");

        Relocator::new(null_sender())
            .execute(&plan("k", &[(&a, &dest)]))
            .unwrap();

        assert!(dest.exists());
    }

    #[test]
    fn file_already_in_place_is_left_alone() {
        let temp = TempDir::new().unwrap();
        let a = write(temp.path(), "k.jpg", b"a");

        let report = Relocator::new(null_sender())
            .execute(&plan("k", &[(&a, &a)]))
            .unwrap();

        assert_eq!(report.moved, 0);
        assert_eq!(report.already_in_place, 1);
        assert_eq!(fs::read(&a).unwrap(), b"a");
    }

    #[test]
    fn swapping_names_goes_through_staging() {
        let temp = TempDir::new().unwrap();
        let x = write(temp.path(), "k_0.jpg", b"x");
        let y = write(temp.path(), "k_1.jpg", b"y");

        let report = Relocator::new(null_sender())
            .execute(&plan("k", &[(&x, &y), (&y, &x)]))
            .unwrap();

        assert!(report.staged);
        assert_eq!(fs::read(&x).unwrap(), b"y");
        assert_eq!(fs::read(&y).unwrap(), b"x");
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 2);
    }

    #[test]
    fn source_holding_another_destination_is_not_lost() {
        let temp = TempDir::new().unwrap();
        let sub = temp.path().join("sub");
        fs::create_dir(&sub).unwrap();
        let first = write(&sub, "p.jpg", b"same");
        let existing = write(temp.path(), "k.jpg", b"same");
        let dup = temp.path().join("k_dup.jpg");

        Relocator::new(null_sender())
            .execute(&plan("k", &[(&first, &existing), (&existing, &dup)]))
            .unwrap();

        assert!(!first.exists());
        assert!(existing.exists());
        assert!(dup.exists());
    }

    #[test]
    fn occupied_destination_fails_by_default() {
        let temp = TempDir::new().unwrap();
        let a = write(temp.path(), "a.jpg", b"new");
        let other = write(temp.path(), "k.jpg", b"unrelated");

        let result = Relocator::new(null_sender()).execute(&plan("k", &[(&a, &other)]));

        assert!(matches!(result, Err(OrganizeError::MoveFailed { .. })));
        assert!(a.exists());
        assert_eq!(fs::read(&other).unwrap(), b"unrelated");
    }

    #[test]
    fn occupied_destination_can_be_overwritten() {
        let temp = TempDir::new().unwrap();
        let a = write(temp.path(), "a.jpg", b"new");
        let other = write(temp.path(), "k.jpg", b"unrelated");

        Relocator::new(null_sender())
            .conflict_policy(ConflictPolicy::Overwrite)
            .execute(&plan("k", &[(&a, &other)]))
            .unwrap();

        assert!(!a.exists());
        assert_eq!(fs::read(&other).unwrap(), b"new");
    }

    #[test]
    fn missing_source_is_a_move_failure() {
        let temp = TempDir::new().unwrap();
        let result = move_file(&temp.path().join("gone.jpg"), &temp.path().join("k.jpg"));
        assert!(matches!(result, Err(OrganizeError::MoveFailed { .. })));
    }

    #[test]
    fn failed_staged_plan_puts_every_file_back() {
        let temp = TempDir::new().unwrap();
        let y = write(temp.path(), "y.jpg", b"new");
        let k0 = write(temp.path(), "k_0.jpg", b"old");
        // A directory with content cannot be replaced by a file
        let k1 = temp.path().join("k_1.jpg");
        fs::create_dir(&k1).unwrap();
        write(&k1, "inside", b"x");

        let result = Relocator::new(null_sender())
            .conflict_policy(ConflictPolicy::Overwrite)
            .execute(&plan("k", &[(&y, &k0), (&k0, &k1)]));

        assert!(matches!(result, Err(OrganizeError::MoveFailed { .. })));
        assert_eq!(fs::read(&y).unwrap(), b"new");
        assert_eq!(fs::read(&k0).unwrap(), b"old");
        assert!(k1.is_dir());
        let mut names: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["k_0.jpg", "k_1.jpg", "y.jpg"]);
    }

    #[test]
    fn renaming_a_file_onto_itself_is_not_a_conflict() {
        let temp = TempDir::new().unwrap();
        let upper = write(temp.path(), "IMG_0042.JPG", b"photo");
        // Stands in for the same file seen through a case-insensitive name
        let lower = write(temp.path(), "IMG_0042.jpg", b"photo");

        let case_insensitive: fn(&Path, &Path) -> bool =
            |a, b| a.to_string_lossy().to_lowercase() == b.to_string_lossy().to_lowercase();

        let report = Relocator::new(null_sender())
            .with_same_file(case_insensitive)
            .execute(&plan("IMG_0042", &[(&upper, &lower)]))
            .unwrap();

        assert_eq!(report.moved, 1);
        assert!(!report.staged);
        let names: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["IMG_0042.jpg"]);
        assert_eq!(fs::read(&lower).unwrap(), b"photo");
    }

    #[test]
    fn different_spelling_of_a_stranger_is_still_a_conflict() {
        let temp = TempDir::new().unwrap();
        let a = write(temp.path(), "a.jpg", b"new");
        let other = write(temp.path(), "k.jpg", b"unrelated");

        let result = Relocator::new(null_sender())
            .with_same_file(|_, _| false)
            .execute(&plan("k", &[(&a, &other)]));

        assert!(matches!(result, Err(OrganizeError::MoveFailed { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn hard_links_are_the_same_file_on_disk() {
        let temp = TempDir::new().unwrap();
        let a = write(temp.path(), "a.jpg", b"x");
        let b = temp.path().join("b.jpg");
        fs::hard_link(&a, &b).unwrap();
        let c = write(temp.path(), "c.jpg", b"x");

        assert!(same_file_on_disk(&a, &b));
        assert!(!same_file_on_disk(&a, &c));
        assert!(!same_file_on_disk(&a, &temp.path().join("gone.jpg")));
    }

    #[test]
    fn staging_directories_are_never_shared() {
        let temp = TempDir::new().unwrap();
        let destination = temp.path().join("k.jpg");

        let first = staging_dir(&destination).unwrap();
        let second = staging_dir(&destination).unwrap();

        assert_ne!(first, second);
        assert!(first.is_dir());
        assert!(second.is_dir());
        assert_eq!(first.parent(), Some(temp.path()));
    }
}
