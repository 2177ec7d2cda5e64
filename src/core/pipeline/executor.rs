//! Pipeline execution implementation.

use crate::core::dedup::{Deduplicator, MovePlan, MoveRole};
use crate::core::relocate::{ConflictPolicy, Relocator};
use crate::core::resolver::FallbackNaming;
use crate::core::scanner::{KeyIndex, MetadataPolicy, PhotoScanner, ScanConfig};
use crate::error::{OrganizeError, Result};
use crate::events::{null_sender, Event, EventSender, PipelineEvent, PipelinePhase, PipelineSummary};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Instant;

/// When moves happen relative to planning
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Plan a key, move its files, then go on to the next key
    #[default]
    Interleaved,
    /// Plan every key first, then execute all plans
    TwoPhase,
}

/// Result of pipeline execution
#[derive(Debug)]
pub struct PipelineResult {
    /// Counts for the whole run
    pub summary: PipelineSummary,
    /// Plans that were executed, in key order
    pub plans: Vec<MovePlan>,
}

/// Configuration for the pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Tree to scan
    pub root: PathBuf,
    /// Directory photos are moved into (None = the root itself)
    pub destination: Option<PathBuf>,
    /// Directory walker configuration
    pub scan_config: ScanConfig,
    /// Key derivation when no date is usable
    pub fallback: FallbackNaming,
    /// Handling of unreadable metadata
    pub metadata_policy: MetadataPolicy,
    /// Handling of occupied destinations
    pub conflict_policy: ConflictPolicy,
    /// Interleaved or two-phase execution
    pub mode: ExecutionMode,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            destination: None,
            scan_config: ScanConfig::default(),
            fallback: FallbackNaming::default(),
            metadata_policy: MetadataPolicy::default(),
            conflict_policy: ConflictPolicy::default(),
            mode: ExecutionMode::default(),
        }
    }
}

impl PipelineConfig {
    /// Directory photos end up in
    pub fn destination_dir(&self) -> PathBuf {
        self.destination.clone().unwrap_or_else(|| self.root.clone())
    }

    fn validate(&self) -> Result<()> {
        if self.root.as_os_str().is_empty() {
            return Err(OrganizeError::Config("source directory is empty".to_string()));
        }
        let destination = self.destination_dir();
        if destination.exists() && !destination.is_dir() {
            return Err(OrganizeError::Config(format!(
                "destination {} is not a directory",
                destination.display()
            )));
        }
        Ok(())
    }
}

/// Builder for pipeline configuration
#[derive(Default)]
pub struct PipelineBuilder {
    config: PipelineConfig,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the directory to scan
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.root = root.into();
        self
    }

    /// Move photos somewhere other than the scanned root
    pub fn destination(mut self, destination: impl Into<PathBuf>) -> Self {
        self.config.destination = Some(destination.into());
        self
    }

    /// Set directory walker configuration
    pub fn scan_config(mut self, config: ScanConfig) -> Self {
        self.config.scan_config = config;
        self
    }

    pub fn fallback_naming(mut self, fallback: FallbackNaming) -> Self {
        self.config.fallback = fallback;
        self
    }

    pub fn metadata_policy(mut self, policy: MetadataPolicy) -> Self {
        self.config.metadata_policy = policy;
        self
    }

    pub fn conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.config.conflict_policy = policy;
        self
    }

    pub fn mode(mut self, mode: ExecutionMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Build the pipeline
    pub fn build(self) -> Pipeline {
        Pipeline {
            config: self.config,
        }
    }
}

/// Scan, deduplicate and relocate one photo tree
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline without events
    pub fn run(&self) -> Result<PipelineResult> {
        self.run_with_events(&null_sender())
    }

    /// Run the pipeline, reporting through `events`
    pub fn run_with_events(&self, events: &EventSender) -> Result<PipelineResult> {
        events.send(Event::Pipeline(PipelineEvent::Started));

        let result = self.execute(events);
        if let Err(ref e) = result {
            events.send(Event::Pipeline(PipelineEvent::Error {
                message: e.to_string(),
            }));
        }
        result
    }

    /// Compute every key's plan without moving anything
    pub fn plan(&self, events: &EventSender) -> Result<Vec<MovePlan>> {
        self.config.validate()?;
        let index = self.scan(events)?;

        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Planning,
        }));
        let mut deduplicator = Deduplicator::new(self.config.destination_dir(), events.clone());
        index
            .iter()
            .map(|(key, paths)| deduplicator.plan(key, paths))
            .collect()
    }

    fn scan(&self, events: &EventSender) -> Result<KeyIndex> {
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Scanning,
        }));

        PhotoScanner::new(self.config.scan_config.clone(), events.clone())
            .fallback_naming(self.config.fallback)
            .metadata_policy(self.config.metadata_policy)
            .scan(&self.config.root)
    }

    fn execute(&self, events: &EventSender) -> Result<PipelineResult> {
        let start = Instant::now();
        self.config.validate()?;

        let destination = self.config.destination_dir();
        tracing::info!(
            "Organizing {} into {} ({:?})",
            self.config.root.display(),
            destination.display(),
            self.config.mode
        );

        let index = self.scan(events)?;

        let mut deduplicator = Deduplicator::new(destination, events.clone());
        let relocator =
            Relocator::new(events.clone()).conflict_policy(self.config.conflict_policy);

        let mut summary = PipelineSummary {
            total_photos: index.total_files(),
            total_keys: index.len(),
            ..Default::default()
        };
        let mut plans = Vec::with_capacity(index.len());

        match self.config.mode {
            ExecutionMode::Interleaved => {
                events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
                    phase: PipelinePhase::Moving,
                }));
                for (key, paths) in index.iter() {
                    let plan = deduplicator.plan(key, paths)?;
                    summary.files_moved += relocator.execute(&plan)?.moved;
                    plans.push(plan);
                }
            }
            ExecutionMode::TwoPhase => {
                events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
                    phase: PipelinePhase::Planning,
                }));
                for (key, paths) in index.iter() {
                    plans.push(deduplicator.plan(key, paths)?);
                }

                events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
                    phase: PipelinePhase::Moving,
                }));
                for plan in &plans {
                    summary.files_moved += relocator.execute(plan)?.moved;
                }
            }
        }

        summary.unique_files = plans.iter().map(|p| p.count(MoveRole::Unique)).sum();
        summary.redundant_files = plans.iter().map(|p| p.count(MoveRole::Redundant)).sum();
        summary.duration_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            "All done: {} photos, {} keys, {} redundant, {} moved",
            summary.total_photos,
            summary.total_keys,
            summary.redundant_files,
            summary.files_moved
        );

        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: summary.clone(),
        }));

        Ok(PipelineResult { summary, plans })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventChannel;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::TempDir;

    /// JPEG without EXIF whose scan data is `payload`
    fn write_plain_jpeg(dir: &std::path::Path, name: &str, payload: &[u8]) -> PathBuf {
        let path = dir.join(name);
        let mut bytes = vec![0xFF, 0xD8];
        // Start of scan, so readers stop looking for EXIF here
        bytes.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x08, 0x01, 0x01, 0x00, 0x00, 0x3F, 0x00]);
        bytes.extend_from_slice(payload);
        bytes.extend_from_slice(&[0xFF, 0xD9]);
        File::create(&path).unwrap().write_all(&bytes).unwrap();
        path
    }

    #[test]
    fn empty_tree_does_nothing() {
        let temp = TempDir::new().unwrap();
        let result = Pipeline::builder().root(temp.path()).build().run().unwrap();

        assert_eq!(result.summary.total_photos, 0);
        assert!(result.plans.is_empty());
    }

    #[test]
    fn nonexistent_root_is_an_error() {
        let result = Pipeline::builder()
            .root("/nonexistent/path/that/does/not/exist")
            .build()
            .run();

        assert!(matches!(result, Err(OrganizeError::FileSystemError { .. })));
    }

    #[test]
    fn file_as_destination_is_a_config_error() {
        let temp = TempDir::new().unwrap();
        let file = write_plain_jpeg(temp.path(), "a.jpg", b"a");

        let result = Pipeline::builder()
            .root(temp.path())
            .destination(&file)
            .build()
            .run();

        assert!(matches!(result, Err(OrganizeError::Config(_))));
    }

    #[test]
    fn plan_moves_nothing() {
        let temp = TempDir::new().unwrap();
        let a = write_plain_jpeg(temp.path(), "a.jpg", b"a");

        let plans = Pipeline::builder()
            .root(temp.path())
            .build()
            .plan(&null_sender())
            .unwrap();

        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].key.as_str(), "a");
        assert!(a.exists());
    }

    #[test]
    fn two_phase_plans_everything_before_moving() {
        let temp = TempDir::new().unwrap();
        write_plain_jpeg(temp.path(), "a.jpg", b"one");
        let sub = temp.path().join("sub");
        fs::create_dir(&sub).unwrap();
        write_plain_jpeg(&sub, "a.jpg", b"one");
        write_plain_jpeg(&sub, "b.jpg", b"two");

        let (sender, receiver) = EventChannel::new();
        let result = Pipeline::builder()
            .root(temp.path())
            .mode(ExecutionMode::TwoPhase)
            .build()
            .run_with_events(&sender)
            .unwrap();

        assert_eq!(result.summary.redundant_files, 1);
        assert!(temp.path().join("a.jpg").exists());
        assert!(temp.path().join("a_dup.jpg").exists());
        assert!(temp.path().join("b.jpg").exists());

        let events = receiver.drain();
        let last_plan = events
            .iter()
            .rposition(|e| matches!(e, Event::Dedup(_)))
            .unwrap();
        let first_move = events
            .iter()
            .position(|e| matches!(e, Event::Relocate(_)))
            .unwrap();
        assert!(last_plan < first_move);
    }

    #[test]
    fn completion_event_carries_summary() {
        let temp = TempDir::new().unwrap();
        write_plain_jpeg(temp.path(), "x.jpg", b"x");

        let (sender, receiver) = EventChannel::new();
        let result = Pipeline::builder()
            .root(temp.path())
            .build()
            .run_with_events(&sender)
            .unwrap();

        let completed = receiver.drain().into_iter().find_map(|e| match e {
            Event::Pipeline(PipelineEvent::Completed { summary }) => Some(summary),
            _ => None,
        });
        assert_eq!(completed, Some(result.summary));
    }
}
