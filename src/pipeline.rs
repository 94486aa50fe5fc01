// src/pipeline.rs
//! Drives one extraction attempt: image scan first, then every registered dataset
//! in order, yielding one progress step per unit of work.

use serde::Serialize;
use std::{
    collections::VecDeque,
    io::{Read, Seek},
};
use tracing::{debug, info, instrument, warn};

use crate::annotations::{is_image, AnnotationLookup, FeatureDetector};
use crate::archive::{ArchiveStatus, DdpArchive};
use crate::extract::{ExtractContext, ExtractResult, ExtractionError, NameList};
use crate::registry::{DatasetDescriptor, LocalizedText, REGISTRY};
use crate::table::ResultTable;

/// Marker text for a dataset whose file is not in the package.
pub const ABSENT_MARKER: &str = "file does not exist";

/// The table produced for one registry entry: extracted rows, or a marker.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetOutput {
    pub name: &'static str,
    pub title: LocalizedText,
    pub table: ResultTable,
    #[serde(skip)]
    pub failure: Option<ExtractionError>,
}

impl DatasetOutput {
    fn from_result(descriptor: &DatasetDescriptor, result: ExtractResult) -> Self {
        let (table, failure) = match result {
            Ok(table) => (table, None),
            Err(ExtractionError::NotFound) => {
                debug!(dataset = descriptor.name, "file does not exist");
                (
                    ResultTable::marker(descriptor.name, ABSENT_MARKER),
                    Some(ExtractionError::NotFound),
                )
            }
            Err(e) => {
                warn!(dataset = descriptor.name, kind = e.kind(), "extraction failed: {}", e);
                let reason = format!("extraction failed: {}", e.kind());
                (ResultTable::marker(descriptor.name, &reason), Some(e))
            }
        };
        Self {
            name: descriptor.name,
            title: descriptor.title,
            table,
            failure,
        }
    }

    pub fn is_marker(&self) -> bool {
        self.failure.is_some()
    }
}

#[derive(Debug, Clone)]
pub enum StepEvent {
    /// One image went through the feature detector. `None` when detection failed.
    Scanned { entry: String, features: Option<u32> },
    Dataset(DatasetOutput),
}

#[derive(Debug, Clone)]
pub struct Progress {
    /// 1-based index of this step.
    pub step: usize,
    pub total: usize,
    pub event: StepEvent,
}

impl Progress {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.step as f64 / self.total as f64
        }
    }

    /// Entry path or dataset name this step worked on.
    pub fn label(&self) -> &str {
        match &self.event {
            StepEvent::Scanned { entry, .. } => entry,
            StepEvent::Dataset(out) => out.name,
        }
    }
}

/// A resumable extraction run over one archive.
///
/// The archive is owned by the pipeline and released once the final step has been
/// produced, or when the pipeline is dropped part-way.
pub struct Pipeline<'a, R> {
    archive: Option<DdpArchive<R>>,
    registry: &'a [DatasetDescriptor],
    names: &'a NameList,
    detector: &'a dyn FeatureDetector,
    pending_images: VecDeque<usize>,
    annotations: AnnotationLookup,
    next_dataset: usize,
    step: usize,
    total: usize,
}

impl<'a, R: Read + Seek> Pipeline<'a, R> {
    pub fn new(
        archive: DdpArchive<R>,
        registry: &'a [DatasetDescriptor],
        names: &'a NameList,
        detector: &'a dyn FeatureDetector,
    ) -> Self {
        // the scan is only worth its cost when some dataset joins against it
        let pending_images: VecDeque<usize> = if registry.iter().any(|d| d.needs_annotations()) {
            archive
                .entry_names()
                .iter()
                .enumerate()
                .filter(|(_, name)| is_image(name))
                .map(|(i, _)| i)
                .collect()
        } else {
            VecDeque::new()
        };
        let total = pending_images.len() + registry.len();
        debug!(images = pending_images.len(), datasets = registry.len(), "pipeline ready");

        Self {
            archive: Some(archive),
            registry,
            names,
            detector,
            pending_images,
            annotations: AnnotationLookup::new(),
            next_dataset: 0,
            step: 0,
            total,
        }
    }

    pub fn total_steps(&self) -> usize {
        self.total
    }

    /// Whether the archive is still held open.
    pub fn is_open(&self) -> bool {
        self.archive.is_some()
    }

    /// Run to completion, keeping only the dataset tables (registry order).
    pub fn collect_outputs(self) -> Vec<DatasetOutput> {
        self.filter_map(|p| match p.event {
            StepEvent::Dataset(out) => Some(out),
            StepEvent::Scanned { .. } => None,
        })
        .collect()
    }
}

impl<R: Read + Seek> Iterator for Pipeline<'_, R> {
    type Item = Progress;

    fn next(&mut self) -> Option<Progress> {
        let archive = self.archive.as_mut()?;

        let event = if let Some(index) = self.pending_images.pop_front() {
            scan_image(archive, index, self.detector, &mut self.annotations)
        } else if let Some(descriptor) = self.registry.get(self.next_dataset) {
            self.next_dataset += 1;
            let ctx = ExtractContext {
                annotations: &self.annotations,
                names: self.names,
            };
            StepEvent::Dataset(extract_dataset(archive, descriptor, &ctx))
        } else {
            self.archive = None;
            return None;
        };

        self.step += 1;
        if self.step >= self.total {
            self.archive = None;
        }
        Some(Progress {
            step: self.step,
            total: self.total,
            event,
        })
    }
}

fn scan_image<R: Read + Seek>(
    archive: &mut DdpArchive<R>,
    index: usize,
    detector: &dyn FeatureDetector,
    annotations: &mut AnnotationLookup,
) -> StepEvent {
    let entry = archive.entry_names()[index].clone();

    let bytes = if detector.reads_content() {
        match archive.read_entry(index) {
            Ok(b) => b,
            Err(e) => {
                warn!(entry = %entry, "cannot read image: {}", e);
                return StepEvent::Scanned { entry, features: None };
            }
        }
    } else {
        Vec::new()
    };

    let features = match detector.detect(&entry, &bytes) {
        Ok(count) => {
            annotations.insert(entry.clone(), count);
            Some(count)
        }
        Err(e) => {
            warn!(entry = %entry, "feature detection failed: {:#}", e);
            None
        }
    };
    StepEvent::Scanned { entry, features }
}

#[instrument(level = "debug", skip_all, fields(dataset = descriptor.name))]
fn extract_dataset<R: Read + Seek>(
    archive: &mut DdpArchive<R>,
    descriptor: &DatasetDescriptor,
    ctx: &ExtractContext<'_>,
) -> DatasetOutput {
    let result = match archive.locate(descriptor.locate_pattern) {
        Some(record) => descriptor.extractor.extract(&record, ctx),
        None => Err(ExtractionError::NotFound),
    };
    DatasetOutput::from_result(descriptor, result)
}

/// Open `reader` and accept it only if it classifies as a supported export.
pub fn open_validated<R: Read + Seek>(reader: R) -> Result<DdpArchive<R>, ArchiveStatus> {
    let archive = DdpArchive::new(reader).map_err(|e| {
        warn!("archive rejected: {}", e);
        ArchiveStatus::InvalidUnreadable
    })?;
    match archive.classify() {
        ArchiveStatus::Valid => Ok(archive),
        other => Err(other),
    }
}

/// Every registered dataset, in order, extracted from `archive`.
/// Progress is logged every tenth of the way.
#[instrument(level = "info", skip_all, fields(entries = archive.len()))]
pub fn run<R: Read + Seek>(
    archive: DdpArchive<R>,
    names: &NameList,
    detector: &dyn FeatureDetector,
) -> Vec<DatasetOutput> {
    let mut outputs = Vec::with_capacity(REGISTRY.len());
    let mut last_decile = 0;
    for progress in Pipeline::new(archive, REGISTRY, names, detector) {
        let decile = (progress.fraction() * 10.0) as u32;
        if decile > last_decile {
            info!("{:>3}% ({}/{})", decile * 10, progress.step, progress.total);
            last_decile = decile;
        }
        match progress.event {
            StepEvent::Scanned { entry, features } => {
                debug!(entry = %entry, ?features, "scanned image");
            }
            StepEvent::Dataset(out) => outputs.push(out),
        }
    }

    let extracted = outputs.iter().filter(|o| !o.is_marker()).count();
    info!(extracted, markers = outputs.len() - extracted, "extraction finished");
    outputs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::{NoDetector, PrecomputedDetector};
    use crate::archive::fixture::zip_with;
    use crate::extract::Extractor;
    use crate::table::Cell;
    use anyhow::{Context, Result};
    use std::io::Cursor;

    const TITLE: LocalizedText = LocalizedText {
        en: "t",
        nl: "t",
        de: "t",
    };

    fn counted(name: &'static str, pattern: &'static str) -> DatasetDescriptor {
        DatasetDescriptor {
            name,
            locate_pattern: pattern,
            extractor: Extractor::Count {
                list_key: None,
                column: "n",
            },
            title: TITLE,
        }
    }

    fn open(entries: &[(&str, &str)]) -> Result<DdpArchive<Cursor<Vec<u8>>>> {
        Ok(DdpArchive::new(zip_with(entries))?)
    }

    #[test]
    fn absent_dataset_becomes_marker_between_extracted_ones() -> Result<()> {
        let registry = [
            counted("first", "alpha"),
            counted("second", "beta"),
            counted("third", "gamma"),
        ];
        let archive = open(&[
            ("export/alpha.json", "[1, 2]"),
            ("export/gamma.json", "[1]"),
        ])?;
        let names = NameList::default();

        let outputs = Pipeline::new(archive, &registry, &names, &NoDetector).collect_outputs();

        let order: Vec<_> = outputs.iter().map(|o| o.name).collect();
        assert_eq!(order, ["first", "second", "third"]);
        assert_eq!(outputs[0].table.rows, vec![vec![Cell::Int(2)]]);
        assert!(outputs[1].is_marker());
        assert_eq!(outputs[1].failure, Some(ExtractionError::NotFound));
        assert_eq!(outputs[1].table, ResultTable::marker("second", ABSENT_MARKER));
        assert_eq!(outputs[2].table.rows, vec![vec![Cell::Int(1)]]);
        Ok(())
    }

    #[test]
    fn failing_extractor_is_isolated() -> Result<()> {
        let registry = [counted("broken", "alpha"), counted("fine", "gamma")];
        let archive = open(&[
            ("export/alpha.json", r#""not a list""#),
            ("export/gamma.json", "[]"),
        ])?;
        let names = NameList::default();

        let outputs = Pipeline::new(archive, &registry, &names, &NoDetector).collect_outputs();

        assert_eq!(
            outputs[0].table.rows,
            vec![vec![Cell::Text("extraction failed: schema_mismatch".into())]]
        );
        assert_eq!(outputs[0].table.columns, vec!["broken".to_string()]);
        assert_eq!(outputs[1].table.rows, vec![vec![Cell::Int(0)]]);
        Ok(())
    }

    #[test]
    fn personal_information_ignores_earlier_siblings() -> Result<()> {
        let archive = open(&[
            (
                "personal_information/personal_information/account_information.json",
                r#"{"profile_account_insights": []}"#,
            ),
            (
                "personal_information/device_information/devices.json",
                r#"{"devices_devices": []}"#,
            ),
            (
                "personal_information/personal_information/personal_information.json",
                r#"{"profile_user": [{"string_map_data": {
                    "Name": {"value": "Anna"},
                    "Username": {"value": "xyz123"}
                }}]}"#,
            ),
        ])?;
        let names = NameList::from_names(["Anna"]);

        let outputs = run(archive, &names, &NoDetector);

        let personal = outputs
            .iter()
            .find(|o| o.name == "personal_information")
            .context("dataset in output")?;
        assert_eq!(personal.table.rows, vec![vec![Cell::Bool(true), Cell::Bool(false)]]);
        Ok(())
    }

    #[test]
    fn single_ad_click_end_to_end() -> Result<()> {
        let archive = open(&[(
            "ads_information/ads_and_topics/ads_clicked.json",
            r#"{"impressions_history_ads_clicked": [
                {"title": "Shoe Co", "string_list_data": [{"timestamp": 1700000000}]}
            ]}"#,
        )])?;
        let names = NameList::default();

        let outputs = run(archive, &names, &NoDetector);

        assert_eq!(outputs.len(), REGISTRY.len());
        let first = &outputs[0];
        assert_eq!(first.name, "ads_clicked");
        assert!(!first.is_marker());
        let records = first.table.to_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["date"], "2023-11-14");
        assert_eq!(records[0]["ads_clicked"], serde_json::json!(["Shoe Co"]));
        assert!(outputs[1..].iter().all(DatasetOutput::is_marker));
        Ok(())
    }

    #[test]
    fn empty_export_is_still_displayable() -> Result<()> {
        let archive = open(&[("personal_information/readme.txt", "nothing here")])?;
        let names = NameList::default();

        let outputs = run(archive, &names, &NoDetector);

        assert_eq!(outputs.len(), REGISTRY.len());
        for out in &outputs {
            assert_eq!(out.table.len(), 1);
            assert_eq!(out.table.columns, vec![out.name.to_string()]);
        }
        Ok(())
    }

    #[test]
    fn progress_counts_images_then_datasets() -> Result<()> {
        let registry = [
            DatasetDescriptor {
                name: "posts",
                locate_pattern: "posts_1",
                extractor: Extractor::Annotated(crate::extract::media::extract_posts),
                title: TITLE,
            },
            counted("other", "missing"),
        ];
        let archive = open(&[
            ("media/posts/a.jpg", "jpeg"),
            ("media/posts/b.PNG", "png"),
            (
                "your_instagram_activity/content/posts_1.json",
                r#"[{"media": [{"uri": "media/posts/a.jpg", "creation_timestamp": 1700000000}]}]"#,
            ),
        ])?;
        let names = NameList::default();
        let detector = PrecomputedDetector::from_lookup(
            [("media/posts/a.jpg".to_string(), 3)].into_iter().collect(),
        );

        let mut pipeline = Pipeline::new(archive, &registry, &names, &detector);
        assert_eq!(pipeline.total_steps(), 4);

        let steps: Vec<Progress> = pipeline.by_ref().collect();
        assert!(!pipeline.is_open());
        assert_eq!(steps.len(), 4);
        assert!(matches!(steps[0].event, StepEvent::Scanned { features: Some(3), .. }));
        assert!(matches!(steps[1].event, StepEvent::Scanned { features: Some(0), .. }));
        assert_eq!(steps[2].label(), "posts");
        assert!((steps[3].fraction() - 1.0).abs() < f64::EPSILON);
        assert!(steps.windows(2).all(|w| w[0].fraction() < w[1].fraction()));

        let StepEvent::Dataset(posts) = &steps[2].event else {
            panic!("expected dataset step");
        };
        assert_eq!(
            posts.table.rows,
            vec![vec![
                Cell::Text("2023-11-14".into()),
                Cell::Text("media/posts/a.jpg".into()),
                Cell::Int(3),
                Cell::Bool(true),
                Cell::Bool(false),
            ]]
        );
        Ok(())
    }

    #[test]
    fn no_scan_without_annotated_datasets() -> Result<()> {
        let registry = [counted("only", "alpha")];
        let archive = open(&[("a.jpg", "x"), ("alpha.json", "[]")])?;
        let names = NameList::default();

        let pipeline = Pipeline::new(archive, &registry, &names, &NoDetector);
        assert_eq!(pipeline.total_steps(), 1);
        Ok(())
    }

    #[test]
    fn abandoned_pipeline_stops_cleanly() -> Result<()> {
        let archive = open(&[("alpha.json", "[]")])?;
        let names = NameList::default();
        let mut pipeline = Pipeline::new(archive, REGISTRY, &names, &NoDetector);

        let first = pipeline.next().expect("at least one step");
        assert_eq!(first.step, 1);
        assert!(pipeline.is_open());
        drop(pipeline);
        Ok(())
    }

    #[test]
    fn validation_gate() {
        let ok = zip_with(&[("your_instagram_activity/likes/liked_posts.json", "{}")]);
        assert!(open_validated(ok).is_ok());

        let html = zip_with(&[
            ("your_instagram_activity/likes/liked_posts.html", ""),
            ("start_here.html", ""),
        ]);
        assert_eq!(open_validated(html).err(), Some(ArchiveStatus::InvalidWrongFormat));

        let junk = Cursor::new(b"definitely not a zip".to_vec());
        assert_eq!(open_validated(junk).err(), Some(ArchiveStatus::InvalidUnreadable));
    }
}
