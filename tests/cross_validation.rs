use parking_lot::Mutex;
use screenmatch::image::color::{BLACK, WHITE};
use screenmatch::{
    BadCharacterFinder, CrossValidatorConfig, FinderCrossValidator, ImageExporter, NaiveFinder,
    ParallelFinder, PatternFinder, PixelImage, Position, ScreenMatchError, ScreenMatchResult,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Reports every match one column to the right of where it really is.
struct OffByOne;

impl PatternFinder for OffByOne {
    fn name(&self) -> &str {
        "off-by-one"
    }

    fn find(
        &self,
        screen: &PixelImage,
        pattern: &PixelImage,
    ) -> ScreenMatchResult<Option<Position>> {
        Ok(NaiveFinder::new()
            .find(screen, pattern)?
            .map(|p| Position::new(p.x + 1, p.y)))
    }

    fn find_all(
        &self,
        screen: &PixelImage,
        pattern: &PixelImage,
    ) -> ScreenMatchResult<Vec<Position>> {
        NaiveFinder::new().find_all(screen, pattern)
    }

    fn at(
        &self,
        screen: &PixelImage,
        pattern: &PixelImage,
        position: Position,
    ) -> ScreenMatchResult<bool> {
        NaiveFinder::new().at(screen, pattern, position)
    }
}

#[derive(Clone, Default)]
struct RecordingExporter {
    exported: Arc<Mutex<Vec<(PathBuf, PixelImage)>>>,
}

impl ImageExporter for RecordingExporter {
    fn export(&self, image: &PixelImage, path: &Path) -> ScreenMatchResult<()> {
        self.exported.lock().push((path.to_path_buf(), image.clone()));
        Ok(())
    }
}

struct FailingExporter;

impl ImageExporter for FailingExporter {
    fn export(&self, _image: &PixelImage, path: &Path) -> ScreenMatchResult<()> {
        Err(ScreenMatchError::ImageIo {
            reason: format!("cannot write {}", path.display()),
        })
    }
}

fn screen_with_marker() -> PixelImage {
    PixelImage::from_fn(16, 6, |x, y| if (x, y) == (9, 4) { WHITE } else { BLACK }).unwrap()
}

fn marker() -> PixelImage {
    PixelImage::filled(1, 1, WHITE).unwrap()
}

#[test]
fn requires_at_least_one_finder() {
    let err = FinderCrossValidator::new(Vec::new()).err().unwrap();
    assert!(err.is_invalid_argument());
}

#[test]
fn agreeing_finders_pass_results_through() {
    let validator = FinderCrossValidator::new(vec![
        Box::new(NaiveFinder::new()),
        Box::new(BadCharacterFinder::new()),
        Box::new(ParallelFinder::new()),
    ])
    .unwrap();
    let screen = screen_with_marker();
    let pattern = marker();

    assert_eq!(validator.name(), "cross-validator");
    assert_eq!(
        validator.find(&screen, &pattern).unwrap(),
        Some(Position::new(9, 4))
    );
    assert_eq!(
        validator.find_all(&screen, &pattern).unwrap(),
        vec![Position::new(9, 4)]
    );
    assert!(validator.at_xy(&screen, &pattern, 9, 4).unwrap());
    let batch = validator
        .find_all_batch(&screen, std::slice::from_ref(&pattern))
        .unwrap();
    assert_eq!(batch[&pattern], vec![Position::new(9, 4)]);

    // Identical errors count as agreement.
    assert!(validator
        .at_xy(&screen, &pattern, 16, 0)
        .unwrap_err()
        .is_out_of_bounds());
}

#[test]
fn report_lists_every_finder_in_order() {
    let validator = FinderCrossValidator::new(vec![
        Box::new(BadCharacterFinder::new()),
        Box::new(NaiveFinder::new()),
    ])
    .unwrap();
    validator.find(&screen_with_marker(), &marker()).unwrap();

    let names: Vec<String> = validator.durations().into_iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["bad-character", "naive"]);

    let report = validator.report();
    let lines: Vec<&str> = report.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("bad-character - "));
    assert!(lines[1].starts_with("naive - "));
    assert!(lines.iter().all(|line| line.ends_with(" ms")));
    assert_eq!(validator.to_string(), report);
}

#[test]
fn disagreement_is_a_consistency_violation() {
    let exporter = RecordingExporter::default();
    let validator = FinderCrossValidator::new(vec![
        Box::new(NaiveFinder::new()),
        Box::new(OffByOne),
    ])
    .unwrap()
    .with_config(CrossValidatorConfig {
        export_dir: PathBuf::from("diagnostics"),
    })
    .with_exporter(exporter.clone());
    let screen = screen_with_marker();

    let err = validator.find(&screen, &marker()).unwrap_err();
    match err {
        ScreenMatchError::ConsistencyViolation { operation, message } => {
            assert_eq!(operation, "find");
            assert!(message.contains("naive"));
            assert!(message.contains("off-by-one"));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let exported = exporter.exported.lock();
    assert_eq!(exported.len(), 1);
    let (path, image) = &exported[0];
    assert_eq!(image, &screen);
    assert!(path.starts_with("diagnostics"));
    let file_name = path.file_name().unwrap().to_string_lossy();
    assert!(file_name.starts_with("cross_validation_error_"));
    assert!(file_name.ends_with(".png"));
}

#[test]
fn operations_the_finders_agree_on_still_succeed() {
    let exporter = RecordingExporter::default();
    let validator = FinderCrossValidator::new(vec![
        Box::new(NaiveFinder::new()),
        Box::new(OffByOne),
    ])
    .unwrap()
    .with_exporter(exporter.clone());

    let screen = screen_with_marker();
    assert_eq!(
        validator.find_all(&screen, &marker()).unwrap(),
        vec![Position::new(9, 4)]
    );
    assert!(exporter.exported.lock().is_empty());
}

#[test]
fn export_failure_replaces_the_violation() {
    let validator = FinderCrossValidator::new(vec![
        Box::new(NaiveFinder::new()),
        Box::new(OffByOne),
    ])
    .unwrap()
    .with_exporter(FailingExporter);

    let err = validator.find(&screen_with_marker(), &marker()).unwrap_err();
    assert!(matches!(err, ScreenMatchError::ImageIo { .. }));
}

#[test]
fn shared_validator_stays_consistent_across_threads() {
    let validator = Arc::new(
        FinderCrossValidator::new(vec![
            Box::new(NaiveFinder::new()),
            Box::new(BadCharacterFinder::new()),
        ])
        .unwrap(),
    );
    let screen = screen_with_marker();
    let pattern = marker();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            let validator = Arc::clone(&validator);
            let (screen, pattern) = (&screen, &pattern);
            scope.spawn(move || {
                for _ in 0..25 {
                    assert_eq!(
                        validator.find(screen, pattern).unwrap(),
                        Some(Position::new(9, 4))
                    );
                }
            });
        }
    });

    assert_eq!(validator.report().lines().count(), 2);
    assert!(validator
        .units()
        .iter()
        .all(|unit| unit.elapsed() > std::time::Duration::ZERO));
}
