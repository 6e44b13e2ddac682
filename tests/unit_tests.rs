use approx::assert_relative_eq;
use clap::Parser;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::Path;

use predict2yolo::config::{parse_class_mapping, parse_color, validate_confidence};
use predict2yolo::conversion::{build_label_content, format_label_line, normalize_box};
use predict2yolo::{
    Args, ClassIndexMap, Detection, DetectionFilter, DetectionProvider, Error, Mode,
    PredictionFile,
};

fn names() -> BTreeMap<usize, String> {
    BTreeMap::from([(29, "cat".to_string()), (39, "TNN16Live".to_string())])
}

#[test]
fn test_validate_confidence() {
    assert!(validate_confidence("0.5").is_ok());
    assert!(validate_confidence("1.0").is_ok());
    assert!(validate_confidence("0.0").is_ok());
    assert!(validate_confidence("-0.1").is_err());
    assert!(validate_confidence("1.1").is_err());
    assert!(validate_confidence("abc").is_err());
}

#[test]
fn test_parse_class_mapping() {
    assert_eq!(parse_class_mapping("39:1"), Ok((39, 1)));
    assert_eq!(parse_class_mapping(" 29 : 3 "), Ok((29, 3)));
    assert!(parse_class_mapping("39").is_err());
    assert!(parse_class_mapping("a:1").is_err());
    assert!(parse_class_mapping("1:-2").is_err());
}

#[test]
fn test_parse_color() {
    assert_eq!(parse_color("255,255,255"), Ok([255, 255, 255]));
    assert_eq!(parse_color("0, 128, 10"), Ok([0, 128, 10]));
    assert!(parse_color("256,0,0").is_err());
    assert!(parse_color("1,2").is_err());
    assert!(parse_color("1,2,3,4").is_err());
}

#[test]
fn test_args_per_source_map() {
    let args = Args::try_parse_from([
        "predict2yolo",
        "--input_dir",
        "project",
        "--output_dir",
        "output",
        "--model_path",
        "predictions.json",
        "--confidence",
        "0.2",
        "--target_classes",
        "29,39",
        "--class_map",
        "29:3,39:1",
    ])
    .unwrap();

    assert_eq!(args.mode, Mode::Merge);
    let config = args.to_config();
    assert_eq!(config.confidence_threshold, 0.2);
    assert_eq!(config.target_class_filter, BTreeSet::from([29, 39]));
    assert_eq!(
        config.class_index_map,
        ClassIndexMap::PerSource(BTreeMap::from([(29, 3), (39, 1)]))
    );
    assert_eq!(config.fill_color, [255, 255, 255]);
}

#[test]
fn test_args_uniform_map() {
    let args = Args::try_parse_from([
        "predict2yolo",
        "--mode",
        "redact",
        "-i",
        "project",
        "-o",
        "output",
        "-m",
        "predictions.json",
        "--class_name",
        "TNN16Live",
        "--class_index",
        "1",
        "--fill_color",
        "0,0,0",
    ])
    .unwrap();

    assert_eq!(args.mode, Mode::Redact);
    let config = args.to_config();
    assert_eq!(
        config.class_index_map,
        ClassIndexMap::Uniform {
            name: "TNN16Live".to_string(),
            index: 1
        }
    );
    assert_eq!(config.fill_color, [0, 0, 0]);
}

#[test]
fn test_args_class_name_requires_index() {
    let result = Args::try_parse_from([
        "predict2yolo",
        "-i",
        "project",
        "-o",
        "output",
        "-m",
        "predictions.json",
        "--class_name",
        "TNN16Live",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_class_index_map_target_for() {
    let per_source = ClassIndexMap::PerSource(BTreeMap::from([(29, 3), (39, 1)]));
    assert_eq!(per_source.target_for(39), Some(1));
    assert_eq!(per_source.target_for(0), None);

    let uniform = ClassIndexMap::Uniform {
        name: "TNN16Live".to_string(),
        index: 1,
    };
    assert_eq!(uniform.target_for(39), Some(1));
    assert_eq!(uniform.target_for(0), Some(1));
}

#[test]
fn test_class_index_map_registrations() {
    let provider = PredictionFile::from_parts(names(), HashMap::new());

    let per_source = ClassIndexMap::PerSource(BTreeMap::from([(29, 3), (39, 1)]));
    assert_eq!(
        per_source.registrations(&provider).unwrap(),
        vec![(3, "cat".to_string()), (1, "TNN16Live".to_string())]
    );

    let unknown = ClassIndexMap::PerSource(BTreeMap::from([(7, 2)]));
    assert!(matches!(
        unknown.registrations(&provider),
        Err(Error::UnknownSourceClass(7))
    ));
}

#[test]
fn test_detection_filter() {
    let filter = DetectionFilter::new(0.2, BTreeSet::from([39]));
    assert!(filter.admits(&Detection::new([0.0, 0.0, 1.0, 1.0], 0.9, 39)));
    assert!(filter.admits(&Detection::new([0.0, 0.0, 1.0, 1.0], 0.2, 39)));
    assert!(!filter.admits(&Detection::new([0.0, 0.0, 1.0, 1.0], 0.19, 39)));
    assert!(!filter.admits(&Detection::new([0.0, 0.0, 1.0, 1.0], 0.9, 29)));
    assert!(!filter.admits(&Detection::new([0.0, 0.0, 1.0, 1.0], f32::NAN, 39)));

    let open = DetectionFilter::new(0.5, BTreeSet::new());
    assert!(open.admits(&Detection::new([0.0, 0.0, 1.0, 1.0], 0.5, 12)));
    assert!(!open.admits(&Detection::new([0.0, 0.0, 1.0, 1.0], 0.4, 12)));
}

#[test]
fn test_normalize_box() {
    let cases = [
        ([100.0, 100.0, 200.0, 200.0], 400, 400),
        ([12.5, 40.0, 300.25, 95.5], 640, 480),
        ([0.0, 0.0, 1920.0, 1080.0], 1920, 1080),
    ];
    for (bbox, width, height) in cases {
        let (cx, cy, w, h) = normalize_box(bbox, width, height);
        let [x1, y1, x2, y2] = bbox;
        assert_relative_eq!(cx * width as f64, (x1 + x2) / 2.0, epsilon = 1e-9);
        assert_relative_eq!(cy * height as f64, (y1 + y2) / 2.0, epsilon = 1e-9);
        assert_relative_eq!(w * width as f64, x2 - x1, epsilon = 1e-9);
        assert_relative_eq!(h * height as f64, y2 - y1, epsilon = 1e-9);
    }
}

#[test]
fn test_format_label_line() {
    let detection = Detection::new([100.0, 100.0, 200.0, 200.0], 0.9, 39);
    assert_eq!(
        format_label_line(1, &detection, 400, 400),
        "1 0.375 0.375 0.25 0.25"
    );
}

#[test]
fn test_build_label_content() {
    let existing = vec!["0 0.5 0.5 0.2 0.2".to_string()];
    let new_lines = vec!["1 0.375 0.375 0.25 0.25".to_string()];
    assert_eq!(
        build_label_content(&existing, &new_lines),
        "0 0.5 0.5 0.2 0.2\n1 0.375 0.375 0.25 0.25\n"
    );
    assert_eq!(build_label_content(&[], &[]), "");
}

#[test]
fn test_prediction_file_open() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("predictions.json");
    fs::write(
        &path,
        r#"{
            "names": {"29": "cat", "39": "TNN16Live"},
            "images": {
                "a.png": [
                    {"box": [100, 100, 200, 200], "confidence": 0.9, "class": 39},
                    {"box": [0.5, 1.5, 10.0, 20.0], "confidence": 0.1, "class": 29}
                ]
            }
        }"#,
    )
    .unwrap();

    let provider = PredictionFile::open(&path).unwrap();
    assert_eq!(provider.class_name(39), Some("TNN16Live"));
    assert_eq!(provider.class_name(0), None);

    let detections = provider.detect(Path::new("project/images/a.png")).unwrap();
    assert_eq!(
        detections,
        vec![
            Detection::new([100.0, 100.0, 200.0, 200.0], 0.9, 39),
            Detection::new([0.5, 1.5, 10.0, 20.0], 0.1, 29),
        ]
    );
    assert!(provider
        .detect(Path::new("project/images/b.png"))
        .unwrap()
        .is_empty());
}

#[test]
fn test_prediction_file_missing() {
    let temp_dir = tempfile::tempdir().unwrap();
    let result = PredictionFile::open(&temp_dir.path().join("absent.json"));
    assert!(matches!(result, Err(Error::MissingPath(_))));
}
