//! Paint over detected regions of a YOLO project's images.

use image::{Rgb, RgbImage};
use log::{info, warn};
use rayon::prelude::*;
use std::cmp::{max, min};
use std::path::Path;

use crate::config::Config;
use crate::conversion::DetectionFilter;
use crate::error::Result;
use crate::project::Project;
use crate::provider::DetectionProvider;
use crate::types::ProcessingStats;
use crate::utils::create_progress_bar;

/// Cover every admitted detection with a solid `fill_color` rectangle.
///
/// Labels and the classes file are copied unchanged; only pixels differ between
/// input and output. Images are always rewritten, in place when the output
/// project is the input project.
pub fn redact<P: DetectionProvider>(provider: &P, config: &Config) -> Result<Project> {
    let input = Project::new(&config.input_path);
    let output = Project::new(&config.output_path);
    input.ensure_readable()?;
    let in_place = input.same_location(&output);

    info!(
        "Redacting detections from {} into {}",
        input.root().display(),
        output.root().display()
    );

    let images = input.list_images()?;

    if !in_place {
        output.reset()?;
        if !output.copy_classes_from(&input)? {
            warn!("No classes file in {}", input.root().display());
        }
        output.copy_labels_from(&input)?;
    }

    let filter = DetectionFilter::from_config(config);
    let color = Rgb(config.fill_color);
    let pb = create_progress_bar(images.len() as u64, "Redact");
    let stats = images
        .par_iter()
        .map(|image_path| {
            let result = redact_image(provider, image_path, &output, &filter, color);
            pb.inc(1);
            result
        })
        .try_reduce(ProcessingStats::new, |mut total, stats| {
            total += stats;
            Ok(total)
        })?;
    pb.finish_with_message("Redaction complete");

    stats.print_summary("Redaction");
    Ok(output)
}

fn redact_image<P: DetectionProvider>(
    provider: &P,
    image_path: &Path,
    output: &Project,
    filter: &DetectionFilter,
    color: Rgb<u8>,
) -> Result<ProcessingStats> {
    let mut stats = ProcessingStats::new();
    let detections = provider.detect(image_path)?;
    let mut img = image::open(image_path)?.to_rgb8();

    for detection in &detections {
        stats.detections_total += 1;
        if !detection.is_well_formed() {
            stats.malformed_detections += 1;
            warn!(
                "Malformed detection in {}: {:?}",
                image_path.display(),
                detection
            );
        }

        if filter.admits(detection) {
            fill_box(&mut img, detection.bbox, color);
            stats.detections_kept += 1;
        } else {
            stats.detections_filtered += 1;
        }
    }

    img.save(output.image_path(image_path))?;
    stats.images_processed += 1;
    Ok(stats)
}

/// Fill the pixel box `[x1, y1, x2, y2]`, corners inclusive, clamped to the image.
///
/// Coordinates are truncated toward zero; corners may come in either order.
pub fn fill_box(img: &mut RgbImage, bbox: [f64; 4], color: Rgb<u8>) {
    if img.width() == 0 || img.height() == 0 {
        return;
    }
    let [x1, y1, x2, y2] = bbox.map(|v| v as i64);

    let x_start = max(0, min(x1, x2));
    let y_start = max(0, min(y1, y2));
    let x_end = min(img.width() as i64 - 1, max(x1, x2));
    let y_end = min(img.height() as i64 - 1, max(y1, y2));

    for y in y_start..=y_end {
        for x in x_start..=x_end {
            img.put_pixel(x as u32, y as u32, color);
        }
    }
}
