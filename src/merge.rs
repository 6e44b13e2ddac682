//! Merge model predictions into a YOLO project's labels.

use log::{debug, info, warn};
use rayon::prelude::*;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::class_table::ClassTable;
use crate::config::{ClassIndexMap, Config};
use crate::conversion::{build_label_content, format_label_line, DetectionFilter};
use crate::error::Result;
use crate::project::Project;
use crate::provider::DetectionProvider;
use crate::types::ProcessingStats;
use crate::utils::create_progress_bar;

/// Run `provider` over every image of the input project and write the union of
/// existing labels and newly mapped detections to the output project.
///
/// Class registration happens before anything on disk is touched, so a class
/// collision returns an error with the output project unchanged.
pub fn merge<P: DetectionProvider>(provider: &P, config: &Config) -> Result<Project> {
    let input = Project::new(&config.input_path);
    let output = Project::new(&config.output_path);
    input.ensure_readable()?;
    let in_place = input.same_location(&output);

    info!(
        "Merging predictions from {} into {}",
        input.root().display(),
        output.root().display()
    );

    let base_classes = if in_place {
        output.classes_path()
    } else {
        input.classes_path()
    };
    let classes = register_classes(
        ClassTable::load(&base_classes)?,
        &config.class_index_map,
        provider,
    )?;

    let images = input.list_images()?;

    if !in_place {
        output.reset()?;
    }
    classes.save(&output.classes_path())?;

    let filter = DetectionFilter::from_config(config);
    let pb = create_progress_bar(images.len() as u64, "Merge");
    let stats = images
        .par_iter()
        .map(|image_path| {
            let result = merge_image(
                provider,
                image_path,
                &input,
                &output,
                in_place,
                &config.class_index_map,
                &filter,
            );
            pb.inc(1);
            result
        })
        .try_reduce(ProcessingStats::new, |mut total, stats| {
            total += stats;
            Ok(total)
        })?;
    pb.finish_with_message("Merge complete");

    stats.print_summary("Merge");
    Ok(output)
}

/// Record every target class of `class_map` in `classes`.
pub fn register_classes(
    mut classes: ClassTable,
    class_map: &ClassIndexMap,
    provider: &dyn DetectionProvider,
) -> Result<ClassTable> {
    for (index, name) in class_map.registrations(provider)? {
        if classes.register(index, &name)? {
            info!("Registered class {} as '{}'", index, name);
        } else {
            debug!("Class {} is already '{}'", index, name);
        }
    }
    Ok(classes)
}

fn merge_image<P: DetectionProvider>(
    provider: &P,
    image_path: &Path,
    input: &Project,
    output: &Project,
    in_place: bool,
    class_map: &ClassIndexMap,
    filter: &DetectionFilter,
) -> Result<ProcessingStats> {
    let mut stats = ProcessingStats::new();
    let detections = provider.detect(image_path)?;
    let (width, height) = image::image_dimensions(image_path)?;
    let existing = input.read_label_lines(image_path)?;

    let mut new_lines = Vec::with_capacity(detections.len());
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

        match class_map.target_for(detection.class_index) {
            Some(target) if filter.admits(detection) => {
                new_lines.push(format_label_line(target, detection, width, height));
                stats.detections_kept += 1;
            }
            _ => stats.detections_filtered += 1,
        }
    }

    let mut writer = BufWriter::new(File::create(output.label_path(image_path))?);
    writer.write_all(build_label_content(&existing, &new_lines).as_bytes())?;
    writer.flush()?;

    if !in_place {
        fs::copy(image_path, output.image_path(image_path))?;
        stats.images_copied += 1;
    }
    stats.images_processed += 1;
    Ok(stats)
}
