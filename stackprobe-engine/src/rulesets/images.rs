//! Image catalog requirements.

use stackprobe_types::{ImageRecord, Measurements, Severity};

use crate::rule::{MeasurementRef, Rule, RuleError, RuleFamily, RuleSet};

pub const IMAGE_COUNT: &str = "image_count";
pub const PUBLIC_IMAGE_COUNT: &str = "public_image_count";
pub const IMAGE_NAMES: &str = "image_names";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageRequirements {
    pub min_images: Option<u64>,
    pub min_public: Option<u64>,
    /// Names that must appear in the catalog. Repeats count once.
    pub required: Vec<String>,
}

impl ImageRequirements {
    /// Whether any rule needs the image list at all.
    pub fn needs_listing(&self) -> bool {
        self.min_images.is_some() || self.min_public.is_some() || !self.required.is_empty()
    }

    /// Required names in first-seen order, without repeats.
    pub fn distinct_required(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::with_capacity(self.required.len());
        for name in &self.required {
            if !seen.contains(&name.as_str()) {
                seen.push(name);
            }
        }
        seen
    }
}

pub fn rules(req: &ImageRequirements) -> Result<RuleSet, RuleError> {
    let mut rules = vec![
        Rule::builder("min-images", MeasurementRef::count(IMAGE_COUNT))
            .less_than(req.min_images.map(|n| n as f64))
            .severity(Severity::Critical)
            .family(RuleFamily::MinimumCount)
            .message("not enough images found: {threshold} required, {value} found")
            .build()?,
        Rule::builder("min-public-images", MeasurementRef::count(PUBLIC_IMAGE_COUNT))
            .less_than(req.min_public.map(|n| n as f64))
            .severity(Severity::Critical)
            .family(RuleFamily::MinimumCount)
            .message("not enough public images found: {threshold} required, {value} found")
            .build()?,
    ];

    for name in req.distinct_required() {
        rules.push(
            Rule::builder(format!("required-image:{name}"), MeasurementRef::names(IMAGE_NAMES))
                .requires_names([name])
                .severity(Severity::Critical)
                .message("required image '{item}' not found")
                .build()?,
        );
    }

    RuleSet::new(rules)
}

pub fn measurements(images: &[ImageRecord]) -> Measurements {
    let public = images.iter().filter(|i| i.is_public()).count();
    let names: Vec<String> = images.iter().filter_map(|i| i.name.clone()).collect();

    Measurements::new()
        .count(IMAGE_COUNT, images.len() as u64)
        .count(PUBLIC_IMAGE_COUNT, public as u64)
        .names(IMAGE_NAMES, names)
}
