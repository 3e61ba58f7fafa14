//! Engine configuration and the static resources loaded from it.
//!
//! Configuration is a JSON file in which every key is optional:
//!
//! ```json
//! {
//!   "regularFont": "fonts/NotoSans-Regular.ttf",
//!   "boldFont": "fonts/NotoSans-Bold.ttf",
//!   "prescriptionTemplate": "assets/prescription-template.pdf",
//!   "letterhead": { "tagline": "Professional Dental Care Services" },
//!   "binding": { "wrapWidth": 340, "name": { "x": 250 } }
//! }
//! ```
//!
//! The template may be a PNG, JPEG, SVG or PDF; of a PDF only the first page
//! is used.
//!
//! Fonts default to the PDF standard Helvetica faces and the template to
//! none. Resources are loaded once, then shared by every render; install
//! them process-wide with [`Resources::install`].

use crate::compose::Binding;
use crate::font::{Font, StandardFont};
use crate::image::Image;
use crate::style::{Letterhead, Style};
use crate::DocError;
use log::{info, warn};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub regular_font: Option<PathBuf>,
    pub bold_font: Option<PathBuf>,
    pub prescription_template: Option<PathBuf>,
    pub letterhead: Letterhead,
    #[serde(deserialize_with = "merged_binding")]
    pub binding: Binding,
}

/// Lay the configured binding over the default one key by key, so that a
/// single coordinate of an anchor can be moved without restating the rest
fn merged_binding<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Binding, D::Error> {
    let overrides = Value::deserialize(deserializer)?;
    let mut binding = serde_json::to_value(Binding::default()).map_err(serde::de::Error::custom)?;
    merge(&mut binding, overrides);
    serde_json::from_value(binding).map_err(serde::de::Error::custom)
}

/// Objects merge recursively, `null` keeps the base value, anything else
/// replaces it
fn merge(base: &mut Value, overrides: Value) {
    match (base, overrides) {
        (Value::Object(base), Value::Object(overrides)) => {
            for (key, value) in overrides {
                match base.get_mut(&key) {
                    Some(slot) => merge(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (_, Value::Null) => {}
        (base, overrides) => *base = overrides,
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<EngineConfig, DocError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a configuration file. Relative resource paths in it are resolved
    /// against the file's own directory.
    pub fn from_disk<P: AsRef<Path>>(path: P) -> Result<EngineConfig, DocError> {
        let path = path.as_ref();
        let mut config = EngineConfig::from_json(&std::fs::read_to_string(path)?)?;
        if let Some(base) = path.parent() {
            for entry in [
                &mut config.regular_font,
                &mut config.bold_font,
                &mut config.prescription_template,
            ] {
                if let Some(p) = entry.as_mut() {
                    if p.is_relative() {
                        *p = base.join(&*p);
                    }
                }
            }
        }
        Ok(config)
    }
}

/// Fonts, template and style shared by every render. Cheap to clone; fonts
/// and the template are reference counted.
#[derive(Clone, Debug)]
pub struct Resources {
    pub regular: Font,
    pub bold: Font,
    pub prescription_template: Option<Image>,
    pub style: Style,
    pub binding: Binding,
}

static RESOURCES: OnceLock<Resources> = OnceLock::new();

fn load_font(path: Option<&Path>, fallback: StandardFont) -> Result<Font, DocError> {
    match path {
        Some(path) => {
            let font = Font::load_from_disk(path)?;
            info!("loaded font {} from {}", font.name(), path.display());
            Ok(font)
        }
        None => Ok(Font::standard(fallback)),
    }
}

impl Resources {
    /// Standard fonts, no template, the clinic's own letterhead
    pub fn builtin() -> Resources {
        Resources {
            regular: Font::standard(StandardFont::Helvetica),
            bold: Font::standard(StandardFont::HelveticaBold),
            prescription_template: None,
            style: Style::default(),
            binding: Binding::default(),
        }
    }

    /// Load everything the configuration points at. Any unreadable resource
    /// fails the whole load.
    pub fn load(config: &EngineConfig) -> Result<Resources, DocError> {
        let regular = load_font(config.regular_font.as_deref(), StandardFont::Helvetica)?;
        let bold = load_font(config.bold_font.as_deref(), StandardFont::HelveticaBold)?;
        let prescription_template = match config.prescription_template.as_deref() {
            Some(path) => {
                let image = Image::from_disk(path)?;
                info!(
                    "loaded prescription template {} ({}x{})",
                    path.display(),
                    image.width,
                    image.height
                );
                Some(image)
            }
            None => None,
        };
        Ok(Resources {
            regular,
            bold,
            prescription_template,
            style: Style::from_letterhead(config.letterhead.clone()),
            binding: config.binding.clone(),
        })
    }

    /// Make `resources` the process-wide instance. Only the first call takes
    /// effect; later calls keep what is already installed.
    pub fn install(resources: Resources) -> &'static Resources {
        if RESOURCES.set(resources).is_err() {
            warn!("resources already installed, keeping the existing ones");
        }
        Resources::global()
    }

    /// The process-wide resources, falling back to [`Resources::builtin`]
    /// when nothing was installed
    pub fn global() -> &'static Resources {
        RESOURCES.get_or_init(Resources::builtin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_is_all_defaults() {
        let config = EngineConfig::from_json("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        let resources = Resources::load(&config).unwrap();
        assert!(resources.prescription_template.is_none());
        assert_eq!(resources.regular.name(), "Helvetica");
        assert_eq!(resources.bold.name(), "Helvetica-Bold");
    }

    #[test]
    fn binding_overrides_merge_with_defaults() {
        let config = EngineConfig::from_json(r#"{"binding": {"wrapWidth": 300, "medicineFloor": 200}}"#)
            .unwrap();
        assert_eq!(config.binding.wrap_width, 300.0);
        assert_eq!(config.binding.medicine_floor, 200.0);
        assert_eq!(config.binding.line_spacing, 20.0);
    }

    #[test]
    fn anchor_overrides_keep_the_remaining_coordinates() {
        let config = EngineConfig::from_json(
            r#"{"binding": {
                "name": {"x": 250},
                "advice": {"y": 190},
                "continuationMarker": {"fromTop": 75},
                "medicineColumns": [150, 350, 480]
            }}"#,
        )
        .unwrap();
        let defaults = Binding::default();
        assert_eq!(config.binding.name.x, 250.0);
        assert_eq!(config.binding.name.y, 173.0);
        assert_eq!(config.binding.name.size, 12.0);
        assert_eq!(config.binding.advice.y, 190.0);
        assert_eq!(config.binding.advice.edge, defaults.advice.edge);
        assert_eq!(config.binding.continuation_marker.from_top, 75.0);
        assert_eq!(
            config.binding.continuation_marker.text,
            defaults.continuation_marker.text
        );
        assert_eq!(config.binding.medicine_columns, [150.0, 350.0, 480.0]);
        assert_eq!(config.binding.date, defaults.date);
    }

    #[test]
    fn malformed_binding_is_still_an_error() {
        let err = EngineConfig::from_json(r#"{"binding": {"name": {"x": "left"}}}"#).unwrap_err();
        assert!(matches!(err, DocError::Json(_)));
    }

    #[test]
    fn missing_resources_are_fatal() {
        let config = EngineConfig {
            regular_font: Some(PathBuf::from("/nonexistent/font.ttf")),
            ..EngineConfig::default()
        };
        let err = Resources::load(&config).unwrap_err();
        assert!(matches!(err, DocError::Io(_)));
        assert!(err.is_configuration());
    }

    #[test]
    fn resources_are_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Resources>();
    }

    #[test]
    fn global_resources_are_always_available() {
        let first = Resources::global() as *const Resources;
        let again = Resources::install(Resources::builtin()) as *const Resources;
        assert_eq!(first, again);
    }
}
