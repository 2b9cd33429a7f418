//! Hearts health bar
//!
//! Every slot is resolved on its own from the health value and the slot index:
//!
//! - `value >= i + 1` → full
//! - `i < value < i + 1` → half
//! - anything else → empty
//!
//! The value is never rounded or clamped. Values past the last slot fill the
//! bar, negative values and NaN leave it empty, and a value sitting exactly on
//! a slot boundary (`value == i`) leaves slot `i` empty.

use serde::Serialize;

use super::document::{Document, ElementId};

pub const HEART_SLOTS: usize = 16;

/// Alt text carried by every heart icon
pub const HEART_ALT: &str = "heart";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HeartVariant {
    Full,
    Half,
    Empty,
}

impl HeartVariant {
    pub fn for_slot(value: f64, index: usize) -> Self {
        let lower = index as f64;
        let upper = lower + 1.0;
        if value >= upper {
            HeartVariant::Full
        } else if value > lower && value < upper {
            HeartVariant::Half
        } else {
            HeartVariant::Empty
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            HeartVariant::Full => "full_h.svg",
            HeartVariant::Half => "half_h.svg",
            HeartVariant::Empty => "empty_h.svg",
        }
    }

    /// Icon source relative to the assets directory
    pub fn src(self, asset_dir: &str) -> String {
        let dir = asset_dir.trim_end_matches('/');
        if dir.is_empty() {
            self.file_name().to_string()
        } else {
            format!("{}/{}", dir, self.file_name())
        }
    }

    /// Terminal glyph for the icon
    pub fn glyph(self) -> &'static str {
        match self {
            HeartVariant::Full => "♥",
            HeartVariant::Half => "❥",
            HeartVariant::Empty => "♡",
        }
    }

    /// Recover the variant from an icon's `src`
    pub fn from_src(src: &str) -> Option<Self> {
        let file = src.rsplit('/').next().unwrap_or(src);
        [HeartVariant::Full, HeartVariant::Half, HeartVariant::Empty]
            .into_iter()
            .find(|v| v.file_name() == file)
    }
}

pub fn heart_strip(value: f64) -> [HeartVariant; HEART_SLOTS] {
    std::array::from_fn(|i| HeartVariant::for_slot(value, i))
}

/// Throw away whatever the container holds and rebuild all 16 icons.
pub fn render_hearts(doc: &mut Document, container: ElementId, value: f64, asset_dir: &str) {
    doc.clear_children(container);

    for variant in heart_strip(value) {
        let img = doc.create_element("img");
        doc.set_attribute(img, "src", &variant.src(asset_dir));
        doc.set_attribute(img, "alt", HEART_ALT);
        doc.append_child(container, img);
    }

    tracing::debug!("Rendered hearts for value {}", value);
}

/// Variants currently shown in the container, left to right
pub fn read_hearts(doc: &Document, container: ElementId) -> Vec<HeartVariant> {
    doc.children(container)
        .iter()
        .filter_map(|id| doc.attribute(*id, "src"))
        .filter_map(HeartVariant::from_src)
        .collect()
}
