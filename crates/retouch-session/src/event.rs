use retouch_core::geometry::crop::CropRatio;
use retouch_core::params::Filter;
use serde::{Deserialize, Serialize};

/// A committed, undoable edit.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EditEvent {
    Enhance { filter: Filter, value: f32 },
    Crop { ratio: CropRatio },
    /// Full-content rect with a free ratio; the state before any crop edit.
    CropReset,
}

/// The setting an event writes. Undo restores the previous value per key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKey {
    Enhance(Filter),
    CropRatio,
}

impl EditEvent {
    pub fn key(&self) -> EventKey {
        match *self {
            EditEvent::Enhance { filter, .. } => EventKey::Enhance(filter),
            EditEvent::Crop { .. } | EditEvent::CropReset => EventKey::CropRatio,
        }
    }

    /// The event that restores `key` to its initial state.
    pub fn default_for(key: EventKey) -> Self {
        match key {
            EventKey::Enhance(filter) => EditEvent::Enhance { filter, value: 0.0 },
            EventKey::CropRatio => EditEvent::CropReset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_group_by_setting() {
        let a = EditEvent::Enhance {
            filter: Filter::Fade,
            value: 10.0,
        };
        let b = EditEvent::Enhance {
            filter: Filter::Fade,
            value: 40.0,
        };
        let c = EditEvent::Enhance {
            filter: Filter::Grain,
            value: 40.0,
        };
        assert_eq!(a.key(), b.key());
        assert_ne!(a.key(), c.key());
        assert_eq!(
            EditEvent::CropReset.key(),
            EditEvent::Crop {
                ratio: CropRatio::Square
            }
            .key()
        );
    }

    #[test]
    fn crop_default_resets_the_rect() {
        assert_eq!(
            EditEvent::default_for(EventKey::CropRatio),
            EditEvent::CropReset
        );
        let json = serde_json::to_value(EditEvent::CropReset).unwrap();
        assert_eq!(json["kind"], "crop_reset");
    }

    #[test]
    fn serialized_shape() {
        let e = EditEvent::Crop {
            ratio: CropRatio::default(),
        };
        let json = serde_json::to_value(e).unwrap();
        assert_eq!(json["kind"], "crop");
        let back: EditEvent =
            serde_json::from_str(r#"{"kind":"enhance","filter":"warmth","value":-20}"#).unwrap();
        assert_eq!(
            back,
            EditEvent::Enhance {
                filter: Filter::Warmth,
                value: -20.0
            }
        );
    }
}
