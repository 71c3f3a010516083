use catalog::ImageryItemConfig;
use foundation::bounds::Rectangle;
use foundation::math::precision::unit_interval_f32;

/// How an imagery item's layers are presented.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LayerStyle {
    pub shown: bool,
    /// Opacity of the visible layer, in `[0, 1]`. Prefetched layers stay at 0.
    pub opacity: f32,
    pub rectangle: Option<Rectangle>,
    pub clip_to_rectangle: bool,
}

impl LayerStyle {
    pub const fn new(shown: bool, opacity: f32) -> Self {
        Self {
            shown,
            opacity,
            rectangle: None,
            clip_to_rectangle: true,
        }
    }

    pub fn from_config(config: &ImageryItemConfig) -> Self {
        Self {
            shown: config.is_shown,
            opacity: unit_interval_f32(config.opacity),
            rectangle: config.rectangle,
            clip_to_rectangle: config.clip_to_rectangle,
        }
    }
}
