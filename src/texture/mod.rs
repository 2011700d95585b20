pub mod loader;

pub use loader::{DecodedImage, LoadResult, TextureLoader};

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKind {
    Diffuse,
    Normal,
    Specular,
}

impl TextureKind {
    pub const ALL: [TextureKind; 3] = [Self::Diffuse, Self::Normal, Self::Specular];

    pub fn slot(self) -> usize {
        match self {
            Self::Diffuse => 0,
            Self::Normal => 1,
            Self::Specular => 2,
        }
    }

    /// Single texel shown until the real image arrives.
    pub fn placeholder_texel(self) -> [u8; 4] {
        match self {
            Self::Diffuse => [0, 0, 255, 255],
            Self::Normal => [128, 128, 255, 255],
            Self::Specular => [64, 64, 64, 255],
        }
    }

    /// Colour maps are sampled with sRGB decoding, data maps are not.
    pub fn is_color(self) -> bool {
        self == Self::Diffuse
    }
}

impl fmt::Display for TextureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Diffuse => "diffuse",
            Self::Normal => "normal",
            Self::Specular => "specular",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextureStatus {
    Placeholder,
    Loading,
    Loaded { width: u32, height: u32 },
    Failed(String),
}

impl TextureStatus {
    pub fn label(&self) -> String {
        match self {
            Self::Placeholder => "placeholder".to_string(),
            Self::Loading => "loading".to_string(),
            Self::Loaded { width, height } => format!("{}x{}", width, height),
            Self::Failed(_) => "failed".to_string(),
        }
    }
}

/// Load state of each map. Every state is valid for drawing: anything short of
/// `Loaded` renders with the placeholder texel.
#[derive(Debug, Clone)]
pub struct TextureSet {
    status: [TextureStatus; 3],
}

impl Default for TextureSet {
    fn default() -> Self {
        Self {
            status: std::array::from_fn(|_| TextureStatus::Placeholder),
        }
    }
}

impl TextureSet {
    pub fn status(&self, kind: TextureKind) -> &TextureStatus {
        &self.status[kind.slot()]
    }

    pub fn mark_loading(&mut self, kind: TextureKind) {
        self.status[kind.slot()] = TextureStatus::Loading;
    }

    pub fn apply(&mut self, result: &LoadResult) {
        match result {
            LoadResult::Loaded(image) => {
                self.status[image.kind.slot()] = TextureStatus::Loaded {
                    width: image.width,
                    height: image.height,
                };
            }
            LoadResult::Failed { kind, error } => {
                self.status[kind.slot()] = TextureStatus::Failed(error.clone());
            }
        }
    }

    pub fn pending(&self) -> usize {
        self.status
            .iter()
            .filter(|s| matches!(s, TextureStatus::Loading))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_placeholders() {
        let set = TextureSet::default();
        for kind in TextureKind::ALL {
            assert_eq!(set.status(kind), &TextureStatus::Placeholder);
        }
    }

    #[test]
    fn tracks_load_lifecycle() {
        let mut set = TextureSet::default();
        set.mark_loading(TextureKind::Diffuse);
        set.mark_loading(TextureKind::Normal);
        assert_eq!(set.pending(), 2);

        set.apply(&LoadResult::Loaded(DecodedImage {
            kind: TextureKind::Diffuse,
            width: 4,
            height: 2,
            rgba: vec![0; 32],
        }));
        set.apply(&LoadResult::Failed {
            kind: TextureKind::Normal,
            error: "missing".to_string(),
        });

        assert_eq!(set.status(TextureKind::Diffuse), &TextureStatus::Loaded { width: 4, height: 2 });
        assert_eq!(set.status(TextureKind::Diffuse).label(), "4x2");
        assert_eq!(set.status(TextureKind::Normal), &TextureStatus::Failed("missing".to_string()));
        assert_eq!(set.pending(), 0);
    }

    #[test]
    fn slots_are_distinct() {
        let mut slots: Vec<_> = TextureKind::ALL.iter().map(|k| k.slot()).collect();
        slots.dedup();
        assert_eq!(slots, vec![0, 1, 2]);
    }
}
