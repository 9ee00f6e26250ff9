//! Paint-layer weight rasters

/// Weight of a layer that fully covers a cell.
pub const FULL_WEIGHT: u8 = 255;

/// Weight raster for one named paint layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaintLayer {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub weights: Vec<u8>,
}

impl PaintLayer {
    /// A layer with the same weight in every cell.
    pub fn uniform(name: impl Into<String>, width: u32, height: u32, weight: u8) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            weights: vec![weight; width as usize * height as usize],
        }
    }

    /// Default weights for a fresh terrain: the first layer covers
    /// everything, the others nothing.
    pub fn default_weights<S: AsRef<str>>(names: &[S], width: u32, height: u32) -> Vec<Self> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let weight = if i == 0 { FULL_WEIGHT } else { 0 };
                Self::uniform(name.as_ref(), width, height, weight)
            })
            .collect()
    }
}
