//! Floating-point elevation grid

/// Row-major grid of elevations in meters. Row 0 is the northern edge.
#[derive(Debug, Clone, PartialEq)]
pub struct ElevationGrid {
    width: u32,
    height: u32,
    samples: Vec<f32>,
}

impl ElevationGrid {
    /// A grid at sea level.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            samples: vec![0.0; width as usize * height as usize],
        }
    }

    /// Wraps existing samples. Returns `None` if the length does not match.
    pub fn from_samples(width: u32, height: u32, samples: Vec<f32>) -> Option<Self> {
        (samples.len() == width as usize * height as usize).then_some(Self {
            width,
            height,
            samples,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub(crate) fn samples_mut(&mut self) -> &mut [f32] {
        &mut self.samples
    }

    pub fn get(&self, x: u32, y: u32) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.samples
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }
}
