//! Translucent color wash drawn over the space background.
//! Starts opaque black and is re-rolled each time the sprite starts a new row.

/// Alpha of a re-rolled wash (out of 255).
const WASH_ALPHA: u8 = 140;
/// Upper bound for each re-rolled color channel. Keeps channels below the
/// alpha so the color stays valid premultiplied RGBA.
const WASH_CHANNEL_MAX: u8 = 130;

pub struct Backdrop {
    /// Premultiplied RGBA8.
    fill: [u8; 4],
    rng: fastrand::Rng,
}

impl Backdrop {
    pub fn new(rng: fastrand::Rng) -> Self {
        Self {
            fill: [0, 0, 0, 255],
            rng,
        }
    }

    /// Pick a new random wash color.
    pub fn reroll(&mut self) {
        self.fill = [
            self.rng.u8(1..=WASH_CHANNEL_MAX),
            self.rng.u8(1..=WASH_CHANNEL_MAX),
            self.rng.u8(1..=WASH_CHANNEL_MAX),
            WASH_ALPHA,
        ];
        log::trace!("Backdrop wash: {:?}", self.fill);
    }

    pub fn fill(&self) -> [u8; 4] {
        self.fill
    }

    /// Premultiplied color normalized to `0.0..=1.0` for the GPU.
    pub fn fill_color(&self) -> [f32; 4] {
        self.fill.map(|c| c as f32 / 255.0)
    }
}

impl Default for Backdrop {
    fn default() -> Self {
        Self::new(fastrand::Rng::new())
    }
}
