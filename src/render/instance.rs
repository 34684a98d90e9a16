use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::sprite::animation::DrawCommand;
use crate::viewport::{LOGICAL_HEIGHT, LOGICAL_WIDTH};

/// Per-quad data uploaded to GPU each frame.
/// Stride = 48 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SpriteInstance {
    /// Screen position of the quad's top-left corner (logical pixels).
    pub origin: [f32; 2],
    /// Quad extent in logical pixels. Negative flips the quad.
    pub size: [f32; 2],
    /// Top-left texture coordinate.
    pub uv_min: [f32; 2],
    /// Bottom-right texture coordinate.
    pub uv_max: [f32; 2],
    /// Premultiplied RGBA multiplier.
    pub tint: [f32; 4],
}

const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

impl SpriteInstance {
    /// A whole image drawn at (0, 0) at its native size.
    pub fn image(width: u32, height: u32) -> Self {
        Self {
            origin: [0.0, 0.0],
            size: [width as f32, height as f32],
            uv_min: [0.0, 0.0],
            uv_max: [1.0, 1.0],
            tint: WHITE,
        }
    }

    /// A full-screen solid fill. Drawn with the 1x1 white texture.
    pub fn fill(color: [f32; 4]) -> Self {
        Self {
            origin: [0.0, 0.0],
            size: [LOGICAL_WIDTH as f32, LOGICAL_HEIGHT as f32],
            uv_min: [0.0, 0.0],
            uv_max: [1.0, 1.0],
            tint: color,
        }
    }

    /// The character frame described by `cmd`, cut from a sheet of the given size.
    pub fn from_draw_command(cmd: &DrawCommand, sheet_w: u32, sheet_h: u32) -> Self {
        let [u0, v0, u1, v1] = cmd.source.uv(sheet_w, sheet_h);
        let xf = cmd.transform();
        let frame = Vec2::new(cmd.source.width() as f32, cmd.source.height() as f32);
        Self {
            origin: xf.translation.into(),
            size: xf.transform_vector2(frame).into(),
            uv_min: [u0, v0],
            uv_max: [u1, v1],
            tint: WHITE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sprite::{Character, SourceRect};

    #[test]
    fn stride_matches_vertex_layout() {
        assert_eq!(std::mem::size_of::<SpriteInstance>(), 48);
    }

    #[test]
    fn frame_quad_is_scaled_and_placed() {
        let cmd = DrawCommand {
            character: Character::Kfc,
            source: SourceRect::for_cell(3, 2),
            scale: 0.5,
            translate: Vec2::new(100.0, 50.0),
            row_advanced: false,
        };
        let inst = SpriteInstance::from_draw_command(&cmd, 4500, 2880);
        assert_eq!(inst.origin, [100.0, 50.0]);
        assert_eq!(inst.size, [375.0, 360.0]);
        assert_eq!(inst.uv_min, [1500.0 / 4500.0, 720.0 / 2880.0]);
        assert_eq!(inst.uv_max, [2250.0 / 4500.0, 1440.0 / 2880.0]);
    }

    #[test]
    fn fill_covers_logical_screen() {
        let inst = SpriteInstance::fill([0.1, 0.2, 0.3, 0.5]);
        assert_eq!(inst.size, [1280.0, 720.0]);
        assert_eq!(inst.tint, [0.1, 0.2, 0.3, 0.5]);
    }
}
