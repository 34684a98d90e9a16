use std::path::{Path, PathBuf};

use image::RgbaImage;

use crate::sprite::{self, Character};

const FONT_PATH: &str = "font/BalsamiqSans-Regular.ttf";
const MUSIC_PATH: &str = "music/shootingStars.mp3";
const BACKGROUND_PATH: &str = "images/spaceBG.png";
const AME_PATH: &str = "images/ameSprite.png";
const KFC_PATH: &str = "images/kfcSprite.png";

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read {name} from {}: {source}", path.display())]
    Read {
        name: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{name} is empty")]
    Empty { name: &'static str },
    #[error("failed to decode {name}: {source}")]
    Image {
        name: &'static str,
        #[source]
        source: image::ImageError,
    },
    #[error("{name} is not a TrueType/OpenType font")]
    Font { name: &'static str },
    #[error("{name} is {width}x{height}, the animation needs at least {min_width}x{min_height}")]
    SheetTooSmall {
        name: &'static str,
        width: u32,
        height: u32,
        min_width: u32,
        min_height: u32,
    },
}

/// Every file the toy needs, read and decoded up front.
pub struct AssetBundle {
    pub font: Vec<u8>,
    pub music: Vec<u8>,
    pub background: RgbaImage,
    pub ame: RgbaImage,
    pub kfc: RgbaImage,
}

impl AssetBundle {
    /// Load everything under `dir`. The first missing or broken asset aborts
    /// the whole load.
    pub fn load(dir: &Path) -> Result<Self, AssetError> {
        let font = read(dir, "font", FONT_PATH)?;
        if !is_font(&font) {
            return Err(AssetError::Font { name: "font" });
        }
        let music = read(dir, "music", MUSIC_PATH)?;
        let background = decode(&read(dir, "background", BACKGROUND_PATH)?, "background")?;
        let ame = load_sheet(dir, "Ame sprite sheet", AME_PATH)?;
        let kfc = load_sheet(dir, "KFC sprite sheet", KFC_PATH)?;

        log::info!(
            "Assets loaded from {}: font {} KiB, music {} KiB, background {}x{}",
            dir.display(),
            font.len() / 1024,
            music.len() / 1024,
            background.width(),
            background.height(),
        );

        Ok(Self {
            font,
            music,
            background,
            ame,
            kfc,
        })
    }

    pub fn sheet(&self, character: Character) -> &RgbaImage {
        match character {
            Character::Ame => &self.ame,
            Character::Kfc => &self.kfc,
        }
    }
}

fn read(dir: &Path, name: &'static str, rel: &str) -> Result<Vec<u8>, AssetError> {
    let path = dir.join(rel);
    let bytes = std::fs::read(&path).map_err(|source| AssetError::Read { name, path, source })?;
    if bytes.is_empty() {
        return Err(AssetError::Empty { name });
    }
    Ok(bytes)
}

fn decode(bytes: &[u8], name: &'static str) -> Result<RgbaImage, AssetError> {
    image::load_from_memory(bytes)
        .map(|img| img.to_rgba8())
        .map_err(|source| AssetError::Image { name, source })
}

fn load_sheet(dir: &Path, name: &'static str, rel: &str) -> Result<RgbaImage, AssetError> {
    let sheet = decode(&read(dir, name, rel)?, name)?;
    let (min_width, min_height) = sprite::required_sheet_size();
    if sheet.width() < min_width || sheet.height() < min_height {
        return Err(AssetError::SheetTooSmall {
            name,
            width: sheet.width(),
            height: sheet.height(),
            min_width,
            min_height,
        });
    }
    Ok(sheet)
}

/// Check the sfnt header: TrueType (`00 01 00 00` or `true`), OpenType CFF
/// (`OTTO`) or a font collection (`ttcf`).
fn is_font(bytes: &[u8]) -> bool {
    matches!(
        bytes.get(..4),
        Some(b"\x00\x01\x00\x00" | b"OTTO" | b"true" | b"ttcf")
    )
}
