use crate::core::geo::Size;
use fxhash::FxHashMap;
#[cfg(feature = "decode")]
use std::path::PathBuf;

/// File name of one tile in a `<base><col>x<row><ext>` grid.
pub fn tile_file_name(base: &str, column: u32, row: u32, extension: &str) -> String {
    format!("{}{}x{}{}", base, column, row, extension)
}

/// Loaded tile as far as layout is concerned: its name and pixel size.
#[derive(Debug, Clone, PartialEq)]
pub struct TileImage {
    pub name: String,
    pub size: Size,
}

impl TileImage {
    pub fn new(name: impl Into<String>, size: Size) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}

/// Anything that can resolve a tile name to an image.
///
/// A `None` means the tile does not exist; assembly treats that as fatal.
pub trait TileSource {
    fn load(&self, name: &str) -> Option<TileImage>;
}

impl<S: TileSource + ?Sized> TileSource for &S {
    fn load(&self, name: &str) -> Option<TileImage> {
        (**self).load(name)
    }
}

/// Tiles read from a directory on disk.
///
/// Only image headers are decoded; pixel data is left to the renderer.
#[cfg(feature = "decode")]
#[derive(Debug, Clone)]
pub struct FsTileSource {
    root: PathBuf,
}

#[cfg(feature = "decode")]
impl FsTileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    /// Reads the dimensions of a tile, reporting why it could not be read.
    pub fn probe(&self, name: &str) -> crate::Result<TileImage> {
        let (width, height) = image::image_dimensions(self.root.join(name))?;
        Ok(TileImage::new(name, Size::new(width as f64, height as f64)))
    }
}

#[cfg(feature = "decode")]
impl TileSource for FsTileSource {
    fn load(&self, name: &str) -> Option<TileImage> {
        match self.probe(name) {
            Ok(tile) => Some(tile),
            Err(e) => {
                log::warn!("could not read tile {} from {}: {}", name, self.root.display(), e);
                None
            }
        }
    }
}

/// In-memory tile table, handy for headless runs and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryTileSource {
    tiles: FxHashMap<String, Size>,
}

impl MemoryTileSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Complete grid where every tile has the same size.
    pub fn uniform_grid(base: &str, extension: &str, columns: u32, rows: u32, tile: Size) -> Self {
        let mut source = Self::new();
        for column in 0..columns {
            for row in 0..rows {
                source.insert(tile_file_name(base, column, row, extension), tile);
            }
        }
        source
    }

    pub fn insert(&mut self, name: impl Into<String>, size: Size) {
        self.tiles.insert(name.into(), size);
    }

    pub fn remove(&mut self, name: &str) -> Option<Size> {
        self.tiles.remove(name)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

impl TileSource for MemoryTileSource {
    fn load(&self, name: &str) -> Option<TileImage> {
        self.tiles.get(name).map(|size| TileImage::new(name, *size))
    }
}
