pub mod assembler;
pub mod source;

// Re-exports for convenience
pub use assembler::{
    AssemblyOutcome, AssemblyStatus, AsyncAssembly, PlacedTile, ProgressSink, TiledImage,
};
#[cfg(feature = "decode")]
pub use source::FsTileSource;
pub use source::{tile_file_name, MemoryTileSource, TileImage, TileSource};
