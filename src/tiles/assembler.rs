//! Stitching a grid of tiles into one logical image.
//!
//! Tiles are loaded column by column, bottom row first. Each tile sits to the
//! right of the tile in the previous column of its row and on top of the tile
//! in the previous row of its column, so rows and columns may differ in size.
//!
//! [`TiledImage::assemble`] does the whole grid at once. [`AsyncAssembly`]
//! loads one tile per frame tick and reports progress, for use during startup.

use crate::core::{
    bounds::Bounds,
    config::TileGridConfig,
    geo::{Point, Size},
    node::NodeTransform,
};
use crate::spatial::culling::Culling;
use crate::tiles::source::{tile_file_name, TileImage, TileSource};
use crate::{GuideError, Result};
use futures::channel::oneshot;
use std::fmt;

/// One tile placed inside the assembled image, in unscaled image units.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedTile {
    pub name: String,
    pub column: u32,
    pub row: u32,
    pub origin: Point,
    pub size: Size,
}

impl PlacedTile {
    pub fn bounds(&self) -> Bounds {
        Bounds::from_origin_and_size(self.origin, self.size)
    }
}

/// The assembled surface: its tiles and the bounding size they cover.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TiledImage {
    columns: u32,
    rows: u32,
    tiles: Vec<PlacedTile>,
    /// Index into `tiles` per grid cell, column-major.
    cells: Vec<Option<usize>>,
    size: Size,
}

impl TiledImage {
    pub fn new(columns: u32, rows: u32) -> Self {
        Self {
            columns,
            rows,
            tiles: Vec::new(),
            cells: vec![None; columns as usize * rows as usize],
            size: Size::ZERO,
        }
    }

    /// Loads every tile of the grid. Any missing tile fails the whole assembly.
    pub fn assemble(source: &dyn TileSource, grid: &TileGridConfig) -> Result<TiledImage> {
        grid.tile_count()?;

        log::info!(
            "assembling {}x{} tiles of {}",
            grid.columns,
            grid.rows,
            grid.base_name
        );

        let mut image = TiledImage::new(grid.columns, grid.rows);
        for column in 0..grid.columns {
            for row in 0..grid.rows {
                let name = tile_file_name(&grid.base_name, column, row, &grid.extension);
                let Some(tile) = source.load(&name) else {
                    log::warn!("tile {} is missing; assembly failed", name);
                    return Err(GuideError::MissingTile { name });
                };
                image.place(column, row, tile);
            }
        }

        log::info!(
            "assembled {} tiles into {}x{}",
            image.tile_count(),
            image.size.width,
            image.size.height
        );
        Ok(image)
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Bounding size of everything placed so far.
    pub fn size(&self) -> Size {
        self.size
    }

    pub fn tiles(&self) -> &[PlacedTile] {
        &self.tiles
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        !self.cells.is_empty() && self.cells.iter().all(Option::is_some)
    }

    pub fn tile_at(&self, column: u32, row: u32) -> Option<&PlacedTile> {
        self.cell(column, row)
            .and_then(|cell| self.cells[cell])
            .map(|index| &self.tiles[index])
    }

    /// Places a tile against its left and lower neighbours and grows the bounds.
    pub fn place(&mut self, column: u32, row: u32, tile: TileImage) -> Option<&PlacedTile> {
        let cell = self.cell(column, row)?;

        let x = column
            .checked_sub(1)
            .and_then(|left| self.tile_at(left, row))
            .map(|t| t.origin.x + t.size.width)
            .unwrap_or(0.0);
        let y = row
            .checked_sub(1)
            .and_then(|below| self.tile_at(column, below))
            .map(|t| t.origin.y + t.size.height)
            .unwrap_or(0.0);

        let placed = PlacedTile {
            name: tile.name,
            column,
            row,
            origin: Point::new(x, y),
            size: tile.size,
        };
        log::debug!(
            "placed {} at ({}, {}) size {}x{}",
            placed.name,
            x,
            y,
            placed.size.width,
            placed.size.height
        );

        self.size = Size::new(
            self.size.width.max(x + placed.size.width),
            self.size.height.max(y + placed.size.height),
        );

        // Re-placing a cell replaces the old tile
        let index = match self.cells[cell] {
            Some(index) => {
                self.tiles[index] = placed;
                index
            }
            None => {
                self.tiles.push(placed);
                self.tiles.len() - 1
            }
        };
        self.cells[cell] = Some(index);
        Some(&self.tiles[index])
    }

    /// Drops every placed tile.
    pub fn clear(&mut self) {
        self.tiles.clear();
        self.cells.iter_mut().for_each(|cell| *cell = None);
        self.size = Size::ZERO;
    }

    /// Tiles whose on-screen rectangle overlaps the viewport when the image is
    /// drawn with `surface`.
    pub fn visible_tiles<'a>(
        &'a self,
        surface: &'a NodeTransform,
        viewport: Size,
    ) -> impl Iterator<Item = &'a PlacedTile> + 'a {
        let screen = Culling::viewport_bounds(viewport);
        self.tiles.iter().filter(move |tile| {
            Culling::aabb_intersects(&screen, &Culling::to_screen(surface, &tile.bounds()))
        })
    }

    fn cell(&self, column: u32, row: u32) -> Option<usize> {
        if column < self.columns && row < self.rows {
            Some(column as usize * self.rows as usize + row as usize)
        } else {
            None
        }
    }
}

/// Receives progress of a frame-stepped assembly.
pub trait ProgressSink {
    /// Fraction of tiles loaded so far, in `0.0..=1.0`.
    fn progress(&mut self, fraction: f64);

    fn finished(&mut self) {}

    /// Assembly gave up; any loading UI should be torn down.
    fn aborted(&mut self) {}
}

impl ProgressSink for () {
    fn progress(&mut self, _fraction: f64) {}
}

/// Final result of an assembly, as delivered to completion receivers.
#[derive(Debug, Clone, PartialEq)]
pub enum AssemblyOutcome {
    Completed { size: Size, tiles: usize },
    Failed { missing: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum AssemblyStatus {
    Loading { loaded: usize, total: usize },
    Complete,
    Failed { missing: String },
}

impl AssemblyStatus {
    pub fn progress(&self) -> f64 {
        match self {
            AssemblyStatus::Loading { loaded, total } if *total > 0 => {
                *loaded as f64 / *total as f64
            }
            AssemblyStatus::Loading { .. } => 0.0,
            AssemblyStatus::Complete => 1.0,
            AssemblyStatus::Failed { .. } => 0.0,
        }
    }

    pub fn is_finished(&self) -> bool {
        !matches!(self, AssemblyStatus::Loading { .. })
    }
}

type CompletionObserver = Box<dyn FnOnce(&TiledImage)>;

/// Tile assembly spread over frames, one tile per load interval.
pub struct AsyncAssembly {
    grid: TileGridConfig,
    image: TiledImage,
    next: u32,
    until_next_load: f64,
    status: AssemblyStatus,
    observers: Vec<CompletionObserver>,
    completions: Vec<oneshot::Sender<AssemblyOutcome>>,
    outcome: Option<AssemblyOutcome>,
}

impl AsyncAssembly {
    /// Schedules the grid for loading. The first tile loads one interval from now.
    pub fn new(grid: TileGridConfig) -> Result<Self> {
        let total = grid.tile_count()?;

        log::info!(
            "loading {}x{} tiles of {} one per {:.4}s",
            grid.columns,
            grid.rows,
            grid.base_name,
            grid.load_interval
        );

        Ok(Self {
            image: TiledImage::new(grid.columns, grid.rows),
            next: 0,
            until_next_load: grid.load_interval,
            status: AssemblyStatus::Loading {
                loaded: 0,
                total,
            },
            grid,
            observers: Vec::new(),
            completions: Vec::new(),
            outcome: None,
        })
    }

    pub fn status(&self) -> &AssemblyStatus {
        &self.status
    }

    pub fn progress(&self) -> f64 {
        self.status.progress()
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_finished()
    }

    /// The image built so far.
    pub fn image(&self) -> &TiledImage {
        &self.image
    }

    /// Takes the finished image, leaving an empty one behind.
    pub fn take_image(&mut self) -> Option<TiledImage> {
        match self.status {
            AssemblyStatus::Complete => Some(std::mem::take(&mut self.image)),
            _ => None,
        }
    }

    /// Registers a callback run once with the image when assembly completes.
    ///
    /// Observers are dropped without being called if assembly fails.
    pub fn on_complete(&mut self, observer: impl FnOnce(&TiledImage) + 'static) {
        if self.status == AssemblyStatus::Complete {
            observer(&self.image);
        } else if !self.is_finished() {
            self.observers.push(Box::new(observer));
        }
    }

    /// A future resolved once with the outcome.
    pub fn completion(&mut self) -> oneshot::Receiver<AssemblyOutcome> {
        let (tx, rx) = oneshot::channel();
        match &self.outcome {
            Some(outcome) => {
                let _ = tx.send(outcome.clone());
            }
            None => self.completions.push(tx),
        }
        rx
    }

    /// Advances the schedule by `dt` seconds, loading at most one tile.
    ///
    /// Returns the outcome on the tick that finishes the assembly.
    pub fn tick(
        &mut self,
        dt: f64,
        source: &dyn TileSource,
        sink: &mut dyn ProgressSink,
    ) -> Option<AssemblyOutcome> {
        let AssemblyStatus::Loading { total, .. } = self.status else {
            return None;
        };

        self.until_next_load -= dt;
        if self.until_next_load > 0.0 {
            return None;
        }
        self.until_next_load = self.grid.load_interval;

        let column = self.next / self.grid.rows;
        let row = self.next % self.grid.rows;
        let name = tile_file_name(&self.grid.base_name, column, row, &self.grid.extension);

        let Some(tile) = source.load(&name) else {
            log::warn!("tile {} is missing; aborting assembly", name);
            self.image.clear();
            sink.aborted();
            self.observers.clear();
            return Some(self.finish(
                AssemblyStatus::Failed {
                    missing: name.clone(),
                },
                AssemblyOutcome::Failed { missing: name },
            ));
        };

        self.image.place(column, row, tile);
        self.next += 1;

        let loaded = self.next as usize;
        sink.progress(loaded as f64 / total as f64);

        if loaded < total {
            self.status = AssemblyStatus::Loading { loaded, total };
            return None;
        }

        log::info!(
            "assembled {} tiles into {}x{}",
            loaded,
            self.image.size().width,
            self.image.size().height
        );
        sink.finished();
        for observer in self.observers.drain(..) {
            observer(&self.image);
        }
        let outcome = AssemblyOutcome::Completed {
            size: self.image.size(),
            tiles: loaded,
        };
        Some(self.finish(AssemblyStatus::Complete, outcome))
    }

    fn finish(&mut self, status: AssemblyStatus, outcome: AssemblyOutcome) -> AssemblyOutcome {
        self.status = status;
        for tx in self.completions.drain(..) {
            let _ = tx.send(outcome.clone());
        }
        self.outcome = Some(outcome.clone());
        outcome
    }
}

impl fmt::Debug for AsyncAssembly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncAssembly")
            .field("grid", &self.grid)
            .field("status", &self.status)
            .field("placed", &self.image.tile_count())
            .field("observers", &self.observers.len())
            .finish()
    }
}
