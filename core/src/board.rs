use alloc::vec::Vec;
use ndarray::Array2;
use rand::prelude::*;

use crate::*;

/// Rendering collaborator that mirrors the board's visual state.
///
/// Shells that redraw from [`Board::visual_at`] can use the `()` implementation.
pub trait TileDisplay {
    fn render_tile(&mut self, tile: Tile, state: VisualState);

    fn set_input_enabled(&mut self, enabled: bool);
}

impl TileDisplay for () {
    fn render_tile(&mut self, _tile: Tile, _state: VisualState) {}

    fn set_input_enabled(&mut self, _enabled: bool) {}
}

/// Fixed grid of tiles and the only place their visual state changes.
#[derive(Debug)]
pub struct Board<D> {
    tiles: Vec<Tile>,
    visuals: Array2<VisualState>,
    clickable: bool,
    display: D,
}

impl<D: TileDisplay> Board<D> {
    pub fn new((rows, cols): Coord2, display: D) -> Result<Self> {
        if !is_valid_extent(rows) || !is_valid_extent(cols) {
            return Err(GameError::InvalidGridSize);
        }
        Ok(Self::new_unchecked((rows, cols), display))
    }

    pub(crate) fn new_unchecked(size: Coord2, display: D) -> Self {
        let (rows, cols) = size;
        let mut tiles = Vec::with_capacity(mult(rows, cols).into());
        tiles.extend((0..rows).flat_map(|row| (0..cols).map(move |col| Tile::new(row, col))));
        Self {
            tiles,
            visuals: Array2::default(size.to_nd_index()),
            clickable: false,
            display,
        }
    }

    pub fn size(&self) -> Coord2 {
        let (rows, cols) = self.visuals.dim();
        (rows as Coord, cols as Coord)
    }

    pub fn tile_count(&self) -> CellCount {
        let (rows, cols) = self.size();
        mult(rows, cols)
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile_at(&self, row: Coord, col: Coord) -> Option<Tile> {
        self.validate(Tile::new(row, col)).ok()
    }

    pub fn contains(&self, tile: Tile) -> bool {
        let (rows, cols) = self.size();
        tile.row() < rows && tile.col() < cols
    }

    pub fn validate(&self, tile: Tile) -> Result<Tile> {
        if self.contains(tile) {
            Ok(tile)
        } else {
            Err(GameError::InvalidTile)
        }
    }

    pub fn random_tile(&self, rng: &mut SmallRng) -> Result<Tile> {
        if self.tiles.is_empty() {
            return Err(GameError::BoardTooSmall);
        }
        Ok(self.tiles[rng.random_range(0..self.tiles.len())])
    }

    pub fn visual_at(&self, tile: Tile) -> Result<VisualState> {
        let tile = self.validate(tile)?;
        Ok(self.visuals[tile.to_nd_index()])
    }

    pub fn set_visual(&mut self, tile: Tile, state: VisualState) -> Result<()> {
        let tile = self.validate(tile)?;
        log::trace!("tile {} -> {:?}", tile, state);
        self.visuals[tile.to_nd_index()] = state;
        self.display.render_tile(tile, state);
        Ok(())
    }

    /// Puts every non-default tile back to its default look.
    pub fn reset_all(&mut self) {
        for &tile in &self.tiles {
            let cell = &mut self.visuals[tile.to_nd_index()];
            if !cell.is_default() {
                *cell = VisualState::Default;
                self.display.render_tile(tile, VisualState::Default);
            }
        }
    }

    pub fn is_clickable(&self) -> bool {
        self.clickable
    }

    pub fn set_all_clickable(&mut self, clickable: bool) {
        if self.clickable != clickable {
            log::debug!("input {}", if clickable { "enabled" } else { "disabled" });
        }
        self.clickable = clickable;
        self.display.set_input_enabled(clickable);
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }
}
