//! Per-player item grids, persisted as JSON next to the game.
//!
//! ```json
//! {
//!   "player1": { "0,1": "assets/items/sword.png" },
//!   "player2": {},
//!   "extra_cells": { "player1": { "0,2": "assets/items/potion.png" }, "player2": {} }
//! }
//! ```
//!
//! Cell keys are `"row,col"`. The main grid is 4x5, the extra battle cells
//! 1x3. A key outside its grid is a load error rather than a silently
//! dropped item.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use duel_core::actor::Seat;

pub const GRID_ROWS: u32 = 4;
pub const GRID_COLS: u32 = 5;
pub const EXTRA_ROWS: u32 = 1;
pub const EXTRA_COLS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub row: u32,
    pub col: u32,
}

impl Cell {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    fn parse(key: &str) -> Result<Self, String> {
        let (row, col) = key
            .split_once(',')
            .ok_or_else(|| format!("cell key '{key}' is not 'row,col'"))?;
        let row = row
            .trim()
            .parse()
            .map_err(|e| format!("cell key '{key}': bad row: {e}"))?;
        let col = col
            .trim()
            .parse()
            .map_err(|e| format!("cell key '{key}': bad column: {e}"))?;
        Ok(Self { row, col })
    }

    fn key(self) -> String {
        format!("{},{}", self.row, self.col)
    }
}

/// Fixed-size grid of item asset paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemGrid {
    rows: u32,
    cols: u32,
    items: BTreeMap<Cell, String>,
}

impl ItemGrid {
    pub fn new(rows: u32, cols: u32) -> Self {
        Self {
            rows,
            cols,
            items: BTreeMap::new(),
        }
    }

    pub fn contains_cell(&self, cell: Cell) -> bool {
        cell.row < self.rows && cell.col < self.cols
    }

    pub fn get(&self, cell: Cell) -> Option<&str> {
        self.items.get(&cell).map(String::as_str)
    }

    /// Put `item` in `cell`, returning whatever was there.
    pub fn insert(&mut self, cell: Cell, item: impl Into<String>) -> Result<Option<String>, String> {
        if !self.contains_cell(cell) {
            return Err(format!(
                "cell {} is outside the {}x{} grid",
                cell.key(),
                self.rows,
                self.cols
            ));
        }
        Ok(self.items.insert(cell, item.into()))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn from_json(rows: u32, cols: u32, raw: BTreeMap<String, String>) -> Result<Self, String> {
        let mut grid = Self::new(rows, cols);
        for (key, item) in raw {
            let cell = Cell::parse(&key)?;
            grid.insert(cell, item)?;
        }
        Ok(grid)
    }

    fn to_json(&self) -> BTreeMap<String, String> {
        self.items
            .iter()
            .map(|(cell, item)| (cell.key(), item.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inventory {
    grids: [ItemGrid; 2],
    extra_cells: [ItemGrid; 2],
}

impl Default for Inventory {
    fn default() -> Self {
        Self {
            grids: [
                ItemGrid::new(GRID_ROWS, GRID_COLS),
                ItemGrid::new(GRID_ROWS, GRID_COLS),
            ],
            extra_cells: [
                ItemGrid::new(EXTRA_ROWS, EXTRA_COLS),
                ItemGrid::new(EXTRA_ROWS, EXTRA_COLS),
            ],
        }
    }
}

impl Inventory {
    pub fn grid(&self, seat: Seat) -> &ItemGrid {
        &self.grids[seat.index()]
    }

    /// The 1x3 cells carried into battle.
    pub fn extra_cells(&self, seat: Seat) -> &ItemGrid {
        &self.extra_cells[seat.index()]
    }

    /// Items across both the main grid and the battle cells.
    pub fn item_count(&self, seat: Seat) -> usize {
        self.grid(seat).len() + self.extra_cells(seat).len()
    }
}

// --- JSON types (private) ---

#[derive(Debug, Default, Serialize, Deserialize)]
struct InventoryJson {
    #[serde(default)]
    player1: BTreeMap<String, String>,
    #[serde(default)]
    player2: BTreeMap<String, String>,
    #[serde(default)]
    extra_cells: ExtraCellsJson,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ExtraCellsJson {
    #[serde(default)]
    player1: BTreeMap<String, String>,
    #[serde(default)]
    player2: BTreeMap<String, String>,
}

pub fn load_inventory_from_path(path: &Path) -> Result<Inventory, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read inventory {}: {e}", path.display()))?;
    let json: InventoryJson = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse inventory JSON {}: {e}", path.display()))?;

    let grid = |raw| ItemGrid::from_json(GRID_ROWS, GRID_COLS, raw);
    let extra = |raw| ItemGrid::from_json(EXTRA_ROWS, EXTRA_COLS, raw);
    let qualify = |e: String| format!("Inventory validation failed ({}): {e}", path.display());

    Ok(Inventory {
        grids: [
            grid(json.player1).map_err(qualify)?,
            grid(json.player2).map_err(qualify)?,
        ],
        extra_cells: [
            extra(json.extra_cells.player1).map_err(qualify)?,
            extra(json.extra_cells.player2).map_err(qualify)?,
        ],
    })
}

pub fn save_inventory(path: &Path, inventory: &Inventory) -> Result<(), String> {
    let json = InventoryJson {
        player1: inventory.grids[0].to_json(),
        player2: inventory.grids[1].to_json(),
        extra_cells: ExtraCellsJson {
            player1: inventory.extra_cells[0].to_json(),
            player2: inventory.extra_cells[1].to_json(),
        },
    };
    let raw = serde_json::to_string_pretty(&json)
        .map_err(|e| format!("Failed to serialize inventory: {e}"))?;
    fs::write(path, raw).map_err(|e| format!("Failed to write inventory {}: {e}", path.display()))
}

/// Load `path`, first writing an empty inventory there if it does not exist.
pub fn load_or_create_inventory(path: &Path) -> Result<Inventory, String> {
    if !path.exists() {
        log::info!("No inventory at {}, writing an empty one", path.display());
        save_inventory(path, &Inventory::default())?;
    }
    load_inventory_from_path(path)
}
