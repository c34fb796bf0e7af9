//! WASM bindings for british-core
//!
//! Provides a JavaScript-friendly API for the game logic.

use wasm_bindgen::prelude::*;

use crate::{analyse, evaluate, Board, Cell, Side};

/// WASM-friendly wrapper around Board
///
/// Keeps the played cells so `undoMove` always reverts the latest move.
#[wasm_bindgen]
pub struct WasmBoard {
    inner: Board,
    history: Vec<Cell>,
}

#[wasm_bindgen]
impl WasmBoard {
    /// Create a new empty board
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmBoard {
        WasmBoard {
            inner: Board::new(),
            history: Vec::new(),
        }
    }

    /// Create board from u64 encoding. Undo history starts empty.
    #[wasm_bindgen(js_name = fromU64)]
    pub fn from_u64(bits: u64) -> Result<WasmBoard, JsValue> {
        let inner = Board::from_u64(bits).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(WasmBoard {
            inner,
            history: Vec::new(),
        })
    }

    /// Get u64 encoding of board
    #[wasm_bindgen(js_name = toU64)]
    pub fn to_u64(&self) -> u64 {
        self.inner.to_u64()
    }

    /// Get canonical position encoding (for tablebase lookups)
    pub fn canonical(&self) -> u64 {
        self.inner.canonical()
    }

    /// Side to move: 0 (A) or 1 (B)
    #[wasm_bindgen(js_name = sideToMove)]
    pub fn side_to_move(&self) -> u8 {
        self.inner.side_to_move() as u8
    }

    /// Owner of a cell: 0 (empty), 1 (A) or 2 (B)
    pub fn owner(&self, cell: u8) -> u8 {
        match self.inner.owner(Cell(cell)) {
            None => 0,
            Some(Side::A) => 1,
            Some(Side::B) => 2,
        }
    }

    /// Legal cells for the side to move, ascending
    #[wasm_bindgen(js_name = legalMoves)]
    pub fn legal_moves(&self) -> Vec<u8> {
        self.inner.legal_moves().map(|c| c.0).collect()
    }

    /// Apply a move. Returns false if the move is illegal.
    #[wasm_bindgen(js_name = applyMove)]
    pub fn apply_move(&mut self, cell: u8) -> bool {
        if self.inner.try_apply(cell).is_err() {
            return false;
        }
        self.history.push(Cell(cell));
        true
    }

    /// Undo the latest move. Returns false if nothing was played.
    #[wasm_bindgen(js_name = undoMove)]
    pub fn undo_move(&mut self) -> bool {
        match self.history.pop() {
            Some(cell) => {
                self.inner.undo_move(cell);
                true
            }
            None => false,
        }
    }

    /// Exhaustive score for the side to move
    pub fn evaluate(&mut self) -> i32 {
        evaluate(&mut self.inner)
    }

    /// Per-cell analysis as `{ scores: (number | null)[16], best: number }`
    pub fn analyse(&mut self) -> Result<JsValue, JsValue> {
        let analysis = analyse(&mut self.inner);
        Ok(serde_wasm_bindgen::to_value(&analysis)?)
    }
}

impl Default for WasmBoard {
    fn default() -> Self {
        Self::new()
    }
}
