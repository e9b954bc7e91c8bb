//! WebAssembly bindings for the Hexfront engine.
//!
//! Structured values cross the boundary as JSON strings.

use wasm_bindgen::prelude::*;

use crate::codec;
use crate::game::GameState;
use crate::hex::{GridRect, HexCoord};
use crate::moves::Move;
use crate::rules::Rules;
use crate::skill::{SkillKind, SkillState};
use crate::sync::MoveBatch;
use crate::template::Template;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn js_error(context: &str, err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&format!("{}: {}", context, err))
}

fn to_json<T: serde::Serialize>(value: &T, fallback: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| fallback.to_string())
}

/// WASM-exposed game wrapper
#[wasm_bindgen]
pub struct WasmGame {
    state: GameState,
}

#[wasm_bindgen]
impl WasmGame {
    /// Create a game from an enveloped template and optional rules JSON
    #[wasm_bindgen(constructor)]
    pub fn new(template_json: &str, rules_json: Option<String>, seed: u64) -> Result<WasmGame, JsValue> {
        let template: Template =
            codec::decode(template_json).map_err(|e| js_error("Invalid template", e))?;
        let rules = match rules_json {
            Some(text) => Rules::from_json(&text).map_err(|e| js_error("Invalid rules", e))?,
            None => Rules::default(),
        };
        let mut state = GameState::new(rules, seed);
        state.load(&template);
        Ok(WasmGame { state })
    }

    #[wasm_bindgen(js_name = getTurn)]
    pub fn get_turn(&self) -> u32 {
        self.state.turn()
    }

    /// Tile summaries of a sub-area as JSON, for rendering
    #[wasm_bindgen(js_name = getView)]
    pub fn get_view(&self, x: i32, y: i32, width: i32, height: i32) -> String {
        let view = self.state.map().view(GridRect::new(x, y, width, height));
        to_json(&view, "[]")
    }

    /// Region record of the tile at (x, y) as JSON
    #[wasm_bindgen(js_name = getRegion)]
    pub fn get_region(&self, x: i32, y: i32) -> String {
        to_json(&self.state.map().region_at(HexCoord::new(x, y)), "null")
    }

    /// Highlight a skill's targets; returns them as JSON
    #[wasm_bindgen(js_name = select)]
    pub fn select(&mut self, skill: u8, state_json: &str, x: i32, y: i32) -> Result<String, JsValue> {
        let state: SkillState =
            serde_json::from_str(state_json).map_err(|e| js_error("Invalid skill state", e))?;
        let targets = self.state.select(SkillKind::from(skill), &state, HexCoord::new(x, y));
        Ok(to_json(&targets, "[]"))
    }

    #[wasm_bindgen(js_name = isSelected)]
    pub fn is_selected(&self, x: i32, y: i32) -> bool {
        self.state.map().is_selected(HexCoord::new(x, y))
    }

    #[wasm_bindgen(js_name = useSkill)]
    pub fn use_skill(
        &mut self,
        skill: u8,
        state_json: &str,
        x: i32,
        y: i32,
        target_x: i32,
        target_y: i32,
    ) -> Result<bool, JsValue> {
        let state: SkillState =
            serde_json::from_str(state_json).map_err(|e| js_error("Invalid skill state", e))?;
        Ok(self.state.use_skill(
            SkillKind::from(skill),
            &state,
            HexCoord::new(x, y),
            HexCoord::new(target_x, target_y),
        ))
    }

    /// Apply a move given as JSON
    #[wasm_bindgen(js_name = execute)]
    pub fn execute(&mut self, move_json: &str) -> Result<bool, JsValue> {
        let mv: Move = serde_json::from_str(move_json).map_err(|e| js_error("Invalid move", e))?;
        Ok(self.state.execute(mv))
    }

    /// Undo the last move; returns the tile to select as JSON
    #[wasm_bindgen(js_name = undo)]
    pub fn undo(&mut self) -> String {
        to_json(&self.state.undo(), "null")
    }

    #[wasm_bindgen(js_name = redo)]
    pub fn redo(&mut self) -> String {
        to_json(&self.state.redo(), "null")
    }

    #[wasm_bindgen(js_name = endTurn)]
    pub fn end_turn(&mut self) -> bool {
        self.state.end_turn()
    }

    /// Applied moves as readable lines
    #[wasm_bindgen(js_name = getHistory)]
    pub fn get_history(&self) -> String {
        let lines: Vec<String> = self.state.history().list().iter().map(|m| m.to_string()).collect();
        to_json(&lines, "[]")
    }

    /// Package this player's moves for the peers and start a fresh history
    #[wasm_bindgen(js_name = finish)]
    pub fn finish(&mut self, player: u8) -> Result<String, JsValue> {
        self.state
            .finish(player)
            .to_json()
            .map_err(|e| js_error("Cannot encode batch", e))
    }

    /// Replay a peer's batch; returns how many moves took effect
    #[wasm_bindgen(js_name = applyBatch)]
    pub fn apply_batch(&mut self, batch_json: &str) -> Result<usize, JsValue> {
        let batch = MoveBatch::from_json(batch_json).map_err(|e| js_error("Invalid batch", e))?;
        let applied = self
            .state
            .apply_batch(batch)
            .map_err(|e| js_error("Batch rejected", e))?;
        self.state.commit();
        Ok(applied)
    }

    /// Capture the current map as an enveloped template
    #[wasm_bindgen(js_name = saveTemplate)]
    pub fn save_template(&self) -> Result<String, JsValue> {
        codec::encode(&Template::generate(self.state.map()))
            .map_err(|e| js_error("Cannot encode template", e))
    }
}
