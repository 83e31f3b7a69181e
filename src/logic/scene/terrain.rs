//! Static block field the threats are placed over.

use serde::Serialize;

use super::color::Rgb;
use crate::constants::{BLOCK_FOOTPRINT, TERRAIN_HALF_CELLS, TERRAIN_SPACING};
use crate::logic::demo_data::DemoDataSource;

pub const BLOCK_COLOR: Rgb = Rgb::from_hex(0x2a3b4c);
pub const BLOCK_HIGHLIGHT_COLOR: Rgb = Rgb::from_hex(0x4a9eff);
pub const BLOCK_OPACITY: f32 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Block {
    /// Center of the footprint on the ground
    pub x: f32,
    pub z: f32,
    pub height: f32,
    pub footprint: f32,
    pub color: Rgb,
}

#[derive(Debug, Clone, Default)]
pub struct Terrain {
    blocks: Vec<Block>,
}

impl Terrain {
    /// One block per grid cell, generated once per session
    pub fn generate(source: &mut dyn DemoDataSource) -> Self {
        let cells = -TERRAIN_HALF_CELLS..TERRAIN_HALF_CELLS;
        let mut blocks = Vec::with_capacity(cells.len() * cells.len());

        for gx in cells.clone() {
            for gz in cells.clone() {
                let spec = source.block();
                blocks.push(Block {
                    x: gx as f32 * TERRAIN_SPACING,
                    z: gz as f32 * TERRAIN_SPACING,
                    height: spec.height,
                    footprint: BLOCK_FOOTPRINT,
                    color: if spec.highlighted { BLOCK_HIGHLIGHT_COLOR } else { BLOCK_COLOR },
                });
            }
        }

        log::debug!("Generated terrain with {} blocks", blocks.len());
        Self { blocks }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn tallest(&self) -> Option<&Block> {
        self.blocks
            .iter()
            .max_by(|a, b| a.height.total_cmp(&b.height))
    }
}
