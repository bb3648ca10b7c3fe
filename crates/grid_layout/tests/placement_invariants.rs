use std::collections::BTreeSet;

use block_contract::BlockId;
use grid_layout::{Cell, DragConclusion, GridModel, PlacementEngine, ACTIVATION_SCAN_ROWS};
use proptest::prelude::*;

const BLOCKS: [&str; 5] = ["clock", "emails", "jobs", "movies", "weather"];

#[derive(Debug, Clone)]
enum Op {
    Drop { block: usize, row: u32, col: u32 },
    Cancel { block: usize },
    Toggle { block: usize, row: u32, col: u32 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..BLOCKS.len(), 0u32..4, 0u32..3).prop_map(|(block, row, col)| Op::Drop {
            block,
            row,
            col
        }),
        (0..BLOCKS.len()).prop_map(|block| Op::Cancel { block }),
        (0..BLOCKS.len(), 0u32..4, 0u32..3).prop_map(|(block, row, col)| Op::Toggle {
            block,
            row,
            col
        }),
    ]
}

fn id(index: usize) -> BlockId {
    BlockId::trusted(BLOCKS[index])
}

fn seeded_engine() -> PlacementEngine {
    let mut grid = GridModel::default();
    grid.place(id(0), Cell::new(0, 0));
    grid.place(id(1), Cell::new(0, 1));
    grid.place(id(2), Cell::new(1, 0));
    PlacementEngine::new(grid)
}

fn assert_unique(grid: &GridModel) {
    let placements = grid.placements();
    let cells: BTreeSet<Cell> = placements.iter().map(|p| p.cell).collect();
    let blocks: BTreeSet<&BlockId> = placements.iter().map(|p| &p.block_id).collect();
    assert_eq!(cells.len(), placements.len(), "two blocks share a cell");
    assert_eq!(blocks.len(), placements.len(), "a block has two cells");
    grid.check_consistency().expect("indexes agree");
}

proptest! {
    #[test]
    fn no_reachable_state_maps_two_blocks_to_one_cell(ops in proptest::collection::vec(op_strategy(), 1..40)) {
        let mut engine = seeded_engine();
        for op in ops {
            match op {
                Op::Drop { block, row, col } => {
                    if engine.grid().position_of(&id(block)).is_none() {
                        continue;
                    }
                    let count_before = engine.grid().len();
                    engine.begin_drag(id(block)).expect("begin drag");
                    let result = engine
                        .resolve_drop(&id(block), Cell::new(row, col))
                        .expect("drop on placed block resolves");
                    prop_assert!(result.changes.len() <= 2);
                    prop_assert_eq!(engine.grid().len(), count_before);
                    let conclusion = engine.end_drag().expect("end drag");
                    prop_assert!(
                        matches!(conclusion, DragConclusion::Accepted { .. }),
                        "drop was not accepted"
                    );
                }
                Op::Cancel { block } => {
                    if engine.grid().position_of(&id(block)).is_none() {
                        continue;
                    }
                    let before = engine.grid().clone();
                    engine.begin_drag(id(block)).expect("begin drag");
                    let signal = engine.cancel_drag(&id(block)).expect("cancel drag");
                    prop_assert!(signal.is_some());
                    prop_assert_eq!(engine.grid(), &before);
                }
                Op::Toggle { block, row, col } => {
                    if engine.grid().position_of(&id(block)).is_some() {
                        engine.deactivate_block(&id(block)).expect("deactivate");
                    } else {
                        engine.activate_block(id(block), Some(Cell::new(row, col)), ACTIVATION_SCAN_ROWS);
                    }
                }
            }
            assert_unique(engine.grid());
        }
    }
}
