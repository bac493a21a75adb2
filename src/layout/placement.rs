use std::collections::BTreeMap;

use crate::geometry::{Rect, Vec2};

/// One node to put on the layer/row grid.
#[derive(Debug, Clone, Copy)]
pub struct GridItem {
    pub layer: usize,
    pub row: usize,
    pub size: Vec2,
}

#[derive(Debug, Clone, Default)]
pub struct GridPlacement {
    /// Content-local rect per input item, same order.
    pub cells: Vec<Rect>,
    pub column_x: Vec<f32>,
    pub row_y: Vec<f32>,
    /// Sum of all column widths and row heights.
    pub extent: Vec2,
}

/// Lays items out on a grid where each layer is as wide as its widest node and each row
/// as tall as its tallest node. Items are anchored at their cell's top-left corner.
///
/// Only layers and rows that hold an item take up space, so sparse or huge indices
/// cost nothing; `column_x` and `row_y` list the used ones in ascending order.
pub fn place_on_grid(items: &[GridItem]) -> GridPlacement {
    if items.is_empty() {
        return GridPlacement::default();
    }

    let mut col_widths: BTreeMap<usize, f32> = BTreeMap::new();
    let mut row_heights: BTreeMap<usize, f32> = BTreeMap::new();
    for item in items {
        let width = col_widths.entry(item.layer).or_default();
        *width = width.max(item.size.x);
        let height = row_heights.entry(item.row).or_default();
        *height = height.max(item.size.y);
    }

    let (col_start, width) = prefix_sums(&col_widths);
    let (row_start, height) = prefix_sums(&row_heights);

    let cells = items
        .iter()
        .map(|item| {
            let x = col_start.get(&item.layer).copied().unwrap_or(0.0);
            let y = row_start.get(&item.row).copied().unwrap_or(0.0);
            Rect::from_origin_size(Vec2::new(x, y), item.size)
        })
        .collect();

    GridPlacement {
        cells,
        column_x: col_start.into_values().collect(),
        row_y: row_start.into_values().collect(),
        extent: Vec2::new(width, height),
    }
}

fn prefix_sums(sizes: &BTreeMap<usize, f32>) -> (BTreeMap<usize, f32>, f32) {
    let mut acc = 0.0;
    let mut starts = BTreeMap::new();
    for (&index, &size) in sizes {
        starts.insert(index, acc);
        acc += size;
    }
    (starts, acc)
}

/// Content plane size: never smaller than the viewport, otherwise extent plus slack.
pub fn content_size(extent: Vec2, viewport: Vec2, slack: f32) -> Vec2 {
    Vec2::new(
        viewport.x.max(extent.x + slack),
        viewport.y.max(extent.y + slack),
    )
}
