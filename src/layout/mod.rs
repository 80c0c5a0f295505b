//! Layout - main-axis space distribution for stacks.
//!
//! Stacks measure their children first (a child's size is whatever its frame
//! buffer turned out to be), then ask this module how to place them along the
//! stack's main axis. Fixed items keep their measured length; flexible items
//! (spacers) share whatever is left over.
//!
//! The distribution is computed with [Taffy](https://github.com/DioxusLabs/taffy)
//! flexbox: each item becomes a leaf with a fixed `flex_basis`, and flexible
//! items get `flex_grow: 1`. Taffy's rounding keeps the lengths integral and
//! summing to the available space.

use taffy::{
    AvailableSpace, Dimension, Display, FlexDirection, LengthPercentage, NodeId, Size, Style,
    TaffyResult, TaffyTree,
};
use tracing::warn;

/// One item along a stack's main axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisItem {
    /// Keeps its measured length.
    Fixed(usize),
    /// Grows into leftover space, never below `min`.
    Flexible { min: usize },
}

impl AxisItem {
    fn base(self) -> usize {
        match self {
            AxisItem::Fixed(len) => len,
            AxisItem::Flexible { min } => min,
        }
    }

    fn is_flexible(self) -> bool {
        matches!(self, AxisItem::Flexible { .. })
    }
}

/// Lengths for each item along an axis of `available` cells with `gap`
/// cells between neighbours.
///
/// Without an available length, or without flexible items, every item keeps
/// its base length.
pub fn distribute(items: &[AxisItem], gap: usize, available: Option<usize>) -> Vec<usize> {
    let base: Vec<usize> = items.iter().map(|item| item.base()).collect();

    let Some(available) = available else {
        return base;
    };
    if !items.iter().any(|item| item.is_flexible()) {
        return base;
    }

    match compute_flex(items, gap, available) {
        Ok(lengths) => lengths,
        Err(err) => {
            warn!(error = %err, "layout failed, using measured sizes");
            base
        }
    }
}

fn compute_flex(items: &[AxisItem], gap: usize, available: usize) -> TaffyResult<Vec<usize>> {
    let mut tree: TaffyTree<()> = TaffyTree::new();

    let leaves = items
        .iter()
        .map(|item| {
            let (grow, basis) = match *item {
                AxisItem::Fixed(len) => (0.0, len),
                AxisItem::Flexible { min } => (1.0, min),
            };
            tree.new_leaf(Style {
                flex_grow: grow,
                flex_shrink: 0.0,
                flex_basis: Dimension::Length(basis as f32),
                size: Size {
                    width: Dimension::Auto,
                    height: Dimension::Length(1.0),
                },
                ..Default::default()
            })
        })
        .collect::<TaffyResult<Vec<NodeId>>>()?;

    let root = tree.new_with_children(
        Style {
            display: Display::Flex,
            flex_direction: FlexDirection::Row,
            gap: Size {
                width: LengthPercentage::Length(gap as f32),
                height: LengthPercentage::Length(0.0),
            },
            size: Size {
                width: Dimension::Length(available as f32),
                height: Dimension::Auto,
            },
            ..Default::default()
        },
        &leaves,
    )?;

    tree.compute_layout(
        root,
        Size {
            width: AvailableSpace::Definite(available as f32),
            height: AvailableSpace::MaxContent,
        },
    )?;

    leaves
        .iter()
        .map(|&leaf| tree.layout(leaf).map(|layout| layout.size.width.max(0.0) as usize))
        .collect()
}
