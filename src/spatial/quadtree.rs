//! Fixed-depth quadtree mapping field regions to the items overlapping them.
//!
//! The tree is subdivided fully at construction and never rebalanced; items are
//! inserted into every leaf they overlap. Leaves keep each item's bounds so
//! queries can filter candidates exactly.

use crate::core::types::Vec2;
use crate::math::Quad;

/// A single quadtree node. Internal nodes have exactly four children.
#[derive(Clone, Debug)]
pub struct QuadNode<T> {
    pub region: Quad,
    pub children: Vec<QuadNode<T>>,
    pub items: Vec<(T, Quad)>,
}

impl<T: Copy + PartialEq> QuadNode<T> {
    fn build(region: Quad, depth: u32) -> Self {
        let children = if depth == 0 {
            Vec::new()
        } else {
            (0..4u8)
                .map(|i| Self::build(region.child_quadrant(i), depth - 1))
                .collect()
        };
        Self {
            region,
            children,
            items: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    fn insert(&mut self, item: T, bounds: &Quad) {
        if !self.region.intersects(bounds) {
            return;
        }
        if self.is_leaf() {
            self.items.push((item, *bounds));
            return;
        }
        for child in &mut self.children {
            child.insert(item, bounds);
        }
    }

    fn collect(&self, area: &Quad, out: &mut Vec<T>) {
        if !self.region.intersects(area) {
            return;
        }
        for (item, bounds) in &self.items {
            if bounds.intersects(area) && !out.contains(item) {
                out.push(*item);
            }
        }
        for child in &self.children {
            child.collect(area, out);
        }
    }

    fn collect_point(&self, p: Vec2, out: &mut Vec<T>) {
        if !self.region.contains_point(p) {
            return;
        }
        for (item, bounds) in &self.items {
            if bounds.contains_point(p) && !out.contains(item) {
                out.push(*item);
            }
        }
        for child in &self.children {
            child.collect_point(p, out);
        }
    }
}

/// Quadtree over a fixed region.
#[derive(Clone, Debug)]
pub struct QuadTree<T> {
    root: QuadNode<T>,
    depth: u32,
}

impl<T: Copy + PartialEq> QuadTree<T> {
    /// Build a tree over `region`, subdivided `depth` times (4^depth leaves).
    pub fn new(region: Quad, depth: u32) -> Self {
        Self {
            root: QuadNode::build(region, depth),
            depth,
        }
    }

    /// Insert `item` into every leaf its bounds overlap.
    pub fn insert(&mut self, item: T, bounds: Quad) {
        self.root.insert(item, &bounds);
    }

    /// Items whose bounds overlap `area`, each reported once.
    pub fn query(&self, area: &Quad) -> Vec<T> {
        let mut out = Vec::new();
        self.root.collect(area, &mut out);
        out
    }

    /// Items whose bounds contain `p`.
    pub fn query_point(&self, p: Vec2) -> Vec<T> {
        let mut out = Vec::new();
        self.root.collect_point(p, &mut out);
        out
    }

    pub fn region(&self) -> &Quad {
        &self.root.region
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Number of leaves holding at least one item.
    pub fn occupied_leaves(&self) -> usize {
        fn count<T>(node: &QuadNode<T>) -> usize {
            if node.children.is_empty() {
                usize::from(!node.items.is_empty())
            } else {
                node.children.iter().map(count).sum()
            }
        }
        count(&self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> Quad {
        Quad::new(Vec2::ZERO, Vec2::splat(1000.0))
    }

    #[test]
    fn test_query_single_island() {
        let mut tree = QuadTree::new(field(), 4);
        tree.insert(7u32, Quad::from_coords(100.0, 100.0, 200.0, 200.0));

        assert_eq!(tree.query(&Quad::from_coords(150.0, 150.0, 160.0, 160.0)), vec![7]);
        assert!(tree.query(&Quad::from_coords(500.0, 500.0, 510.0, 510.0)).is_empty());
    }

    #[test]
    fn test_item_spanning_leaves_reported_once() {
        let mut tree = QuadTree::new(field(), 3);
        tree.insert(1u32, Quad::from_coords(0.0, 0.0, 900.0, 900.0));

        assert!(tree.occupied_leaves() > 1);
        assert_eq!(tree.query(&field()), vec![1]);
    }

    #[test]
    fn test_query_filters_by_exact_bounds() {
        // Leaf is 125 wide at depth 3; both items share the first leaf
        let mut tree = QuadTree::new(field(), 3);
        tree.insert(1u32, Quad::from_coords(0.0, 0.0, 10.0, 10.0));
        tree.insert(2u32, Quad::from_coords(100.0, 100.0, 120.0, 120.0));

        assert_eq!(tree.query(&Quad::from_coords(0.0, 0.0, 20.0, 20.0)), vec![1]);
    }

    #[test]
    fn test_query_point() {
        let mut tree = QuadTree::new(field(), 4);
        tree.insert(3u32, Quad::from_coords(100.0, 100.0, 200.0, 200.0));

        assert_eq!(tree.query_point(Vec2::new(150.0, 199.0)), vec![3]);
        assert!(tree.query_point(Vec2::new(250.0, 150.0)).is_empty());
    }

    #[test]
    fn test_depth_zero_is_single_leaf() {
        let mut tree = QuadTree::new(field(), 0);
        tree.insert(5u32, Quad::from_coords(10.0, 10.0, 20.0, 20.0));
        assert_eq!(tree.occupied_leaves(), 1);
        assert_eq!(tree.query(&field()), vec![5]);
    }
}
