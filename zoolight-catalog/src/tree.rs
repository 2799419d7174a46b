//! Collapsible taxonomy tree.
//!
//! Each [`DisclosureNode`] owns its own `expanded` flag, so collapsing a
//! parent leaves the children's flags untouched and reopening it shows them as
//! they were. Nodes are addressed by [`NodePath`], the child indices walked
//! from the root.

pub const EXPANDED_GLYPH: &str = "▼";
pub const COLLAPSED_GLYPH: &str = "▶";
pub const TREE_TITLE: &str = "🌿 Animal Kingdom 🌿";

/// Structural address of a node: child indices from the root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn child(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(index);
        Self(segments)
    }

    /// 0 for the root.
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn segments(&self) -> &[usize] {
        &self.0
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(segments: Vec<usize>) -> Self {
        Self(segments)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TreeChild {
    Node(DisclosureNode),
    /// Terminal descriptive text.
    Leaf(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisclosureNode {
    label: String,
    expanded: bool,
    children: Vec<TreeChild>,
}

/// One line of the tree as currently visible.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeRow<'a> {
    pub path: NodePath,
    pub depth: usize,
    pub kind: RowKind<'a>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RowKind<'a> {
    Node { label: &'a str, expanded: bool },
    Leaf(&'a str),
}

impl TreeRow<'_> {
    pub fn is_node(&self) -> bool {
        matches!(self.kind, RowKind::Node { .. })
    }

    /// Indicator and label, e.g. `▶ Cellular Level 🔬`.
    pub fn text(&self) -> String {
        match self.kind {
            RowKind::Node { label, expanded } => format!("{} {label}", indicator(expanded)),
            RowKind::Leaf(text) => text.to_string(),
        }
    }
}

fn indicator(expanded: bool) -> &'static str {
    if expanded {
        EXPANDED_GLYPH
    } else {
        COLLAPSED_GLYPH
    }
}

impl DisclosureNode {
    /// A collapsed node without children.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            expanded: false,
            children: Vec::new(),
        }
    }

    pub fn node(mut self, child: DisclosureNode) -> Self {
        self.children.push(TreeChild::Node(child));
        self
    }

    pub fn leaf(mut self, text: impl Into<String>) -> Self {
        self.children.push(TreeChild::Leaf(text.into()));
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn indicator(&self) -> &'static str {
        indicator(self.expanded)
    }

    pub fn children(&self) -> &[TreeChild] {
        &self.children
    }

    /// Flip this node only. Returns the new state.
    pub fn toggle(&mut self) -> bool {
        self.expanded = !self.expanded;
        self.expanded
    }

    pub fn get(&self, path: &NodePath) -> Option<&DisclosureNode> {
        let mut cur = self;
        for &idx in path.segments() {
            match cur.children.get(idx)? {
                TreeChild::Node(node) => cur = node,
                TreeChild::Leaf(_) => return None,
            }
        }
        Some(cur)
    }

    pub fn get_mut(&mut self, path: &NodePath) -> Option<&mut DisclosureNode> {
        let mut cur = self;
        for &idx in path.segments() {
            match cur.children.get_mut(idx)? {
                TreeChild::Node(node) => cur = node,
                TreeChild::Leaf(_) => return None,
            }
        }
        Some(cur)
    }

    /// Toggle the node at `path`. `None` if it does not name a node.
    pub fn toggle_at(&mut self, path: &NodePath) -> Option<bool> {
        let node = self.get_mut(path)?;
        let expanded = node.toggle();
        tracing::debug!(label = %node.label, expanded, depth = path.depth(), "tree node toggled");
        Some(expanded)
    }

    /// Rows in display order: this node, then its children while expanded.
    pub fn visible_rows(&self) -> Vec<TreeRow<'_>> {
        let mut out = Vec::new();
        self.collect_rows(NodePath::root(), &mut out);
        out
    }

    fn collect_rows<'a>(&'a self, path: NodePath, out: &mut Vec<TreeRow<'a>>) {
        out.push(TreeRow {
            depth: path.depth(),
            kind: RowKind::Node {
                label: &self.label,
                expanded: self.expanded,
            },
            path: path.clone(),
        });
        if !self.expanded {
            return;
        }
        for (idx, child) in self.children.iter().enumerate() {
            let child_path = path.child(idx);
            match child {
                TreeChild::Node(node) => node.collect_rows(child_path, out),
                TreeChild::Leaf(text) => out.push(TreeRow {
                    depth: child_path.depth(),
                    kind: RowKind::Leaf(text),
                    path: child_path,
                }),
            }
        }
    }

    /// Deepest node below this one (0 when there are no child nodes).
    pub fn depth(&self) -> usize {
        self.children
            .iter()
            .filter_map(|c| match c {
                TreeChild::Node(n) => Some(1 + n.depth()),
                TreeChild::Leaf(_) => None,
            })
            .max()
            .unwrap_or(0)
    }

    /// Largest child count anywhere in this subtree.
    pub fn max_branching(&self) -> usize {
        self.children
            .iter()
            .filter_map(|c| match c {
                TreeChild::Node(n) => Some(n.max_branching()),
                TreeChild::Leaf(_) => None,
            })
            .fold(self.children.len(), usize::max)
    }
}

/// The animal kingdom classification shown beside the catalog.
pub fn animal_kingdom() -> DisclosureNode {
    DisclosureNode::new("Animalia (Multicellular) 🦁")
        .node(DisclosureNode::new("Cellular Level 🔬").leaf("➡ Porifera (Sponges) 🧽"))
        .node(
            DisclosureNode::new("Tissue/Organ System 🧬")
                .node(
                    DisclosureNode::new("Radial Symmetry 🎡")
                        .node(DisclosureNode::new("Coelenterata (Cnidaria) 🦑"))
                        .node(DisclosureNode::new("Ctenophora (Comb Jellies) 🌊")),
                )
                .node(
                    DisclosureNode::new("Bilateral Symmetry ⚖")
                        .node(
                            DisclosureNode::new("Acoelomates (No Body Cavity) 🚫")
                                .leaf("➡ Platyhelminthes (Flatworms) 🪱"),
                        )
                        .node(
                            DisclosureNode::new("Pseudocoelomates (Body Cavity) 🌀")
                                .leaf("➡ Nematoda (Roundworms) 🪱"),
                        )
                        .node(
                            DisclosureNode::new("Coelomates (True Body Cavity) 🏛")
                                .node(DisclosureNode::new("Annelida (Segmented Worms) 🐍"))
                                .node(DisclosureNode::new("Arthropoda (Insects, Arachnids) 🦋"))
                                .node(DisclosureNode::new("Mollusca (Mollusks) 🐚"))
                                .node(DisclosureNode::new(
                                    "Echinodermata (Starfish, Sea Urchins) 🌟",
                                ))
                                .node(DisclosureNode::new("Chordata (Vertebrates) 🦓")),
                        ),
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(segments: &[usize]) -> NodePath {
        NodePath::from(segments.to_vec())
    }

    #[test]
    fn starts_collapsed_with_only_root_visible() {
        let tree = animal_kingdom();
        let rows = tree.visible_rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text(), "▶ Animalia (Multicellular) 🦁");
    }

    #[test]
    fn shape_matches_the_classification() {
        let tree = animal_kingdom();
        assert_eq!(tree.depth(), 4);
        assert_eq!(tree.max_branching(), 5);
        assert_eq!(
            tree.get(&path(&[1, 1, 2])).map(DisclosureNode::label),
            Some("Coelomates (True Body Cavity) 🏛")
        );
        // leaves are not addressable as nodes
        assert!(tree.get(&path(&[0, 0])).is_none());
        assert!(tree.get(&path(&[7])).is_none());
    }

    #[test]
    fn toggle_flips_only_the_target() {
        let mut tree = animal_kingdom();
        tree.toggle_at(&NodePath::root());
        tree.toggle_at(&path(&[1]));

        assert_eq!(tree.toggle_at(&path(&[1, 0])), Some(true));
        assert!(tree.is_expanded());
        assert!(tree.get(&path(&[1])).unwrap().is_expanded());
        assert!(!tree.get(&path(&[0])).unwrap().is_expanded());
        assert!(!tree.get(&path(&[1, 1])).unwrap().is_expanded());
    }

    #[test]
    fn collapsed_parent_remembers_open_children() {
        let mut tree = animal_kingdom();
        tree.toggle_at(&NodePath::root());
        tree.toggle_at(&path(&[0]));
        let open = tree.visible_rows().len();
        assert_eq!(open, 4); // root, cellular, porifera leaf, tissue

        tree.toggle_at(&NodePath::root());
        assert_eq!(tree.visible_rows().len(), 1);
        assert!(tree.get(&path(&[0])).unwrap().is_expanded());

        tree.toggle_at(&NodePath::root());
        assert_eq!(tree.visible_rows().len(), open);
    }

    #[test]
    fn rows_carry_depth_and_leaves() {
        let mut tree = animal_kingdom();
        for p in [vec![], vec![1], vec![1, 1], vec![1, 1, 0]] {
            tree.toggle_at(&NodePath::from(p));
        }
        let rows = tree.visible_rows();
        let leaf = rows
            .iter()
            .find(|r| !r.is_node())
            .expect("flatworm leaf visible");
        assert_eq!(leaf.kind, RowKind::Leaf("➡ Platyhelminthes (Flatworms) 🪱"));
        assert_eq!(leaf.depth, 4);
        assert!(rows.iter().any(|r| r.text() == "▼ Bilateral Symmetry ⚖"));
    }

    #[test]
    fn toggling_a_leaf_path_is_a_no_op() {
        let mut tree = animal_kingdom();
        tree.toggle_at(&NodePath::root());
        tree.toggle_at(&path(&[0]));
        let before = tree.clone();
        assert_eq!(tree.toggle_at(&path(&[0, 0])), None);
        assert_eq!(tree, before);
    }
}
