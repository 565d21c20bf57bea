//! Search tree storing UCT statistics. Nodes live in a single arena and refer
//! to each other by index: children are owned by the tree and listed by their
//! parent, the parent link is only used to walk back to the root.

use crate::game::Game;

/// Handle of a node inside the [`Tree`] arena.
pub(super) type NodeIndex = usize;

pub(super) const ROOT: NodeIndex = 0;

pub(super) struct Node<G: Game> {
    /// Move that led to this node, `None` for the root.
    pub(super) last_move: Option<G::Move>,
    /// The player who made `last_move`. Statistics of the node are collected
    /// from this player's perspective.
    pub(super) player_just_moved: G::Player,
    parent: Option<NodeIndex>,
    children: Vec<NodeIndex>,
    untried_moves: Vec<G::Move>,
    /// Sum of the results of all playouts that went through this node.
    pub(super) wins: f64,
    /// Number of playouts that went through this node.
    pub(super) visits: u32,
}

impl<G: Game> Node<G> {
    fn new(
        last_move: Option<G::Move>,
        parent: Option<NodeIndex>,
        state: &G,
    ) -> Self {
        Self {
            last_move,
            player_just_moved: state.last_mover(),
            parent,
            children: Vec::new(),
            untried_moves: state.legal_moves(),
            wins: 0.0,
            visits: 0,
        }
    }

    #[must_use]
    pub(super) fn untried_moves(&self) -> &[G::Move] {
        &self.untried_moves
    }

    #[must_use]
    pub(super) fn children(&self) -> &[NodeIndex] {
        &self.children
    }

    #[must_use]
    pub(super) const fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }

    /// A node is fully expanded once every legal move has a child.
    #[must_use]
    pub(super) fn is_fully_expanded(&self) -> bool {
        self.untried_moves.is_empty()
    }

    /// Average result from the perspective of [`Node::player_just_moved`].
    #[must_use]
    pub(super) fn mean(&self) -> f64 {
        debug_assert!(self.visits > 0);
        self.wins / f64::from(self.visits)
    }

    fn update(&mut self, result: f64) {
        self.visits += 1;
        self.wins += result;
    }
}

pub(super) struct Tree<G: Game> {
    nodes: Vec<Node<G>>,
}

impl<G: Game> Tree<G> {
    /// Creates a tree with a single root node for the given state.
    pub(super) fn new(root: &G) -> Self {
        Self {
            nodes: vec![Node::new(None, None, root)],
        }
    }

    #[must_use]
    pub(super) fn node(&self, index: NodeIndex) -> &Node<G> {
        &self.nodes[index]
    }

    #[must_use]
    pub(super) fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Picks the child with the highest UCT score:
    ///
    /// $$\frac{w_i}{n_i} + c \sqrt{\frac{\ln N}{n_i}}$$
    ///
    /// where $w_i$ and $n_i$ are the child's wins and visits, $N$ is the
    /// parent's visit count and $c$ is the exploration constant. Among equal
    /// scores the earliest child wins.
    ///
    /// # Panics
    ///
    /// Panics if the node has no children.
    #[must_use]
    pub(super) fn select_child(&self, parent: NodeIndex, exploration: f64) -> NodeIndex {
        let node = self.node(parent);
        assert!(
            !node.children.is_empty(),
            "can not select a child of a node without children"
        );
        let log_visits = f64::from(node.visits).ln();
        let mut best = node.children[0];
        let mut best_score = f64::NEG_INFINITY;
        for &child in &node.children {
            let child_node = self.node(child);
            let visits = f64::from(child_node.visits);
            let score = exploration.mul_add((log_visits / visits).sqrt(), child_node.mean());
            if score > best_score {
                best = child;
                best_score = score;
            }
        }
        best
    }

    /// Expands `parent` with the node reached by `next_move`. `state` is the
    /// position after `next_move` has been applied.
    ///
    /// # Panics
    ///
    /// Panics if `next_move` is not one of the parent's untried moves.
    pub(super) fn add_child(&mut self, parent: NodeIndex, next_move: G::Move, state: &G) -> NodeIndex {
        let untried = &mut self.nodes[parent].untried_moves;
        let Some(position) = untried.iter().position(|&m| m == next_move) else {
            panic!("move {next_move} is not among the untried moves {untried:?}");
        };
        let _ = untried.swap_remove(position);

        let child = self.nodes.len();
        self.nodes.push(Node::new(Some(next_move), Some(parent), state));
        self.nodes[parent].children.push(child);
        child
    }

    /// Records the playout result for the node.
    pub(super) fn update(&mut self, index: NodeIndex, result: f64) {
        self.nodes[index].update(result);
    }

    /// The child with most visits: the first one among equals.
    #[must_use]
    pub(super) fn most_visited_child(&self, parent: NodeIndex) -> Option<NodeIndex> {
        let mut best: Option<NodeIndex> = None;
        for &child in self.node(parent).children() {
            if best.map_or(true, |b| self.node(child).visits > self.node(b).visits) {
                best = Some(child);
            }
        }
        best
    }
}
