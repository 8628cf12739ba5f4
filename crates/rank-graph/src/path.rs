//! Path-finder trait and the breadth-first shortest-hop implementation.
//!
//! # Pluggability
//!
//! The dispatcher calls path finding through the [`PathFinder`] trait so the
//! search strategy is chosen at compile time.  [`BfsPathFinder`] minimises hop
//! count and ignores distance and price entirely.
//!
//! # Tie-breaking
//!
//! Among equal-hop paths the first one discovered wins.  Discovery order is
//! the graph's edge order (ascending `RouteId` per source rank), so the
//! result is deterministic for a given route collection.

use std::collections::VecDeque;

use rank_core::RankId;

use crate::network::RankGraph;
use crate::GraphError;

// ── RankPath ──────────────────────────────────────────────────────────────────

/// An ordered rank sequence from origin to destination, both inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankPath {
    pub ranks: Vec<RankId>,
}

impl RankPath {
    /// Number of edges traversed.
    pub fn hops(&self) -> usize {
        self.ranks.len().saturating_sub(1)
    }

    /// `true` if origin and destination coincide (zero hops).
    pub fn is_trivial(&self) -> bool {
        self.hops() == 0
    }

    /// Consecutive `(from, to)` rank pairs, one per hop.
    pub fn hop_pairs(&self) -> impl Iterator<Item = (RankId, RankId)> + '_ {
        self.ranks.windows(2).map(|w| (w[0], w[1]))
    }

    pub fn origin(&self) -> Option<RankId> {
        self.ranks.first().copied()
    }

    pub fn destination(&self) -> Option<RankId> {
        self.ranks.last().copied()
    }
}

// ── PathFinder trait ──────────────────────────────────────────────────────────

/// Pluggable path search.
///
/// Implementations must be `Send + Sync` so one instance can serve
/// concurrent requests.
pub trait PathFinder: Send + Sync {
    /// Find a path from `from` to `to`.
    ///
    /// `from == to` yields the single-rank path even when the rank has no
    /// routes.  Returns [`GraphError::Unreachable`] when no path exists.
    fn find_path(&self, graph: &RankGraph, from: RankId, to: RankId) -> Result<RankPath, GraphError>;
}

// ── BfsPathFinder ─────────────────────────────────────────────────────────────

/// Unweighted breadth-first search: O(V + E) per query.
#[derive(Clone, Copy, Debug, Default)]
pub struct BfsPathFinder;

impl PathFinder for BfsPathFinder {
    fn find_path(&self, graph: &RankGraph, from: RankId, to: RankId) -> Result<RankPath, GraphError> {
        let path = bfs(graph, from, to);
        match &path {
            Ok(p)  => tracing::debug!(%from, %to, hops = p.hops(), "shortest-hop path found"),
            Err(_) => tracing::debug!(%from, %to, "no path between ranks"),
        }
        path
    }
}

// ── BFS internals ─────────────────────────────────────────────────────────────

/// Sentinel for "no predecessor" in the `prev` array.
const NO_PREV: u32 = u32::MAX;

fn bfs(graph: &RankGraph, from: RankId, to: RankId) -> Result<RankPath, GraphError> {
    if from == to {
        return Ok(RankPath { ranks: vec![from] });
    }

    let unreachable = GraphError::Unreachable { from, to };
    let (Some(src), Some(dst)) = (graph.node_index(from), graph.node_index(to)) else {
        return Err(unreachable);
    };

    let n = graph.node_count();
    let mut visited = vec![false; n];
    // prev[v] = node from which v was first discovered.
    let mut prev = vec![NO_PREV; n];
    let mut queue = VecDeque::with_capacity(n);

    visited[src] = true;
    queue.push_back(src);

    while let Some(node) = queue.pop_front() {
        if node == dst {
            return Ok(reconstruct(graph, &prev, dst));
        }
        for (_, next) in graph.out_neighbors(node) {
            if !visited[next] {
                visited[next] = true;
                prev[next] = node as u32;
                queue.push_back(next);
            }
        }
    }

    Err(unreachable)
}

fn reconstruct(graph: &RankGraph, prev: &[u32], dst: usize) -> RankPath {
    let mut ranks = vec![graph.rank_at(dst)];
    let mut cur = dst;
    while prev[cur] != NO_PREV {
        cur = prev[cur] as usize;
        ranks.push(graph.rank_at(cur));
    }
    ranks.reverse();
    RankPath { ranks }
}
