//! Rank graph: a read projection over the route collection.
//!
//! # Data layout
//!
//! Ranks are mapped to dense node indices and outgoing edges are stored in
//! **Compressed Sparse Row (CSR)** form.  The outgoing edges of node `n`
//! occupy:
//!
//! ```text
//! edges[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! # Edge order
//!
//! Edge order is part of the contract, not an accident of the store:
//! [`RankGraphBuilder::build`] orders edges by `(source node, RouteId)`.
//! Because route ids are allocated in insertion order, a node's outgoing
//! edges are visited oldest-route-first, and breadth-first tie-breaks are
//! reproducible across runs and store backends.
//!
//! The graph is rebuilt for every path-finding request from a single bulk
//! edge fetch.  Nothing is cached between requests.

use rank_core::{RankId, Route, RouteId};

#[cfg(feature = "fx-hash")]
type IndexMap = rustc_hash::FxHashMap<RankId, u32>;
#[cfg(not(feature = "fx-hash"))]
type IndexMap = std::collections::HashMap<RankId, u32>;

// ── RouteEdge ─────────────────────────────────────────────────────────────────

/// Adjacency entry: one directed route with the metadata trip building needs.
#[derive(Clone, Debug, PartialEq)]
pub struct RouteEdge {
    pub route:             RouteId,
    pub from:              RankId,
    pub to:                RankId,
    pub distance:          f64,
    /// Package price, `0` when the route has none.
    pub price:             f64,
    pub driver_split:      f64,
    pub association_split: f64,
}

impl RouteEdge {
    pub fn from_route(route: &Route) -> Self {
        Self {
            route:             route.id,
            from:              route.from_rank,
            to:                route.to_rank,
            distance:          route.distance,
            price:             route.price_or_zero(),
            driver_split:      route.driver_split_or_zero(),
            association_split: route.association_split_or_zero(),
        }
    }
}

// ── RankGraph ─────────────────────────────────────────────────────────────────

/// Directed rank graph in CSR format.
///
/// Do not construct directly; use [`RankGraph::from_routes`] or
/// [`RankGraphBuilder`].
pub struct RankGraph {
    /// `RankId` of each dense node index.
    ranks: Vec<RankId>,

    /// Reverse lookup `RankId → node index`.
    index: IndexMap,

    /// CSR row pointer.  Length = `node_count + 1`.
    node_out_start: Vec<u32>,

    /// Edges sorted by `(source node, RouteId)`.
    edges: Vec<RouteEdge>,

    /// Target node index of each edge, parallel to `edges`.
    edge_to: Vec<u32>,
}

impl RankGraph {
    /// Graph with no ranks and no routes.  Every query against it between
    /// distinct ranks is unreachable.
    pub fn empty() -> Self {
        RankGraphBuilder::new().build()
    }

    /// Project a bulk-fetched route collection.  Input order is irrelevant.
    pub fn from_routes<'a, I>(routes: I) -> Self
    where
        I: IntoIterator<Item = &'a Route>,
    {
        let mut b = RankGraphBuilder::new();
        for r in routes {
            b.add_route(r);
        }
        b.build()
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.ranks.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    pub fn contains_rank(&self, rank: RankId) -> bool {
        self.index.contains_key(&rank)
    }

    // ── Index mapping ─────────────────────────────────────────────────────

    #[inline]
    pub fn node_index(&self, rank: RankId) -> Option<usize> {
        self.index.get(&rank).map(|&i| i as usize)
    }

    #[inline]
    pub fn rank_at(&self, node: usize) -> RankId {
        self.ranks[node]
    }

    // ── Traversal ─────────────────────────────────────────────────────────

    /// CSR slice bounds of `node`'s outgoing edges.
    #[inline]
    fn out_range(&self, node: usize) -> std::ops::Range<usize> {
        self.node_out_start[node] as usize..self.node_out_start[node + 1] as usize
    }

    /// `(edge, target node index)` pairs leaving `node`, in edge order.
    #[inline]
    pub fn out_neighbors(&self, node: usize) -> impl Iterator<Item = (&RouteEdge, usize)> + '_ {
        self.out_range(node)
            .map(move |i| (&self.edges[i], self.edge_to[i] as usize))
    }

    /// Outgoing edges of `rank`, in edge order.  Empty for unknown ranks.
    pub fn out_edges(&self, rank: RankId) -> &[RouteEdge] {
        match self.node_index(rank) {
            Some(n) => &self.edges[self.out_range(n)],
            None    => &[],
        }
    }

    pub fn out_degree(&self, rank: RankId) -> usize {
        self.out_edges(rank).len()
    }

    /// All parallel edges `from → to`, ascending `RouteId`.
    pub fn edges_between(&self, from: RankId, to: RankId) -> impl Iterator<Item = &RouteEdge> + '_ {
        self.out_edges(from).iter().filter(move |e| e.to == to)
    }

    /// Look up an edge by route id (linear scan; trip building only needs
    /// it for explicit-route trips).
    pub fn edge(&self, route: RouteId) -> Option<&RouteEdge> {
        self.edges.iter().find(|e| e.route == route)
    }
}

// ── RankGraphBuilder ──────────────────────────────────────────────────────────

/// Construct a [`RankGraph`] incrementally, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use rank_core::{RankId, Route, RouteId};
/// use rank_graph::RankGraphBuilder;
///
/// let route = Route {
///     id: RouteId(1), from_rank: RankId(1), to_rank: RankId(2),
///     distance: 10.0, fare_price: 12.0, price: None,
///     driver_split: None, association_split: None, version: 0,
/// };
/// let mut b = RankGraphBuilder::new();
/// b.add_route(&route);
/// let g = b.build();
/// assert_eq!(g.node_count(), 2);
/// assert_eq!(g.edge_count(), 1);
/// ```
pub struct RankGraphBuilder {
    ranks: Vec<RankId>,
    index: IndexMap,
    edges: Vec<RouteEdge>,
}

impl RankGraphBuilder {
    pub fn new() -> Self {
        Self { ranks: Vec::new(), index: IndexMap::default(), edges: Vec::new() }
    }

    pub fn with_capacity(ranks: usize, routes: usize) -> Self {
        let mut index = IndexMap::default();
        index.reserve(ranks);
        Self {
            ranks: Vec::with_capacity(ranks),
            index,
            edges: Vec::with_capacity(routes),
        }
    }

    /// Register a rank (idempotent).  Ranks without routes are isolated nodes.
    pub fn add_rank(&mut self, rank: RankId) -> usize {
        if let Some(&i) = self.index.get(&rank) {
            return i as usize;
        }
        let i = self.ranks.len() as u32;
        self.ranks.push(rank);
        self.index.insert(rank, i);
        i as usize
    }

    /// Add a **directed** route edge; endpoints are registered implicitly.
    pub fn add_route(&mut self, route: &Route) {
        self.add_rank(route.from_rank);
        self.add_rank(route.to_rank);
        self.edges.push(RouteEdge::from_route(route));
    }

    pub fn node_count(&self) -> usize { self.ranks.len() }
    pub fn edge_count(&self) -> usize { self.edges.len() }

    /// Consume the builder and produce a [`RankGraph`].
    ///
    /// O(E log E) for the edge sort.
    pub fn build(self) -> RankGraph {
        let node_count = self.ranks.len();
        let index = self.index;

        let mut edges = self.edges;
        edges.sort_by_key(|e| (index[&e.from], e.route));

        let edge_to: Vec<u32> = edges.iter().map(|e| index[&e.to]).collect();

        let mut node_out_start = vec![0u32; node_count + 1];
        for e in &edges {
            node_out_start[index[&e.from] as usize + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, edges.len());

        RankGraph { ranks: self.ranks, index, node_out_start, edges, edge_to }
    }
}

impl Default for RankGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
