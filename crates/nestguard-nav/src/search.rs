//! A* search over a waypoint graph
//!
//! [`PathSearch`] keeps its open and closed sets between calls so a large
//! query can be spread over several ticks with [`PathSearch::step`].
//! [`WaypointGraph::find_path`] is the same search run to completion.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use glam::Vec3;
use nestguard_core::ensure_finite;
use tracing::debug;

use crate::error::NavError;
use crate::graph::WaypointGraph;
use crate::path::Path;
use crate::waypoint::WaypointId;

/// Off-graph goal points closer than this to their snapped waypoint are not
/// appended to the path
const SNAP_EPSILON: f32 = 1e-3;

/// Where a path query starts or ends
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Endpoint {
    /// A waypoint of the graph
    Node(WaypointId),
    /// An arbitrary world position, snapped to the nearest waypoint
    Point(Vec3),
}

impl From<WaypointId> for Endpoint {
    fn from(id: WaypointId) -> Self {
        Endpoint::Node(id)
    }
}

impl From<Vec3> for Endpoint {
    fn from(point: Vec3) -> Self {
        Endpoint::Point(point)
    }
}

/// Result of advancing a search
#[derive(Debug, Clone, PartialEq)]
pub enum SearchStatus {
    /// Budget exhausted, call `step` again
    Pending,
    Found(Path),
    Unreachable,
}

/// A node in the open set
#[derive(Debug, Clone, Copy)]
struct OpenEntry {
    node: WaypointId,
    /// Accumulated cost from the start (g)
    cost: f32,
    /// Estimated total cost (f = g + h)
    estimated_total: f32,
    /// Push order, used to break ties on f
    seq: u64,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap (BinaryHeap is a max-heap); on equal f
        // the most recently pushed entry wins
        other
            .estimated_total
            .total_cmp(&self.estimated_total)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Resolved query endpoints
#[derive(Debug, Clone, Copy)]
struct Route {
    start: WaypointId,
    goal: WaypointId,
    goal_position: Vec3,
    /// Raw goal position when the goal was an off-graph point
    goal_point: Option<Vec3>,
}

/// Incremental A* query
#[derive(Debug, Clone)]
pub struct PathSearch {
    route: Option<Route>,
    open: BinaryHeap<OpenEntry>,
    best_cost: HashMap<WaypointId, f32>,
    came_from: HashMap<WaypointId, WaypointId>,
    closed: HashSet<WaypointId>,
    next_seq: u64,
    expanded: usize,
    outcome: Option<Option<Path>>,
}

impl PathSearch {
    /// Prepare a query. Errors only on unknown waypoints or non-finite points.
    pub fn new(graph: &WaypointGraph, start: Endpoint, goal: Endpoint) -> Result<Self, NavError> {
        Self::with_visibility(graph, start, goal, &|_, _| true)
    }

    /// Prepare a query whose point endpoints prefer visible waypoints
    pub fn with_visibility(
        graph: &WaypointGraph,
        start: Endpoint,
        goal: Endpoint,
        visible: &dyn Fn(Vec3, Vec3) -> bool,
    ) -> Result<Self, NavError> {
        let start = resolve(graph, start, visible)?;
        let goal = resolve(graph, goal, visible)?;

        let route = match (start, goal) {
            (Some((start, _)), Some((goal, goal_point))) => Some(Route {
                start,
                goal,
                goal_position: graph.position(goal)?,
                goal_point,
            }),
            _ => None,
        };

        let mut search = Self {
            route,
            open: BinaryHeap::new(),
            best_cost: HashMap::new(),
            came_from: HashMap::new(),
            closed: HashSet::new(),
            next_seq: 0,
            expanded: 0,
            outcome: None,
        };

        match route {
            Some(route) => {
                let h = graph.heuristic(graph.position(route.start)?, route.goal_position);
                search.best_cost.insert(route.start, 0.0);
                search.push(route.start, 0.0, h);
            }
            None => search.outcome = Some(None),
        }

        Ok(search)
    }

    fn push(&mut self, node: WaypointId, cost: f32, h: f32) {
        self.open.push(OpenEntry {
            node,
            cost,
            estimated_total: cost + h,
            seq: self.next_seq,
        });
        self.next_seq += 1;
    }

    /// Nodes expanded so far
    pub fn expanded(&self) -> usize {
        self.expanded
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    /// Expand at most `budget` nodes.
    ///
    /// Once finished, further calls keep returning the same outcome.
    pub fn step(&mut self, graph: &WaypointGraph, budget: usize) -> Result<SearchStatus, NavError> {
        if let Some(outcome) = &self.outcome {
            return Ok(status_of(outcome));
        }
        let Some(route) = self.route else {
            return Ok(SearchStatus::Unreachable);
        };

        let mut expanded_now = 0;
        while expanded_now < budget {
            let Some(entry) = self.open.pop() else {
                debug!(
                    start = %route.start,
                    goal = %route.goal,
                    expanded = self.expanded,
                    "no path"
                );
                self.outcome = Some(None);
                return Ok(SearchStatus::Unreachable);
            };

            // Stale entry superseded by a cheaper push
            let best = self.best_cost.get(&entry.node).copied().unwrap_or(f32::INFINITY);
            if entry.cost > best || self.closed.contains(&entry.node) {
                continue;
            }

            if entry.node == route.goal {
                let path = self.reconstruct(graph, route, entry.cost)?;
                debug!(
                    start = %route.start,
                    goal = %route.goal,
                    nodes = path.len(),
                    cost = path.cost(),
                    expanded = self.expanded,
                    "path found"
                );
                self.outcome = Some(Some(path.clone()));
                return Ok(SearchStatus::Found(path));
            }

            self.closed.insert(entry.node);
            self.expanded += 1;
            expanded_now += 1;

            for edge in graph.edges(entry.node)? {
                let tentative = entry.cost + edge.cost;
                let known = self.best_cost.get(&edge.to).copied().unwrap_or(f32::INFINITY);
                if tentative >= known {
                    continue;
                }
                self.best_cost.insert(edge.to, tentative);
                self.came_from.insert(edge.to, entry.node);
                // Re-open on strict improvement
                self.closed.remove(&edge.to);
                let h = graph.heuristic(graph.position(edge.to)?, route.goal_position);
                self.push(edge.to, tentative, h);
            }
        }

        Ok(SearchStatus::Pending)
    }

    /// Run the search to completion
    pub fn run(mut self, graph: &WaypointGraph) -> Result<Option<Path>, NavError> {
        match self.step(graph, usize::MAX)? {
            SearchStatus::Found(path) => Ok(Some(path)),
            SearchStatus::Unreachable | SearchStatus::Pending => Ok(None),
        }
    }

    fn reconstruct(&self, graph: &WaypointGraph, route: Route, cost: f32) -> Result<Path, NavError> {
        let mut nodes = vec![route.goal];
        let mut current = route.goal;
        while current != route.start {
            match self.came_from.get(&current) {
                Some(&prev) => {
                    nodes.push(prev);
                    current = prev;
                }
                None => break,
            }
        }
        nodes.reverse();

        let mut points = nodes
            .iter()
            .map(|&id| graph.position(id))
            .collect::<Result<Vec<_>, _>>()?;
        if let Some(goal_point) = route.goal_point {
            if goal_point.distance(route.goal_position) > SNAP_EPSILON {
                points.push(goal_point);
            }
        }

        Ok(Path::new(nodes, points, cost))
    }
}

fn status_of(outcome: &Option<Path>) -> SearchStatus {
    match outcome {
        Some(path) => SearchStatus::Found(path.clone()),
        None => SearchStatus::Unreachable,
    }
}

/// Map an endpoint onto a graph node. `Ok(None)` when the graph is empty.
fn resolve(
    graph: &WaypointGraph,
    endpoint: Endpoint,
    visible: &dyn Fn(Vec3, Vec3) -> bool,
) -> Result<Option<(WaypointId, Option<Vec3>)>, NavError> {
    match endpoint {
        Endpoint::Node(id) => {
            graph.get(id)?;
            Ok(Some((id, None)))
        }
        Endpoint::Point(point) => {
            let point = ensure_finite(point)?;
            let snapped = graph
                .nearest_where(point, |wp| visible(point, wp.position()))
                .or_else(|| graph.nearest(point));
            Ok(snapped.map(|id| (id, Some(point))))
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    /// A-B-C-D in a line, one unit apart
    fn line() -> (WaypointGraph, Vec<WaypointId>) {
        let mut g = WaypointGraph::new();
        let ids: Vec<_> = (0..4)
            .map(|i| g.add_waypoint(Vec3::new(i as f32, 0.0, 0.0)).unwrap())
            .collect();
        for pair in ids.windows(2) {
            g.connect(pair[0], pair[1]).unwrap();
        }
        (g, ids)
    }

    /// Grid with random missing edges and some diagonals, full of cycles
    fn random_grid(seed: u64, size: usize) -> WaypointGraph {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut g = WaypointGraph::new();
        let mut ids = Vec::new();
        for y in 0..size {
            for x in 0..size {
                let jitter = Vec3::new(rng.gen_range(-0.3..0.3), rng.gen_range(-0.3..0.3), 0.0);
                ids.push(
                    g.add_waypoint(Vec3::new(x as f32 * 3.0, y as f32 * 3.0, 0.0) + jitter)
                        .unwrap(),
                );
            }
        }
        for y in 0..size {
            for x in 0..size {
                let here = ids[y * size + x];
                if x + 1 < size && rng.gen_bool(0.8) {
                    g.connect(here, ids[y * size + x + 1]).unwrap();
                }
                if y + 1 < size && rng.gen_bool(0.8) {
                    g.connect(here, ids[(y + 1) * size + x]).unwrap();
                }
                if x + 1 < size && y + 1 < size && rng.gen_bool(0.3) {
                    g.connect(here, ids[(y + 1) * size + x + 1]).unwrap();
                }
            }
        }
        g
    }

    /// Exhaustive reference: plain Dijkstra without a heuristic
    fn dijkstra(g: &WaypointGraph, start: WaypointId, goal: WaypointId) -> Option<f32> {
        let mut dist = vec![f32::INFINITY; g.len()];
        let mut done = vec![false; g.len()];
        dist[start.0 as usize] = 0.0;
        loop {
            let mut current = None;
            for i in 0..g.len() {
                if !done[i] && dist[i].is_finite() && current.map_or(true, |c: usize| dist[i] < dist[c]) {
                    current = Some(i);
                }
            }
            let Some(c) = current else { break };
            done[c] = true;
            for edge in g.edges(WaypointId(c as u32)).unwrap() {
                let nd = dist[c] + edge.cost;
                if nd < dist[edge.to.0 as usize] {
                    dist[edge.to.0 as usize] = nd;
                }
            }
        }
        let d = dist[goal.0 as usize];
        d.is_finite().then_some(d)
    }

    #[test]
    fn test_line_path() {
        let (g, ids) = line();
        let path = g.find_path(ids[0], ids[3]).unwrap().unwrap();
        assert_eq!(path.nodes(), ids.as_slice());
        assert!((path.cost() - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_start_equals_goal() {
        let (g, ids) = line();
        let path = g.find_path(ids[2], ids[2]).unwrap().unwrap();
        assert_eq!(path.nodes(), &[ids[2]]);
        assert_eq!(path.cost(), 0.0);
    }

    #[test]
    fn test_disconnected_is_unreachable() {
        let mut g = WaypointGraph::new();
        let a = g.add_waypoint(Vec3::ZERO).unwrap();
        let b = g.add_waypoint(Vec3::X).unwrap();
        let c = g.add_waypoint(Vec3::new(10.0, 0.0, 0.0)).unwrap();
        let d = g.add_waypoint(Vec3::new(11.0, 0.0, 0.0)).unwrap();
        g.connect(a, b).unwrap();
        g.connect(c, d).unwrap();
        assert_eq!(g.find_path(a, d).unwrap(), None);
        assert_eq!(g.find_path(d, a).unwrap(), None);
    }

    #[test]
    fn test_empty_graph_is_unreachable() {
        let g = WaypointGraph::new();
        assert_eq!(g.find_path(Vec3::ZERO, Vec3::ONE).unwrap(), None);
    }

    #[test]
    fn test_unknown_node_is_an_error() {
        let (g, ids) = line();
        assert_eq!(
            g.find_path(ids[0], WaypointId(42)),
            Err(NavError::InvalidWaypointReference(WaypointId(42)))
        );
    }

    #[test]
    fn test_non_finite_point_is_an_error() {
        let (g, ids) = line();
        let err = g.find_path(Vec3::new(f32::NAN, 0.0, 0.0), ids[0]).unwrap_err();
        assert!(matches!(err, NavError::NonFinitePosition(_)));
    }

    #[test]
    fn test_directed_edges_respected() {
        let mut g = WaypointGraph::new();
        let a = g.add_waypoint(Vec3::ZERO).unwrap();
        let b = g.add_waypoint(Vec3::X).unwrap();
        g.connect_directed(a, b).unwrap();
        assert!(g.find_path(a, b).unwrap().is_some());
        assert_eq!(g.find_path(b, a).unwrap(), None);
    }

    #[test]
    fn test_prefers_cheaper_detour() {
        // Direct edge A-C is expensive, A-B-C is cheap
        let mut g = WaypointGraph::new();
        let a = g.add_waypoint(Vec3::ZERO).unwrap();
        let b = g.add_waypoint(Vec3::new(5.0, 1.0, 0.0)).unwrap();
        let c = g.add_waypoint(Vec3::new(10.0, 0.0, 0.0)).unwrap();
        g.connect_with_cost(a, c, 100.0).unwrap();
        g.connect(a, b).unwrap();
        g.connect(b, c).unwrap();
        let path = g.find_path(a, c).unwrap().unwrap();
        assert_eq!(path.nodes(), &[a, b, c]);
    }

    #[test]
    fn test_cheap_explicit_costs_stay_optimal() {
        // Explicit costs below straight-line length must not break optimality
        let mut g = WaypointGraph::new();
        let a = g.add_waypoint(Vec3::ZERO).unwrap();
        let b = g.add_waypoint(Vec3::new(0.0, 50.0, 0.0)).unwrap();
        let c = g.add_waypoint(Vec3::new(10.0, 0.0, 0.0)).unwrap();
        g.connect(a, c).unwrap();
        g.connect_with_cost(a, b, 1.0).unwrap();
        g.connect_with_cost(b, c, 1.0).unwrap();
        let path = g.find_path(a, c).unwrap().unwrap();
        assert_eq!(path.nodes(), &[a, b, c]);
        assert_eq!(path.cost(), 2.0);
    }

    #[test]
    fn test_optimal_against_exhaustive_search() {
        for seed in 0..8 {
            let g = random_grid(seed, 7);
            let n = g.len() as u32;
            for (s, t) in [(0, n - 1), (3, n - 5), (n / 2, 1), (6, n - 7)] {
                let (s, t) = (WaypointId(s), WaypointId(t));
                let found = g.find_path(s, t).unwrap();
                let reference = dijkstra(&g, s, t);
                match (found, reference) {
                    (Some(path), Some(best)) => {
                        assert!(
                            (path.cost() - best).abs() < 1e-3,
                            "seed {seed}: A* {} vs exhaustive {best}",
                            path.cost()
                        );
                        let walked = g.path_cost(path.nodes()).unwrap().unwrap();
                        assert!((walked - path.cost()).abs() < 1e-3);
                        assert_eq!(path.start(), Some(s));
                        assert_eq!(path.goal(), Some(t));
                    }
                    (None, None) => {}
                    (found, reference) => {
                        panic!("seed {seed}: reachability mismatch {found:?} vs {reference:?}")
                    }
                }
            }
        }
    }

    #[test]
    fn test_repeat_query_is_identical() {
        let g = random_grid(11, 8);
        let last = WaypointId(g.len() as u32 - 1);
        let first = g.find_path(WaypointId(0), last).unwrap();
        let second = g.find_path(WaypointId(0), last).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_equal_cost_ties_prefer_latest_push() {
        // Diamond: A -> B -> D and A -> C -> D cost exactly the same
        let mut g = WaypointGraph::new();
        let a = g.add_waypoint(Vec3::new(0.0, 0.0, 0.0)).unwrap();
        let b = g.add_waypoint(Vec3::new(1.0, 1.0, 0.0)).unwrap();
        let c = g.add_waypoint(Vec3::new(1.0, -1.0, 0.0)).unwrap();
        let d = g.add_waypoint(Vec3::new(2.0, 0.0, 0.0)).unwrap();
        g.connect(a, b).unwrap();
        g.connect(a, c).unwrap();
        g.connect(b, d).unwrap();
        g.connect(c, d).unwrap();
        let path = g.find_path(a, d).unwrap().unwrap();
        assert_eq!(path.nodes(), &[a, c, d]);
    }

    #[test]
    fn test_point_endpoints_snap() {
        let (g, ids) = line();
        let goal = Vec3::new(3.4, 0.5, 0.0);
        let path = g.find_path(Vec3::new(-0.2, 0.1, 0.0), goal).unwrap().unwrap();
        assert_eq!(path.nodes(), ids.as_slice());
        assert_eq!(path.points().len(), 5);
        assert_eq!(path.points().last(), Some(&goal));
    }

    #[test]
    fn test_point_on_waypoint_not_duplicated() {
        let (g, ids) = line();
        let path = g.find_path(ids[0], Vec3::new(3.0, 0.0, 0.0)).unwrap().unwrap();
        assert_eq!(path.points().len(), 4);
    }

    #[test]
    fn test_visibility_filter_changes_snap() {
        let (g, ids) = line();
        // Pretend a wall hides everything but the far end from the start point
        let path = g
            .find_path_visible(Vec3::new(0.1, 0.0, 0.0), ids[3], |_, wp| wp.x > 2.5)
            .unwrap()
            .unwrap();
        assert_eq!(path.nodes(), &[ids[3]]);
    }

    #[test]
    fn test_resumable_matches_one_shot() {
        let g = random_grid(3, 9);
        let last = WaypointId(g.len() as u32 - 1);
        let expected = g.find_path(WaypointId(0), last).unwrap();

        let mut search = PathSearch::new(&g, WaypointId(0).into(), last.into()).unwrap();
        let mut pending_steps = 0;
        let found = loop {
            match search.step(&g, 1).unwrap() {
                SearchStatus::Pending => pending_steps += 1,
                SearchStatus::Found(path) => break Some(path),
                SearchStatus::Unreachable => break None,
            }
            assert!(pending_steps <= g.len(), "search must terminate");
        };
        assert_eq!(found, expected);
        assert!(search.is_finished());
        if expected.is_some() {
            assert!(pending_steps > 0);
        }
    }

    #[test]
    fn test_finished_search_repeats_outcome() {
        let (g, ids) = line();
        let mut search = PathSearch::new(&g, ids[0].into(), ids[3].into()).unwrap();
        let first = search.step(&g, usize::MAX).unwrap();
        let again = search.step(&g, 1).unwrap();
        assert_eq!(first, again);
    }

    #[test]
    fn test_zero_budget_makes_no_progress() {
        let (g, ids) = line();
        let mut search = PathSearch::new(&g, ids[0].into(), ids[3].into()).unwrap();
        assert_eq!(search.step(&g, 0).unwrap(), SearchStatus::Pending);
        assert_eq!(search.expanded(), 0);
    }

    #[test]
    fn test_cycle_terminates_when_unreachable() {
        let mut g = WaypointGraph::new();
        let ids: Vec<_> = (0..5)
            .map(|i| {
                let angle = i as f32 * std::f32::consts::TAU / 5.0;
                g.add_waypoint(Vec3::new(angle.cos(), angle.sin(), 0.0)).unwrap()
            })
            .collect();
        for i in 0..5 {
            g.connect(ids[i], ids[(i + 1) % 5]).unwrap();
        }
        let island = g.add_waypoint(Vec3::new(20.0, 0.0, 0.0)).unwrap();
        let mut search = PathSearch::new(&g, ids[0].into(), island.into()).unwrap();
        assert_eq!(search.step(&g, usize::MAX).unwrap(), SearchStatus::Unreachable);
        assert_eq!(search.expanded(), 5);
    }
}
