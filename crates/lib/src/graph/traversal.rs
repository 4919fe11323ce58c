//! Graph traversal and pathfinding
//!
//! Breadth-first walks over parent and child links, topological ordering of
//! ancestor sets, common-ancestor search, and path reconstruction.

use std::collections::{HashMap, HashSet, VecDeque};

use super::{GraphError, VersionGraph, VersionNode};
use crate::{Result, id::ID};

/// Collect the ancestors of `id` and sort them topologically.
///
/// The walk starts from the node's parents, so `id` itself is never included.
pub(crate) async fn ancestors(graph: &VersionGraph, id: &ID) -> Result<Vec<ID>> {
    let start = graph.require(id).await?;

    let mut visited: HashMap<ID, VersionNode> = HashMap::new();
    let mut discovered: Vec<ID> = Vec::new();
    let mut queue: VecDeque<(ID, ID)> = start
        .parents()
        .iter()
        .map(|p| (id.clone(), p.clone()))
        .collect();

    while let Some((child, current)) = queue.pop_front() {
        if visited.contains_key(&current) {
            continue;
        }
        let node = graph.follow(&child, &current).await?;
        for parent in node.parents() {
            if !visited.contains_key(parent) {
                queue.push_back((current.clone(), parent.clone()));
            }
        }
        discovered.push(current.clone());
        visited.insert(current, node);
    }

    tracing::debug!(node_id = %id, ancestor_count = discovered.len(), "Collected ancestors");
    Ok(topological_sort(&discovered, &visited))
}

/// Kahn's algorithm restricted to `order`, parents before children.
///
/// Ties are broken by position in `order`, which keeps the output stable for a
/// given graph.
fn topological_sort(order: &[ID], nodes: &HashMap<ID, VersionNode>) -> Vec<ID> {
    let mut in_degree: HashMap<&ID, usize> = order.iter().map(|id| (id, 0)).collect();
    let mut forward: HashMap<&ID, Vec<&ID>> = HashMap::new();

    for id in order {
        let Some(node) = nodes.get(id) else { continue };
        for parent in node.parents() {
            if let Some((parent_key, _)) = in_degree.get_key_value(parent) {
                let parent_key = *parent_key;
                forward.entry(parent_key).or_default().push(id);
            }
        }
    }
    for children in forward.values() {
        for child in children {
            if let Some(degree) = in_degree.get_mut(*child) {
                *degree += 1;
            }
        }
    }

    let mut ready: VecDeque<&ID> = order.iter().filter(|id| in_degree[id] == 0).collect();
    let mut sorted = Vec::with_capacity(order.len());
    while let Some(current) = ready.pop_front() {
        sorted.push(current.clone());
        if let Some(children) = forward.get(current) {
            for child in children {
                if let Some(degree) = in_degree.get_mut(*child) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.push_back(*child);
                    }
                }
            }
        }
    }
    sorted
}

/// Breadth-first walk over child links, excluding the start node.
pub(crate) async fn descendants(graph: &VersionGraph, id: &ID) -> Result<Vec<ID>> {
    let start = graph.require(id).await?;

    let mut visited: HashSet<ID> = HashSet::new();
    let mut result = Vec::new();
    let mut queue: VecDeque<(ID, ID)> = start
        .children()
        .iter()
        .map(|c| (id.clone(), c.clone()))
        .collect();

    while let Some((parent, current)) = queue.pop_front() {
        if !visited.insert(current.clone()) {
            continue;
        }
        let node = graph.follow(&parent, &current).await?;
        for child in node.children() {
            if !visited.contains(child) {
                queue.push_back((current.clone(), child.clone()));
            }
        }
        result.push(current);
    }

    tracing::debug!(node_id = %id, descendant_count = result.len(), "Collected descendants");
    Ok(result)
}

/// Ancestor closure of `id`, including `id` itself.
async fn closure(graph: &VersionGraph, id: &ID) -> Result<HashSet<ID>> {
    let mut seen: HashSet<ID> = HashSet::new();
    let mut queue: VecDeque<(ID, ID)> = VecDeque::from([(id.clone(), id.clone())]);

    while let Some((child, current)) = queue.pop_front() {
        if !seen.insert(current.clone()) {
            continue;
        }
        let node = graph.follow(&child, &current).await?;
        for parent in node.parents() {
            if !seen.contains(parent) {
                queue.push_back((current.clone(), parent.clone()));
            }
        }
    }
    Ok(seen)
}

pub(crate) async fn common_ancestor(graph: &VersionGraph, a: &ID, b: &ID) -> Result<Option<ID>> {
    graph.require(a).await?;
    graph.require(b).await?;

    let closure_a = closure(graph, a).await?;

    // Direct ancestry first: a walk back from `b` would otherwise step past `a`
    // and report one of `a`'s own ancestors.
    if closure_a.contains(b) {
        return Ok(Some(b.clone()));
    }

    let mut visited: HashSet<ID> = HashSet::new();
    let mut queue: VecDeque<(ID, ID)> = VecDeque::from([(b.clone(), b.clone())]);
    let mut interior: Option<ID> = None;

    while let Some((child, current)) = queue.pop_front() {
        if !visited.insert(current.clone()) {
            continue;
        }
        if current == *a {
            return Ok(Some(a.clone()));
        }
        if interior.is_none() && closure_a.contains(&current) && current != *b {
            interior = Some(current.clone());
        }
        let node = graph.follow(&child, &current).await?;
        for parent in node.parents() {
            if !visited.contains(parent) {
                queue.push_back((current.clone(), parent.clone()));
            }
        }
    }

    match &interior {
        Some(found) => tracing::debug!(a = %a, b = %b, common = %found, "Found common ancestor"),
        None => tracing::debug!(a = %a, b = %b, "Disjoint histories"),
    }
    Ok(interior)
}

pub(crate) async fn is_ancestor(
    graph: &VersionGraph,
    ancestor: &ID,
    descendant: &ID,
) -> Result<bool> {
    graph.require(ancestor).await?;
    let start = graph.require(descendant).await?;

    let mut visited: HashSet<ID> = HashSet::new();
    let mut queue: VecDeque<(ID, ID)> = start
        .parents()
        .iter()
        .map(|p| (descendant.clone(), p.clone()))
        .collect();

    while let Some((child, current)) = queue.pop_front() {
        if current == *ancestor {
            return Ok(true);
        }
        if !visited.insert(current.clone()) {
            continue;
        }
        let node = graph.follow(&child, &current).await?;
        for parent in node.parents() {
            if !visited.contains(parent) {
                queue.push_back((current.clone(), parent.clone()));
            }
        }
    }
    Ok(false)
}

pub(crate) async fn between(graph: &VersionGraph, from: &ID, to: &ID) -> Result<Vec<ID>> {
    graph.require(from).await?;
    graph.require(to).await?;

    if from == to {
        return Ok(vec![from.clone()]);
    }

    let no_path = || -> crate::Error {
        GraphError::NoPath {
            from: from.clone(),
            to: to.clone(),
        }
        .into()
    };

    // Walk back from `to`, recording parent -> child edges, until `from` turns up.
    let mut forward: HashMap<ID, Vec<ID>> = HashMap::new();
    let mut visited: HashSet<ID> = HashSet::from([to.clone()]);
    let mut queue: VecDeque<(ID, ID)> = VecDeque::from([(to.clone(), to.clone())]);
    let mut found = false;

    while let Some((child, current)) = queue.pop_front() {
        if current == *from {
            found = true;
            break;
        }
        let node = graph.follow(&child, &current).await?;
        for parent in node.parents() {
            forward
                .entry(parent.clone())
                .or_default()
                .push(current.clone());
            if visited.insert(parent.clone()) {
                queue.push_back((current.clone(), parent.clone()));
            }
        }
    }

    if !found {
        return Err(no_path());
    }

    // Depth-first forward from `from` over the restricted edges.
    let mut path: Vec<ID> = vec![from.clone()];
    let mut next_edge: Vec<usize> = vec![0];
    let mut on_search: HashSet<ID> = HashSet::from([from.clone()]);

    while let Some(current) = path.last().cloned() {
        if current == *to {
            tracing::debug!(from = %from, to = %to, length = path.len(), "Found path");
            return Ok(path);
        }
        let depth = path.len() - 1;
        let next = forward
            .get(&current)
            .and_then(|children| children.get(next_edge[depth]))
            .cloned();
        match next {
            Some(child) => {
                next_edge[depth] += 1;
                if on_search.insert(child.clone()) {
                    path.push(child);
                    next_edge.push(0);
                }
            }
            None => {
                path.pop();
                next_edge.pop();
            }
        }
    }

    Err(no_path())
}
