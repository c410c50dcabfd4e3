//! Weakly-connected component labelling.
//!
//! Edge direction is ignored: two nodes share a component when some chain of
//! edges links them regardless of orientation.  Labelling uses a disjoint-set
//! forest with union by size and path halving, so the whole pass is
//! effectively linear in N + E.

/// Disjoint-set forest over `0..n`.
struct DisjointSet {
    parent: Vec<u32>,
    size:   Vec<u32>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self { parent: (0..n as u32).collect(), size: vec![1; n] }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] as usize != x {
            let grand = self.parent[self.parent[x] as usize];
            self.parent[x] = grand;
            x = grand as usize;
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        let (big, small) = if self.size[ra] >= self.size[rb] { (ra, rb) } else { (rb, ra) };
        self.parent[small] = big as u32;
        self.size[big] += self.size[small];
    }
}

/// Label every node with the index of the lowest node in its weak component.
///
/// Labels are therefore stable and comparable across runs: two nodes share a
/// component iff their labels are equal.
pub fn weak_component_labels(
    node_count: usize,
    edges: impl IntoIterator<Item = (usize, usize)>,
) -> Vec<usize> {
    let mut ds = DisjointSet::new(node_count);
    for (a, b) in edges {
        ds.union(a, b);
    }

    let mut root_label = vec![usize::MAX; node_count];
    let mut labels = Vec::with_capacity(node_count);
    for n in 0..node_count {
        let root = ds.find(n);
        if root_label[root] == usize::MAX {
            root_label[root] = n;
        }
        labels.push(root_label[root]);
    }
    labels
}

/// Membership mask of the largest weak component.
///
/// Among equally large components the one whose lowest node index is
/// smallest wins.
pub fn largest_component_mask(
    node_count: usize,
    edges: impl IntoIterator<Item = (usize, usize)>,
) -> Vec<bool> {
    let labels = weak_component_labels(node_count, edges);

    let mut sizes = vec![0usize; node_count];
    for &label in &labels {
        sizes[label] += 1;
    }

    // Labels are lowest-member indices, so scanning in index order with a
    // strict comparison keeps the earliest component on ties.
    let mut best = None;
    let mut best_size = 0;
    for (label, &size) in sizes.iter().enumerate() {
        if size > best_size {
            best = Some(label);
            best_size = size;
        }
    }

    match best {
        Some(best) => labels.iter().map(|&l| l == best).collect(),
        None => Vec::new(),
    }
}
