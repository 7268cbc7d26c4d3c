//! Connected-component partition of items under a symmetric predicate.

use std::cmp::Ordering;

/// Disjoint-set forest with path halving and union by rank.
pub struct DisjointSets {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSets {
    pub fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            rank: vec![0; len],
        }
    }

    pub fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    pub fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            Ordering::Less => self.parent[ra] = rb,
            Ordering::Greater => self.parent[rb] = ra,
            Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }
}

/// Partition `items` into connected components of the `related` relation.
///
/// `related` only needs to be symmetric; transitivity comes from the
/// component closure, so chains `a~b~c` land in one class even when `a` and
/// `c` are not directly related (single-linkage clustering). Returns the
/// number of classes and one dense class label per item.
pub fn partition_by<T, F>(items: &[T], related: F) -> (usize, Vec<usize>)
where
    F: Fn(&T, &T) -> bool,
{
    let mut sets = DisjointSets::new(items.len());
    for i in 0..items.len() {
        for j in (i + 1)..items.len() {
            if related(&items[i], &items[j]) {
                sets.union(i, j);
            }
        }
    }

    let mut labels = vec![0usize; items.len()];
    let mut label_of_root = vec![usize::MAX; items.len()];
    let mut n_classes = 0usize;
    for (i, label) in labels.iter_mut().enumerate() {
        let root = sets.find(i);
        if label_of_root[root] == usize::MAX {
            label_of_root[root] = n_classes;
            n_classes += 1;
        }
        *label = label_of_root[root];
    }
    (n_classes, labels)
}
