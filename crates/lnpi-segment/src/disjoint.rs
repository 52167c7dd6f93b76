//! Disjoint-set arena tracking which original regions have been merged.

/// Union-find over the dense region indices `0..n`.
///
/// Each root owns the list of original indices merged into it. The root
/// that survives a [`union`](Self::union) is chosen by the caller, so the
/// merger controls which region id lives on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegionForest {
    parent: Vec<usize>,
    members: Vec<Vec<usize>>,
    live: usize,
}

impl RegionForest {
    /// `n` singleton regions.
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            members: (0..n).map(|i| vec![i]).collect(),
            live: n,
        }
    }

    /// Total number of original regions.
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    /// Whether the forest was built over zero regions.
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Number of regions still standing.
    pub fn live_count(&self) -> usize {
        self.live
    }

    /// Whether `i` is still the root of its own set.
    pub fn is_root(&self, i: usize) -> bool {
        self.parent[i] == i
    }

    /// Root of the set containing `i`, compressing the path on the way.
    pub fn find(&mut self, i: usize) -> usize {
        let mut root = i;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut node = i;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    /// Merge the set of `kill` into the set of `keep`. Returns the
    /// surviving root.
    pub fn union(&mut self, keep: usize, kill: usize) -> usize {
        let keep = self.find(keep);
        let kill = self.find(kill);
        if keep == kill {
            return keep;
        }
        self.parent[kill] = keep;
        let moved = std::mem::take(&mut self.members[kill]);
        self.members[keep].extend(moved);
        self.members[keep].sort_unstable();
        self.live -= 1;
        keep
    }

    /// Surviving roots in ascending order.
    pub fn roots(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.parent.len()).filter(|&i| self.is_root(i))
    }

    /// Original indices merged into `root`, ascending. Empty for non-roots.
    pub fn members(&self, root: usize) -> &[usize] {
        &self.members[root]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn keep_side_survives() {
        let mut forest = RegionForest::new(4);
        assert_eq!(forest.union(2, 0), 2);
        assert_eq!(forest.union(2, 3), 2);
        assert_eq!(forest.live_count(), 2);
        assert_eq!(forest.roots().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(forest.members(2), &[0, 2, 3]);
        assert!(forest.members(0).is_empty());
        assert_eq!(forest.find(3), 2);
    }

    #[test]
    fn redundant_union_is_noop() {
        let mut forest = RegionForest::new(3);
        forest.union(0, 1);
        assert_eq!(forest.union(1, 0), 0);
        assert_eq!(forest.live_count(), 2);
    }

    proptest! {
        #[test]
        fn members_partition_indices(
            n in 1usize..20,
            pairs in prop::collection::vec((0usize..20, 0usize..20), 0..30),
        ) {
            let mut forest = RegionForest::new(n);
            for (a, b) in pairs {
                forest.union(a % n, b % n);
            }
            let mut all: Vec<usize> = forest
                .roots()
                .flat_map(|r| forest.members(r).to_vec())
                .collect();
            all.sort_unstable();
            prop_assert_eq!(all, (0..n).collect::<Vec<_>>());
            prop_assert_eq!(forest.roots().count(), forest.live_count());
        }
    }
}
