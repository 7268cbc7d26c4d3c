//! Reduction of overlapping raw detections into weighted boxes.
//!
//! Two reducers are provided. [`group_rectangles`] and friends cluster
//! rectangles through a union-find partition of the pairwise similarity
//! graph and keep one mean rectangle per cluster, suppressing small clusters
//! only when a dominant overlapping cluster shadows them.
//! [`group_rectangles_meanshift`] instead treats detections as weighted
//! samples in (x, y, log-scale) space and merges them by density mode.

pub mod meanshift;
pub mod partition;

pub use meanshift::{group_rectangles_meanshift, group_rectangles_meanshift_with, MeanShiftParams};
pub use partition::{partition_by, DisjointSets};

use crate::types::Rect;

/// Relaxation applied to `eps` when testing whether a dominant cluster
/// shadows a smaller one. Calibrated against reference outputs, not exact.
pub const SHADOW_EPS_SCALE: f64 = 1.5;

/// A shadowed cluster still survives when its member count exceeds this
/// fraction of the strongest shadowing cluster. Calibrated, not exact.
pub const SHADOW_SUPPORT_RATIO: f64 = 1.0 / 3.0;

/// Corner-distance similarity predicate between rectangles.
///
/// Two rectangles are similar when both the top-left and bottom-right corner
/// deltas stay within `eps * 0.5 * (min(w1, w2) + min(h1, h2))` on each
/// axis. The relation is symmetric but not transitive.
#[derive(Clone, Copy, Debug)]
pub struct SimilarRects {
    pub eps: f64,
}

impl SimilarRects {
    pub fn new(eps: f64) -> Self {
        Self { eps }
    }

    pub fn matches(&self, a: &Rect, b: &Rect) -> bool {
        let delta =
            self.eps * 0.5 * (a.width.min(b.width) + a.height.min(b.height)) as f64;
        (a.x - b.x).abs() as f64 <= delta
            && (a.y - b.y).abs() as f64 <= delta
            && (a.right() - b.right()).abs() as f64 <= delta
            && (a.bottom() - b.bottom()).abs() as f64 <= delta
    }
}

/// One equivalence class of similar rectangles.
#[derive(Clone, Debug)]
struct Cluster {
    /// Coordinate-wise mean of the members, rounded half away from zero.
    rect: Rect,
    members: usize,
    /// Highest member reject level.
    reject_level: u32,
    /// Level weight of the deepest member (ties take the larger weight).
    level_weight: f64,
}

/// Group similar rectangles and return one representative per kept cluster.
///
/// `group_threshold == 0` disables grouping: the input is returned with
/// exact duplicates removed. Otherwise clusters are merged and small ones
/// are dropped only when shadowed by a dominant overlapping cluster; an
/// isolated singleton always survives.
pub fn group_rectangles(rects: &[Rect], group_threshold: usize, eps: f64) -> Vec<Rect> {
    group_rectangles_weighted(rects, group_threshold, eps).0
}

/// Like [`group_rectangles`], also reporting each cluster's member count.
pub fn group_rectangles_weighted(
    rects: &[Rect],
    group_threshold: usize,
    eps: f64,
) -> (Vec<Rect>, Vec<usize>) {
    if group_threshold == 0 {
        let deduped = dedup_identical(rects);
        let weights = vec![1; deduped.len()];
        return (deduped, weights);
    }
    let clusters = cluster_rectangles(rects, None, eps);
    let kept = surviving_clusters(clusters, group_threshold, eps, false);
    let weights = kept.iter().map(|c| c.members).collect();
    (kept.into_iter().map(|c| c.rect).collect(), weights)
}

/// Variant carrying per-rectangle reject levels and level weights through
/// the reduction.
///
/// Each kept cluster reports the highest member reject level and the level
/// weight of that member; the scores also let a shadowed cluster defend
/// itself when its confidence beats the clusters shadowing it.
pub fn group_rectangles_levels(
    rects: &[Rect],
    reject_levels: &[u32],
    level_weights: &[f64],
    group_threshold: usize,
    eps: f64,
) -> (Vec<Rect>, Vec<usize>, Vec<f64>) {
    assert!(
        rects.len() == reject_levels.len() && rects.len() == level_weights.len(),
        "per-rectangle inputs must have matching lengths"
    );
    if group_threshold == 0 {
        let mut out_rects: Vec<Rect> = Vec::with_capacity(rects.len());
        let mut out_levels: Vec<f64> = Vec::with_capacity(rects.len());
        for (i, r) in rects.iter().enumerate() {
            if !out_rects.contains(r) {
                out_rects.push(*r);
                out_levels.push(level_weights[i]);
            }
        }
        let weights = vec![1; out_rects.len()];
        return (out_rects, weights, out_levels);
    }
    let clusters = cluster_rectangles(rects, Some((reject_levels, level_weights)), eps);
    let kept = surviving_clusters(clusters, group_threshold, eps, true);
    let weights = kept.iter().map(|c| c.members).collect();
    let out_levels = kept.iter().map(|c| c.level_weight).collect();
    (kept.into_iter().map(|c| c.rect).collect(), weights, out_levels)
}

fn dedup_identical(rects: &[Rect]) -> Vec<Rect> {
    let mut out: Vec<Rect> = Vec::with_capacity(rects.len());
    for r in rects {
        if !out.contains(r) {
            out.push(*r);
        }
    }
    out
}

fn cluster_rectangles(
    rects: &[Rect],
    levels: Option<(&[u32], &[f64])>,
    eps: f64,
) -> Vec<Cluster> {
    let predicate = SimilarRects::new(eps);
    let (n_classes, labels) = partition_by(rects, |a, b| predicate.matches(a, b));

    let mut sums = vec![[0f64; 4]; n_classes];
    let mut counts = vec![0usize; n_classes];
    let mut reject = vec![0u32; n_classes];
    let mut level_weight = vec![f64::MIN; n_classes];

    for (i, rect) in rects.iter().enumerate() {
        let cls = labels[i];
        sums[cls][0] += rect.x as f64;
        sums[cls][1] += rect.y as f64;
        sums[cls][2] += rect.width as f64;
        sums[cls][3] += rect.height as f64;
        counts[cls] += 1;
        if let Some((levels, weights)) = levels {
            if levels[i] > reject[cls] {
                reject[cls] = levels[i];
                level_weight[cls] = weights[i];
            } else if levels[i] == reject[cls] && weights[i] > level_weight[cls] {
                level_weight[cls] = weights[i];
            }
        }
    }

    (0..n_classes)
        .map(|cls| {
            let n = counts[cls] as f64;
            Cluster {
                rect: Rect {
                    x: (sums[cls][0] / n).round() as i32,
                    y: (sums[cls][1] / n).round() as i32,
                    width: (sums[cls][2] / n).round() as i32,
                    height: (sums[cls][3] / n).round() as i32,
                },
                members: counts[cls],
                reject_level: reject[cls],
                level_weight: if levels.is_some() {
                    level_weight[cls]
                } else {
                    0.0
                },
            }
        })
        .collect()
}

/// Apply the shadow-survival rule.
///
/// Clusters above the threshold always survive and act as dominants. A
/// cluster at or below the threshold is dropped only when a dominant's
/// representative is similar to it under the relaxed tolerance or absorbs
/// it geometrically, and neither its member support nor (with
/// `use_scores`) its confidence defends it. Isolated small clusters are
/// kept; the threshold is not a blanket floor.
fn surviving_clusters(
    clusters: Vec<Cluster>,
    group_threshold: usize,
    eps: f64,
    use_scores: bool,
) -> Vec<Cluster> {
    let relaxed = SimilarRects::new(eps * SHADOW_EPS_SCALE);
    let mut kept = Vec::with_capacity(clusters.len());

    for (i, cluster) in clusters.iter().enumerate() {
        if cluster.members > group_threshold {
            kept.push(cluster.clone());
            continue;
        }

        let mut max_members = 0usize;
        let mut shadow_score_sum = 0.0f64;
        let mut shadow_count = 0usize;
        for (j, dominant) in clusters.iter().enumerate() {
            if i == j || dominant.members <= group_threshold {
                continue;
            }
            if !shadows(&dominant.rect, &cluster.rect, &relaxed) {
                continue;
            }
            max_members = max_members.max(dominant.members);
            shadow_score_sum += dominant.level_weight;
            shadow_count += 1;
        }

        if shadow_count == 0 {
            kept.push(cluster.clone());
            continue;
        }
        let support_ok = cluster.members as f64 > max_members as f64 * SHADOW_SUPPORT_RATIO;
        let score_ok = use_scores
            && cluster.level_weight > shadow_score_sum / shadow_count as f64;
        if support_ok || score_ok {
            kept.push(cluster.clone());
        }
    }
    kept
}

/// Whether `dominant` shadows `small`: similar under the relaxed predicate,
/// or `small` sits inside `dominant` grown by the relaxed margin.
fn shadows(dominant: &Rect, small: &Rect, relaxed: &SimilarRects) -> bool {
    if relaxed.matches(dominant, small) {
        return true;
    }
    let dx = (dominant.width as f64 * relaxed.eps).round() as i32;
    let dy = (dominant.height as f64 * relaxed.eps).round() as i32;
    dominant.expanded(dx, dy).contains_rect(small)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: i32, y: i32, w: i32, h: i32) -> Rect {
        Rect::new(x, y, w, h)
    }

    #[test]
    fn similar_rects_accepts_near_duplicates() {
        let pred = SimilarRects::new(0.2);
        assert!(pred.matches(&rect(10, 10, 50, 50), &rect(12, 11, 49, 50)));
        assert!(!pred.matches(&rect(10, 10, 50, 50), &rect(200, 200, 40, 40)));
    }

    #[test]
    fn representative_is_member_mean() {
        let rects = [rect(10, 10, 50, 50), rect(12, 11, 49, 50)];
        let (boxes, weights) = group_rectangles_weighted(&rects, 1, 0.2);
        assert_eq!(weights, vec![2]);
        assert_eq!(boxes[0], rect(11, 11, 50, 50));
    }

    #[test]
    fn threshold_zero_dedups_identity() {
        let rects = [rect(5, 5, 20, 20), rect(5, 5, 20, 20), rect(9, 9, 20, 20)];
        let (boxes, weights) = group_rectangles_weighted(&rects, 0, 0.2);
        assert_eq!(boxes, vec![rect(5, 5, 20, 20), rect(9, 9, 20, 20)]);
        assert_eq!(weights, vec![1, 1]);
    }

    #[test]
    fn level_weights_take_deepest_member() {
        let rects = [rect(10, 10, 40, 40), rect(11, 11, 40, 40), rect(12, 10, 40, 40)];
        let levels = [3u32, 7, 7];
        let weights = [9.0f64, 2.0, 5.0];
        let (boxes, counts, out) = group_rectangles_levels(&rects, &levels, &weights, 1, 0.2);
        assert_eq!(boxes.len(), 1);
        assert_eq!(counts, vec![3]);
        // Deepest members sit at level 7; the larger of their weights wins.
        assert_eq!(out, vec![5.0]);
    }

    #[test]
    fn shadowed_small_cluster_is_dropped() {
        // Four stacked hits form the dominant; a stray hit offset just past
        // the eps=0.2 similarity radius still overlaps the dominant under
        // the relaxed tolerance and must not yield a second box.
        let rects = [
            rect(100, 100, 40, 40),
            rect(102, 101, 40, 40),
            rect(101, 99, 41, 40),
            rect(99, 100, 40, 41),
            rect(111, 107, 40, 40),
        ];
        let (boxes, weights) = group_rectangles_weighted(&rects, 2, 0.2);
        assert_eq!(boxes.len(), 1, "stray hit should be shadowed: {boxes:?}");
        assert_eq!(weights, vec![4]);
    }

    #[test]
    fn isolated_singleton_survives_threshold() {
        let rects = [rect(10, 10, 50, 50), rect(12, 11, 49, 50), rect(200, 200, 40, 40)];
        let (boxes, weights) = group_rectangles_weighted(&rects, 1, 0.2);
        assert_eq!(boxes.len(), 2);
        assert!(boxes.contains(&rect(200, 200, 40, 40)));
        let idx = boxes.iter().position(|r| *r == rect(200, 200, 40, 40)).unwrap();
        assert_eq!(weights[idx], 1);
    }

    #[test]
    fn strong_support_defends_shadowed_cluster() {
        // Two overlapping clusters of 4 and 3 members. The smaller one is
        // shadowed by the dominant but 3 > 4/3, so both stay.
        let rects = [
            rect(100, 100, 40, 40),
            rect(101, 100, 40, 40),
            rect(100, 101, 40, 40),
            rect(102, 102, 40, 40),
            rect(112, 107, 40, 40),
            rect(113, 107, 40, 40),
            rect(112, 108, 40, 40),
        ];
        let (boxes, weights) = group_rectangles_weighted(&rects, 3, 0.2);
        assert_eq!(boxes.len(), 2, "supported cluster must survive: {boxes:?}");
        assert!(weights.contains(&4) && weights.contains(&3));
    }
}
