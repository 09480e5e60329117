//! Frame-to-node assignment.

/// Frames in flight per healthy node.
const FRAMES_PER_NODE: usize = 3;

/// Position of the node that handles `frame_index` on the given attempt.
///
/// Attempt 0 is the round-robin primary; attempts `1..node_count` walk the
/// remaining nodes in order. `None` when there are no nodes.
pub fn node_for(frame_index: u32, node_count: usize, attempt: usize) -> Option<usize> {
    (frame_index as usize)
        .checked_add(attempt)?
        .checked_rem(node_count)
}

/// Frames dispatched concurrently per wave: `min(max_batch, 3 * node_count)`.
pub fn batch_size(node_count: usize, max_batch: usize) -> usize {
    max_batch
        .min(node_count.saturating_mul(FRAMES_PER_NODE))
        .max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_is_round_robin() {
        let primaries: Vec<_> = (0..6).map(|i| node_for(i, 2, 0).unwrap()).collect();
        assert_eq!(primaries, vec![0, 1, 0, 1, 0, 1]);
    }

    #[test]
    fn test_rotation_visits_every_node_once() {
        let mut visited: Vec<_> = (0..4).map(|a| node_for(5, 4, a).unwrap()).collect();
        assert_eq!(visited, vec![1, 2, 3, 0]);
        visited.sort();
        assert_eq!(visited, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_no_nodes() {
        assert_eq!(node_for(3, 0, 0), None);
    }

    #[test]
    fn test_batch_size() {
        assert_eq!(batch_size(1, 10), 3);
        assert_eq!(batch_size(3, 10), 9);
        assert_eq!(batch_size(4, 10), 10);
        assert_eq!(batch_size(50, 10), 10);
        assert_eq!(batch_size(2, 4), 4);
        assert_eq!(batch_size(0, 10), 1);
    }
}
