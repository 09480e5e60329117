//! Ordered reassembly of frames that arrive in any order.

use std::collections::BTreeMap;

use crate::error::{DispatchError, DispatchResult};

/// Collects processed frames keyed by index.
#[derive(Debug)]
pub struct FrameCollector {
    expected: u32,
    frames: BTreeMap<u32, Vec<u8>>,
}

impl FrameCollector {
    /// Collector for frames `0..expected`.
    pub fn new(expected: u32) -> Self {
        Self {
            expected,
            frames: BTreeMap::new(),
        }
    }

    /// Store a frame. Out-of-range and duplicate indices are rejected.
    pub fn insert(&mut self, frame_index: u32, image: Vec<u8>) -> DispatchResult<()> {
        if frame_index >= self.expected {
            return Err(DispatchError::UnexpectedFrame {
                frame_index,
                reason: "index out of range",
            });
        }
        if self.frames.contains_key(&frame_index) {
            return Err(DispatchError::UnexpectedFrame {
                frame_index,
                reason: "duplicate index",
            });
        }
        self.frames.insert(frame_index, image);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.frames.len() == self.expected as usize
    }

    /// Frames in index order. Fails unless every index is present.
    pub fn into_ordered(self) -> DispatchResult<Vec<Vec<u8>>> {
        if !self.is_complete() {
            return Err(DispatchError::IncompleteFrames {
                expected: self.expected,
                received: self.frames.len() as u32,
            });
        }
        Ok(self.frames.into_values().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_order_inserts_come_out_ordered() {
        let mut collector = FrameCollector::new(4);
        for index in [2u32, 0, 3, 1] {
            collector.insert(index, vec![index as u8]).unwrap();
        }

        assert!(collector.is_complete());
        assert_eq!(
            collector.into_ordered().unwrap(),
            vec![vec![0], vec![1], vec![2], vec![3]]
        );
    }

    #[test]
    fn test_rejects_duplicate() {
        let mut collector = FrameCollector::new(2);
        collector.insert(1, vec![1]).unwrap();

        let err = collector.insert(1, vec![9]).unwrap_err();
        assert!(matches!(err, DispatchError::UnexpectedFrame { frame_index: 1, .. }));
        assert_eq!(collector.len(), 1);
    }

    #[test]
    fn test_rejects_out_of_range() {
        let mut collector = FrameCollector::new(2);
        assert!(collector.insert(2, vec![]).is_err());
        assert!(collector.is_empty());
    }

    #[test]
    fn test_incomplete() {
        let mut collector = FrameCollector::new(3);
        collector.insert(0, vec![0]).unwrap();
        collector.insert(2, vec![2]).unwrap();

        let err = collector.into_ordered().unwrap_err();
        assert!(matches!(
            err,
            DispatchError::IncompleteFrames {
                expected: 3,
                received: 2
            }
        ));
    }
}
