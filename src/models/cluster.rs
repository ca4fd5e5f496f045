//! Spatial clusters of orders.

use std::fmt;

use super::coord::Coordinate;
use super::order::OrderId;

/// Grouping partition an order belongs to before spatial clustering.
///
/// Empty when clustering runs without a grouping key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PartitionKey {
    pub region: Option<String>,
    pub sub_region: Option<String>,
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.region, &self.sub_region) {
            (None, _) => write!(f, "*"),
            (Some(r), None) => write!(f, "{r}"),
            (Some(r), Some(s)) => write!(f, "{r}/{s}"),
        }
    }
}

/// Cluster identifier: an index in `[0, k)` scoped to its partition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClusterId {
    pub partition: PartitionKey,
    pub index: usize,
}

impl ClusterId {
    pub fn new(partition: PartitionKey, index: usize) -> Self {
        Self { partition, index }
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.partition, self.index)
    }
}

/// A group of orders sharing a coarse destination area.
///
/// The centroid is derived from the members (mean latitude/longitude) and is
/// informational only.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cluster {
    pub id: ClusterId,
    pub members: Vec<OrderId>,
    pub centroid: Coordinate,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_id_ordering_groups_partitions() {
        let a = ClusterId::new(PartitionKey { region: Some("A".into()), sub_region: None }, 1);
        let b = ClusterId::new(PartitionKey { region: Some("B".into()), sub_region: None }, 0);
        assert!(a < b);
        assert_eq!(a.to_string(), "A#1");
    }

    #[test]
    fn test_partition_display() {
        assert_eq!(PartitionKey::default().to_string(), "*");
        let key = PartitionKey {
            region: Some("SP".into()),
            sub_region: Some("Centro".into()),
        };
        assert_eq!(key.to_string(), "SP/Centro");
    }
}
