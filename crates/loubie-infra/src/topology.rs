use crate::prelude::*;
use derive_more::Display;

/// Sort attribute shared by every secondary index; chronological
/// ordering within a group falls out of sorting on it.
pub const CREATED_AT_ATTR: &str = "createdAt";

///
/// IndexGroup
///
/// Closed set of grouping attributes the application actually queries
/// by: list by category, list featured items, list by portfolio. The
/// topology below must contain exactly one index per member, no more
/// and no fewer, for the model to match those read patterns.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq, Serialize)]
#[remain::sorted]
#[serde(rename_all = "lowercase")]
pub enum IndexGroup {
    #[display("category")]
    Category,

    #[display("featured")]
    Featured,

    #[display("portfolio")]
    Portfolio,
}

impl IndexGroup {
    pub const ALL: [Self; 3] = [Self::Category, Self::Featured, Self::Portfolio];

    /// Partition attribute the group's index is keyed by.
    #[must_use]
    pub const fn partition_attr(self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Featured => "featured",
            Self::Portfolio => "portfolio",
        }
    }

    /// Provider-facing index name.
    #[must_use]
    pub const fn index_name(self) -> &'static str {
        match self {
            Self::Category => "CategoryIndex",
            Self::Featured => "FeaturedIndex",
            Self::Portfolio => "PortfolioIndex",
        }
    }
}

///
/// IndexDefinition
///
/// One secondary index: a grouping attribute as the partition key and
/// the creation timestamp as the sort key.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct IndexDefinition {
    pub name: &'static str,
    pub partition_attr: &'static str,
    pub sort_attr: &'static str,
}

impl IndexDefinition {
    #[must_use]
    pub const fn for_group(group: IndexGroup) -> Self {
        Self {
            name: group.index_name(),
            partition_attr: group.partition_attr(),
            sort_attr: CREATED_AT_ATTR,
        }
    }
}

/// The fixed index topology of the metadata store.
///
/// Pure and parameterless: the same three definitions on every call,
/// one per [`IndexGroup`] member.
#[must_use]
pub const fn index_topology() -> [IndexDefinition; 3] {
    [
        IndexDefinition::for_group(IndexGroup::Category),
        IndexDefinition::for_group(IndexGroup::Featured),
        IndexDefinition::for_group(IndexGroup::Portfolio),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn topology_has_exactly_one_index_per_group() {
        let topology = index_topology();
        assert_eq!(topology.len(), 3);

        let partitions: BTreeSet<&str> = topology.iter().map(|i| i.partition_attr).collect();
        let expected: BTreeSet<&str> = IndexGroup::ALL
            .iter()
            .map(|g| g.partition_attr())
            .collect();
        assert_eq!(
            partitions, expected,
            "topology partition attributes must cover exactly the declared groups"
        );
    }

    #[test]
    fn every_index_sorts_on_creation_timestamp() {
        for index in index_topology() {
            assert_eq!(
                index.sort_attr, CREATED_AT_ATTR,
                "index {} must order by creation time",
                index.name
            );
        }
    }

    #[test]
    fn index_names_are_stable() {
        let names: Vec<&str> = index_topology().iter().map(|i| i.name).collect();
        assert_eq!(names, ["CategoryIndex", "FeaturedIndex", "PortfolioIndex"]);
    }

    #[test]
    fn topology_is_pure() {
        assert_eq!(index_topology(), index_topology());
    }
}
