use std::sync::OnceLock;

/// Cumulative cluster sizes of one ordered partition of the sorted colors.
///
/// `c0` colors go to the first cluster, `c1 - c0` to the second and
/// `c2 - c1` to the third; the last cluster takes the rest. Three-cluster
/// records leave `c2` at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Partition {
    pub c0: u8,
    pub c1: u8,
    pub c2: u8,
}

pub(crate) const FOUR_CLUSTER_COUNT: usize = 968;
pub(crate) const THREE_CLUSTER_COUNT: usize = 152;

/// Number of sentinel replicas appended after the last record so a batched
/// evaluator can read past the end without bounds checks.
const PADDING: usize = 8;

pub(crate) struct PartitionTables {
    pub four: [Partition; FOUR_CLUSTER_COUNT + PADDING],
    pub three: [Partition; THREE_CLUSTER_COUNT + PADDING],
    /// `four_total[t - 1]` is the number of leading records of `four` that
    /// apply to a block of `t` sorted colors; same for `three_total`.
    pub four_total: [usize; 16],
    pub three_total: [usize; 16],
}

static TABLES: OnceLock<PartitionTables> = OnceLock::new();

pub(crate) fn partition_tables() -> &'static PartitionTables {
    TABLES.get_or_init(build_tables)
}

/// Enumerates every distinct ordered split once, in lexicographic order by
/// total. A record first generated for a smaller total is not repeated for a
/// larger one; the running `*_total` counters make the prefix for each total
/// directly addressable.
fn build_tables() -> PartitionTables {
    let zero = Partition { c0: 0, c1: 0, c2: 0 };
    let mut tables = PartitionTables {
        four: [zero; FOUR_CLUSTER_COUNT + PADDING],
        three: [zero; THREE_CLUSTER_COUNT + PADDING],
        four_total: [0; 16],
        three_total: [0; 16],
    };

    let mut i = 0;
    for t in 1..=16_u32 {
        for c0 in 0..=t {
            for c1 in 0..=t - c0 {
                for c2 in 0..=t - c0 - c1 {
                    if c0 == 0 && c1 == 0 && c2 == 0 {
                        continue;
                    }

                    let record = Partition {
                        c0: c0 as u8,
                        c1: (c0 + c1) as u8,
                        c2: (c0 + c1 + c2) as u8,
                    };

                    let seen = t > 1
                        && tables.four[..tables.four_total[t as usize - 2]].contains(&record);
                    if !seen {
                        tables.four[i] = record;
                        i += 1;
                    }
                }
            }
        }
        tables.four_total[t as usize - 1] = i;
    }
    debug_assert_eq!(i, FOUR_CLUSTER_COUNT);
    for p in 0..PADDING {
        tables.four[FOUR_CLUSTER_COUNT + p] = tables.four[FOUR_CLUSTER_COUNT - 1];
    }

    let mut i = 0;
    for t in 1..=16_u32 {
        for c0 in 0..=t {
            for c1 in 0..=t - c0 {
                if c0 == 0 && c1 == 0 {
                    continue;
                }

                let record = Partition {
                    c0: c0 as u8,
                    c1: (c0 + c1) as u8,
                    c2: 0,
                };

                let seen = t > 1
                    && tables.three[..tables.three_total[t as usize - 2]].contains(&record);
                if !seen {
                    tables.three[i] = record;
                    i += 1;
                }
            }
        }
        tables.three_total[t as usize - 1] = i;
    }
    debug_assert_eq!(i, THREE_CLUSTER_COUNT);
    for p in 0..PADDING {
        tables.three[THREE_CLUSTER_COUNT + p] = tables.three[THREE_CLUSTER_COUNT - 1];
    }

    tables
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn totals_match_known_counts() {
        let tables = partition_tables();
        assert_eq!(tables.four_total[15], FOUR_CLUSTER_COUNT);
        assert_eq!(tables.three_total[15], THREE_CLUSTER_COUNT);
    }

    #[test]
    fn four_cluster_prefix_is_exactly_the_feasible_splits() {
        let tables = partition_tables();

        for t in 1..=16_u8 {
            let prefix = &tables.four[..tables.four_total[t as usize - 1]];

            // No duplicates anywhere in the prefix.
            let unique: HashSet<_> = prefix.iter().map(|p| (p.c0, p.c1, p.c2)).collect();
            assert_eq!(unique.len(), prefix.len());

            // Every cumulative triple fits into t colors and is not the
            // skipped all-in-last-cluster record.
            for p in prefix {
                assert!(p.c0 <= p.c1 && p.c1 <= p.c2 && p.c2 <= t);
                assert!(p.c2 != 0);
            }

            // Conversely, every feasible triple appears.
            let mut expected = 0;
            for c0 in 0..=t {
                for c01 in c0..=t {
                    for c012 in c01..=t {
                        if c012 == 0 {
                            continue;
                        }
                        expected += 1;
                        assert!(
                            unique.contains(&(c0, c01, c012)),
                            "missing ({c0},{c01},{c012}) for total {t}"
                        );
                    }
                }
            }
            assert_eq!(expected, prefix.len());
        }
    }

    #[test]
    fn three_cluster_prefix_is_exactly_the_feasible_splits() {
        let tables = partition_tables();

        for t in 1..=16_u8 {
            let prefix = &tables.three[..tables.three_total[t as usize - 1]];

            let unique: HashSet<_> = prefix.iter().map(|p| (p.c0, p.c1)).collect();
            assert_eq!(unique.len(), prefix.len());

            let mut expected = 0;
            for c0 in 0..=t {
                for c01 in c0..=t {
                    if c01 == 0 {
                        continue;
                    }
                    expected += 1;
                    assert!(unique.contains(&(c0, c01)));
                }
            }
            assert_eq!(expected, prefix.len());
        }
    }

    #[test]
    fn padding_replicates_last_record() {
        let tables = partition_tables();
        for p in 0..8 {
            assert_eq!(
                tables.four[FOUR_CLUSTER_COUNT + p],
                tables.four[FOUR_CLUSTER_COUNT - 1]
            );
            assert_eq!(
                tables.three[THREE_CLUSTER_COUNT + p],
                tables.three[THREE_CLUSTER_COUNT - 1]
            );
        }
    }
}
