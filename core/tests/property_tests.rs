use std::collections::BTreeMap;

use proptest::prelude::*;
use ranktable_core::rank::{Limit, Order, RankTable, TableConfig};

#[derive(Clone, Debug)]
enum Op {
    Insert(i32, u8),
    Delete(u8),
    Clear,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        8 => (-50..50i32, 0..32u8).prop_map(|(s, k)| Op::Insert(s, k)),
        3 => (0..32u8).prop_map(Op::Delete),
        1 => Just(Op::Clear),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_matches_model(ops in prop::collection::vec(op(), 0..200)) {
        let table: RankTable<i32, u8> = RankTable::start("model", TableConfig::default()).unwrap();
        let mut model: BTreeMap<u8, i32> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(score, key) => {
                    table.insert(score, key).unwrap();
                    model.insert(key, score);
                }
                Op::Delete(key) => {
                    let existed = table.delete(key).unwrap();
                    prop_assert_eq!(existed, model.remove(&key).is_some());
                }
                Op::Clear => {
                    table.delete_all().unwrap();
                    model.clear();
                }
            }
            prop_assert_eq!(table.size(), model.len());
        }

        table.check_consistency().unwrap();

        let mut expected: Vec<(i32, u8)> = model.iter().map(|(k, s)| (*s, *k)).collect();
        expected.sort();
        prop_assert_eq!(table.select(Order::Ascend, Limit::Unbounded), expected.clone());

        expected.reverse();
        prop_assert_eq!(table.select(Order::Descend, Limit::Unbounded), expected);

        for (key, score) in &model {
            prop_assert_eq!(table.lookup(key), Some(*score));
        }
    }

    #[test]
    fn test_limit_is_prefix(
        records in prop::collection::vec((0..1000u32, 0..100u16), 0..60),
        n in 0..80usize,
        descend in any::<bool>(),
    ) {
        let table: RankTable<u32, u16> = RankTable::start("prefix", TableConfig::default()).unwrap();
        for (score, key) in records {
            table.insert(score, key).unwrap();
        }
        let order = if descend { Order::Descend } else { Order::Ascend };

        let full = table.select(order, Limit::Unbounded);
        let partial = table.select(order, Limit::Count(n));
        prop_assert_eq!(partial.len(), n.min(table.size()));
        prop_assert_eq!(&partial[..], &full[..partial.len()]);
    }

    #[test]
    fn test_match_equals_filtered_select(
        records in prop::collection::vec((0..100u32, 0..50u16), 0..60),
        threshold in 0..100u32,
        n in 1..20usize,
    ) {
        let table: RankTable<u32, u16> = RankTable::start("filtered", TableConfig::default()).unwrap();
        for (score, key) in records {
            table.insert(score, key).unwrap();
        }

        let expected: Vec<u16> = table
            .select(Order::Descend, Limit::Unbounded)
            .into_iter()
            .filter(|(s, _)| *s > threshold)
            .map(|(_, k)| k)
            .take(n)
            .collect();
        let matched = table.match_records(
            |s, k| (*s > threshold).then_some(*k),
            Order::Descend,
            Limit::Count(n),
        );
        prop_assert_eq!(matched, expected);
    }
}
