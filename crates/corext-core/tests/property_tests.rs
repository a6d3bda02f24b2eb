use std::collections::HashMap;

use corext_core::dependency::{DependencyResolver, TopologicalResolver};
use corext_core::{Error, ExtensionInfo, LifecycleManager};
use corext_test_utils::{CallJournal, Phase, RecordingExtension, VecDiscoverer};
use proptest::prelude::*;

/// A random DAG over `n` nodes, discovered in a shuffled order.
///
/// Node `i` may only depend on nodes `j < i`, which keeps the graph acyclic;
/// the shuffle hides that from the resolver.
fn dag() -> impl Strategy<Value = Vec<ExtensionInfo>> {
    (0..10usize).prop_flat_map(|n| {
        (
            proptest::collection::vec(proptest::collection::vec(any::<bool>(), n), n),
            Just((0..n).collect::<Vec<_>>()).prop_shuffle(),
        )
            .prop_map(move |(edges, discovery)| {
                discovery
                    .into_iter()
                    .map(|i| {
                        let deps = (0..i)
                            .filter(|&j| edges[i][j])
                            .map(|j| format!("ext{j}"));
                        ExtensionInfo::new(format!("ext{i}"), deps)
                    })
                    .collect()
            })
    })
}

proptest! {
    #[test]
    fn test_order_respects_every_dependency(infos in dag()) {
        let order = TopologicalResolver.resolve(&infos).unwrap();
        prop_assert_eq!(order.len(), infos.len());

        let position: HashMap<&str, usize> = order
            .names()
            .into_iter()
            .enumerate()
            .map(|(i, name)| (name, i))
            .collect();
        for info in &infos {
            for dep in &info.dependencies {
                prop_assert!(position[dep.as_str()] < position[info.name.as_str()]);
            }
        }
    }

    #[test]
    fn test_order_is_deterministic(infos in dag()) {
        let first = TopologicalResolver.resolve(&infos).unwrap();
        let second = TopologicalResolver.resolve(&infos).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn test_positions_point_back_into_discovery(infos in dag()) {
        let order = TopologicalResolver.resolve(&infos).unwrap();
        for (info, &pos) in order.iter().zip(order.positions()) {
            prop_assert_eq!(info, &infos[pos]);
        }
    }

    #[test]
    fn test_independent_extensions_keep_discovery_order(n in 0..12usize) {
        let infos: Vec<ExtensionInfo> = (0..n)
            .rev()
            .map(|i| ExtensionInfo::new(format!("ext{i}"), Vec::<String>::new()))
            .collect();
        let order = TopologicalResolver.resolve(&infos).unwrap();
        prop_assert_eq!(order.positions().to_vec(), (0..n).collect::<Vec<_>>());
    }

    #[test]
    fn test_any_ring_is_rejected(ring in 1..6usize, extra in 0..4usize) {
        // ring members depend on their successor; the last closes the loop.
        let mut infos: Vec<ExtensionInfo> = (0..ring)
            .map(|i| ExtensionInfo::new(format!("ring{i}"), [format!("ring{}", (i + 1) % ring)]))
            .collect();
        infos.extend((0..extra).map(|i| ExtensionInfo::new(format!("free{i}"), Vec::<String>::new())));

        let err = TopologicalResolver.resolve(&infos).unwrap_err();
        match err {
            Error::CyclicDependency { participants } => {
                prop_assert_eq!(participants.len(), ring + 1);
                prop_assert!(participants.iter().all(|p| p.starts_with("ring")));
            }
            other => prop_assert!(false, "expected CyclicDependency, got {other:?}"),
        }
    }

    #[test]
    fn test_stop_reverses_start(infos in dag()) {
        let journal = CallJournal::new();
        let extensions = infos
            .iter()
            .map(|info| {
                info.dependencies
                    .iter()
                    .fold(RecordingExtension::new(&info.name, &journal), |ext, dep| {
                        ext.depends_on(dep)
                    })
                    .boxed()
            })
            .collect();

        let mut manager = LifecycleManager::new(VecDiscoverer::new(extensions));
        manager.initialise().unwrap();
        manager.start().unwrap();
        prop_assert!(manager.stop().is_clean());

        let started = journal.names_for(Phase::Start);
        let mut stopped = journal.names_for(Phase::Stop);
        stopped.reverse();
        prop_assert_eq!(started.len(), infos.len());
        prop_assert_eq!(started, stopped);
    }
}
