use std::collections::HashSet;
use tsp_algorithms::permutation::{factorial, Permutations};

fn collect_all(items: Vec<usize>) -> Vec<Vec<usize>> {
    let mut permutations = Permutations::new(items);
    let mut all = Vec::new();
    while let Some(p) = permutations.next_permutation() {
        all.push(p.to_vec());
    }
    all
}

#[test]
fn test_heap_order() {
    assert_eq!(
        collect_all(vec![1, 2, 3]),
        vec![
            vec![1, 2, 3],
            vec![2, 1, 3],
            vec![3, 1, 2],
            vec![1, 3, 2],
            vec![2, 3, 1],
            vec![3, 2, 1],
        ]
    );
}

#[test]
fn test_yields_every_ordering_once() {
    for k in 1..=7usize {
        let items: Vec<usize> = (0..k).collect();
        let all = collect_all(items.clone());
        assert_eq!(all.len() as u64, factorial(k).unwrap());

        let distinct: HashSet<Vec<usize>> = all.iter().cloned().collect();
        assert_eq!(distinct.len(), all.len());

        for p in &all {
            let mut sorted = p.clone();
            sorted.sort();
            assert_eq!(sorted, items);
        }
    }
}

#[test]
fn test_consecutive_orderings_differ_by_one_swap() {
    let all = collect_all((0..5).collect());
    for pair in all.windows(2) {
        let differing = pair[0]
            .iter()
            .zip(pair[1].iter())
            .filter(|(a, b)| a != b)
            .count();
        assert_eq!(differing, 2);
    }
}

#[test]
fn test_state_after_exhaustion() {
    let mut permutations = Permutations::new(vec!['a', 'b']);
    assert!(permutations.current().is_none());
    assert_eq!(permutations.next_permutation(), Some(&['a', 'b'][..]));
    assert_eq!(permutations.current(), Some(&['a', 'b'][..]));
    assert_eq!(permutations.next_permutation(), Some(&['b', 'a'][..]));
    assert_eq!(permutations.produced(), 2);
    assert!(!permutations.is_exhausted());
    assert_eq!(permutations.next_permutation(), None);
    assert!(permutations.is_exhausted());
    assert_eq!(permutations.next_permutation(), None);
    assert_eq!(permutations.produced(), 2);
}

#[test]
fn test_single_and_empty_inputs() {
    assert_eq!(collect_all(vec![4]), vec![vec![4]]);
    assert_eq!(collect_all(Vec::new()), vec![Vec::<usize>::new()]);
}

#[test]
fn test_rebuilding_restarts_sequence() {
    let first = collect_all(vec![0, 1, 2, 3]);
    let second = collect_all(vec![0, 1, 2, 3]);
    assert_eq!(first, second);
}

#[test]
fn test_factorial() {
    assert_eq!(factorial(0), Some(1));
    assert_eq!(factorial(3), Some(6));
    assert_eq!(factorial(10), Some(3_628_800));
    assert_eq!(factorial(20), Some(2_432_902_008_176_640_000));
    assert_eq!(factorial(21), None);
}
