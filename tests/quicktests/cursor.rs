use ordered_bst::{OrderedTree, TreeError};

use std::collections::BTreeSet;

use crate::init_test_setup;

#[quickcheck]
fn yields_every_element_ascending(xs: Vec<i16>) -> bool {
    let mut tree: OrderedTree<_> = xs.iter().copied().collect();
    let len = tree.len();
    let mut cursor = tree.cursor();

    let mut yielded = Vec::new();
    while cursor.has_next() {
        yielded.push(*cursor.next().unwrap());
    }

    yielded.len() == len
        && yielded.windows(2).all(|pair| pair[0] < pair[1])
        && cursor.next() == Err(TreeError::Exhausted)
}

#[quickcheck]
fn removal_matches_retain(xs: Vec<i16>, removals: Vec<bool>) -> bool {
    init_test_setup();
    let mut tree: OrderedTree<_> = xs.iter().copied().collect();
    let mut set: BTreeSet<_> = xs.iter().copied().collect();
    let mut decisions = removals.into_iter().cycle();

    let mut cursor = tree.cursor();
    let mut yielded = Vec::new();
    while let Ok(x) = cursor.next() {
        let x = *x;
        yielded.push(x);
        if decisions.next().unwrap_or(false) {
            if cursor.remove() != Ok(x) || cursor.remove() != Err(TreeError::InvalidState) {
                return false;
            }
            set.remove(&x);
        }
    }

    let ascending = yielded.windows(2).all(|pair| pair[0] < pair[1]);
    ascending && tree.check_invariant() && tree.iter().eq(set.iter())
}

#[quickcheck]
fn removal_never_grows_height(xs: Vec<i16>, skip: usize) -> bool {
    let mut tree: OrderedTree<_> = xs.into_iter().collect();
    let height_before = tree.height();
    let mut cursor = tree.cursor();

    for _ in 0..=skip % 8 {
        if cursor.next().is_err() {
            return true;
        }
    }
    cursor.remove().unwrap();

    tree.height() <= height_before
}

#[test]
fn cursor_coupled_deletion_example() {
    init_test_setup();
    let mut tree: OrderedTree<_> = [5, 2, 8, 1, 3, 7, 9].into_iter().collect();

    let mut cursor = tree.cursor();
    assert_eq!(cursor.next(), Ok(&1));
    assert_eq!(cursor.next(), Ok(&2));
    assert_eq!(cursor.next(), Ok(&3));
    assert_eq!(cursor.remove(), Ok(3));
    assert_eq!(cursor.remove(), Err(TreeError::InvalidState));

    let mut rest = Vec::new();
    while let Ok(x) = cursor.next() {
        rest.push(*x);
    }
    assert_eq!(rest, [5, 7, 8, 9]);

    assert!(!tree.contains(&3));
    assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [1, 2, 5, 7, 8, 9]);
}

#[test]
fn empty_tree_edge_cases() {
    let mut tree = OrderedTree::<i32>::new();

    assert_eq!(tree.first(), Err(TreeError::NoSuchElement));
    assert_eq!(tree.last(), Err(TreeError::NoSuchElement));
    assert!(!tree.cursor().has_next());
}
