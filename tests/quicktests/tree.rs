use ordered_bst::{OrderedTree, TreeError};

use std::collections::BTreeSet;

use crate::{init_test_setup, Op};

/// Applies a set of operations to a tree and a `BTreeSet`.
/// This way we can ensure that after a random smattering of inserts
/// and deletes we have the same set of values in both.
fn do_ops(ops: &[Op<i8>], tree: &mut OrderedTree<i8>, set: &mut BTreeSet<i8>) -> bool {
    for op in ops {
        let agreed = match op {
            Op::Insert(x) => tree.insert(*x) == set.insert(*x),
            Op::Delete(x) => {
                let height_before = tree.height();
                tree.delete(x) == set.remove(x) && tree.height() <= height_before
            }
            Op::CursorRemove(divisor) => {
                let divisor = i8::try_from(*divisor).unwrap();
                let mut cursor = tree.cursor();
                while let Ok(x) = cursor.next() {
                    if x % divisor == 0 {
                        cursor.remove().unwrap();
                    }
                }
                set.retain(|x| x % divisor != 0);
                true
            }
        };

        if !agreed || !tree.check_invariant() || tree.len() != set.len() {
            return false;
        }
    }

    true
}

#[quickcheck]
fn fuzz_multiple_operations_i8(ops: Vec<Op<i8>>) -> bool {
    init_test_setup();
    let mut tree = OrderedTree::new();
    let mut set = BTreeSet::new();

    do_ops(&ops, &mut tree, &mut set) && tree.iter().eq(set.iter())
}

#[quickcheck]
fn contains(xs: Vec<i8>) -> bool {
    let tree: OrderedTree<_> = xs.iter().copied().collect();

    xs.iter().all(|x| tree.contains(x))
}

#[quickcheck]
fn contains_not(xs: Vec<i8>, nots: Vec<i8>) -> bool {
    let tree: OrderedTree<_> = xs.iter().copied().collect();
    let added: BTreeSet<_> = xs.into_iter().collect();
    let nots: BTreeSet<_> = nots.into_iter().collect();
    let mut nots = nots.difference(&added);

    nots.all(|x| !tree.contains(x))
}

#[quickcheck]
fn insert_twice_is_rejected(xs: Vec<i8>, x: i8) -> bool {
    let mut tree: OrderedTree<_> = xs.into_iter().collect();
    tree.insert(x);
    let len = tree.len();

    !tree.insert(x) && tree.len() == len
}

#[quickcheck]
fn with_deletions(xs: Vec<i8>, deletes: Vec<i8>) -> bool {
    init_test_setup();
    let mut tree: OrderedTree<_> = xs.iter().copied().collect();
    for delete in &deletes {
        let height_before = tree.height();
        tree.delete(delete);
        if tree.height() > height_before {
            return false;
        }
    }

    let still_present: BTreeSet<_> = xs
        .iter()
        .filter(|x| !deletes.contains(x))
        .copied()
        .collect();

    deletes.iter().all(|x| !tree.contains(x))
        && still_present.iter().all(|x| tree.contains(x))
        && tree.len() == still_present.len()
        && tree.check_invariant()
}

#[quickcheck]
fn first_and_last(xs: Vec<i8>) -> bool {
    let tree: OrderedTree<_> = xs.iter().copied().collect();

    match (xs.iter().min(), xs.iter().max()) {
        (Some(min), Some(max)) => tree.first() == Ok(min) && tree.last() == Ok(max),
        _ => {
            tree.first() == Err(TreeError::NoSuchElement)
                && tree.last() == Err(TreeError::NoSuchElement)
        }
    }
}

#[quickcheck]
fn clone_is_equal_and_independent(xs: Vec<i8>, x: i8) -> bool {
    let tree: OrderedTree<_> = xs.into_iter().collect();
    let mut copy = tree.clone();
    let same = copy == tree && copy.height() == tree.height();

    copy.delete(&x);
    copy.insert(x);
    same && tree.check_invariant() && copy.check_invariant() && copy.contains(&x)
}
