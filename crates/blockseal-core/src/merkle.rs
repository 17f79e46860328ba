use crate::hash::sha256_2_string;
use crate::transaction::Transaction;

/// Merkle root over an ordered transaction list.
///
/// Leaves are `H(tx.to_string())`. Each level hashes adjacent pairs as
/// `H(left || right)`; an odd node at the end of a level moves up unchanged.
/// The empty list has root `H("")`.
pub fn merkle_root(txs: &[Transaction]) -> String {
    let leaves = txs.iter().map(|tx| sha256_2_string(&tx.to_string())).collect();
    merkle_root_of_leaves(leaves)
}

pub fn merkle_root_of_leaves(mut level: Vec<String>) -> String {
    if level.is_empty() {
        return sha256_2_string("");
    }

    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len().div_ceil(2));
        for pair in level.chunks(2) {
            match pair {
                [left, right] => next.push(sha256_2_string(&format!("{left}{right}"))),
                [odd] => next.push(odd.clone()),
                _ => unreachable!("chunks(2) yields one or two items"),
            }
        }
        level = next;
    }
    level.swap_remove(0)
}
