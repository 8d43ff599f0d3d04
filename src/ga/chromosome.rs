//! Permutation encoding, order-crossover recombination, swap mutation, and
//! tournament selection over a population of task-index permutations.

use rand::seq::SliceRandom;
use rand::Rng;

/// A candidate schedule: a permutation of `0..n_tasks`.
pub type Permutation = Vec<usize>;

pub fn random_permutation(n: usize, rng: &mut impl Rng) -> Permutation {
    let mut p: Permutation = (0..n).collect();
    p.shuffle(rng);
    p
}

/// Order crossover (OX): copies a random slice from `a` verbatim, then fills
/// the remaining positions with `b`'s genes in `b`'s order, skipping
/// whatever the slice already placed. Produces a valid permutation.
pub fn order_crossover(a: &[usize], b: &[usize], rng: &mut impl Rng) -> Permutation {
    let n = a.len();
    if n < 2 {
        return a.to_vec();
    }

    let mut i = rng.random_range(0..n);
    let mut j = rng.random_range(0..n);
    if i > j {
        std::mem::swap(&mut i, &mut j);
    }

    let mut child: Vec<Option<usize>> = vec![None; n];
    let mut taken = vec![false; n];
    for pos in i..=j {
        child[pos] = Some(a[pos]);
        taken[a[pos]] = true;
    }

    let mut fill_pos = (j + 1) % n;
    let mut source_pos = (j + 1) % n;
    for _ in 0..n {
        let gene = b[source_pos];
        if !taken[gene] {
            child[fill_pos] = Some(gene);
            taken[gene] = true;
            fill_pos = (fill_pos + 1) % n;
        }
        source_pos = (source_pos + 1) % n;
    }

    child.into_iter().map(|g| g.expect("order crossover fills every position")).collect()
}

/// Swaps two random positions.
pub fn swap_mutation(individual: &mut Permutation, rng: &mut impl Rng) {
    if individual.len() < 2 {
        return;
    }
    let i = rng.random_range(0..individual.len());
    let j = rng.random_range(0..individual.len());
    individual.swap(i, j);
}

/// Picks the fitter of `k` randomly-drawn candidates (lower fitness wins).
pub fn tournament_select<'p>(
    population: &'p [(Permutation, i64)],
    k: usize,
    rng: &mut impl Rng,
) -> &'p Permutation {
    let mut best_idx = rng.random_range(0..population.len());
    for _ in 1..k.max(1) {
        let candidate_idx = rng.random_range(0..population.len());
        if population[candidate_idx].1 < population[best_idx].1 {
            best_idx = candidate_idx;
        }
    }
    &population[best_idx].0
}
