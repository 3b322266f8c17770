//! Variant discovery and ranking.
//!
//! A variant is the activity sequence of a case. Variants are recorded in
//! the order they are first seen while scanning cases, and ranking is a
//! stable sort on frequency, so ties always resolve to discovery order.

use pm_common::Case;
use std::collections::HashMap;

/// One distinct activity sequence and the cases that produce it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant<'a> {
    pub sequence: Vec<&'a str>,
    /// Indices into the case slice the index was built from.
    pub cases: Vec<usize>,
}

impl<'a> Variant<'a> {
    pub fn frequency(&self) -> usize {
        self.cases.len()
    }
}

/// Variants of a log in discovery order.
#[derive(Debug, Clone, Default)]
pub struct VariantIndex<'a> {
    variants: Vec<Variant<'a>>,
    by_sequence: HashMap<Vec<&'a str>, usize>,
}

impl<'a> VariantIndex<'a> {
    pub fn build(cases: &[Case<'a>]) -> Self {
        let mut index = VariantIndex::default();
        for (position, case) in cases.iter().enumerate() {
            let sequence = case.variant();
            match index.by_sequence.get(&sequence) {
                Some(&slot) => index.variants[slot].cases.push(position),
                None => {
                    index
                        .by_sequence
                        .insert(sequence.clone(), index.variants.len());
                    index.variants.push(Variant {
                        sequence,
                        cases: vec![position],
                    });
                }
            }
        }
        index
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Variants in discovery order.
    pub fn variants(&self) -> &[Variant<'a>] {
        &self.variants
    }

    /// Variants by descending frequency; ties keep discovery order.
    pub fn ranked(&self) -> Vec<&Variant<'a>> {
        let mut ranked: Vec<&Variant<'a>> = self.variants.iter().collect();
        ranked.sort_by(|a, b| b.frequency().cmp(&a.frequency()));
        ranked
    }

    /// The `n` most frequent variants.
    pub fn top(&self, n: usize) -> Vec<&Variant<'a>> {
        let mut ranked = self.ranked();
        ranked.truncate(n);
        ranked
    }
}
