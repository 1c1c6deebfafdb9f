//! Trace generators - run a sort over a working copy and record every swap
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::grid::{Note, Sequence};

/// One recorded moment of a sort run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// The sequence after this step's swap.
    pub snapshot: Sequence,
    pub index_a: Option<usize>,
    pub index_b: Option<usize>,
}

impl Step {
    fn swap(snapshot: &Sequence, a: usize, b: usize) -> Self {
        Self {
            snapshot: snapshot.clone(),
            index_a: Some(a),
            index_b: Some(b),
        }
    }

    /// The notes now sitting at the swapped columns.
    pub fn swapped_notes(&self) -> (Option<Note>, Option<Note>) {
        let at = |idx: Option<usize>| idx.and_then(|i| self.snapshot.get(i).copied());
        (at(self.index_a), at(self.index_b))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Bubble,
    Insertion,
    Selection,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [Algorithm::Bubble, Algorithm::Insertion, Algorithm::Selection];

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Bubble => "bubble",
            Algorithm::Insertion => "insertion",
            Algorithm::Selection => "selection",
        }
    }

    pub fn trace(self, initial: &Sequence) -> Trace {
        let steps = match self {
            Algorithm::Bubble => bubble_sort(initial),
            Algorithm::Insertion => insertion_sort(initial),
            Algorithm::Selection => selection_sort(initial),
        };
        log::debug!("{} sort over {} produced {} steps", self, initial, steps.len());
        Trace {
            algorithm: self,
            initial: initial.clone(),
            steps,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Algorithm::ALL
            .iter()
            .copied()
            .find(|alg| alg.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownAlgorithm(s.to_string()))
    }
}

/// The full list of steps from one run of one algorithm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trace {
    algorithm: Algorithm,
    initial: Sequence,
    steps: Vec<Step>,
}

impl Trace {
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// The sequence before any step was taken.
    pub fn initial(&self) -> &Sequence {
        &self.initial
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn get(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The sorted end state; the initial sequence when nothing moved.
    pub fn final_sequence(&self) -> &Sequence {
        self.steps
            .last()
            .map(|step| &step.snapshot)
            .unwrap_or(&self.initial)
    }
}

// Only swaps are recorded. Comparisons that leave the pair in place
// produce no step.
fn bubble_sort(initial: &Sequence) -> Vec<Step> {
    let mut notes = initial.clone();
    let len = notes.len();
    let mut steps = Vec::new();
    if len < 2 {
        return steps;
    }

    for i in 0..len {
        let mut swapped = false;
        for j in 0..(len - 1 - i) {
            if notes[j] > notes[j + 1] {
                notes.swap(j, j + 1);
                steps.push(Step::swap(&notes, j, j + 1));
                swapped = true;
            }
        }
        if !swapped {
            break;
        }
    }
    steps
}

fn insertion_sort(initial: &Sequence) -> Vec<Step> {
    let mut notes = initial.clone();
    let len = notes.len();
    let mut steps = Vec::new();
    if len < 2 {
        return steps;
    }

    for i in 1..len {
        let mut j = i;
        while j > 0 && notes[j - 1] > notes[j] {
            notes.swap(j - 1, j);
            steps.push(Step::swap(&notes, j - 1, j));
            j -= 1;
        }
    }
    steps
}

// One step per outer position, self-swaps included, so a run always
// takes exactly `len` steps.
fn selection_sort(initial: &Sequence) -> Vec<Step> {
    let mut notes = initial.clone();
    let len = notes.len();
    let mut steps = Vec::with_capacity(len);
    if len < 2 {
        return steps;
    }

    for i in 0..len {
        let mut min_idx = i;
        for j in (i + 1)..len {
            if notes[j] < notes[min_idx] {
                min_idx = j;
            }
        }
        notes.swap(i, min_idx);
        steps.push(Step::swap(&notes, i, min_idx));
    }
    steps
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(s: &str) -> Sequence {
        s.parse().unwrap()
    }

    // All orderings of a five-note set with a repeated note, plus some fixed rows.
    fn samples() -> Vec<Sequence> {
        let mut out = vec![
            Sequence::default(),
            seq("gfedcba"),
            seq("abcdefg"),
            seq("cdefgab"),
            seq("bagfedc"),
            seq("ccccccc"),
            seq("gg"),
            seq("ba"),
            seq("ab"),
        ];
        let base = [Note::B, Note::C, Note::A, Note::C, Note::E];
        let mut idx = [0usize, 1, 2, 3, 4];
        permute(&mut idx, 0, &mut |p: &[usize; 5]| {
            out.push(Sequence::new(p.iter().map(|&i| base[i]).collect()));
        });
        out
    }

    fn permute(items: &mut [usize; 5], k: usize, f: &mut impl FnMut(&[usize; 5])) {
        if k == items.len() {
            f(items);
            return;
        }
        for i in k..items.len() {
            items.swap(k, i);
            permute(items, k + 1, f);
            items.swap(k, i);
        }
    }

    #[test]
    fn test_all_traces_end_sorted() {
        for initial in samples() {
            for alg in Algorithm::ALL {
                let trace = alg.trace(&initial);
                assert!(
                    trace.final_sequence().is_sorted(),
                    "{} left {} unsorted",
                    alg,
                    initial
                );
                if let Some(last) = trace.steps().last() {
                    assert!(last.snapshot.is_sorted());
                }
                for step in trace.steps() {
                    assert_eq!(step.snapshot.len(), initial.len());
                }
            }
        }
    }

    #[test]
    fn test_trace_length_bounds() {
        for initial in samples() {
            let n = initial.len();
            assert!(Algorithm::Bubble.trace(&initial).len() <= n * (n - 1) / 2);
            assert!(Algorithm::Insertion.trace(&initial).len() <= n * (n - 1) / 2);
            assert_eq!(Algorithm::Selection.trace(&initial).len(), n);
        }
    }

    #[test]
    fn test_traces_are_deterministic() {
        let initial = Sequence::default();
        for alg in Algorithm::ALL {
            assert_eq!(alg.trace(&initial), alg.trace(&initial));
        }
    }

    #[test]
    fn test_input_is_not_mutated() {
        let initial = seq("gfedcba");
        let trace = Algorithm::Insertion.trace(&initial);
        assert_eq!(initial, seq("gfedcba"));
        assert_eq!(trace.initial(), &initial);
    }

    #[test]
    fn test_bubble_reversed_scenario() {
        let trace = Algorithm::Bubble.trace(&seq("gfedcba"));
        let first = &trace.steps()[0];
        assert_eq!(first.index_a, Some(0));
        assert_eq!(first.index_b, Some(1));
        assert_eq!(first.snapshot, seq("fgedcba"));
        assert_eq!(first.swapped_notes(), (Some(Note::F), Some(Note::G)));
        // alphabet order runs c..b, so a and b end up on the right
        assert_eq!(trace.final_sequence(), &seq("cdefgab"));
    }

    #[test]
    fn test_bubble_records_only_swaps() {
        // b and a are the only pair out of order
        let trace = Algorithm::Bubble.trace(&seq("cdeba"));
        assert_eq!(trace.len(), 1);
        assert_eq!(trace.steps()[0].index_a, Some(3));
        assert_eq!(trace.steps()[0].index_b, Some(4));
        assert!(Algorithm::Bubble.trace(&seq("cdefgab")).is_empty());
    }

    #[test]
    fn test_insertion_shifts_left() {
        let trace = Algorithm::Insertion.trace(&seq("degc"));
        let pairs: Vec<_> = trace
            .steps()
            .iter()
            .map(|s| (s.index_a.unwrap(), s.index_b.unwrap()))
            .collect();
        assert_eq!(pairs, vec![(2, 3), (1, 2), (0, 1)]);
        assert_eq!(trace.final_sequence(), &seq("cdeg"));
    }

    #[test]
    fn test_selection_records_self_swaps() {
        let trace = Algorithm::Selection.trace(&seq("cdefgab"));
        assert_eq!(trace.len(), 7);
        for (i, step) in trace.steps().iter().enumerate() {
            assert_eq!(step.index_a, Some(i));
            assert_eq!(step.index_b, Some(i));
        }

        let trace = Algorithm::Selection.trace(&seq("edc"));
        assert_eq!(trace.steps()[0].index_a, Some(0));
        assert_eq!(trace.steps()[0].index_b, Some(2));
        assert_eq!(trace.steps()[0].snapshot, seq("cde"));
        assert_eq!(trace.steps()[1].index_b, Some(1));
    }

    #[test]
    fn test_degenerate_inputs_yield_empty_traces() {
        for alg in Algorithm::ALL {
            assert!(alg.trace(&seq("c")).is_empty());
            assert!(alg.trace(&Sequence::new(vec![])).is_empty());
            assert!(alg.trace(&seq("c")).final_sequence().is_sorted());
        }
    }

    #[test]
    fn test_algorithm_names() {
        assert_eq!("bubble".parse::<Algorithm>(), Ok(Algorithm::Bubble));
        assert_eq!("Selection".parse::<Algorithm>(), Ok(Algorithm::Selection));
        assert_eq!(
            "quick".parse::<Algorithm>(),
            Err(Error::UnknownAlgorithm("quick".to_string()))
        );
        assert_eq!(Algorithm::Insertion.to_string(), "insertion");
    }
}
