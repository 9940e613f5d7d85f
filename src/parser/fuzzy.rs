//! Fuzzy heading classifier.
//!
//! Template authors drift: headings pick up typos, plural forms and stray
//! punctuation. Headings are therefore compared with a character-alignment
//! similarity ratio (the Ratcliff/Obershelp "gestalt" measure, computed the
//! same way as Python's `difflib.SequenceMatcher.ratio`) on trimmed,
//! lower-cased text, with spaces and tabs treated as junk while aligning.

use std::collections::{HashMap, HashSet};

/// Similarity a candidate must strictly exceed to match a label.
pub const MATCH_THRESHOLD: f64 = 0.8;

/// Sequences at least this long get their most popular elements ignored.
const AUTOJUNK_MIN_LEN: usize = 200;

/// Similarity ratio of two strings in `[0, 1]`.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.trim().to_lowercase().chars().collect();
    let b: Vec<char> = b.trim().to_lowercase().chars().collect();
    SequenceMatcher::new(&a, &b).ratio()
}

/// True when `candidate` matches `label` above [`MATCH_THRESHOLD`].
pub fn strings_equal(candidate: &str, label: &str) -> bool {
    similarity(candidate, label) > MATCH_THRESHOLD
}

/// Classify `candidate` against an ordered set of role labels.
///
/// Returns the index of the best matching label, or `None` when even the
/// best ratio does not exceed [`MATCH_THRESHOLD`]. The first label reaching
/// the maximum wins.
pub fn classify<S: AsRef<str>>(candidate: &str, labels: &[S]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, label) in labels.iter().enumerate() {
        let ratio = similarity(candidate, label.as_ref());
        if best.map_or(true, |(_, r)| ratio > r) {
            best = Some((i, ratio));
        }
    }
    let (index, ratio) = best?;
    log::debug!(
        "classified {:?} as {:?} (ratio {:.3})",
        candidate,
        labels[index].as_ref(),
        ratio
    );
    (ratio > MATCH_THRESHOLD).then_some(index)
}

fn is_junk(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Longest-matching-block sequence matcher over characters.
struct SequenceMatcher<'a> {
    a: &'a [char],
    b: &'a [char],
    /// Positions of every non-junk, non-popular element of `b`
    b2j: HashMap<char, Vec<usize>>,
}

impl<'a> SequenceMatcher<'a> {
    fn new(a: &'a [char], b: &'a [char]) -> Self {
        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, &c) in b.iter().enumerate() {
            b2j.entry(c).or_default().push(j);
        }

        b2j.retain(|c, _| !is_junk(*c));

        let n = b.len();
        if n >= AUTOJUNK_MIN_LEN {
            let ntest = n / 100 + 1;
            let popular: HashSet<char> = b2j
                .iter()
                .filter(|(_, idxs)| idxs.len() > ntest)
                .map(|(c, _)| *c)
                .collect();
            b2j.retain(|c, _| !popular.contains(c));
        }

        Self { a, b, b2j }
    }

    /// Longest matching block in `a[alo..ahi]` and `b[blo..bhi]` as `(i, j, size)`.
    fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> (usize, usize, usize) {
        let (a, b) = (self.a, self.b);
        let (mut besti, mut bestj, mut bestsize) = (alo, blo, 0);

        let mut j2len: HashMap<usize, usize> = HashMap::new();
        for i in alo..ahi {
            let mut new_j2len = HashMap::new();
            if let Some(positions) = self.b2j.get(&a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let prev = j
                        .checked_sub(1)
                        .and_then(|pj| j2len.get(&pj))
                        .copied()
                        .unwrap_or(0);
                    let k = prev + 1;
                    new_j2len.insert(j, k);
                    if k > bestsize {
                        besti = i + 1 - k;
                        bestj = j + 1 - k;
                        bestsize = k;
                    }
                }
            }
            j2len = new_j2len;
        }

        // Extend with equal non-junk elements, then soak up equal junk on both sides.
        while besti > alo && bestj > blo && !is_junk(b[bestj - 1]) && a[besti - 1] == b[bestj - 1] {
            besti -= 1;
            bestj -= 1;
            bestsize += 1;
        }
        while besti + bestsize < ahi
            && bestj + bestsize < bhi
            && !is_junk(b[bestj + bestsize])
            && a[besti + bestsize] == b[bestj + bestsize]
        {
            bestsize += 1;
        }
        while besti > alo && bestj > blo && is_junk(b[bestj - 1]) && a[besti - 1] == b[bestj - 1] {
            besti -= 1;
            bestj -= 1;
            bestsize += 1;
        }
        while besti + bestsize < ahi
            && bestj + bestsize < bhi
            && is_junk(b[bestj + bestsize])
            && a[besti + bestsize] == b[bestj + bestsize]
        {
            bestsize += 1;
        }

        (besti, bestj, bestsize)
    }

    /// Total size of all matching blocks.
    fn matched_len(&self) -> usize {
        let mut total = 0;
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];
        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let (i, j, k) = self.find_longest_match(alo, ahi, blo, bhi);
            if k == 0 {
                continue;
            }
            total += k;
            if alo < i && blo < j {
                queue.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                queue.push((i + k, ahi, j + k, bhi));
            }
        }
        total
    }

    fn ratio(&self) -> f64 {
        let len = self.a.len() + self.b.len();
        if len == 0 {
            return 1.0;
        }
        2.0 * self.matched_len() as f64 / len as f64
    }
}
