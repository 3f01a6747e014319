//! Lenient parsing of user-typed vocabulary.
//!
//! Statuses, item types and priorities arrive from people and scripts in
//! many spellings. Each word is resolved against a [`Vocabulary`]: exact
//! canonical name first, then a synonym table, and otherwise an error that
//! carries the nearest known word. Values read back from the database never
//! pass through here.

/// Largest edit distance still offered as a "did you mean" hint.
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// A closed set of canonical words plus the aliases accepted for them.
pub struct Vocabulary {
    canonical: &'static [&'static str],
    synonyms: &'static [(&'static str, &'static str)],
}

/// Rejected input paired with the closest known word, if any.
pub type Rejected = (String, Option<String>);

impl Vocabulary {
    /// Resolve `input` case-insensitively to its canonical word.
    pub fn resolve(&self, input: &str) -> Result<&'static str, Rejected> {
        let word = input.trim().to_lowercase();

        if let Some(found) = self.canonical.iter().find(|c| **c == word) {
            return Ok(*found);
        }
        if let Some((_, target)) = self.synonyms.iter().find(|(alias, _)| *alias == word) {
            return Ok(*target);
        }
        Err((input.to_string(), self.nearest(&word).map(str::to_string)))
    }

    /// Closest canonical word by edit distance; aliases point at their target.
    fn nearest(&self, word: &str) -> Option<&'static str> {
        self.canonical
            .iter()
            .map(|&c| (c, c))
            .chain(self.synonyms.iter().copied())
            .map(|(spelling, target)| (levenshtein_distance(word, spelling), target))
            .filter(|(distance, _)| *distance <= MAX_SUGGESTION_DISTANCE)
            .min_by_key(|(distance, _)| *distance)
            .map(|(_, target)| target)
    }
}

pub static STATUSES: Vocabulary = Vocabulary {
    canonical: &["open", "in_progress", "blocked", "reviewing", "done", "canceled"],
    synonyms: &[
        ("todo", "open"),
        ("new", "open"),
        ("wip", "in_progress"),
        ("started", "in_progress"),
        ("active", "in_progress"),
        ("working", "in_progress"),
        ("in-progress", "in_progress"),
        ("stuck", "blocked"),
        ("waiting", "blocked"),
        ("review", "reviewing"),
        ("in_review", "reviewing"),
        ("closed", "done"),
        ("complete", "done"),
        ("completed", "done"),
        ("finished", "done"),
        ("resolved", "done"),
        ("cancel", "canceled"),
        ("cancelled", "canceled"),
        ("dropped", "canceled"),
        ("wontfix", "canceled"),
    ],
};

pub static ITEM_TYPES: Vocabulary = Vocabulary {
    canonical: &["task", "epic"],
    synonyms: &[
        ("item", "task"),
        ("todo", "task"),
        ("ticket", "task"),
        ("subtask", "task"),
        ("parent", "epic"),
        ("milestone", "epic"),
        ("initiative", "epic"),
    ],
};

/// Priority words; the canonical entries are the numeric levels themselves.
pub static PRIORITIES: Vocabulary = Vocabulary {
    canonical: &["1", "2", "3"],
    synonyms: &[
        ("p1", "1"),
        ("p2", "2"),
        ("p3", "3"),
        ("high", "1"),
        ("urgent", "1"),
        ("critical", "1"),
        ("important", "1"),
        ("medium", "2"),
        ("normal", "2"),
        ("default", "2"),
        ("low", "3"),
        ("minor", "3"),
        ("trivial", "3"),
    ],
};

pub fn normalize_status(input: &str) -> Result<String, Rejected> {
    STATUSES.resolve(input).map(str::to_string)
}

pub fn normalize_type(input: &str) -> Result<String, Rejected> {
    ITEM_TYPES.resolve(input).map(str::to_string)
}

/// Parse a priority given as `1`-`3`, `P1`-`P3` or a word like `high`.
///
/// Priority hints are guidance text rather than a nearest word, since a
/// digit one off from a valid level is not a useful suggestion.
pub fn normalize_priority(input: &str) -> Result<i32, Rejected> {
    let hint = if input.trim().parse::<i64>().is_ok() {
        "Priority must be 1-3 (1=high, 3=low)"
    } else {
        "Use 1-3, P1-P3, or: high, medium, low"
    };
    PRIORITIES
        .resolve(input)
        .ok()
        .and_then(|level| level.parse().ok())
        .ok_or_else(|| (input.to_string(), Some(hint.to_string())))
}

/// Edit distance between two strings, counted in chars.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let target: Vec<char> = b.chars().collect();
    // row[j] holds the distance between the consumed prefix of `a` and target[..j]
    let mut row: Vec<usize> = (0..=target.len()).collect();

    for (i, ca) in a.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in target.iter().enumerate() {
            let above = row[j + 1];
            let substitute = diagonal + usize::from(ca != *cb);
            row[j + 1] = substitute.min(above + 1).min(row[j] + 1);
            diagonal = above;
        }
    }

    row[target.len()]
}

/// Known ids close to a mistyped one, nearest first, ties alphabetical.
pub fn find_similar_ids(searched: &str, existing: &[String], max: usize) -> Vec<String> {
    let mut scored: Vec<(usize, &String)> = existing
        .iter()
        .filter_map(|id| {
            let distance = levenshtein_distance(searched, id);
            (distance <= MAX_SUGGESTION_DISTANCE).then_some((distance, id))
        })
        .collect();
    scored.sort();
    scored.truncate(max);
    scored.into_iter().map(|(_, id)| id.clone()).collect()
}
