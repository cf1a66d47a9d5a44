//! Close-match lookup for mistyped snapshot names.

use super::Store;
use crate::error::Result;

impl Store {
    /// Resolve `name` to a stored snapshot name.
    ///
    /// An exact match always wins. Otherwise the stored name with the highest
    /// normalized Levenshtein similarity at or above `cutoff` is returned, ties
    /// going to the lexicographically first name. `None` when nothing qualifies.
    pub fn resolve(&self, name: &str, cutoff: f64) -> Result<Option<String>> {
        let names = self.list()?;
        Ok(closest_match(name, &names, cutoff))
    }
}

pub fn closest_match(name: &str, candidates: &[String], cutoff: f64) -> Option<String> {
    if candidates.iter().any(|c| c == name) {
        return Some(name.to_string());
    }

    let mut best: Option<(&String, f64)> = None;
    for candidate in candidates {
        let score = strsim::normalized_levenshtein(name, candidate);
        if score < cutoff {
            continue;
        }
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((candidate, score)),
        }
    }

    best.map(|(candidate, _)| candidate.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn exact_name_wins() {
        let candidates = names(&["demo", "demo2"]);
        assert_eq!(closest_match("demo", &candidates, 0.3).as_deref(), Some("demo"));
    }

    #[test]
    fn typo_resolves_to_closest() {
        let candidates = names(&["backend", "frontend", "staging"]);
        assert_eq!(closest_match("bakend", &candidates, 0.3).as_deref(), Some("backend"));
        assert_eq!(closest_match("stagin", &candidates, 0.3).as_deref(), Some("staging"));
    }

    #[test]
    fn nothing_above_cutoff() {
        let candidates = names(&["demo"]);
        assert_eq!(closest_match("missing", &candidates, 0.3), None);
    }

    #[test]
    fn empty_candidates_never_match() {
        assert_eq!(closest_match("demo", &[], 0.0), None);
    }

    #[test]
    fn ties_prefer_sorted_order() {
        // both are one edit away from "abc"
        let candidates = names(&["abd", "abe"]);
        assert_eq!(closest_match("abc", &candidates, 0.3).as_deref(), Some("abd"));
    }

    #[test]
    fn store_resolve_reads_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        std::fs::write(dir.path().join("release.json"), "{}").unwrap();

        assert_eq!(store.resolve("relase", 0.3).unwrap().as_deref(), Some("release"));
        assert_eq!(store.resolve("zzzzzzzz", 0.3).unwrap(), None);
    }
}
