//! "Did you mean" suggestions based on Levenshtein edit distance

/// Closest candidate, offered only when the distance is under half the
/// length of the longer of the two names
pub fn suggest<'a, I>(name: &str, candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(&'a str, usize)> = None;
    for candidate in candidates {
        let distance = strsim::levenshtein(name, candidate);
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((candidate, distance));
        }
    }

    let (candidate, distance) = best?;
    let longest = name.chars().count().max(candidate.chars().count());
    if (distance as f64) < longest as f64 / 2.0 {
        Some(candidate)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggest_close_match() {
        let presets = ["title", "author", "url"];
        assert_eq!(suggest("titel", presets), Some("title"));
        assert_eq!(suggest("autor", presets), Some("author"));
    }

    #[test]
    fn test_suggest_rejects_dissimilar_names() {
        let presets = ["title", "author", "url"];
        assert_eq!(suggest("xyzzy", presets), None);
        // distance 2, longest 4: 2 < 2 is false
        assert_eq!(suggest("urlx", ["ur"]), None);
    }

    #[test]
    fn test_suggest_prefers_first_on_ties() {
        assert_eq!(suggest("dat", ["date", "data"]), Some("date"));
        assert_eq!(suggest("anything", std::iter::empty()), None);
    }
}
