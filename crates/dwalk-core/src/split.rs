/// One fragment of a split string, with its position among its siblings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    pub text: String,
    pub index: usize,
    pub is_first: bool,
    pub is_last: bool,
    pub previous: Option<String>,
    pub next: Option<String>,
}

/// How strings are cut into pieces and glued back together.
///
/// With `include` set, every piece but the first carries the separator as a
/// prefix and pieces are rejoined by plain concatenation. Otherwise the
/// separator is dropped and reinserted between pieces on join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Separator<'a> {
    pub text: &'a str,
    pub include: bool,
}

impl<'a> Separator<'a> {
    pub fn new(text: &'a str, include: bool) -> Self {
        Self { text, include }
    }

    pub fn split(&self, s: &str) -> Vec<String> {
        // An empty separator splits into characters rather than yielding
        // the leading and trailing empty pieces `str::split("")` produces.
        if self.text.is_empty() {
            return s.chars().map(String::from).collect();
        }
        s.split(self.text)
            .enumerate()
            .map(|(i, it)| {
                if self.include && i > 0 {
                    format!("{}{}", self.text, it)
                } else {
                    it.to_string()
                }
            })
            .collect()
    }

    pub fn join<S: AsRef<str>>(&self, pieces: &[S]) -> String {
        let glue = if self.include { "" } else { self.text };
        let mut out = String::new();
        for (i, p) in pieces.iter().enumerate() {
            if i > 0 {
                out.push_str(glue);
            }
            out.push_str(p.as_ref());
        }
        out
    }
}

/// Position metadata for `pieces[index]`, read from the current piece list.
pub fn annotate(pieces: &[String], index: usize) -> Piece {
    Piece {
        text: pieces[index].clone(),
        index,
        is_first: index == 0,
        is_last: index + 1 == pieces.len(),
        previous: index.checked_sub(1).map(|i| pieces[i].clone()),
        next: pieces.get(index + 1).cloned(),
    }
}

/// Splits `text` on `separator` and annotates every piece.
pub fn split_annotated(text: &str, separator: &str, include_separator: bool) -> Vec<Piece> {
    let pieces = Separator::new(separator, include_separator).split(text);
    (0..pieces.len()).map(|i| annotate(&pieces, i)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("United States of America", " ")]
    #[case(" leading and trailing ", " ")]
    #[case("a  b", " ")]
    #[case("", " ")]
    #[case("no-separator-here", "|")]
    #[case("a::b::::c", "::")]
    #[case("héllo wörld", "")]
    fn unmodified_pieces_rejoin_to_original(#[case] text: &str, #[case] sep: &str) {
        for include in [false, true] {
            let s = Separator::new(sep, include);
            assert_eq!(s.join(&s.split(text)), text, "include={}", include);
        }
    }

    #[test]
    fn include_separator_prefixes_all_but_first() {
        let s = Separator::new(" ", true);
        assert_eq!(s.split("a cow jumped"), vec!["a", " cow", " jumped"]);
    }

    #[test]
    fn annotated_pieces_know_their_neighbors() {
        let pieces = split_annotated("United States of America", " ", false);
        assert_eq!(pieces.len(), 4);
        assert!(pieces[0].is_first && !pieces[0].is_last);
        assert_eq!(pieces[0].previous, None);
        assert_eq!(pieces[0].next.as_deref(), Some("States"));
        assert_eq!(pieces[2].text, "of");
        assert_eq!(pieces[2].previous.as_deref(), Some("States"));
        assert!(pieces[3].is_last);
        assert_eq!(pieces[3].next, None);
    }

    #[test]
    fn empty_separator_splits_characters() {
        assert_eq!(Separator::new("", false).split("ab"), vec!["a", "b"]);
        assert!(Separator::new("", false).split("").is_empty());
    }
}
