//! Identifier codec: derive flag and environment variable names from field paths.
//!
//! Both namespaces come from the same word split, so a field's `--flag-name`
//! and its `FLAG_NAME` variable always agree:
//!
//! | Path | Flag | Env |
//! |------|------|-----|
//! | `Docker.Foo` | `docker-foo` | `DOCKER_FOO` |
//! | `sub.sub_sub.rint` | `sub-sub-sub-rint` | `SUB_SUB_SUB_RINT` |
//! | `TestURLs` | `test-urls` | `TEST_URLS` |
//!
//! Each path segment is first cut on non-alphanumeric characters (so Rust
//! `snake_case` names work), then every chunk goes through [`split_words`].
//! Empty segments and chunks are elided.

/// Split a mixed-case identifier into lowercase words.
///
/// - Shorter than two characters: one word.
/// - Exactly two: `"aS"` splits into `["a", "s"]`, anything else is one word.
/// - Otherwise a lower→upper transition starts a new word. Inside an acronym
///   run the boundary moves to before the run's last capital, so
///   `"URLStuff"` becomes `["url", "stuff"]`.
/// - Tail handling for plurals: a trailing `<upper><upper><lower>` keeps the
///   lowercase letter on the acronym (`"TestURLs"` → `["test", "urls"]`), and
///   a trailing `<lower><upper>` peels the capital into its own word
///   (`"TestT"` → `["test", "t"]`).
///
/// Digits count as lowercase. The function is total: any input produces at
/// least one word, and only the empty input produces an empty word.
pub fn split_words(ident: &str) -> Vec<String> {
    let s = ident.as_bytes();
    let len = s.len();

    if len < 2 {
        return vec![ident.to_ascii_lowercase()];
    }
    if len == 2 {
        if is_lower(s[0]) && is_upper(s[1]) {
            return vec![lower(&s[..1]), lower(&s[1..])];
        }
        return vec![ident.to_ascii_lowercase()];
    }

    let (body, tail) = peel_tail(s);
    let mut words = scan(body);

    match tail {
        Tail::None => {}
        Tail::Word(c) => words.push(lower(&[c])),
        Tail::Suffix(c) => match words.last_mut() {
            Some(last) => last.push(c.to_ascii_lowercase() as char),
            None => words.push(lower(&[c])),
        },
    }

    if words.is_empty() {
        words.push(String::new());
    }
    words
}

/// `--flag` form of a field: path segments then the leaf, hyphen-joined.
pub fn flag_name<S: AsRef<str>>(path: &[S], leaf: &str) -> String {
    path_words(path, leaf).join("-")
}

/// Environment form of a field (without the process prefix): underscore-joined
/// and uppercased.
pub fn env_name<S: AsRef<str>>(path: &[S], leaf: &str) -> String {
    path_words(path, leaf).join("_").to_ascii_uppercase()
}

/// Environment prefix for a command name: uppercased, hyphens become
/// underscores (`"my-tool"` → `"MY_TOOL"`).
pub fn env_prefix(command: &str) -> String {
    command.to_ascii_uppercase().replace('-', "_")
}

fn path_words<S: AsRef<str>>(path: &[S], leaf: &str) -> Vec<String> {
    path.iter()
        .map(AsRef::as_ref)
        .chain(std::iter::once(leaf))
        .flat_map(segment_words)
        .collect()
}

fn segment_words(segment: &str) -> Vec<String> {
    segment
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|chunk| !chunk.is_empty())
        .flat_map(split_words)
        .filter(|word| !word.is_empty())
        .collect()
}

enum Tail {
    None,
    /// Peeled capital that becomes its own word.
    Word(u8),
    /// Peeled lowercase letter glued onto the preceding acronym.
    Suffix(u8),
}

fn peel_tail(s: &[u8]) -> (&[u8], Tail) {
    let len = s.len();
    let (a, b, c) = (s[len - 3], s[len - 2], s[len - 1]);

    if is_lower(c) && is_upper(b) && is_upper(a) {
        (&s[..len - 1], Tail::Suffix(c))
    } else if is_lower(b) && is_upper(c) {
        (&s[..len - 1], Tail::Word(c))
    } else {
        (s, Tail::None)
    }
}

fn scan(s: &[u8]) -> Vec<String> {
    let len = s.len();
    let mut words = Vec::new();
    let mut in_word = false;
    let mut word_start = 0;

    for i in 0..len.saturating_sub(1) {
        let (l, m) = (s[i], s[i + 1]);

        if !in_word && is_lower(l) && is_upper(m) {
            word_start = i.saturating_sub(1);
        } else if !in_word {
            in_word = true;
            word_start = i;
            continue;
        }

        if same_case(l, m) {
            continue;
        }

        // URLStuff: the boundary sits before the last capital of the run.
        let mut end = i + 1;
        if i >= 1 && is_lower(m) && is_upper(l) && is_upper(s[i - 1]) {
            end -= 1;
        }

        push_word(&mut words, s, word_start, end);
        word_start = end;
        in_word = end == i;
    }

    push_word(&mut words, s, word_start, len);
    words
}

fn push_word(words: &mut Vec<String>, s: &[u8], start: usize, end: usize) {
    if let Some(word) = s.get(start..end)
        && !word.is_empty()
    {
        words.push(lower(word));
    }
}

fn lower(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).to_ascii_lowercase()
}

fn is_upper(c: u8) -> bool {
    c.is_ascii_uppercase()
}

fn is_lower(c: u8) -> bool {
    !is_upper(c)
}

fn same_case(a: u8, b: u8) -> bool {
    is_upper(a) == is_upper(b)
}
