use crate::error::LoadError;
use std::fs;
use std::path::Path;

/// Index of a word within a `WordList`.
pub type WordIndex = usize;

/// The vocabulary every slot draws its candidates from.
///
/// Words are kept sorted and without duplicates, so two distinct `WordIndex`es always name two
/// distinct words.
#[derive(Debug, Clone, Default)]
pub struct WordList {
    /// WordIndex -> word
    words: Vec<String>,
    /// WordIndex -> the word's characters, for indexing by position
    chars: Vec<Vec<char>>,
}

impl WordList {
    /// Use exactly these words. Surrounding whitespace is trimmed and blank entries are skipped.
    pub fn new(words: impl IntoIterator<Item = impl AsRef<str>>) -> WordList {
        let mut words = words
            .into_iter()
            .map(|word| word.as_ref().trim().to_owned())
            .filter(|word| !word.is_empty())
            .collect::<Vec<_>>();
        words.sort();
        words.dedup();
        let chars = words
            .iter()
            .map(|word| word.chars().collect::<Vec<_>>())
            .collect::<Vec<_>>();
        WordList { words, chars }
    }

    /// One word per line, upper-cased.
    pub fn parse(text: &str) -> WordList {
        WordList::new(text.lines().map(|line| line.to_uppercase()))
    }

    /// Read a word list file. See `parse` for the format.
    pub fn load(path: impl AsRef<Path>) -> Result<WordList, LoadError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_owned(),
            source,
        })?;
        Ok(WordList::parse(&text))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn word(&self, word: WordIndex) -> &str {
        &self.words[word]
    }

    /// The number of characters (not bytes) in the word.
    pub fn word_len(&self, word: WordIndex) -> usize {
        self.chars[word].len()
    }

    /// Character `pos` of the word. Panics if the word is too short.
    pub fn char_at(&self, word: WordIndex, pos: usize) -> char {
        self.chars[word][pos]
    }

    pub fn index_of(&self, word: &str) -> Option<WordIndex> {
        self.words
            .binary_search_by(|probe| probe.as_str().cmp(word))
            .ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.words.iter().map(|word| word.as_str())
    }
}

#[test]
fn test_word_list_new() {
    let words = WordList::new(["dog", " cat ", "", "dog", "ab"]);
    assert_eq!(words.iter().collect::<Vec<_>>(), vec!["ab", "cat", "dog"]);
    assert_eq!(words.len(), 3);
    assert_eq!(words.index_of("cat"), Some(1));
    assert_eq!(words.index_of("cow"), None);
    assert_eq!(words.word_len(0), 2);
    assert_eq!(words.char_at(2, 1), 'o');
}

#[test]
fn test_word_list_counts_chars() {
    let words = WordList::new(["café"]);
    assert_eq!(words.word_len(0), 4);
    assert_eq!(words.char_at(0, 3), 'é');
}

#[test]
fn test_word_list_parse() {
    let words = WordList::parse("one\nTwo\r\nthree\n\n  four\none\n");
    assert_eq!(
        words.iter().collect::<Vec<_>>(),
        vec!["FOUR", "ONE", "THREE", "TWO"]
    );
}

#[test]
fn test_word_list_load() {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "cat\ndog\nbird").unwrap();
    let words = WordList::load(file.path()).unwrap();
    assert_eq!(words.iter().collect::<Vec<_>>(), vec!["BIRD", "CAT", "DOG"]);

    let missing = WordList::load("/definitely/not/a/word/list.txt");
    assert!(matches!(missing, Err(LoadError::Io { .. })));
}
