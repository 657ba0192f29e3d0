use memchr::memmem::Finder;
use std::io::{ErrorKind, Read};
use tracing::trace;

use crate::errors::{ScoutError, ScoutResult};

/// Bytes requested from the reader per call (same as `io::copy`)
pub const DEFAULT_CHUNK_SIZE: usize = 32 * 1024;

/// Outcome of scanning one stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchTally {
    pub occurrences: u64,
    pub bytes_scanned: u64,
}

/// Counts a word and its title-case variant in byte streams of any length.
///
/// Only two spellings are recognized: the word exactly as given and the same
/// word with its first character upper-cased (`go` and `Go`, never `GO`).
///
/// Memory use is bounded by `chunk_size` plus the carry region. The last
/// `longest_needle - 1` bytes of every window are shifted to the front of the
/// next one, so an occurrence split across two reads is still seen, and each
/// window only counts occurrences that end in freshly read bytes, so nothing
/// is counted twice. Occurrences never overlap: after a match the search for
/// that spelling resumes at its end (`aaaa` appears twice in `aaaaaaaa`),
/// and that resume point travels with the carry so chunking cannot change
/// the count.
#[derive(Debug, Clone)]
pub struct WordMatcher {
    word: String,
    needles: Vec<Finder<'static>>,
    carry: usize,
    chunk_size: usize,
}

impl WordMatcher {
    /// Creates a matcher for `word` with the default chunk size
    pub fn new(word: &str) -> ScoutResult<Self> {
        if word.is_empty() {
            return Err(ScoutError::config_error("word must not be empty"));
        }

        let title = title_case(word);
        let mut needles = vec![Finder::new(word.as_bytes()).into_owned()];
        if title != word {
            needles.push(Finder::new(title.as_bytes()).into_owned());
        }

        let longest = needles
            .iter()
            .map(|n| n.needle().len())
            .max()
            .unwrap_or(word.len());

        Ok(Self {
            word: word.to_string(),
            needles,
            carry: longest - 1,
            chunk_size: DEFAULT_CHUNK_SIZE,
        })
    }

    /// Sets the read size; zero is treated as one
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// The byte sequences being counted
    pub fn variants(&self) -> impl Iterator<Item = &[u8]> {
        self.needles.iter().map(|n| n.needle())
    }

    /// Counts occurrences in `reader` until end of stream
    pub fn count<R: Read>(&self, reader: R) -> ScoutResult<u64> {
        self.scan(reader).map(|tally| tally.occurrences)
    }

    /// Like [`count`](Self::count), also reporting how many bytes were read.
    ///
    /// Any read error other than `Interrupted` aborts the scan; the partial
    /// count is dropped.
    pub fn scan<R: Read>(&self, mut reader: R) -> ScoutResult<MatchTally> {
        let mut window = vec![0u8; self.carry + self.chunk_size];
        let mut carried = 0;
        let mut resume = vec![0; self.needles.len()];
        let mut tally = MatchTally::default();

        loop {
            let read = match reader.read(&mut window[carried..carried + self.chunk_size]) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(ScoutError::stream_read(e)),
            };

            let filled = carried + read;
            tally.occurrences += self.count_window(&window[..filled], carried, &mut resume);
            tally.bytes_scanned += read as u64;

            let keep = self.carry.min(filled);
            let shift = filled - keep;
            window.copy_within(shift..filled, 0);
            for end in resume.iter_mut() {
                *end = end.saturating_sub(shift);
            }
            carried = keep;
        }

        trace!(
            "Scanned {} bytes, {} occurrences of '{}'",
            tally.bytes_scanned,
            tally.occurrences,
            self.word
        );
        Ok(tally)
    }

    /// Counts occurrences in an in-memory buffer
    pub fn count_slice(&self, haystack: &[u8]) -> u64 {
        let mut resume = vec![0; self.needles.len()];
        self.count_window(haystack, 0, &mut resume)
    }

    /// Counts matches in `window` that end past the first `carried` bytes.
    ///
    /// `resume[i]` is where the last match of needle `i` ended, relative to
    /// the window; no match of that needle may start before it.
    fn count_window(&self, window: &[u8], carried: usize, resume: &mut [usize]) -> u64 {
        let mut total = 0;
        for (finder, end) in self.needles.iter().zip(resume.iter_mut()) {
            let len = finder.needle().len();
            // Earliest start whose match would end inside the fresh bytes
            let mut pos = (carried + 1).saturating_sub(len).max(*end);
            while pos < window.len() {
                match finder.find(&window[pos..]) {
                    Some(offset) => {
                        total += 1;
                        pos += offset + len;
                        *end = pos;
                    }
                    None => break,
                }
            }
        }
        total
    }
}

/// Upper-cases the first character and leaves the rest untouched
fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
