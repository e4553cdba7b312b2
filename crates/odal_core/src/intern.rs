//! String interning for the compiler.
//!
//! The intern table is the single owner of all text the AST refers to:
//! identifiers, import paths, package names, literal spellings. Equal
//! byte sequences are deduplicated to one stored copy and always intern
//! to the same handle for the lifetime of the table.

use std::fmt;
use std::hash::Hasher;
use std::ops::Range;

use hashbrown::hash_table::HashTable;
use rustc_hash::FxHasher;

/// A handle to an interned string: a byte offset and length into the
/// table's backing buffer.
///
/// `StringRef` is a plain value and never dangles — it carries no pointer
/// into the buffer, and resolution always goes through the table that
/// issued it. Comparing two handles from the same table is an O(1)
/// integer comparison that agrees with content equality.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct StringRef {
    offset: u32,
    length: u32,
}

impl StringRef {
    /// The length of the referenced text in bytes.
    #[inline]
    pub fn len(self) -> u32 {
        self.length
    }

    /// Whether the referenced text is empty.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.length == 0
    }

    #[inline]
    fn to_range(self) -> Range<usize> {
        self.offset as usize..(self.offset + self.length) as usize
    }
}

impl fmt::Debug for StringRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StringRef({}+{})", self.offset, self.length)
    }
}

/// Content-deduplicating string table.
///
/// All interned text lives in one contiguous backing buffer that doubles
/// its capacity whenever an insertion would overflow it. Growth preserves
/// the relative offsets of previously interned content, so every issued
/// [`StringRef`] stays valid for the lifetime of the table. The dedup
/// index stores handles, not views — lookups re-read content through the
/// current buffer.
pub struct StringInternTable {
    buffer: String,
    index: HashTable<StringRef>,
}

impl StringInternTable {
    /// Create an empty intern table.
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            index: HashTable::new(),
        }
    }

    /// Create an intern table with pre-allocated buffer capacity in bytes.
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            buffer: String::with_capacity(bytes),
            index: HashTable::new(),
        }
    }

    /// Intern a string, returning a handle to the stored copy.
    ///
    /// If equal content is already present the existing handle is returned
    /// and nothing is copied. Returns `None` only when the table's 32-bit
    /// offset/length space cannot represent the new content.
    pub fn insert(&mut self, text: &str) -> Option<StringRef> {
        let hash = hash_bytes(text.as_bytes());
        let Self { buffer, index } = self;
        if let Some(&existing) = index.find(hash, |probe| &buffer[probe.to_range()] == text) {
            return Some(existing);
        }
        let offset = u32::try_from(buffer.len()).ok()?;
        let length = u32::try_from(text.len()).ok()?;
        offset.checked_add(length)?;
        buffer.push_str(text);
        let handle = StringRef { offset, length };
        index.insert_unique(hash, handle, |probe| {
            hash_bytes(buffer[probe.to_range()].as_bytes())
        });
        Some(handle)
    }

    /// Resolve a handle back to its text. O(1), never allocates.
    #[inline]
    pub fn resolve(&self, handle: StringRef) -> &str {
        &self.buffer[handle.to_range()]
    }

    /// The number of distinct strings interned.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether no strings have been interned.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Total bytes of interned text in the backing buffer.
    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }
}

impl Default for StringInternTable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StringInternTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringInternTable")
            .field("len", &self.len())
            .field("buffer_len", &self.buffer_len())
            .finish()
    }
}

fn hash_bytes(bytes: &[u8]) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write(bytes);
    hasher.finish()
}
