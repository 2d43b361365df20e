//! File metadata as reported by a listing parser, and the ordered
//! collection ([`FileSet`]) that listings and globs pass around.

use std::cmp::Ordering;

/// What kind of filesystem object a [`FileInfo`] describes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum FileType {
    Directory,
    Symlink,
    Normal,
}

/// A file's modification time, tagged with whether it is precise (seconds,
/// or at least minutes) or imprecise (year-only, as `ls` prints for old
/// files without a locale-specific override).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FileDate {
    /// Unix timestamp.
    pub unix_time: i64,
    /// Whether this date is precise (safe to overwrite an imprecise one)
    /// or imprecise (never overwrites a precise one already set).
    pub precise: bool,
}

/// One file or directory entry as reported by a listing dialect parser.
///
/// Fields are `Option` rather than defaulted, mirroring the original's
/// `defined` bitmask: a field that was never reported by the parser that
/// produced this entry stays `None` rather than taking on a meaningless
/// zero value.
#[derive(Clone, Debug)]
pub struct FileInfo {
    name: String,
    file_type: Option<FileType>,
    mode: Option<u32>,
    date: Option<FileDate>,
    size: Option<u64>,
    symlink_target: Option<String>,
}

impl FileInfo {
    /// Creates an entry with only a name; every other field absent.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file_type: None,
            mode: None,
            date: None,
            size: None,
            symlink_target: None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    #[must_use]
    pub fn file_type(&self) -> Option<FileType> {
        self.file_type
    }

    pub fn set_type(&mut self, file_type: FileType) {
        self.file_type = Some(file_type);
    }

    #[must_use]
    pub fn mode(&self) -> Option<u32> {
        self.mode
    }

    pub fn set_mode(&mut self, mode: u32) {
        self.mode = Some(mode);
    }

    #[must_use]
    pub fn date(&self) -> Option<FileDate> {
        self.date
    }

    /// Sets a precise date, clearing any prior imprecise marking.
    pub fn set_date(&mut self, unix_time: i64) {
        self.date = Some(FileDate { unix_time, precise: true });
    }

    /// Sets an imprecise date (e.g. year-only `ls` output), but only if no
    /// date — precise or not — is already set. A later precise
    /// [`FileInfo::set_date`] always wins; an imprecise date never
    /// overwrites one already present.
    pub fn set_date_imprecise(&mut self, unix_time: i64) {
        if self.date.is_some() {
            return;
        }
        self.date = Some(FileDate { unix_time, precise: false });
    }

    #[must_use]
    pub fn size(&self) -> Option<u64> {
        self.size
    }

    pub fn set_size(&mut self, size: u64) {
        self.size = Some(size);
    }

    #[must_use]
    pub fn symlink_target(&self) -> Option<&str> {
        self.symlink_target.as_deref()
    }

    pub fn set_symlink(&mut self, target: impl Into<String>) {
        self.symlink_target = Some(target.into());
        self.file_type = Some(FileType::Symlink);
    }

    /// Merges `other`'s defined fields into `self`, preferring `other`
    /// except where the precision rule on dates says otherwise: a precise
    /// date always wins over an imprecise one regardless of which side it
    /// came from, and an imprecise date never displaces a precise one.
    pub fn merge(&mut self, other: &FileInfo) {
        if let Some(t) = other.file_type {
            self.file_type = Some(t);
        }
        if let Some(m) = other.mode {
            self.mode = Some(m);
        }
        if let Some(s) = other.size {
            self.size = Some(s);
        }
        if let Some(sym) = &other.symlink_target {
            self.symlink_target = Some(sym.clone());
        }
        match (self.date, other.date) {
            (_, Some(d)) if d.precise => self.date = Some(d),
            (None, Some(d)) => self.date = Some(d),
            (Some(existing), Some(d)) if !existing.precise && !d.precise => self.date = Some(d),
            _ => {}
        }
    }
}

impl glob::Entry for FileInfo {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_directory(&self) -> bool {
        matches!(self.file_type, Some(FileType::Directory))
    }

    fn renamed(&self, name: String) -> Self {
        let mut copy = self.clone();
        copy.name = name;
        copy
    }

    fn synthetic(name: String) -> Self {
        Self::new(name)
    }
}

/// An ordered collection of [`FileInfo`], kept sorted by name for
/// binary-searchable lookups.
#[derive(Clone, Debug, Default)]
pub struct FileSet {
    files: Vec<FileInfo>,
}

impl FileSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    #[must_use]
    pub fn iter(&self) -> std::slice::Iter<'_, FileInfo> {
        self.files.iter()
    }

    /// Adds `info`, merging into an existing entry of the same name rather
    /// than duplicating it.
    pub fn add(&mut self, info: FileInfo) {
        match self.files.binary_search_by(|f| f.name.cmp(&info.name)) {
            Ok(idx) => self.files[idx].merge(&info),
            Err(idx) => self.files.insert(idx, info),
        }
    }

    /// Merges every entry of `other` into `self`.
    pub fn merge(&mut self, other: &FileSet) {
        for info in &other.files {
            self.add(info.clone());
        }
    }

    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&FileInfo> {
        self.files.binary_search_by(|f| f.name.as_str().cmp(name)).ok().map(|idx| &self.files[idx])
    }

    /// Drops `.` and `..` entries (an MLSD listing's `cdir`/`pdir` rows).
    pub fn exclude_dots(&mut self) {
        self.files.retain(|f| f.name != "." && f.name != "..");
    }

    /// Removes entries whose modification time is older than `cutoff`
    /// (unix seconds); entries with no known date are kept.
    pub fn subtract_older_than(&mut self, cutoff: i64) {
        self.files.retain(|f| f.date.is_none_or(|d| d.unix_time >= cutoff));
    }

    /// Sorts by name (the default and only order this type enforces on
    /// `add`); exposed for callers that want to re-sort after a bulk
    /// mutation by a different key and then restore name order.
    pub fn sort_by_name(&mut self) {
        self.files.sort_by(|a, b| a.name.cmp(&b.name));
    }

    /// Sorts by a key function, for the `{name, size, date, dirs-first,
    /// rank}` orderings a lister's caller may request.
    pub fn sort_by_key<K: Ord>(&mut self, mut key: impl FnMut(&FileInfo) -> K) {
        self.files.sort_by(|a, b| key(a).cmp(&key(b)));
    }

    /// Sorts directories ahead of everything else, preserving relative
    /// order within each group.
    pub fn sort_dirs_first(&mut self) {
        self.files.sort_by(|a, b| {
            let a_dir = matches!(a.file_type, Some(FileType::Directory));
            let b_dir = matches!(b.file_type, Some(FileType::Directory));
            match (a_dir, b_dir) {
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                _ => Ordering::Equal,
            }
        });
    }
}

impl IntoIterator for FileSet {
    type Item = FileInfo;
    type IntoIter = std::vec::IntoIter<FileInfo>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.into_iter()
    }
}

impl FromIterator<FileInfo> for FileSet {
    fn from_iter<I: IntoIterator<Item = FileInfo>>(iter: I) -> Self {
        let mut set = Self::new();
        for info in iter {
            set.add(info);
        }
        set
    }
}
