//! Feature discovery via the `FEAT` reply.

/// The set of optional commands/extensions a remote peer has advertised.
///
/// Built by feeding each line of a `FEAT` reply to [`FeatureSet::observe`].
/// Flags only ever move from unset to set: [`FeatureSet::merge`] never
/// clears a previously observed feature, since a server that advertised
/// `MDTM` once will not stop supporting it for the lifetime of the session
/// (feature monotonicity).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct FeatureSet {
    mdtm: bool,
    size: bool,
    rest_stream: bool,
    mlsd: bool,
    pret: bool,
    utf8: bool,
    lang: bool,
    auth_tls: bool,
}

impl FeatureSet {
    /// An empty feature set, as if nothing has been discovered yet.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            mdtm: false,
            size: false,
            rest_stream: false,
            mlsd: false,
            pret: false,
            utf8: false,
            lang: false,
            auth_tls: false,
        }
    }

    /// Updates the set from one line of a `FEAT` reply body (leading
    /// whitespace from the RFC 2389 indentation is stripped by the caller
    /// or here).
    pub fn observe(&mut self, line: &str) {
        let trimmed = line.trim();
        let mut parts = trimmed.splitn(2, char::is_whitespace);
        let Some(keyword) = parts.next() else {
            return;
        };
        match keyword.to_ascii_uppercase().as_str() {
            "MDTM" => self.mdtm = true,
            "SIZE" => self.size = true,
            "PRET" => self.pret = true,
            "UTF8" => self.utf8 = true,
            "LANG" => self.lang = true,
            "MLSD" | "MLST" => self.mlsd = true,
            "AUTH" if parts.next().is_some_and(|arg| arg.contains("TLS")) => self.auth_tls = true,
            "REST" if parts.next().is_some_and(|arg| arg.trim().eq_ignore_ascii_case("STREAM")) => {
                self.rest_stream = true;
            }
            _ => {}
        }
    }

    /// Merges another observation into this set without ever clearing a bit.
    pub fn merge(&mut self, other: Self) {
        self.mdtm |= other.mdtm;
        self.size |= other.size;
        self.rest_stream |= other.rest_stream;
        self.mlsd |= other.mlsd;
        self.pret |= other.pret;
        self.utf8 |= other.utf8;
        self.lang |= other.lang;
        self.auth_tls |= other.auth_tls;
    }

    /// Whether `MDTM` is supported.
    #[must_use]
    pub const fn mdtm(&self) -> bool {
        self.mdtm
    }
    /// Whether `SIZE` is supported.
    #[must_use]
    pub const fn size(&self) -> bool {
        self.size
    }
    /// Whether `REST STREAM` is supported.
    #[must_use]
    pub const fn rest_stream(&self) -> bool {
        self.rest_stream
    }
    /// Whether `MLSD`/`MLST` is supported.
    #[must_use]
    pub const fn mlsd(&self) -> bool {
        self.mlsd
    }
    /// Whether `PRET` is supported.
    #[must_use]
    pub const fn pret(&self) -> bool {
        self.pret
    }
    /// Whether `UTF8` is supported.
    #[must_use]
    pub const fn utf8(&self) -> bool {
        self.utf8
    }
    /// Whether `LANG` is supported.
    #[must_use]
    pub const fn lang(&self) -> bool {
        self.lang
    }
    /// Whether `AUTH TLS` is supported.
    #[must_use]
    pub const fn auth_tls(&self) -> bool {
        self.auth_tls
    }
}

/// Parses every continuation line of a `FEAT` reply body into a [`FeatureSet`].
#[must_use]
pub fn parse_feat_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> FeatureSet {
    let mut set = FeatureSet::none();
    for line in lines {
        set.observe(line);
    }
    set
}
