/// Directory every compiled entry name is rooted at.
pub const VIRTUAL_PREFIX: &str = r"..\BIOGame\Config\PC\Cooked\";

/// One packed text resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub body: String,
}

impl Entry {
    pub fn new(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self { name: name.into(), body: body.into() }
    }

    /// Trailing component of `name`, the only part callers act on.
    pub fn file_name(&self) -> &str {
        base_name(&self.name)
    }
}

/// An entry together with the container offset its name field starts at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedEntry {
    pub offset: u64,
    pub entry:  Entry,
}

/// Last component of a path using either `\` or `/` as separator.
pub fn base_name(path: &str) -> &str {
    path.rsplit(|c: char| c == '\\' || c == '/').next().unwrap_or(path)
}

/// The stored name for `name`: its base file name under [`VIRTUAL_PREFIX`].
pub fn virtual_path(name: &str) -> String {
    format!("{VIRTUAL_PREFIX}{}", base_name(name))
}
