//! Target platforms.

/// Target operating system of a packaged file.
///
/// A file without a platform (or with [`Platform::All`]) is served to every
/// OS. The numeric ids are part of the public "latest" download URLs.
///
/// # Example
///
/// ```
/// use xpi_schema::Platform;
///
/// let mac: Platform = "mac".parse().unwrap();
/// assert_eq!(mac.id(), 3);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Every platform.
    #[default]
    All,
    /// Linux.
    Linux,
    /// macOS.
    Mac,
    /// The BSDs.
    Bsd,
    /// Windows.
    #[serde(rename = "win")]
    Windows,
    /// Solaris.
    Solaris,
}

impl Platform {
    /// Numeric platform id.
    pub fn id(&self) -> u32 {
        match self {
            Self::All => 1,
            Self::Linux => 2,
            Self::Mac => 3,
            Self::Bsd => 4,
            Self::Windows => 5,
            Self::Solaris => 6,
        }
    }

    /// Short name used in generated filenames.
    pub fn shortname(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Linux => "linux",
            Self::Mac => "mac",
            Self::Bsd => "bsd",
            Self::Windows => "win",
            Self::Solaris => "solaris",
        }
    }

    /// Whether this is the "every platform" sentinel.
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Look up a platform by numeric id.
    pub fn from_id(id: u32) -> Option<Self> {
        [
            Self::All,
            Self::Linux,
            Self::Mac,
            Self::Bsd,
            Self::Windows,
            Self::Solaris,
        ]
        .into_iter()
        .find(|p| p.id() == id)
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.shortname())
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "linux" => Ok(Self::Linux),
            "mac" | "macos" | "darwin" => Ok(Self::Mac),
            "bsd" | "freebsd" => Ok(Self::Bsd),
            "win" | "windows" => Ok(Self::Windows),
            "solaris" => Ok(Self::Solaris),
            _ => Err(format!("Unknown platform: {s}")),
        }
    }
}
