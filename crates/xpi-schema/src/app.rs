//! Known host applications.

/// Host applications an add-on can declare compatibility with.
///
/// Each variant carries the fixed identifiers used across the system: the
/// numeric registry id, the GUID that appears in `install.rdf`, the URL
/// segment (`firefox`) and the two-letter code used in generated filenames
/// (`fx`).
///
/// # Example
///
/// ```
/// use xpi_schema::AppKind;
///
/// let app = AppKind::from_guid("{ec8030f7-c20a-464f-9b0e-13a3a9e97384}").unwrap();
/// assert_eq!(app, AppKind::Firefox);
/// assert_eq!(app.shortername(), "fx");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AppKind {
    /// Firefox desktop.
    Firefox,
    /// Thunderbird mail client.
    Thunderbird,
    /// SeaMonkey suite.
    SeaMonkey,
    /// Sunbird calendar.
    Sunbird,
    /// Firefox for mobile (Fennec).
    Mobile,
}

impl AppKind {
    /// Every known application, in registry id order of introduction.
    pub const ALL: [AppKind; 5] = [
        Self::Firefox,
        Self::Thunderbird,
        Self::SeaMonkey,
        Self::Sunbird,
        Self::Mobile,
    ];

    /// Numeric registry id.
    pub fn id(&self) -> u32 {
        match self {
            Self::Firefox => 1,
            Self::Thunderbird => 18,
            Self::Sunbird => 52,
            Self::SeaMonkey => 59,
            Self::Mobile => 60,
        }
    }

    /// GUID used as `em:id` inside `em:targetApplication`.
    pub fn guid(&self) -> &'static str {
        match self {
            Self::Firefox => "{ec8030f7-c20a-464f-9b0e-13a3a9e97384}",
            Self::Thunderbird => "{3550f703-e582-4d05-9a08-453d09bdfdc6}",
            Self::SeaMonkey => "{92650c4d-4b8e-4d2a-b7eb-24ecf4f6b63a}",
            Self::Sunbird => "{718e30fb-e89b-41dd-9da7-e25a45638b28}",
            Self::Mobile => "{a23983c0-fd0e-11dc-95ff-0800200c9a66}",
        }
    }

    /// URL segment (`/firefox/downloads/...`).
    pub fn short(&self) -> &'static str {
        match self {
            Self::Firefox => "firefox",
            Self::Thunderbird => "thunderbird",
            Self::SeaMonkey => "seamonkey",
            Self::Sunbird => "sunbird",
            Self::Mobile => "mobile",
        }
    }

    /// Two-letter code used in generated filenames.
    pub fn shortername(&self) -> &'static str {
        match self {
            Self::Firefox => "fx",
            Self::Thunderbird => "tb",
            Self::SeaMonkey => "sm",
            Self::Sunbird => "sb",
            Self::Mobile => "fn",
        }
    }

    /// Human-readable product name.
    pub fn pretty(&self) -> &'static str {
        match self {
            Self::Firefox => "Firefox",
            Self::Thunderbird => "Thunderbird",
            Self::SeaMonkey => "SeaMonkey",
            Self::Sunbird => "Sunbird",
            Self::Mobile => "Mobile",
        }
    }

    /// Look up an application by its `install.rdf` GUID.
    pub fn from_guid(guid: &str) -> Option<Self> {
        let guid = guid.trim();
        Self::ALL
            .into_iter()
            .find(|app| app.guid().eq_ignore_ascii_case(guid))
    }

    /// Look up an application by registry id.
    pub fn from_id(id: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|app| app.id() == id)
    }
}

impl std::fmt::Display for AppKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.short())
    }
}

impl std::str::FromStr for AppKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|app| app.short() == lower || app.shortername() == lower)
            .or_else(|| Self::from_guid(s))
            .or_else(|| lower.parse::<u32>().ok().and_then(Self::from_id))
            .ok_or_else(|| format!("Unknown application: {s}"))
    }
}
