//! Public URL builders.

use xpi_schema::{AppKind, File, Platform};

/// Builds site-relative download and EULA URLs for one application/locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlBuilder {
    pub app: AppKind,
    pub locale: String,
}

impl UrlBuilder {
    pub fn new(app: AppKind, locale: impl Into<String>) -> Self {
        Self {
            app,
            locale: locale.into(),
        }
    }

    /// `/{app}/downloads/file/{file_id}/{filename}`, with `?src=` when given.
    pub fn download_url(&self, file: &File, src: Option<&str>) -> String {
        let url = format!(
            "/{}/downloads/file/{}/{}",
            self.app.short(),
            file.id,
            file.filename
        );
        match src {
            Some(src) => format!("{url}?src={src}"),
            None => url,
        }
    }

    /// Always resolves to the newest file of an add-on. The platform segment
    /// only appears for a specific platform.
    pub fn latest_url(&self, addon_id: u64, platform: Option<Platform>) -> String {
        let platform = platform
            .filter(|p| !p.is_all())
            .map(|p| format!("platform:{}/", p.id()))
            .unwrap_or_default();
        format!(
            "/{}/downloads/latest/{addon_id}/{platform}addon-{addon_id}-latest.xpi",
            self.app.short()
        )
    }

    pub fn eula_url(&self, addon_id: u64, file_id: u64) -> String {
        format!(
            "/{}/{}/addon/{addon_id}/eula/{file_id}",
            self.locale,
            self.app.short()
        )
    }
}
