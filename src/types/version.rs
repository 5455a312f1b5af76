//! Version and credential types.

use std::fmt;

/// Firmware or runtime version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    /// Major number.
    pub major: u16,
    /// Middle number.
    pub middle: u16,
    /// Minor number.
    pub minor: u16,
    /// Build number.
    pub build: u32,
    /// Build date as (year, month, day).
    pub date: (u16, u8, u8),
}

impl Version {
    /// Creates a version without a build date.
    #[must_use]
    pub const fn new(major: u16, middle: u16, minor: u16, build: u32) -> Self {
        Self {
            major,
            middle,
            minor,
            build,
            date: (0, 0, 0),
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}.{}", self.major, self.middle, self.minor, self.build)
    }
}

/// Application credentials presented when opening a session.
///
/// Issued per application by the device vendor's developer portal.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AppInfo {
    /// Developer identifier.
    pub developer_id: String,
    /// Application bundle identifier.
    pub bundle_id: String,
    /// Application key.
    pub app_key: String,
}

impl AppInfo {
    /// Creates application credentials.
    #[must_use]
    pub fn new(
        developer_id: impl Into<String>,
        bundle_id: impl Into<String>,
        app_key: impl Into<String>,
    ) -> Self {
        Self {
            developer_id: developer_id.into(),
            bundle_id: bundle_id.into(),
            app_key: app_key.into(),
        }
    }
}

impl fmt::Debug for AppInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppInfo")
            .field("developer_id", &self.developer_id)
            .field("bundle_id", &self.bundle_id)
            .field("app_key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_display_and_order() {
        let older = Version::new(1, 2, 3, 40);
        let newer = Version::new(1, 3, 0, 1);
        assert_eq!(older.to_string(), "1.2.3.40");
        assert!(older < newer);
    }

    #[test]
    fn test_app_info_redacts_key() {
        let info = AppInfo::new("dev", "com.example.app", "secret-key");
        let printed = format!("{info:?}");
        assert!(printed.contains("com.example.app"));
        assert!(!printed.contains("secret-key"));
    }
}
