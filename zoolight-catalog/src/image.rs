use std::collections::HashMap;

/// Where an image is displayed; each spot has its own placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Card,
    Detail,
}

/// Probe outcome for one URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageStatus {
    Checking,
    Reachable,
    Broken,
}

/// What to show for a record's image right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImage<'a> {
    pub url: &'a str,
    pub placeholder: bool,
    pub checking: bool,
}

/// Per-URL probe results with placeholder substitution.
///
/// URLs are probed at most once per session. Until a probe reports back the
/// original URL is shown; a broken or missing image resolves to the
/// placeholder for its [`ImageKind`].
///
/// ```
/// use zoolight_catalog::image::{ImageKind, ImageSlots};
///
/// let mut slots = ImageSlots::new("https://ph/150", "https://ph/400x300", true);
/// assert!(slots.request_probe("https://x/lion.png"));
/// assert!(!slots.request_probe("https://x/lion.png"));
///
/// slots.record("https://x/lion.png", false);
/// let shown = slots.resolve(Some("https://x/lion.png"), ImageKind::Detail);
/// assert_eq!(shown.url, "https://ph/400x300");
/// assert!(shown.placeholder);
/// ```
#[derive(Debug, Clone)]
pub struct ImageSlots {
    card_placeholder: String,
    detail_placeholder: String,
    probing: bool,
    statuses: HashMap<String, ImageStatus>,
}

impl ImageSlots {
    pub fn new(
        card_placeholder: impl Into<String>,
        detail_placeholder: impl Into<String>,
        probing: bool,
    ) -> Self {
        Self {
            card_placeholder: card_placeholder.into(),
            detail_placeholder: detail_placeholder.into(),
            probing,
            statuses: HashMap::new(),
        }
    }

    pub fn placeholder(&self, kind: ImageKind) -> &str {
        match kind {
            ImageKind::Card => &self.card_placeholder,
            ImageKind::Detail => &self.detail_placeholder,
        }
    }

    pub fn status(&self, url: &str) -> Option<ImageStatus> {
        self.statuses.get(url).copied()
    }

    /// Claim `url` for probing. `false` if probing is off or already claimed.
    pub fn request_probe(&mut self, url: &str) -> bool {
        if !self.probing || self.statuses.contains_key(url) {
            return false;
        }
        self.statuses.insert(url.to_string(), ImageStatus::Checking);
        true
    }

    pub fn record(&mut self, url: &str, reachable: bool) {
        let status = if reachable {
            ImageStatus::Reachable
        } else {
            ImageStatus::Broken
        };
        self.statuses.insert(url.to_string(), status);
    }

    pub fn resolve<'a>(&'a self, image: Option<&'a str>, kind: ImageKind) -> ResolvedImage<'a> {
        let Some(url) = image else {
            return ResolvedImage {
                url: self.placeholder(kind),
                placeholder: true,
                checking: false,
            };
        };
        match self.status(url) {
            Some(ImageStatus::Broken) => ResolvedImage {
                url: self.placeholder(kind),
                placeholder: true,
                checking: false,
            },
            Some(ImageStatus::Checking) => ResolvedImage {
                url,
                placeholder: false,
                checking: true,
            },
            Some(ImageStatus::Reachable) | None => ResolvedImage {
                url,
                placeholder: false,
                checking: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slots(probing: bool) -> ImageSlots {
        ImageSlots::new("card-ph", "detail-ph", probing)
    }

    #[test]
    fn missing_image_uses_the_placeholder_for_its_spot() {
        let s = slots(true);
        assert_eq!(s.resolve(None, ImageKind::Card).url, "card-ph");
        assert_eq!(s.resolve(None, ImageKind::Detail).url, "detail-ph");
    }

    #[test]
    fn checking_then_reachable_keeps_the_url() {
        let mut s = slots(true);
        assert!(s.request_probe("u1"));
        let shown = s.resolve(Some("u1"), ImageKind::Card);
        assert!(shown.checking);
        assert_eq!(shown.url, "u1");

        s.record("u1", true);
        let shown = s.resolve(Some("u1"), ImageKind::Card);
        assert_eq!(
            shown,
            ResolvedImage {
                url: "u1",
                placeholder: false,
                checking: false
            }
        );
    }

    #[test]
    fn probing_disabled_never_claims() {
        let mut s = slots(false);
        assert!(!s.request_probe("u1"));
        assert_eq!(s.resolve(Some("u1"), ImageKind::Detail).url, "u1");
    }
}
