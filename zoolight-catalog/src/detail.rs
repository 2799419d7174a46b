use crate::record::{field, AnimalRecord};
use url::Url;

/// Title used when a record has no usable common name.
pub const FALLBACK_TITLE: &str = "Animal";

/// Taxonomic ranks in the order the detail sentence lists them.
pub const TAXONOMY_RANKS: [&str; 7] = [
    field::KINGDOM,
    field::PHYLUM,
    field::CLASS,
    field::ORDER,
    field::FAMILY,
    field::GENUS,
    field::SPECIES,
];

/// Controls offered next to the detail panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailAction {
    BackToResults,
    LearnMore,
    /// Present in the layout, does nothing.
    Contact,
}

impl DetailAction {
    pub fn label(self) -> &'static str {
        match self {
            Self::BackToResults => "⬅ Back to Results",
            Self::LearnMore => "Learn More",
            Self::Contact => "Contact",
        }
    }
}

/// Read-only text projection of a selected record.
///
/// ```
/// use zoolight_catalog::{AnimalDetail, AnimalRecord};
///
/// let rec = AnimalRecord::new()
///     .with("Common Name", "Tiger")
///     .with("Kingdom", "Animalia")
///     .with("Diet", "Carnivore");
/// let detail = AnimalDetail::new(&rec);
///
/// assert_eq!(detail.title(), "Tiger");
/// assert_eq!(detail.habitat_line(), "Habitat: N/A. Diet: Carnivore.");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AnimalDetail<'a> {
    record: &'a AnimalRecord,
}

impl<'a> AnimalDetail<'a> {
    pub fn new(record: &'a AnimalRecord) -> Self {
        Self { record }
    }

    pub fn record(&self) -> &'a AnimalRecord {
        self.record
    }

    pub fn title(&self) -> &'a str {
        self.record
            .common_name()
            .filter(|name| !name.is_empty())
            .unwrap_or(FALLBACK_TITLE)
    }

    /// `(rank, value)` pairs with `N/A` for anything missing.
    pub fn taxonomy(&self) -> impl Iterator<Item = (&'static str, &'a str)> + 'a {
        let record = self.record;
        TAXONOMY_RANKS
            .iter()
            .map(move |&rank| (rank, record.text_or_na(rank)))
    }

    /// `Kingdom: …. Phylum: …. … Species: ….`
    pub fn taxonomy_line(&self) -> String {
        self.taxonomy()
            .map(|(rank, value)| format!("{rank}: {value}."))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn habitat_line(&self) -> String {
        format!(
            "Habitat: {}. Diet: {}.",
            self.record.text_or_na(field::HABITAT),
            self.record.text_or_na(field::DIET)
        )
    }

    /// Web search for the animal's name under `search_base`.
    ///
    /// ```
    /// use url::Url;
    /// use zoolight_catalog::{AnimalDetail, AnimalRecord};
    ///
    /// let rec = AnimalRecord::new().with("Common Name", "Snow Leopard");
    /// let base = Url::parse("https://www.google.com/search").unwrap();
    /// let url = AnimalDetail::new(&rec).learn_more_url(&base);
    /// assert_eq!(url.as_str(), "https://www.google.com/search?q=Snow+Leopard");
    /// ```
    pub fn learn_more_url(&self, search_base: &Url) -> Url {
        let mut url = search_base.clone();
        url.query_pairs_mut().append_pair("q", self.title());
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_habitat_reads_na() {
        let rec = AnimalRecord::new().with(field::COMMON_NAME, "Lion");
        let detail = AnimalDetail::new(&rec);
        assert!(detail.habitat_line().contains("Habitat: N/A."));
        assert_eq!(detail.habitat_line(), "Habitat: N/A. Diet: N/A.");
    }

    #[test]
    fn taxonomy_sentence_lists_every_rank() {
        let rec = AnimalRecord::new()
            .with(field::KINGDOM, "Animalia")
            .with(field::CLASS, "Mammalia")
            .with(field::SPECIES, "");
        let line = AnimalDetail::new(&rec).taxonomy_line();
        assert_eq!(
            line,
            "Kingdom: Animalia. Phylum: N/A. Class: Mammalia. Order: N/A. \
             Family: N/A. Genus: N/A. Species: N/A."
        );
    }

    #[test]
    fn untitled_records_fall_back() {
        let rec = AnimalRecord::new().with(field::COMMON_NAME, "");
        let detail = AnimalDetail::new(&rec);
        assert_eq!(detail.title(), FALLBACK_TITLE);

        let base = Url::parse("https://duckduckgo.com/?ia=web").unwrap();
        assert_eq!(
            detail.learn_more_url(&base).as_str(),
            "https://duckduckgo.com/?ia=web&q=Animal"
        );
    }

    #[test]
    fn search_terms_are_encoded() {
        let rec = AnimalRecord::new().with(field::COMMON_NAME, "Kea & Kākāpō");
        let base = Url::parse("https://www.google.com/search").unwrap();
        let url = AnimalDetail::new(&rec).learn_more_url(&base);
        let q: Vec<_> = url.query_pairs().collect();
        assert_eq!(q.len(), 1);
        assert_eq!(q[0].1, "Kea & Kākāpō");
    }
}
