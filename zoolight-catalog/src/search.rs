//! Search and selection state for the animal catalog.
//!
//! [`SearchController`] owns the loaded dataset together with the committed
//! query, the filtered view and the current selection. Filtering only happens
//! when [`SearchController::run_search`] is called; editing the query is a
//! plain state update.
use crate::record::AnimalRecord;

/// Literal shown whenever the filtered set is empty.
pub const NO_RESULTS: &str = "No animals found.";
pub const LOADING_HINT: &str = "Loading animals…";
pub const FAILED_HINT: &str = "Could not load animals.";

/// Lifecycle of the one-shot dataset fetch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    NotStarted,
    Pending,
    Loaded,
    Failed(String),
}

impl LoadState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Loaded | Self::Failed(_))
    }
}

/// Which half of the main column is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    /// Search bar plus result grid.
    Results,
    /// Back control plus the two-column detail view.
    Detail,
}

/// What the result grid should show.
#[derive(Debug, PartialEq)]
pub enum ResultsView<'a> {
    Cards(Vec<&'a AnimalRecord>),
    Empty {
        message: &'static str,
        hint: Option<&'static str>,
    },
}

/// Positions of the records whose `Common Name` contains `query`,
/// case-insensitively, in dataset order.
///
/// A blank query selects everything.
///
/// ```
/// use zoolight_catalog::{search::search, AnimalRecord};
///
/// let data = vec![
///     AnimalRecord::new().with("Common Name", "Lion"),
///     AnimalRecord::new().with("Common Name", "Tiger"),
///     AnimalRecord::new().with("Common Name", "Tiny Owl"),
/// ];
/// assert_eq!(search(&data, "tin"), vec![2]);
/// assert_eq!(search(&data, "TI"), vec![1, 2]);
/// assert_eq!(search(&data, "  "), vec![0, 1, 2]);
/// ```
pub fn search(dataset: &[AnimalRecord], query: &str) -> Vec<usize> {
    let needle = query.trim();
    if needle.is_empty() {
        return (0..dataset.len()).collect();
    }
    let needle = needle.to_lowercase();

    dataset
        .iter()
        .enumerate()
        .filter(|(_, rec)| {
            rec.common_name()
                .is_some_and(|name| name.to_lowercase().contains(&needle))
        })
        .map(|(pos, _)| pos)
        .collect()
}

#[derive(Debug, Default)]
pub struct SearchController {
    dataset: Vec<AnimalRecord>,
    load: LoadState,
    query: String,
    // positions into `dataset`
    filtered: Vec<usize>,
    selected: Option<usize>,
}

impl SearchController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the fetch as issued. Returns `false` if a fetch was already started.
    pub fn begin_load(&mut self) -> bool {
        if self.load != LoadState::NotStarted {
            tracing::warn!(state = ?self.load, "dataset fetch already started; ignoring");
            return false;
        }
        self.load = LoadState::Pending;
        true
    }

    /// Install the fetched dataset and show all of it.
    ///
    /// Only the first terminal outcome counts; later calls are ignored.
    pub fn load(&mut self, data: Vec<AnimalRecord>) -> bool {
        if self.load.is_terminal() {
            tracing::warn!(state = ?self.load, "dataset already settled; ignoring load");
            return false;
        }
        tracing::info!(records = data.len(), "dataset loaded");
        self.filtered = (0..data.len()).collect();
        self.dataset = data;
        self.load = LoadState::Loaded;
        true
    }

    /// Record a failed fetch. The filtered set stays empty.
    pub fn fail_load(&mut self, reason: impl Into<String>) -> bool {
        if self.load.is_terminal() {
            tracing::warn!(state = ?self.load, "dataset already settled; ignoring failure");
            return false;
        }
        let reason = reason.into();
        tracing::warn!(%reason, "dataset fetch failed");
        self.load = LoadState::Failed(reason);
        true
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load
    }

    pub fn dataset(&self) -> &[AnimalRecord] {
        &self.dataset
    }

    /// Replace the query text. Does not filter.
    pub fn set_query(&mut self, text: impl Into<String>) {
        self.query = text.into();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Recompute the filtered set from the current query. Returns its size.
    pub fn run_search(&mut self) -> usize {
        self.filtered = search(&self.dataset, &self.query);
        tracing::debug!(query = %self.query, matches = self.filtered.len(), "search committed");
        self.filtered.len()
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    pub fn filtered(&self) -> impl ExactSizeIterator<Item = &AnimalRecord> + '_ {
        self.filtered.iter().map(|&pos| &self.dataset[pos])
    }

    /// Record at `index` within the filtered set.
    pub fn filtered_record(&self, index: usize) -> Option<&AnimalRecord> {
        self.filtered.get(index).map(|&pos| &self.dataset[pos])
    }

    /// Select the record at `index` within the filtered set.
    pub fn select(&mut self, index: usize) -> Option<&AnimalRecord> {
        let pos = *self.filtered.get(index)?;
        self.selected = Some(pos);
        Some(&self.dataset[pos])
    }

    /// Return to the results. Query and filtered set are left alone.
    pub fn deselect(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&AnimalRecord> {
        self.selected.map(|pos| &self.dataset[pos])
    }

    pub fn panel(&self) -> Panel {
        if self.selected.is_some() {
            Panel::Detail
        } else {
            Panel::Results
        }
    }

    pub fn results(&self) -> ResultsView<'_> {
        if !self.filtered.is_empty() {
            return ResultsView::Cards(self.filtered().collect());
        }
        let hint = match self.load {
            LoadState::NotStarted | LoadState::Pending => Some(LOADING_HINT),
            LoadState::Failed(_) => Some(FAILED_HINT),
            LoadState::Loaded => None,
        };
        ResultsView::Empty {
            message: NO_RESULTS,
            hint,
        }
    }
}
