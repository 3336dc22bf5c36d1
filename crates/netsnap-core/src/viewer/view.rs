//! View state: filtering, page-at-a-time reveal, and selection.
//!
//! Selection indices point into the filtered list, so they are invalid the
//! moment a filter changes; every filter change clears the selection and
//! resets pagination to the first page.

use std::collections::BTreeSet;

use crate::har::HarEntry;

use super::filter::{matches_text, TypeFilter};

pub struct ViewState {
    entries: Vec<HarEntry>,
    type_filter: TypeFilter,
    text_filter: String,
    page_size: usize,
    /// Indices into `entries`, in order, passing both filters.
    filtered: Vec<usize>,
    /// How many filtered rows are currently revealed.
    visible: usize,
    /// Selected positions in the filtered list.
    selected: BTreeSet<usize>,
}

impl ViewState {
    pub fn new(entries: Vec<HarEntry>, page_size: usize) -> Self {
        let mut state = Self {
            entries,
            type_filter: TypeFilter::All,
            text_filter: String::new(),
            page_size,
            filtered: Vec::new(),
            visible: 0,
            selected: BTreeSet::new(),
        };
        state.apply_filters();
        state
    }

    fn apply_filters(&mut self) {
        self.filtered = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| self.type_filter.matches(e) && matches_text(e, &self.text_filter))
            .map(|(i, _)| i)
            .collect();
        self.visible = self.filtered.len().min(self.page_size);
    }

    pub fn set_type_filter(&mut self, filter: TypeFilter) {
        self.type_filter = filter;
        self.selected.clear();
        self.apply_filters();
    }

    pub fn set_text_filter(&mut self, query: &str) {
        self.text_filter = query.to_string();
        self.selected.clear();
        self.apply_filters();
    }

    pub fn type_filter(&self) -> TypeFilter {
        self.type_filter
    }

    /// Reveal the next page. Returns the number of newly visible rows.
    pub fn load_more(&mut self) -> usize {
        let before = self.visible;
        self.visible = self.filtered.len().min(self.visible + self.page_size);
        self.visible - before
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    pub fn visible_len(&self) -> usize {
        self.visible
    }

    pub fn has_more(&self) -> bool {
        self.visible < self.filtered.len()
    }

    /// Currently revealed rows as (filtered-list position, entry).
    pub fn visible_rows(&self) -> impl Iterator<Item = (usize, &HarEntry)> {
        self.filtered[..self.visible]
            .iter()
            .enumerate()
            .map(move |(pos, &idx)| (pos, &self.entries[idx]))
    }

    /// Toggle selection of a filtered-list position. Out-of-range positions
    /// are ignored and report false.
    pub fn toggle(&mut self, position: usize) -> bool {
        if position >= self.filtered.len() {
            return false;
        }
        if !self.selected.remove(&position) {
            self.selected.insert(position);
        }
        true
    }

    pub fn is_selected(&self, position: usize) -> bool {
        self.selected.contains(&position)
    }

    pub fn select_all(&mut self) {
        self.selected = (0..self.filtered.len()).collect();
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    pub fn selection_count(&self) -> usize {
        self.selected.len()
    }

    /// Clones of the selected entries, in filtered-list order. Feed this to
    /// the HAR export container.
    pub fn selected_entries(&self) -> Vec<HarEntry> {
        self.selected
            .iter()
            .filter_map(|&pos| self.filtered.get(pos))
            .map(|&idx| self.entries[idx].clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(tag: &str, path: &str) -> HarEntry {
        serde_json::from_str(&format!(
            r#"{{"request":{{"method":"GET","url":"https://example.com{}","headers":[]}},"_resourceType":"{}"}}"#,
            path, tag
        ))
        .unwrap()
    }

    fn mixed_entries() -> Vec<HarEntry> {
        vec![
            entry("xhr", "/api/users"),
            entry("script", "/static/app.js"),
            entry("fetch", "/api/orders"),
            entry("image", "/img/logo.png"),
            entry("ping", "/beacon"),
        ]
    }

    #[test]
    fn type_filter_narrows_rows() {
        let mut view = ViewState::new(mixed_entries(), 100);
        assert_eq!(view.filtered_len(), 5);
        view.set_type_filter(TypeFilter::FetchXhr);
        assert_eq!(view.filtered_len(), 2);
        let paths: Vec<_> = view.visible_rows().map(|(_, e)| e.url()).collect();
        assert_eq!(
            paths,
            vec![
                "https://example.com/api/users",
                "https://example.com/api/orders"
            ]
        );
    }

    #[test]
    fn text_filter_is_case_insensitive_and_path_scoped() {
        let mut view = ViewState::new(mixed_entries(), 100);
        view.set_text_filter("API");
        assert_eq!(view.filtered_len(), 2);
        view.set_text_filter("example.com");
        assert_eq!(view.filtered_len(), 0);
    }

    #[test]
    fn filter_change_clears_selection_and_resets_pages() {
        let entries: Vec<_> = (0..250)
            .map(|i| entry("xhr", &format!("/api/item/{}", i)))
            .collect();
        let mut view = ViewState::new(entries, 100);
        assert_eq!(view.visible_len(), 100);
        view.load_more();
        assert_eq!(view.visible_len(), 200);
        view.toggle(0);
        view.toggle(150);
        assert_eq!(view.selection_count(), 2);

        view.set_text_filter("item/1");
        assert_eq!(view.selection_count(), 0);
        assert_eq!(view.visible_len(), view.filtered_len().min(100));

        view.toggle(3);
        view.set_type_filter(TypeFilter::All);
        assert_eq!(view.selection_count(), 0);
        assert_eq!(view.visible_len(), 100);
    }

    #[test]
    fn pagination_reveals_in_pages() {
        let entries: Vec<_> = (0..250)
            .map(|i| entry("xhr", &format!("/r/{}", i)))
            .collect();
        let mut view = ViewState::new(entries, 100);
        assert_eq!(view.visible_len(), 100);
        assert!(view.has_more());
        assert_eq!(view.load_more(), 100);
        assert_eq!(view.load_more(), 50);
        assert_eq!(view.load_more(), 0);
        assert!(!view.has_more());
    }

    #[test]
    fn selection_toggles_and_bounds() {
        let mut view = ViewState::new(mixed_entries(), 100);
        assert!(view.toggle(1));
        assert!(view.is_selected(1));
        assert!(view.toggle(1));
        assert!(!view.is_selected(1));
        assert!(!view.toggle(99));
        assert_eq!(view.selection_count(), 0);
    }

    #[test]
    fn select_all_then_export_order() {
        let mut view = ViewState::new(mixed_entries(), 100);
        view.set_type_filter(TypeFilter::FetchXhr);
        view.select_all();
        assert_eq!(view.selection_count(), 2);
        let selected = view.selected_entries();
        assert_eq!(selected[0].url(), "https://example.com/api/users");
        assert_eq!(selected[1].url(), "https://example.com/api/orders");
    }

    #[test]
    fn small_filtered_list_is_fully_visible() {
        let view = ViewState::new(mixed_entries(), 100);
        assert_eq!(view.visible_len(), 5);
        assert!(!view.has_more());
    }
}
