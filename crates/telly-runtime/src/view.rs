use telly_core::models::{DetailBundle, Item};

/// Everything a front end needs to render, published as one value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    /// The snapshot narrowed by `selected_genre`.
    pub catalog_view: Vec<Item>,
    pub favorites_view: Vec<Item>,
    pub detail_view: Option<DetailBundle>,
    pub selected_genre: Option<String>,
    /// Genre facets of the current snapshot, first-seen order.
    pub genres: Vec<String>,
    pub loading: bool,
    pub error: Option<String>,
    /// Set once the first browse or search has succeeded.
    pub has_data: bool,
}

impl ViewState {
    /// Find an item by id in whichever view shows it, detail first.
    pub fn find_item(&self, id: i64) -> Option<&Item> {
        self.detail_view
            .as_ref()
            .map(|d| &d.item)
            .filter(|i| i.id == id)
            .or_else(|| self.catalog_view.iter().find(|i| i.id == id))
            .or_else(|| self.favorites_view.iter().find(|i| i.id == id))
    }

    pub fn is_favorite(&self, id: i64) -> bool {
        self.favorites_view.iter().any(|i| i.id == id)
    }
}
