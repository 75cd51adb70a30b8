//! Plain-text rendering of [`ViewState`] for the terminal.

use telly_core::models::{DetailBundle, Item};
use telly_runtime::ViewState;

const CAST_SHOWN: usize = 5;

pub fn help() {
    println!(
        "commands:
  browse                 reload the catalog
  type <text>            edit the search box (searches after a pause)
  search <text>          search now
  list                   show the current catalog
  genres                 list genres in the catalog
  genre [name]           filter by genre, or clear the filter
  detail <id> | close    open or close a show's detail
  fav <id>               toggle a favorite
  favorites              list favorites
  clear                  dismiss the error
  quit"
    );
}

pub fn changes(old: &ViewState, new: &ViewState) {
    if new.error != old.error {
        if let Some(error) = &new.error {
            println!("! {error}");
        }
    }
    if new.loading && !old.loading {
        println!("loading...");
    }
    if new.catalog_view != old.catalog_view || new.selected_genre != old.selected_genre {
        let filter = new
            .selected_genre
            .as_deref()
            .map(|g| format!(" in {g}"))
            .unwrap_or_default();
        println!("{} shows{filter}", new.catalog_view.len());
    }
    if new.favorites_view.len() != old.favorites_view.len() {
        println!("{} favorites", new.favorites_view.len());
    }
    let opened = new.detail_view.as_ref().map(DetailBundle::id);
    if opened.is_some() && opened != old.detail_view.as_ref().map(DetailBundle::id) {
        if let Some(bundle) = &new.detail_view {
            detail(bundle);
        }
    }
}

pub fn catalog(view: &ViewState) {
    if !view.has_data {
        println!("nothing loaded yet");
        return;
    }
    for item in &view.catalog_view {
        item_line(item);
    }
}

pub fn favorites(view: &ViewState) {
    if view.favorites_view.is_empty() {
        println!("no favorites");
    }
    for item in &view.favorites_view {
        item_line(item);
    }
}

pub fn genres(view: &ViewState) {
    for genre in &view.genres {
        let marker = if view.selected_genre.as_deref() == Some(genre) {
            "*"
        } else {
            " "
        };
        println!("{marker} {genre}");
    }
}

fn item_line(item: &Item) {
    let star = if item.is_favorite { "★" } else { " " };
    println!(
        "{:>7} {star} {}  [{}]",
        item.id,
        item.name,
        item.genres.join(", ")
    );
}

fn detail(bundle: &DetailBundle) {
    item_line(&bundle.item);
    println!(
        "        {} seasons, {} episodes, {} images",
        bundle.seasons.len(),
        bundle.episodes.len(),
        bundle.images.len()
    );
    for entry in bundle.cast.iter().take(CAST_SHOWN) {
        println!("        {} as {}", entry.person.name, entry.character.name);
    }
    if let Some(summary) = &bundle.item.summary {
        println!("        {}", strip_tags(summary));
    }
}

/// Summaries arrive as HTML fragments.
fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}
