//! The static book catalog and the filter/sort views derived from it.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Category sentinel that disables category filtering.
pub const ALL_CATEGORIES: &str = "All";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    pub description: String,
    pub category: String,
    pub price: f64,
    pub cover_image: String, // never checked for existence
    pub rating: f32,
    pub pages: u32,
    pub reading_time: u32, // hours
}

/// Key used to order the filtered catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Title,
    Rating,
    Price,
}

impl SortKey {
    pub fn parse(value: &str) -> Option<SortKey> {
        match value.trim().to_ascii_lowercase().as_str() {
            "title" => Some(SortKey::Title),
            "rating" => Some(SortKey::Rating),
            "price" => Some(SortKey::Price),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Title => "title",
            SortKey::Rating => "rating",
            SortKey::Price => "price",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortKey::Title => "Sort by Title",
            SortKey::Rating => "Sort by Rating",
            SortKey::Price => "Sort by Price",
        }
    }

    /// Cycles Title -> Rating -> Price -> Title.
    pub fn next(self) -> SortKey {
        match self {
            SortKey::Title => SortKey::Rating,
            SortKey::Rating => SortKey::Price,
            SortKey::Price => SortKey::Title,
        }
    }
}

struct Template {
    title: &'static str,
    author: &'static str,
    description: &'static str,
    category: &'static str,
    price: f64,
    rating: f32,
    pages: u32,
    reading_time: u32,
}

const TEMPLATES: [Template; 4] = [
    Template {
        title: "The Great Adventure",
        author: "Sarah Johnson",
        description: "An epic tale of courage and discovery in a mystical land.",
        category: "Adventure",
        price: 12.99,
        rating: 4.5,
        pages: 320,
        reading_time: 8,
    },
    Template {
        title: "Love in Paris",
        author: "Emma Williams",
        description: "A romantic story set in the beautiful streets of Paris.",
        category: "Romance",
        price: 9.99,
        rating: 4.2,
        pages: 280,
        reading_time: 6,
    },
    Template {
        title: "The Quantum Mystery",
        author: "Dr. Michael Chen",
        description: "A mind-bending science fiction thriller about quantum physics.",
        category: "Science Fiction",
        price: 14.99,
        rating: 4.7,
        pages: 450,
        reading_time: 12,
    },
    Template {
        title: "Cooking with Joy",
        author: "Chef Maria Rodriguez",
        description: "Delicious recipes and cooking techniques from around the world.",
        category: "Cooking",
        price: 19.99,
        rating: 4.8,
        pages: 200,
        reading_time: 4,
    },
];

// Cover for each id, in id order. Id 6 reuses cover 7.
const COVERS: [&str; 20] = [
    "/assets/1.avif",
    "/assets/2.avif",
    "/assets/3.jpeg",
    "/assets/4.avif",
    "/assets/5.avif",
    "/assets/7.avif",
    "/assets/7.avif",
    "/assets/8.avif",
    "/assets/9.avif",
    "/assets/10.avif",
    "/assets/11.avif",
    "/assets/12.avif",
    "/assets/13.avif",
    "/assets/14.avif",
    "/assets/15.avif",
    "/assets/16.jpeg",
    "/assets/17.webp",
    "/assets/18.webp",
    "/assets/19.webp",
    "/assets/20.webp",
];

static CATALOG: Lazy<Vec<Book>> = Lazy::new(|| {
    COVERS
        .iter()
        .enumerate()
        .map(|(i, cover)| {
            let t = &TEMPLATES[i % TEMPLATES.len()];
            Book {
                id: (i + 1).to_string(),
                title: t.title.to_string(),
                author: t.author.to_string(),
                description: t.description.to_string(),
                category: t.category.to_string(),
                price: t.price,
                cover_image: cover.to_string(),
                rating: t.rating,
                pages: t.pages,
                reading_time: t.reading_time,
            }
        })
        .collect()
});

/// The catalog loaded at startup. Never mutated.
pub fn catalog() -> &'static [Book] {
    &CATALOG
}

/// `All` followed by each distinct category in first-appearance order.
pub fn categories(books: &[Book]) -> Vec<String> {
    let mut out = vec![ALL_CATEGORIES.to_string()];
    for book in books {
        if !out.iter().any(|c| *c == book.category) {
            out.push(book.category.clone());
        }
    }
    out
}

/// Books matching both the category and the case-insensitive title/author
/// search, in catalog order. Does not sort.
pub fn filter_books<'a>(books: &'a [Book], category: &str, search: &str) -> Vec<&'a Book> {
    let needle = search.to_lowercase();
    books
        .iter()
        .filter(|book| category == ALL_CATEGORIES || book.category == category)
        .filter(|book| {
            book.title.to_lowercase().contains(&needle)
                || book.author.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Stable sort, so ties keep catalog order.
pub fn sort_books(books: &mut [&Book], key: SortKey) {
    match key {
        SortKey::Title => books.sort_by(|a, b| a.title.cmp(&b.title)),
        SortKey::Rating => books.sort_by(|a, b| {
            b.rating.partial_cmp(&a.rating).unwrap_or(Ordering::Equal)
        }),
        SortKey::Price => books.sort_by(|a, b| {
            a.price.partial_cmp(&b.price).unwrap_or(Ordering::Equal)
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_subsequence(sub: &[&Book], full: &[Book]) -> bool {
        let mut it = full.iter();
        sub.iter().all(|b| it.any(|f| f.id == b.id))
    }

    #[test]
    fn catalog_has_unique_ids() {
        let books = catalog();
        assert_eq!(books.len(), 20);
        for (i, a) in books.iter().enumerate() {
            assert!(books[i + 1..].iter().all(|b| b.id != a.id));
        }
    }

    #[test]
    fn quantum_search_finds_only_that_title() {
        let found = filter_books(catalog(), ALL_CATEGORIES, "quantum");
        assert!(!found.is_empty());
        for book in &found {
            assert_eq!(book.title, "The Quantum Mystery");
            assert_eq!(book.author, "Dr. Michael Chen");
            assert_eq!(book.category, "Science Fiction");
            assert_eq!(book.price, 14.99);
        }

        assert!(filter_books(catalog(), "Romance", "quantum").is_empty());
    }

    #[test]
    fn search_matches_author_case_insensitively() {
        let found = filter_books(catalog(), ALL_CATEGORIES, "EMMA wil");
        assert!(!found.is_empty());
        assert!(found.iter().all(|b| b.title == "Love in Paris"));
    }

    #[test]
    fn empty_search_with_all_returns_full_catalog() {
        let found = filter_books(catalog(), ALL_CATEGORIES, "");
        assert_eq!(found.len(), catalog().len());
    }

    #[test]
    fn filter_preserves_order_and_predicates() {
        let books = catalog();
        for category in categories(books) {
            for search in ["", "the", "JOY", "sarah", "zzz", "o"] {
                let found = filter_books(books, &category, search);
                assert!(is_subsequence(&found, books));
                let needle = search.to_lowercase();
                for book in found {
                    assert!(category == ALL_CATEGORIES || book.category == category);
                    assert!(
                        book.title.to_lowercase().contains(&needle)
                            || book.author.to_lowercase().contains(&needle)
                    );
                }
            }
        }
    }

    #[test]
    fn no_match_is_empty() {
        assert!(filter_books(catalog(), "Cooking", "paris").is_empty());
    }

    #[test]
    fn categories_start_with_all_in_first_seen_order() {
        assert_eq!(
            categories(catalog()),
            vec!["All", "Adventure", "Romance", "Science Fiction", "Cooking"]
        );
    }

    #[test]
    fn sorts_by_each_key() {
        let mut books = filter_books(catalog(), ALL_CATEGORIES, "");

        sort_books(&mut books, SortKey::Price);
        assert!(books.windows(2).all(|w| w[0].price <= w[1].price));

        sort_books(&mut books, SortKey::Rating);
        assert!(books.windows(2).all(|w| w[0].rating >= w[1].rating));
        assert_eq!(books[0].title, "Cooking with Joy");

        sort_books(&mut books, SortKey::Title);
        assert!(books.windows(2).all(|w| w[0].title <= w[1].title));
        assert_eq!(books[0].title, "Cooking with Joy");
    }

    #[test]
    fn sort_key_parses_and_cycles() {
        assert_eq!(SortKey::parse(" Rating "), Some(SortKey::Rating));
        assert_eq!(SortKey::parse("author"), None);
        assert_eq!(SortKey::Price.next(), SortKey::Title);
        assert_eq!(SortKey::parse(SortKey::Price.as_str()), Some(SortKey::Price));
    }
}
