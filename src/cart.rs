use crate::catalog::Book;

/// Books picked for purchase, unique by id, in the order they were added.
#[derive(Debug, Default, Clone)]
pub struct Cart {
    items: Vec<Book>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when a book with the same id is already present.
    pub fn add(&mut self, book: &Book) -> bool {
        if self.contains(&book.id) {
            return false;
        }
        self.items.push(book.clone());
        true
    }

    /// Returns false when nothing matched.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|item| item.id == id)
    }

    pub fn total(&self) -> f64 {
        self.items.iter().map(|item| item.price).sum()
    }

    pub fn items(&self) -> &[Book] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::catalog;

    #[test]
    fn add_is_idempotent() {
        let book = &catalog()[2];
        let mut cart = Cart::new();
        assert!(cart.add(book));
        assert!(!cart.add(book));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn total_is_sum_of_prices() {
        let mut cart = Cart::new();
        assert_eq!(cart.total(), 0.0);

        for book in &catalog()[..4] {
            cart.add(book);
        }
        let expected: f64 = catalog()[..4].iter().map(|b| b.price).sum();
        assert!((cart.total() - expected).abs() < 1e-9);
        assert!((cart.total() - 57.96).abs() < 1e-9);
    }

    #[test]
    fn remove_missing_is_noop() {
        let mut cart = Cart::new();
        cart.add(&catalog()[0]);
        assert!(!cart.remove("999"));
        assert!(cart.remove("1"));
        assert!(cart.is_empty());
    }
}
