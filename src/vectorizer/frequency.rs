use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// ItemFrequency
/// Counts how often each item (laboratory test name) occurs across bags.
/// Items keep the order in which they were first seen, which is what
/// breaks ties in [`ItemFrequency::most_common`].
///
/// # Examples
/// ```
/// use labo_recommender::ItemFrequency;
/// let mut freq = ItemFrequency::new();
/// freq.add_items(&["glucose", "sodium"]);
/// freq.add_items(&["sodium", "potassium"]);
///
/// let ranked: Vec<&str> = freq.most_common().into_iter().map(|(item, _)| item).collect();
/// assert_eq!(ranked, vec!["sodium", "glucose", "potassium"]);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ItemFrequency {
    #[serde(with = "indexmap::map::serde_seq")]
    item_count: IndexMap<String, u64>,
    total_item_count: u64,
}

impl ItemFrequency {
    pub fn new() -> Self {
        ItemFrequency {
            item_count: IndexMap::new(),
            total_item_count: 0,
        }
    }

    /// Count every item of every bag
    pub fn from_bags<B, S>(bags: &[B]) -> Self
    where
        B: AsRef<[S]>,
        S: AsRef<str>,
    {
        let mut freq = Self::new();
        for bag in bags {
            freq.add_items(bag.as_ref());
        }
        freq
    }

    #[inline]
    pub fn add_item(&mut self, item: &str) -> &mut Self {
        if let Some(count) = self.item_count.get_mut(item) {
            *count += 1;
        } else {
            self.item_count.insert(item.to_string(), 1);
        }
        self.total_item_count += 1;
        self
    }

    #[inline]
    pub fn add_items<T>(&mut self, items: &[T]) -> &mut Self
    where
        T: AsRef<str>,
    {
        for item in items {
            self.add_item(item.as_ref());
        }
        self
    }

    /// Occurrences of `item`, 0 when never seen
    #[inline]
    pub fn count(&self, item: &str) -> u64 {
        self.item_count.get(item).copied().unwrap_or(0)
    }

    /// Number of distinct items
    #[inline]
    pub fn len(&self) -> usize {
        self.item_count.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.item_count.is_empty()
    }

    /// Total number of occurrences across all items
    #[inline]
    pub fn total_count(&self) -> u64 {
        self.total_item_count
    }

    /// Items in first-seen order
    pub fn items(&self) -> impl Iterator<Item = &str> {
        self.item_count.keys().map(|k| k.as_str())
    }

    /// All items ordered by descending count.
    /// The sort is stable, so equal counts stay in first-seen order.
    pub fn most_common(&self) -> Vec<(&str, u64)> {
        let mut ranked: Vec<(&str, u64)> = self
            .item_count
            .iter()
            .map(|(item, &count)| (item.as_str(), count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }
}
