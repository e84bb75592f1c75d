//! Source registry: the static table of scrape targets and its query surface.
//!
//! The registry is pure data plus lookups; it never performs network I/O.
//! Entries are defined at process start and immutable afterwards. Iteration
//! order is definition order, which doubles as the tie-break for
//! [`SourceRegistry::list_by_priority_descending`].

use crate::models::{Selectors, SourceCategory, SourceConfig, UpdateFrequency};

/// The source every unknown id resolves to.
pub const DEFAULT_SOURCE_ID: &str = "afdb";

/// The built-in scrape targets, highest-value sources first.
static BUILTIN_SOURCES: &[SourceConfig] = &[
    SourceConfig {
        id: "afdb",
        url: "https://www.afdb.org/en/opportunities/business-opportunities",
        display_name: "African Development Bank",
        category: SourceCategory::International,
        priority: 10,
        update_frequency: UpdateFrequency::Daily,
        requires_rendering: false,
        selectors: Selectors {
            container: ".opportunities-list .item",
            title: ".opportunity-title",
            content: ".opportunity-content",
            date: ".posting-date",
            link: "a",
        },
    },
    SourceConfig {
        id: "unep",
        url: "https://www.unep.org/work-with-us/funding-and-partnerships",
        display_name: "UN Environment Programme",
        category: SourceCategory::International,
        priority: 9,
        update_frequency: UpdateFrequency::Weekly,
        requires_rendering: true,
        selectors: Selectors {
            container: ".funding-opportunity",
            title: "h3",
            content: ".description",
            date: ".deadline",
            link: "a.read-more",
        },
    },
    SourceConfig {
        id: "worldbank",
        url: "https://www.worldbank.org/en/projects-operations/procurement/notices",
        display_name: "World Bank",
        category: SourceCategory::International,
        priority: 9,
        update_frequency: UpdateFrequency::Daily,
        requires_rendering: true,
        selectors: Selectors {
            container: ".procurement-notice",
            title: ".notice-title",
            content: ".notice-description",
            date: ".notice-date",
            link: ".notice-link",
        },
    },
    SourceConfig {
        id: "afdb-climate",
        url: "https://www.afdb.org/en/topics-and-sectors/initiatives-partnerships/climate-investment-funds-cif/projects-investments",
        display_name: "AfDB Climate Investments",
        category: SourceCategory::International,
        priority: 9,
        update_frequency: UpdateFrequency::Monthly,
        requires_rendering: false,
        selectors: Selectors {
            container: ".climate-project",
            title: ".project-title",
            content: ".project-description",
            date: ".project-date",
            link: "a.project-link",
        },
    },
    SourceConfig {
        id: "unicef",
        url: "https://www.unicef.org/procurement/opportunities",
        display_name: "UNICEF",
        category: SourceCategory::International,
        priority: 8,
        update_frequency: UpdateFrequency::Weekly,
        requires_rendering: false,
        selectors: Selectors {
            container: ".procurement-item",
            title: ".procurement-title",
            content: ".procurement-description",
            date: ".procurement-deadline",
            link: "a",
        },
    },
    SourceConfig {
        id: "un",
        url: "https://www.un.org/en/funding/opportunities",
        display_name: "United Nations",
        category: SourceCategory::International,
        priority: 8,
        update_frequency: UpdateFrequency::Weekly,
        requires_rendering: false,
        selectors: Selectors {
            container: ".funding-opportunity",
            title: "h3",
            content: ".opportunity-description",
            date: ".opportunity-deadline",
            link: "a.more-info",
        },
    },
    SourceConfig {
        id: "undp-africa",
        url: "https://procurement-notices.undp.org/view_notice.cfm?notice_id=94794",
        display_name: "UNDP Africa",
        category: SourceCategory::Regional,
        priority: 8,
        update_frequency: UpdateFrequency::Weekly,
        requires_rendering: false,
        selectors: Selectors {
            container: ".procurement-notice",
            title: ".notice-title",
            content: ".notice-content",
            date: ".deadline-date",
            link: "a.notice-link",
        },
    },
    SourceConfig {
        id: "kenya",
        url: "https://www.treasury.go.ke/tenders/",
        display_name: "Kenya Treasury",
        category: SourceCategory::National,
        priority: 7,
        update_frequency: UpdateFrequency::Weekly,
        requires_rendering: false,
        selectors: Selectors {
            container: ".tender-item",
            title: ".tender-title",
            content: ".tender-description",
            date: ".closing-date",
            link: "a",
        },
    },
];

/// Lookup surface over a set of [`SourceConfig`] entries.
///
/// Holds the default source id used by [`SourceRegistry::resolve_url`] when
/// an unknown identifier comes in. A registry whose default id is absent from
/// its entries is a construction bug, not a runtime error path.
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    entries: Vec<SourceConfig>,
    default_id: &'static str,
}

impl SourceRegistry {
    /// Registry over the built-in source table.
    pub fn builtin() -> Self {
        Self::new(BUILTIN_SOURCES.to_vec(), DEFAULT_SOURCE_ID)
    }

    /// Registry over a custom entry set; used by tests.
    pub fn new(entries: Vec<SourceConfig>, default_id: &'static str) -> Self {
        let registry = Self {
            entries,
            default_id,
        };
        // Misconfiguration here is a programming error, caught at startup.
        registry.default_source();
        registry
    }

    /// Exact lookup by source id.
    pub fn get(&self, id: &str) -> Option<&SourceConfig> {
        self.entries.iter().find(|s| s.id == id)
    }

    /// The source unknown ids fall back to.
    pub fn default_source(&self) -> &SourceConfig {
        self.entries
            .iter()
            .find(|s| s.id == self.default_id)
            .expect("default source must exist in the registry")
    }

    /// Resolve a source id or pass through an already-absolute URL.
    ///
    /// Never fails: an input that looks like an absolute URL is returned
    /// unchanged, and an unknown id resolves to the default source's URL.
    pub fn resolve_url(&self, id_or_url: &str) -> String {
        if id_or_url.starts_with("http://") || id_or_url.starts_with("https://") {
            return id_or_url.to_string();
        }
        self.get(id_or_url)
            .unwrap_or_else(|| self.default_source())
            .url
            .to_string()
    }

    /// All sources ordered by priority, highest first.
    ///
    /// The sort is stable, so entries with equal priority keep their
    /// definition order.
    pub fn list_by_priority_descending(&self) -> Vec<&SourceConfig> {
        let mut sources: Vec<&SourceConfig> = self.entries.iter().collect();
        sources.sort_by_key(|s| std::cmp::Reverse(s.priority));
        sources
    }

    /// Sources in the given category, definition order preserved.
    pub fn list_by_category(&self, category: SourceCategory) -> Vec<&SourceConfig> {
        self.entries
            .iter()
            .filter(|s| s.category == category)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceCategory;

    fn source(id: &'static str, priority: u8, category: SourceCategory) -> SourceConfig {
        SourceConfig {
            id,
            url: "https://example.org/listings",
            display_name: id,
            category,
            priority,
            update_frequency: UpdateFrequency::Weekly,
            requires_rendering: false,
            selectors: Selectors {
                container: ".item",
                title: "h3",
                content: ".content",
                date: ".date",
                link: "a",
            },
        }
    }

    #[test]
    fn builtin_registry_invariants_hold() {
        let registry = SourceRegistry::builtin();
        assert_eq!(registry.len(), 8);
        for source in registry.list_by_priority_descending() {
            assert!(!source.url.is_empty());
            assert!(!source.selectors.container.is_empty());
        }
        assert_eq!(registry.default_source().id, DEFAULT_SOURCE_ID);
    }

    #[test]
    fn get_is_exact() {
        let registry = SourceRegistry::builtin();
        assert!(registry.get("afdb").is_some());
        assert!(registry.get("afdb-climate").is_some());
        assert!(registry.get("nope").is_none());
    }

    #[test]
    fn resolve_url_passes_absolute_urls_through() {
        let registry = SourceRegistry::builtin();
        let url = "https://example.org/some/page";
        assert_eq!(registry.resolve_url(url), url);
    }

    #[test]
    fn resolve_url_falls_back_to_default_for_unknown_ids() {
        let registry = SourceRegistry::builtin();
        assert_eq!(
            registry.resolve_url("not-a-source"),
            registry.default_source().url
        );
    }

    #[test]
    fn resolve_url_looks_up_known_ids() {
        let registry = SourceRegistry::builtin();
        assert_eq!(
            registry.resolve_url("kenya"),
            "https://www.treasury.go.ke/tenders/"
        );
    }

    #[test]
    fn priority_sort_is_stable_on_ties() {
        let registry = SourceRegistry::new(
            vec![
                source("a", 10, SourceCategory::International),
                source("b", 7, SourceCategory::International),
                source("c", 9, SourceCategory::International),
                source("d", 9, SourceCategory::International),
            ],
            "a",
        );
        let ordered: Vec<&str> = registry
            .list_by_priority_descending()
            .iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ordered, vec!["a", "c", "d", "b"]);
    }

    #[test]
    fn category_filter_preserves_order() {
        let registry = SourceRegistry::new(
            vec![
                source("a", 5, SourceCategory::National),
                source("b", 9, SourceCategory::Regional),
                source("c", 3, SourceCategory::National),
            ],
            "a",
        );
        let national: Vec<&str> = registry
            .list_by_category(SourceCategory::National)
            .iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(national, vec!["a", "c"]);
    }
}
