//! Indented bill of materials for display
//!
//! [`flatten`] walks a Work's composition tree in pre-order and yields one
//! entry per component, descending into a sub-work only when the caller
//! has it expanded. Depth is for indentation only; costs come from
//! [`rollup`](crate::core::rollup::rollup).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::iter::FusedIterator;

use crate::core::catalog::{Catalog, CatalogItem, ComponentKind};
use crate::core::error::PricingError;
use crate::entities::work::{Component, Work};

/// One row of a flattened BOM
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BomEntry {
    pub component_id: String,
    /// 0 for the work's direct components
    pub depth: usize,
    pub kind: ComponentKind,
    pub name: String,
    pub unit: String,
    /// Catalog price; the stored recommended price for sub-works
    pub unit_price: Decimal,
    pub quantity: Decimal,
    /// The entry is a sub-work whose children follow
    pub expanded: bool,
}

/// Which sub-works to descend into
#[derive(Debug, Clone, Copy)]
pub enum Expansion<'e> {
    /// Direct components only
    None,
    /// Every sub-work
    All,
    /// Only the listed sub-work ids
    Only(&'e HashSet<String>),
}

impl Expansion<'_> {
    fn expands(&self, id: &str) -> bool {
        match self {
            Expansion::None => false,
            Expansion::All => true,
            Expansion::Only(ids) => ids.contains(id),
        }
    }
}

/// Lazy pre-order walk over a Work's composition
///
/// The walk only borrows its inputs; call [`flatten`] again to start over.
/// After a cycle or depth error the iterator is exhausted.
#[derive(Debug, Clone)]
pub struct Flatten<'a> {
    catalog: &'a Catalog<'a>,
    expansion: Expansion<'a>,
    max_depth: usize,
    /// Component iterators of the works being walked, outermost first
    stack: Vec<std::slice::Iter<'a, Component>>,
    /// Ids of the works being walked, parallel to `stack`
    path: Vec<&'a str>,
    finished: bool,
}

/// Walk `work`'s components, expanding sub-works per `expansion`
pub fn flatten<'a>(
    work: &'a Work,
    catalog: &'a Catalog<'a>,
    expansion: Expansion<'a>,
    max_depth: usize,
) -> Flatten<'a> {
    Flatten {
        catalog,
        expansion,
        max_depth,
        stack: vec![work.components.iter()],
        path: vec![work.id.as_str()],
        finished: false,
    }
}

impl<'a> Flatten<'a> {
    fn fail(&mut self, err: PricingError) -> Option<Result<BomEntry, PricingError>> {
        self.finished = true;
        self.stack.clear();
        self.path.clear();
        Some(Err(err))
    }
}

impl<'a> Iterator for Flatten<'a> {
    type Item = Result<BomEntry, PricingError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            let Some(components) = self.stack.last_mut() else {
                self.finished = true;
                return None;
            };
            let Some(component) = components.next() else {
                self.stack.pop();
                self.path.pop();
                continue;
            };

            let depth = self.stack.len() - 1;
            let id = component.component_id.as_str();
            let resolved = self.catalog.resolve(id);

            let mut entry = match resolved {
                Some(item) => BomEntry {
                    component_id: id.to_string(),
                    depth,
                    kind: item.kind().into(),
                    name: item.name().to_string(),
                    unit: item.unit().to_string(),
                    unit_price: item.unit_price(),
                    quantity: component.quantity,
                    expanded: false,
                },
                None => {
                    tracing::warn!(component = id, "unresolved component in BOM");
                    BomEntry {
                        component_id: id.to_string(),
                        depth,
                        kind: ComponentKind::Unresolved,
                        name: id.to_string(),
                        unit: String::new(),
                        unit_price: Decimal::ZERO,
                        quantity: component.quantity,
                        expanded: false,
                    }
                }
            };

            if let Some(CatalogItem::Work(sub)) = resolved {
                if self.expansion.expands(&sub.id) {
                    if let Some(start) = self.path.iter().position(|p| *p == sub.id) {
                        let mut ids: Vec<String> =
                            self.path[start..].iter().map(|p| p.to_string()).collect();
                        ids.push(sub.id.clone());
                        return self.fail(PricingError::CompositionCycle { ids });
                    }
                    if self.stack.len() > self.max_depth {
                        return self.fail(PricingError::DepthExceeded {
                            id: sub.id.clone(),
                            max_depth: self.max_depth,
                        });
                    }
                    entry.expanded = true;
                    self.stack.push(sub.components.iter());
                    self.path.push(sub.id.as_str());
                }
            }

            return Some(Ok(entry));
        }
    }
}

impl FusedIterator for Flatten<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Labor, Material};
    use rust_decimal_macros::dec;

    struct Fixture {
        materials: Vec<Material>,
        labor: Vec<Labor>,
        works: Vec<Work>,
    }

    fn fixture() -> Fixture {
        let mut sub = Work::new("S", "Ragréage", "m2").with_component("C", dec!(3));
        sub.recommended_price = dec!(5.4);
        Fixture {
            materials: vec![
                Material::new("A", "Carreau", "m2", dec!(10)),
                Material::new("C", "Colle", "kg", dec!(1.5)),
            ],
            labor: vec![Labor::new("B", "Carreleur", "h", dec!(50))],
            works: vec![
                sub,
                Work::new("T", "Sol complet", "m2")
                    .with_component("A", dec!(1))
                    .with_component("S", dec!(1))
                    .with_component("B", dec!(0.3)),
            ],
        }
    }

    fn ids(entries: &[BomEntry]) -> Vec<(String, usize)> {
        entries
            .iter()
            .map(|e| (e.component_id.clone(), e.depth))
            .collect()
    }

    #[test]
    fn test_collapsed_lists_direct_components() {
        let f = fixture();
        let catalog = Catalog::new(&f.materials, &f.labor, &f.works);
        let work = catalog.work("T").unwrap();

        let entries: Vec<BomEntry> = flatten(work, &catalog, Expansion::None, 64)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(
            ids(&entries),
            vec![("A".into(), 0), ("S".into(), 0), ("B".into(), 0)]
        );
        assert_eq!(entries[1].kind, ComponentKind::Work);
        assert_eq!(entries[1].unit_price, dec!(5.4));
        assert!(!entries[1].expanded);
    }

    #[test]
    fn test_expanded_sub_work_follows_parent() {
        let f = fixture();
        let catalog = Catalog::new(&f.materials, &f.labor, &f.works);
        let work = catalog.work("T").unwrap();
        let expanded: HashSet<String> = ["S".to_string()].into_iter().collect();

        let entries: Vec<BomEntry> = flatten(work, &catalog, Expansion::Only(&expanded), 64)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(
            ids(&entries),
            vec![
                ("A".into(), 0),
                ("S".into(), 0),
                ("C".into(), 1),
                ("B".into(), 0)
            ]
        );
        assert!(entries[1].expanded);
        assert_eq!(entries[2].name, "Colle");
    }

    #[test]
    fn test_unresolved_entry() {
        let f = fixture();
        let catalog = Catalog::new(&f.materials, &f.labor, &f.works);
        let work = Work::new("X", "Brouillon", "u").with_component("GHOST", dec!(2));

        let entries: Vec<BomEntry> = flatten(&work, &catalog, Expansion::All, 64)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, ComponentKind::Unresolved);
        assert_eq!(entries[0].unit_price, dec!(0));
    }

    #[test]
    fn test_cycle_stops_the_walk() {
        let works = vec![
            Work::new("W1", "Un", "u").with_component("W2", dec!(1)),
            Work::new("W2", "Deux", "u").with_component("W1", dec!(1)),
        ];
        let catalog = Catalog::new(&[], &[], &works);
        let work = catalog.work("W1").unwrap();

        let mut walk = flatten(work, &catalog, Expansion::All, 64);
        assert_eq!(walk.next().unwrap().unwrap().component_id, "W2");
        match walk.next() {
            Some(Err(PricingError::CompositionCycle { ids })) => {
                assert_eq!(ids, vec!["W1", "W2", "W1"]);
            }
            other => panic!("expected cycle, got {:?}", other),
        }
        assert!(walk.next().is_none());

        // collapsed, the same graph is finite
        assert_eq!(flatten(work, &catalog, Expansion::None, 64).count(), 1);
    }

    #[test]
    fn test_depth_budget_stops_the_walk() {
        let works: Vec<Work> = (0..4)
            .map(|i| {
                Work::new(format!("W{}", i), "Niveau", "u")
                    .with_component(format!("W{}", i + 1), dec!(1))
            })
            .collect();
        let catalog = Catalog::new(&[], &[], &works);
        let work = catalog.work("W0").unwrap();

        let mut walk = flatten(work, &catalog, Expansion::All, 1);
        let first = walk.next().unwrap().unwrap();
        assert_eq!((first.component_id.as_str(), first.depth), ("W1", 0));
        assert!(first.expanded);
        assert_eq!(
            walk.next(),
            Some(Err(PricingError::DepthExceeded {
                id: "W2".to_string(),
                max_depth: 1
            }))
        );
        assert!(walk.next().is_none());
        assert!(walk.next().is_none());

        // the same chain fits a larger budget
        let entries: Vec<BomEntry> = flatten(work, &catalog, Expansion::All, 64)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[3].kind, ComponentKind::Unresolved);
    }

    #[test]
    fn test_indirect_cycle_only_when_expanded() {
        let works = vec![
            Work::new("W1", "Un", "u").with_component("W2", dec!(1)),
            Work::new("W2", "Deux", "u").with_component("W3", dec!(1)),
            Work::new("W3", "Trois", "u").with_component("W1", dec!(1)),
        ];
        let catalog = Catalog::new(&[], &[], &works);
        let work = catalog.work("W1").unwrap();

        let partial: HashSet<String> = ["W2", "W3"].iter().map(|s| s.to_string()).collect();
        let entries: Vec<BomEntry> = flatten(work, &catalog, Expansion::Only(&partial), 64)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(
            ids(&entries),
            vec![("W2".into(), 0), ("W3".into(), 1), ("W1".into(), 2)]
        );
        assert!(!entries[2].expanded);

        let full: HashSet<String> = ["W1", "W2", "W3"].iter().map(|s| s.to_string()).collect();
        let results: Vec<_> = flatten(work, &catalog, Expansion::Only(&full), 64).collect();
        assert_eq!(results.len(), 3);
        assert!(results[..2].iter().all(|r| r.is_ok()));
        assert_eq!(
            results[2],
            Err(PricingError::CompositionCycle {
                ids: vec![
                    "W1".to_string(),
                    "W2".to_string(),
                    "W3".to_string(),
                    "W1".to_string()
                ]
            })
        );
    }

    #[test]
    fn test_restart_yields_same_sequence() {
        let f = fixture();
        let catalog = Catalog::new(&f.materials, &f.labor, &f.works);
        let work = catalog.work("T").unwrap();

        let first: Vec<_> = flatten(work, &catalog, Expansion::All, 64).collect();
        let second: Vec<_> = flatten(work, &catalog, Expansion::All, 64).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
    }
}
