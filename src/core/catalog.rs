//! Catalog snapshots and component resolution
//!
//! Component ids are resolved once, when the [`Catalog`] index is built,
//! into an explicit [`CatalogItem`] variant.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::core::entity::{CatalogEntity, ItemKind};
use crate::entities::{Labor, Material, Work};

/// A resolved catalog entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CatalogItem<'a> {
    Material(&'a Material),
    Labor(&'a Labor),
    Work(&'a Work),
}

impl<'a> CatalogItem<'a> {
    pub fn kind(&self) -> ItemKind {
        match self {
            CatalogItem::Material(_) => ItemKind::Material,
            CatalogItem::Labor(_) => ItemKind::Labor,
            CatalogItem::Work(_) => ItemKind::Work,
        }
    }

    pub fn id(&self) -> &'a str {
        match self {
            CatalogItem::Material(m) => &m.id,
            CatalogItem::Labor(l) => &l.id,
            CatalogItem::Work(w) => &w.id,
        }
    }

    pub fn name(&self) -> &'a str {
        match self {
            CatalogItem::Material(m) => &m.name,
            CatalogItem::Labor(l) => &l.name,
            CatalogItem::Work(w) => &w.name,
        }
    }

    pub fn unit(&self) -> &'a str {
        match self {
            CatalogItem::Material(m) => &m.unit,
            CatalogItem::Labor(l) => &l.unit,
            CatalogItem::Work(w) => &w.unit,
        }
    }

    /// Unit price as stored in the catalog (cached recommended price for works)
    pub fn unit_price(&self) -> Decimal {
        match self {
            CatalogItem::Material(m) => m.unit_price(),
            CatalogItem::Labor(l) => l.unit_price(),
            CatalogItem::Work(w) => w.unit_price(),
        }
    }

    pub fn as_work(&self) -> Option<&'a Work> {
        match self {
            CatalogItem::Work(w) => Some(w),
            _ => None,
        }
    }
}

/// What a component id turned out to be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Material,
    Labor,
    Work,
    /// The id matched nothing in the catalog
    Unresolved,
}

impl From<ItemKind> for ComponentKind {
    fn from(kind: ItemKind) -> Self {
        match kind {
            ItemKind::Material => ComponentKind::Material,
            ItemKind::Labor => ComponentKind::Labor,
            ItemKind::Work => ComponentKind::Work,
        }
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComponentKind::Material => write!(f, "material"),
            ComponentKind::Labor => write!(f, "labor"),
            ComponentKind::Work => write!(f, "work"),
            ComponentKind::Unresolved => write!(f, "unresolved"),
        }
    }
}

/// Read-only view over the three catalogs for one engine call
#[derive(Debug, Clone)]
pub struct Catalog<'a> {
    materials: &'a [Material],
    labor: &'a [Labor],
    works: &'a [Work],
    index: HashMap<&'a str, CatalogItem<'a>>,
}

impl<'a> Catalog<'a> {
    /// Index the catalogs by id
    ///
    /// Ids are expected to be unique across the three catalogs. When they are
    /// not, the first entry wins in the order materials, labor, works.
    pub fn new(materials: &'a [Material], labor: &'a [Labor], works: &'a [Work]) -> Self {
        let mut index: HashMap<&'a str, CatalogItem<'a>> =
            HashMap::with_capacity(materials.len() + labor.len() + works.len());

        let entries = materials
            .iter()
            .map(CatalogItem::Material)
            .chain(labor.iter().map(CatalogItem::Labor))
            .chain(works.iter().map(CatalogItem::Work));

        for item in entries {
            if let Some(existing) = index.get(item.id()) {
                tracing::warn!(
                    id = item.id(),
                    kept = %existing.kind(),
                    ignored = %item.kind(),
                    "duplicate catalog id"
                );
                continue;
            }
            index.insert(item.id(), item);
        }

        Self {
            materials,
            labor,
            works,
            index,
        }
    }

    /// Resolve a component id
    pub fn resolve(&self, id: &str) -> Option<CatalogItem<'a>> {
        self.index.get(id).copied()
    }

    /// Look up a work by id
    pub fn work(&self, id: &str) -> Option<&'a Work> {
        self.resolve(id).and_then(|item| item.as_work())
    }

    pub fn materials(&self) -> &'a [Material] {
        self.materials
    }

    pub fn labor(&self) -> &'a [Labor] {
        self.labor
    }

    pub fn works(&self) -> &'a [Work] {
        self.works
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// Owned catalogs, as read from a snapshot file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub materials: Vec<Material>,

    #[serde(default)]
    pub labor: Vec<Labor>,

    #[serde(default)]
    pub works: Vec<Work>,
}

impl CatalogSnapshot {
    /// Borrow the snapshot as a resolvable catalog
    pub fn catalog(&self) -> Catalog<'_> {
        Catalog::new(&self.materials, &self.labor, &self.works)
    }
}
