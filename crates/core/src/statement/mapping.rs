//! Fixed classification of ledger labels into balance-sheet categories.
//!
//! The table is hand-authored: each subcategory lists its display item
//! names (in display order) with the canonical ledger label they match, and
//! names the strategy used to find matching rows.

/// How a subcategory finds its rows in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchStrategy {
    /// Rows whose category is the subcategory name, matched on designation;
    /// reads the unit value.
    ScopedDesignation,
    /// Label must exist as some row's category; the value is then read from
    /// any row whose designation is the label (unit value).
    LedgerDesignation,
    /// Rows whose category is the label itself; reads the total.
    CategoryLabel,
    /// Substring classification of debt rows into supplier / other buckets;
    /// reads the total.
    DebtClassification,
    /// Rows whose category is the subcategory name, keyed by designation;
    /// reads the unit value.
    EquityDesignation,
}

/// A subcategory of the statement and its item table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subcategory {
    /// Display name, also the ledger category for scoped strategies.
    pub name: &'static str,
    /// Row matching strategy.
    pub strategy: MatchStrategy,
    /// `(display item name, canonical ledger label)` pairs in display order.
    pub items: &'static [(&'static str, &'static str)],
}

impl Subcategory {
    /// Returns the ledger label mapped to a display item name.
    #[must_use]
    pub fn label(&self, item: &str) -> Option<&'static str> {
        self.items
            .iter()
            .find(|(name, _)| *name == item)
            .map(|(_, label)| *label)
    }

    /// Returns true when `name` is one of the display item names.
    #[must_use]
    pub fn has_item(&self, name: &str) -> bool {
        self.items.iter().any(|(item, _)| *item == name)
    }
}

/// An asset category grouping several subcategories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    /// Display name.
    pub name: &'static str,
    /// Subcategories in display order.
    pub subcategories: &'static [Subcategory],
}

/// Tangible fixed assets.
pub const TANGIBLE_ASSETS: Subcategory = Subcategory {
    name: "Immobilisations corporelles",
    strategy: MatchStrategy::ScopedDesignation,
    items: &[
        ("Batiments", "Batiments"),
        ("Materiel", "Materiel"),
        ("Vehicules", "Vehicules"),
        ("Equipements", "Equipements"),
        ("Terrains", "Terrains"),
    ],
};

/// Intangible fixed assets.
pub const INTANGIBLE_ASSETS: Subcategory = Subcategory {
    name: "Immobilisations incorporelles",
    strategy: MatchStrategy::ScopedDesignation,
    items: &[
        ("Logiciels", "Logiciels"),
        ("Brevets", "Brevets"),
        ("Fonds commercial", "Fonds commercial"),
    ],
};

/// Inventory.
pub const INVENTORY: Subcategory = Subcategory {
    name: "Stocks",
    strategy: MatchStrategy::LedgerDesignation,
    items: &[
        ("Stock marchandises", "Stock marchandises"),
        ("Matieres premieres", "Matieres premieres"),
        ("Produits finis", "Produits finis"),
    ],
};

/// Receivables.
pub const RECEIVABLES: Subcategory = Subcategory {
    name: "Créances",
    strategy: MatchStrategy::LedgerDesignation,
    items: &[
        ("Clients", "Créances clients"),
        ("Autres créances", "Autres créances"),
    ],
};

/// Miscellaneous operating charges.
pub const MISCELLANEOUS: Subcategory = Subcategory {
    name: "Divers",
    strategy: MatchStrategy::CategoryLabel,
    items: &[
        ("Loyer", "Loyer"),
        ("Electricite", "Electricite"),
        ("Eau", "Eau"),
        ("Gaz", "Gaz"),
        ("location", "location"),
        ("Assurances", "Assurances"),
        ("Publicite", "Publicite"),
        ("Transport", "Transport"),
        ("Charges sociales", "Charges sociales"),
        ("Charges de personnel", "Charges de personnel"),
        ("Entretien", "Entretien"),
        ("Achats non stockes", "Achats non stockes"),
        ("Internet", "Internet"),
    ],
};

/// Equity.
pub const EQUITY: Subcategory = Subcategory {
    name: "Capitaux propres",
    strategy: MatchStrategy::EquityDesignation,
    items: &[
        ("capital social", "capital social"),
        ("Reserves", "Reserves"),
    ],
};

/// Payables.
///
/// Only the "Fournisseurs" and "Autres dettes" names are used as buckets;
/// loans have no classification rule of their own and land in "Autres dettes".
pub const PAYABLES: Subcategory = Subcategory {
    name: "Dettes",
    strategy: MatchStrategy::DebtClassification,
    items: &[
        ("Emprunts", "Emprunts"),
        ("Fournisseurs", "Dettes fournisseurs"),
        ("Autres dettes", "Autres dettes"),
    ],
};

/// Fixed assets.
pub const FIXED_ASSETS: Category = Category {
    name: "Actif immobilisé",
    subcategories: &[TANGIBLE_ASSETS, INTANGIBLE_ASSETS],
};

/// Current assets.
pub const CURRENT_ASSETS: Category = Category {
    name: "Actif circulant",
    subcategories: &[INVENTORY, RECEIVABLES, MISCELLANEOUS],
};

/// Layout of the whole statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryMapping {
    /// Asset categories in display order.
    pub asset: &'static [Category],
    /// Liability subcategories in display order.
    pub liability: &'static [Subcategory],
}

impl CategoryMapping {
    /// The standard balance-sheet layout.
    pub const STANDARD: Self = Self {
        asset: &[FIXED_ASSETS, CURRENT_ASSETS],
        liability: &[EQUITY, PAYABLES],
    };

    /// Iterates over every subcategory, asset side first.
    pub fn subcategories(&self) -> impl Iterator<Item = &'static Subcategory> {
        self.asset
            .iter()
            .flat_map(|category| category.subcategories.iter())
            .chain(self.liability.iter())
    }

    /// Finds a subcategory by name.
    #[must_use]
    pub fn subcategory(&self, name: &str) -> Option<&'static Subcategory> {
        self.subcategories().find(|s| s.name == name)
    }
}

impl Default for CategoryMapping {
    fn default() -> Self {
        Self::STANDARD
    }
}
