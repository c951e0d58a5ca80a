//! Balance-sheet construction from ledger rows.

use bilan_shared::DebtPolicy;
use rust_decimal::Decimal;
use tracing::debug;

use super::mapping::{CategoryMapping, MatchStrategy, Subcategory};
use super::types::{ASSET_SIDE, Group, LIABILITY_SIDE, LineItem, Statement, round_total};
use crate::ledger::LedgerRow;

/// Case-insensitive marker selecting payables rows by category.
const DEBT_MARKER: &str = "dettes";

/// Case-sensitive marker classifying a payables row as a supplier debt.
const SUPPLIER_MARKER: &str = "Fournisseurs";

/// Bucket receiving supplier debts.
const SUPPLIER_BUCKET: &str = "Fournisseurs";

/// Bucket receiving every other debt.
const OTHER_DEBTS_BUCKET: &str = "Autres dettes";

/// Builds a [`Statement`] from a ledger snapshot.
///
/// The builder is pure: the same rows always produce the same statement.
#[derive(Debug, Clone, Copy)]
pub struct BilanBuilder {
    mapping: CategoryMapping,
    debt_policy: DebtPolicy,
}

impl Default for BilanBuilder {
    fn default() -> Self {
        Self::new(CategoryMapping::STANDARD)
    }
}

impl BilanBuilder {
    /// Creates a builder over the given mapping with the corrected debt policy.
    #[must_use]
    pub const fn new(mapping: CategoryMapping) -> Self {
        Self {
            mapping,
            debt_policy: DebtPolicy::Corrected,
        }
    }

    /// Sets the payables accumulation policy.
    #[must_use]
    pub const fn with_debt_policy(mut self, debt_policy: DebtPolicy) -> Self {
        self.debt_policy = debt_policy;
        self
    }

    /// Builds the statement.
    ///
    /// Subcategories without matches are omitted; category and branch totals
    /// are always present. Every total is rounded at its own level.
    #[must_use]
    pub fn build(&self, rows: &[LedgerRow]) -> Statement {
        let asset_categories = self
            .mapping
            .asset
            .iter()
            .map(|category| {
                let subcategories = category
                    .subcategories
                    .iter()
                    .filter_map(|sub| self.subcategory(sub, rows))
                    .collect();
                Group::rollup(category.name, subcategories)
            })
            .collect();

        let liability_subcategories = self
            .mapping
            .liability
            .iter()
            .filter_map(|sub| self.subcategory(sub, rows))
            .collect();

        Statement {
            asset: Group::rollup(ASSET_SIDE, asset_categories),
            liability: Group::rollup(LIABILITY_SIDE, liability_subcategories),
        }
    }

    fn subcategory(&self, sub: &Subcategory, rows: &[LedgerRow]) -> Option<Group> {
        let items = match sub.strategy {
            MatchStrategy::ScopedDesignation => scoped_designation(sub, rows),
            MatchStrategy::LedgerDesignation => ledger_designation(sub, rows),
            MatchStrategy::CategoryLabel => category_label(sub, rows),
            MatchStrategy::EquityDesignation => equity_designation(sub, rows),
            MatchStrategy::DebtClassification => {
                return debt_classification(sub, rows, self.debt_policy);
            }
        };

        (!items.is_empty()).then(|| Group::with_items(sub.name, items))
    }
}

/// Returns the first value among `matches`, or `None` when nothing matches
/// or any matching row has a null cell.
fn first_complete<'r>(
    sub: &Subcategory,
    item: &str,
    matches: impl Iterator<Item = &'r LedgerRow>,
    column: fn(&LedgerRow) -> Option<Decimal>,
) -> Option<LineItem> {
    let mut first = None;
    for row in matches {
        let Some(value) = column(row) else {
            debug!(subcategory = sub.name, item, "skipping item with null amount");
            return None;
        };
        first.get_or_insert(value);
    }
    first.map(|value| LineItem::new(item, value))
}

fn unit_value(row: &LedgerRow) -> Option<Decimal> {
    row.unit_value
}

fn total(row: &LedgerRow) -> Option<Decimal> {
    row.total
}

fn scoped_designation(sub: &Subcategory, rows: &[LedgerRow]) -> Vec<LineItem> {
    let scoped: Vec<&LedgerRow> = rows.iter().filter(|r| r.category == sub.name).collect();

    sub.items
        .iter()
        .filter_map(|(item, label)| {
            let matches = scoped.iter().copied().filter(|r| r.designation == *label);
            first_complete(sub, item, matches, unit_value)
        })
        .collect()
}

fn ledger_designation(sub: &Subcategory, rows: &[LedgerRow]) -> Vec<LineItem> {
    sub.items
        .iter()
        .filter(|(_, label)| rows.iter().any(|r| r.category == *label))
        .filter_map(|(item, label)| {
            let matches = rows.iter().filter(|r| r.designation == *label);
            first_complete(sub, item, matches, unit_value)
        })
        .collect()
}

fn category_label(sub: &Subcategory, rows: &[LedgerRow]) -> Vec<LineItem> {
    sub.items
        .iter()
        .filter_map(|(item, label)| {
            let matches = rows.iter().filter(|r| r.category == *label);
            first_complete(sub, item, matches, total)
        })
        .collect()
}

fn equity_designation(sub: &Subcategory, rows: &[LedgerRow]) -> Vec<LineItem> {
    let mut values: Vec<Option<Decimal>> = vec![None; sub.items.len()];

    for row in rows.iter().filter(|r| r.category == sub.name) {
        let Some(value) = row.unit_value else {
            debug!(
                subcategory = sub.name,
                designation = %row.designation,
                "skipping equity row with null amount"
            );
            continue;
        };
        let Some(idx) = sub.items.iter().position(|(key, _)| *key == row.designation) else {
            continue;
        };
        let current = values[idx].unwrap_or(Decimal::ZERO);
        match current.checked_add(value) {
            Some(sum) => values[idx] = Some(sum),
            None => debug!(
                subcategory = sub.name,
                designation = %row.designation,
                "skipping equity row that overflows"
            ),
        }
    }

    sub.items
        .iter()
        .zip(values)
        .filter_map(|((item, _), value)| value.map(|v| LineItem::new(*item, v)))
        .collect()
}

fn debt_classification(
    sub: &Subcategory,
    rows: &[LedgerRow],
    policy: DebtPolicy,
) -> Option<Group> {
    let mut suppliers: Option<Decimal> = None;
    let mut others: Option<Decimal> = None;
    let mut last_amount: Option<Decimal> = None;
    let mut running_total = Decimal::ZERO;

    let selected = rows
        .iter()
        .filter(|r| r.category.to_lowercase().contains(DEBT_MARKER));

    for row in selected {
        let amount = match (row.total, policy) {
            (Some(amount), _) => amount,
            (None, DebtPolicy::Legacy) => Decimal::ZERO,
            (None, DebtPolicy::Corrected) => {
                debug!(designation = %row.designation, "skipping debt row with null total");
                continue;
            }
        };

        let supplier = row.designation.contains(SUPPLIER_MARKER);
        let bucket = if supplier {
            Some(&mut suppliers)
        } else if policy == DebtPolicy::Corrected {
            Some(&mut others)
        } else {
            // Legacy opens the bucket without crediting the row.
            others.get_or_insert(Decimal::ZERO);
            None
        };

        let bucket_sum = match bucket {
            Some(bucket) => match bucket.unwrap_or(Decimal::ZERO).checked_add(amount) {
                Some(sum) => Some((bucket, sum)),
                None => {
                    debug!(designation = %row.designation, "skipping debt row that overflows");
                    continue;
                }
            },
            None => None,
        };
        // Legacy keeps only the last processed amount as the payables total.
        let total = match policy {
            DebtPolicy::Legacy => amount,
            DebtPolicy::Corrected => {
                let Some(total) = running_total.checked_add(amount) else {
                    debug!(designation = %row.designation, "skipping debt row that overflows");
                    continue;
                };
                total
            }
        };

        if let Some((bucket, sum)) = bucket_sum {
            *bucket = Some(sum);
        }
        running_total = total;
        last_amount = Some(amount);
    }

    // Legacy accumulation credits the last processed row once, after the scan.
    if policy == DebtPolicy::Legacy
        && let Some(amount) = last_amount
    {
        let opened = others.unwrap_or(Decimal::ZERO);
        others = Some(opened.checked_add(amount).unwrap_or(opened));
    }

    let items: Vec<LineItem> = [(SUPPLIER_BUCKET, suppliers), (OTHER_DEBTS_BUCKET, others)]
        .into_iter()
        .filter_map(|(bucket, value)| value.map(|v| LineItem::new(bucket, v)))
        .collect();

    if items.is_empty() {
        return None;
    }

    Some(Group::with_total(sub.name, items, round_total(running_total)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn build(rows: &[LedgerRow]) -> Statement {
        BilanBuilder::default().build(rows)
    }

    fn legacy(rows: &[LedgerRow]) -> Statement {
        BilanBuilder::default()
            .with_debt_policy(DebtPolicy::Legacy)
            .build(rows)
    }

    #[test]
    fn test_tangible_assets_example() {
        let rows = vec![
            LedgerRow::new("Immobilisations corporelles", "Batiments")
                .with_unit_value(dec!(10000.0)),
            LedgerRow::new("Immobilisations corporelles", "Materiel")
                .with_unit_value(dec!(2500.5)),
        ];

        let statement = build(&rows);
        let group = statement
            .asset
            .group("Actif immobilisé")
            .and_then(|g| g.group("Immobilisations corporelles"))
            .expect("tangible assets present");

        assert_eq!(group.item("Batiments"), Some(dec!(10000.0)));
        assert_eq!(group.item("Materiel"), Some(dec!(2500.5)));
        assert_eq!(group.total, dec!(12500.5));
        assert_eq!(group.entries.len(), 2);
    }

    #[test]
    fn test_scoped_designation_requires_matching_category() {
        let rows = vec![
            LedgerRow::new("Immobilisations incorporelles", "Batiments").with_unit_value(dec!(10)),
            LedgerRow::new("Immobilisations incorporelles", "Brevets").with_unit_value(dec!(40)),
        ];

        let statement = build(&rows);
        let fixed = statement.asset.group("Actif immobilisé").expect("category");
        assert!(fixed.group("Immobilisations corporelles").is_none());
        assert_eq!(
            fixed
                .group("Immobilisations incorporelles")
                .and_then(|g| g.item("Brevets")),
            Some(dec!(40))
        );
        assert_eq!(fixed.total, dec!(40));
    }

    #[test]
    fn test_null_unit_value_is_absent() {
        let rows = vec![
            LedgerRow::new("Immobilisations corporelles", "Batiments"),
            LedgerRow::new("Immobilisations corporelles", "Terrains").with_unit_value(dec!(700)),
        ];

        let statement = build(&rows);
        let path = ["ACTIF", "Actif immobilisé", "Immobilisations corporelles"];
        assert_eq!(statement.value(&[path[0], path[1], path[2], "Batiments"]), None);
        assert_eq!(
            statement.value(&[path[0], path[1], path[2], "TOTAL"]),
            Some(dec!(700))
        );
    }

    #[test]
    fn test_duplicate_with_null_excludes_item() {
        let rows = vec![
            LedgerRow::new("Immobilisations corporelles", "Vehicules").with_unit_value(dec!(900)),
            LedgerRow::new("Immobilisations corporelles", "Vehicules"),
        ];

        let statement = build(&rows);
        assert!(statement
            .asset
            .group("Actif immobilisé")
            .and_then(|g| g.group("Immobilisations corporelles"))
            .is_none());
    }

    #[test]
    fn test_duplicates_take_first_value() {
        let rows = vec![
            LedgerRow::new("Immobilisations corporelles", "Vehicules").with_unit_value(dec!(900)),
            LedgerRow::new("Immobilisations corporelles", "Vehicules").with_unit_value(dec!(100)),
        ];

        let statement = build(&rows);
        assert_eq!(
            statement.value(&[
                "ACTIF",
                "Actif immobilisé",
                "Immobilisations corporelles",
                "Vehicules"
            ]),
            Some(dec!(900))
        );
    }

    #[test]
    fn test_inventory_requires_label_as_category() {
        let rows = vec![
            LedgerRow::new("Stocks", "Produits finis").with_unit_value(dec!(300)),
            LedgerRow::new("Produits finis", "Produits finis").with_unit_value(dec!(120)),
            LedgerRow::new("Stocks", "Stock marchandises").with_unit_value(dec!(55)),
        ];

        let statement = build(&rows);
        let stocks = statement
            .asset
            .group("Actif circulant")
            .and_then(|g| g.group("Stocks"))
            .expect("inventory present");

        // "Stock marchandises" never appears as a category, so it is not looked up.
        assert_eq!(stocks.item("Stock marchandises"), None);
        assert_eq!(stocks.item("Produits finis"), Some(dec!(300)));
        assert_eq!(stocks.total, dec!(300));
    }

    #[test]
    fn test_receivables_use_canonical_label() {
        let rows = vec![
            LedgerRow::new("Créances clients", "Créances clients").with_unit_value(dec!(1500.75)),
        ];

        let statement = build(&rows);
        assert_eq!(
            statement.value(&["ACTIF", "Actif circulant", "Créances", "Clients"]),
            Some(dec!(1500.75))
        );
    }

    #[test]
    fn test_miscellaneous_reads_total_by_category() {
        let rows = vec![
            LedgerRow::new("Loyer", "Loyer janvier")
                .with_unit_value(dec!(1))
                .with_total(dec!(1200)),
            LedgerRow::new("Loyer", "Loyer fevrier").with_total(dec!(1300)),
            LedgerRow::new("Electricite", "Facture").with_unit_value(dec!(80)),
            LedgerRow::new("Internet", "Box").with_total(dec!(39.99)),
        ];

        let statement = build(&rows);
        let divers = statement
            .asset
            .group("Actif circulant")
            .and_then(|g| g.group("Divers"))
            .expect("divers present");

        assert_eq!(divers.item("Loyer"), Some(dec!(1200)));
        assert_eq!(divers.item("Electricite"), None);
        assert_eq!(divers.item("Internet"), Some(dec!(39.99)));
        assert_eq!(divers.total, dec!(1239.99));
        assert_eq!(
            statement.value(&["ACTIF", "Actif circulant", "TOTAL"]),
            Some(dec!(1239.99))
        );
        assert_eq!(statement.value(&["ACTIF", "TOTAL"]), Some(dec!(1239.99)));
    }

    #[test]
    fn test_current_assets_total_covers_every_subcategory() {
        let rows = vec![
            LedgerRow::new("Stock marchandises", "Stock marchandises").with_unit_value(dec!(100)),
            LedgerRow::new("Autres créances", "Autres créances").with_unit_value(dec!(20)),
            LedgerRow::new("Gaz", "Gaz").with_total(dec!(3)),
        ];

        let statement = build(&rows);
        assert_eq!(
            statement.value(&["ACTIF", "Actif circulant", "TOTAL"]),
            Some(dec!(123))
        );
    }

    #[test]
    fn test_supplier_debt_example() {
        let rows = vec![
            LedgerRow::new("Dettes fournisseurs", "Dettes Fournisseurs X").with_total(dec!(500)),
        ];

        let statement = build(&rows);
        let dettes = statement.liability.group("Dettes").expect("payables present");
        assert_eq!(dettes.item("Fournisseurs"), Some(dec!(500)));
        assert_eq!(dettes.item("Autres dettes"), None);
        assert_eq!(dettes.total, dec!(500));
        assert_eq!(statement.liability.total, dec!(500));
    }

    #[test]
    fn test_debt_category_match_is_case_insensitive() {
        let rows = vec![
            LedgerRow::new("DETTES fiscales", "TVA").with_total(dec!(50)),
            LedgerRow::new("Emprunts", "Banque").with_total(dec!(999)),
        ];

        let statement = build(&rows);
        let dettes = statement.liability.group("Dettes").expect("payables present");
        assert_eq!(dettes.item("Autres dettes"), Some(dec!(50)));
        assert_eq!(dettes.total, dec!(50));
    }

    #[test]
    fn test_corrected_debts_classify_each_row() {
        let rows = vec![
            LedgerRow::new("Dettes", "Emprunt bancaire").with_total(dec!(1000)),
            LedgerRow::new("Dettes fournisseurs", "Fournisseurs A").with_total(dec!(200)),
            LedgerRow::new("Dettes", "Dettes sociales").with_total(dec!(300)),
            LedgerRow::new("Dettes", "Dettes fiscales"),
        ];

        let statement = build(&rows);
        let dettes = statement.liability.group("Dettes").expect("payables present");
        assert_eq!(dettes.item("Fournisseurs"), Some(dec!(200)));
        assert_eq!(dettes.item("Autres dettes"), Some(dec!(1300)));
        assert_eq!(dettes.total, dec!(1500));
        let names: Vec<_> = dettes.entries.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["Fournisseurs", "Autres dettes"]);
    }

    #[test]
    fn test_corrected_debts_skip_null_totals() {
        let rows = vec![LedgerRow::new("Dettes", "Dettes fiscales")];

        let statement = build(&rows);
        assert!(statement.liability.group("Dettes").is_none());
        assert_eq!(statement.liability.total, Decimal::ZERO);
    }

    #[test]
    fn test_legacy_debts_credit_only_last_row() {
        let rows = vec![
            LedgerRow::new("Dettes", "Emprunt bancaire").with_total(dec!(1000)),
            LedgerRow::new("Dettes fournisseurs", "Fournisseurs A").with_total(dec!(200)),
            LedgerRow::new("Dettes", "Dettes sociales").with_total(dec!(300)),
            LedgerRow::new("Dettes fournisseurs", "Fournisseurs B").with_total(dec!(50)),
        ];

        let statement = legacy(&rows);
        let dettes = statement.liability.group("Dettes").expect("payables present");
        assert_eq!(dettes.item("Fournisseurs"), Some(dec!(250)));
        // Only the last processed row (a supplier row) reaches "Autres dettes"
        // and it alone becomes the payables total.
        assert_eq!(dettes.item("Autres dettes"), Some(dec!(50)));
        assert_eq!(dettes.total, dec!(50));
        assert_eq!(statement.liability.total, dec!(50));
    }

    #[test]
    fn test_legacy_total_follows_last_row_order() {
        let rows = vec![
            LedgerRow::new("Dettes fournisseurs", "Fournisseurs B").with_total(dec!(50)),
            LedgerRow::new("Dettes", "Emprunt bancaire").with_total(dec!(1000)),
        ];

        let dettes = legacy(&rows).liability.group("Dettes").cloned().expect("payables");
        assert_eq!(dettes.item("Fournisseurs"), Some(dec!(50)));
        assert_eq!(dettes.item("Autres dettes"), Some(dec!(1000)));
        assert_eq!(dettes.total, dec!(1000));
    }

    #[test]
    fn test_overflowing_totals_do_not_panic() {
        let rows = vec![
            LedgerRow::new("Loyer", "Loyer").with_total(Decimal::MAX),
            LedgerRow::new("Eau", "Eau").with_total(Decimal::MAX),
        ];

        let statement = build(&rows);
        let divers = statement
            .asset
            .group("Actif circulant")
            .and_then(|g| g.group("Divers"))
            .expect("divers present");
        assert_eq!(divers.entries.len(), 1);
        assert_eq!(divers.item("Loyer"), Some(Decimal::MAX));
        assert_eq!(divers.total, Decimal::MAX);
        assert_eq!(statement.asset.total, Decimal::MAX);
    }

    #[test]
    fn test_overflowing_debt_row_is_skipped() {
        let rows = vec![
            LedgerRow::new("Dettes", "Emprunt").with_total(Decimal::MAX),
            LedgerRow::new("Dettes", "Dettes sociales").with_total(Decimal::MAX),
            LedgerRow::new("Dettes fournisseurs", "Fournisseurs A").with_total(dec!(10)),
        ];

        let statement = build(&rows);
        let dettes = statement.liability.group("Dettes").expect("payables present");
        assert_eq!(dettes.item("Autres dettes"), Some(Decimal::MAX));
        assert_eq!(dettes.item("Fournisseurs"), None);
        assert_eq!(dettes.total, Decimal::MAX);
    }

    #[test]
    fn test_overflowing_equity_row_is_skipped() {
        let rows = vec![
            LedgerRow::new("Capitaux propres", "Reserves").with_unit_value(Decimal::MAX),
            LedgerRow::new("Capitaux propres", "Reserves").with_unit_value(dec!(1)),
        ];

        let statement = build(&rows);
        assert_eq!(
            statement.value(&["PASSIF", "Capitaux propres", "Reserves"]),
            Some(Decimal::MAX)
        );
    }

    #[test]
    fn test_legacy_debts_count_null_as_zero() {
        let rows = vec![LedgerRow::new("Dettes", "Dettes fiscales")];

        let statement = legacy(&rows);
        let dettes = statement.liability.group("Dettes").expect("payables present");
        assert_eq!(dettes.item("Autres dettes"), Some(Decimal::ZERO));
        assert_eq!(dettes.total, Decimal::ZERO);
    }

    #[test]
    fn test_equity_keyed_by_designation() {
        let rows = vec![
            LedgerRow::new("Capitaux propres", "Reserves").with_unit_value(dec!(2000)),
            LedgerRow::new("Capitaux propres", "capital social").with_unit_value(dec!(10000)),
            LedgerRow::new("Capitaux propres", "Resultat").with_unit_value(dec!(77)),
            LedgerRow::new("Capitaux propres", "Reserves"),
            LedgerRow::new("Capitaux propres", "Reserves").with_unit_value(dec!(500)),
            LedgerRow::new("capitaux propres", "Reserves").with_unit_value(dec!(1)),
        ];

        let statement = build(&rows);
        let equity = statement
            .liability
            .group("Capitaux propres")
            .expect("equity present");

        let names: Vec<_> = equity.entries.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["capital social", "Reserves"]);
        assert_eq!(equity.item("Reserves"), Some(dec!(2500)));
        assert_eq!(equity.total, dec!(12500));
    }

    #[test]
    fn test_liability_total_sums_equity_and_debts() {
        let rows = vec![
            LedgerRow::new("Capitaux propres", "capital social").with_unit_value(dec!(10000)),
            LedgerRow::new("Dettes", "Emprunt").with_total(dec!(0.0005)),
        ];

        let statement = build(&rows);
        assert_eq!(statement.value(&["PASSIF", "Dettes", "TOTAL"]), Some(dec!(0.000)));
        assert_eq!(statement.liability.total, dec!(10000));
    }

    #[test]
    fn test_empty_ledger() {
        let statement = build(&[]);

        assert_eq!(statement.asset.total, Decimal::ZERO);
        assert_eq!(statement.liability.total, Decimal::ZERO);
        assert!(statement.liability.is_empty());
        let names: Vec<_> = statement.asset.entries.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["Actif immobilisé", "Actif circulant"]);
        for category in ["Actif immobilisé", "Actif circulant"] {
            let group = statement.asset.group(category).expect("category present");
            assert!(group.is_empty());
            assert_eq!(group.total, Decimal::ZERO);
        }
    }

    #[test]
    fn test_rounding_per_level() {
        let rows = vec![
            LedgerRow::new("Immobilisations corporelles", "Batiments")
                .with_unit_value(dec!(0.0004)),
            LedgerRow::new("Immobilisations incorporelles", "Logiciels")
                .with_unit_value(dec!(0.0004)),
        ];

        let statement = build(&rows);
        let tangible = ["ACTIF", "Actif immobilisé", "Immobilisations corporelles"];
        // Leaves keep their source precision; each total is rounded on its own.
        assert_eq!(
            statement.value(&[tangible[0], tangible[1], tangible[2], "Batiments"]),
            Some(dec!(0.0004))
        );
        assert_eq!(
            statement.value(&[tangible[0], tangible[1], tangible[2], "TOTAL"]),
            Some(Decimal::ZERO)
        );
        assert_eq!(statement.value(&["ACTIF", "TOTAL"]), Some(Decimal::ZERO));
    }
}
