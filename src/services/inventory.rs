//! Recipe and inventory math.
//!
//! Everything here works on point-in-time snapshots and has no I/O. The
//! order pipeline uses [`requirements_for`] to know what to deduct and then
//! performs the deduction through the store's atomic decrement.

use crate::models::inventory::InventoryItem;
use crate::models::menu::MenuItem;
use crate::models::order::OrderLineItem;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;
use uuid::Uuid;

/// Total quantity needed per inventory item.
pub type Requirements = BTreeMap<Uuid, f64>;

#[derive(Debug, Clone, PartialEq)]
pub struct Availability {
    pub available: bool,
    /// Names of the short items, or ids for items missing from the snapshot.
    pub insufficient: Vec<String>,
}

#[derive(Debug, Error, PartialEq)]
pub enum InventoryError {
    #[error("Insufficient stock for: {}", .0.join(", "))]
    Insufficient(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct InventoryOutcome {
    pub updated: Vec<InventoryItem>,
    pub low_stock_warnings: Vec<InventoryItem>,
}

pub fn clamped_sub(quantity: f64, amount: f64) -> f64 {
    (quantity - amount).max(0.0)
}

pub fn requirements_for(lines: &[OrderLineItem], recipes: &[MenuItem]) -> Requirements {
    let by_id: HashMap<Uuid, &MenuItem> = recipes.iter().map(|r| (r.id, r)).collect();
    let mut requirements = Requirements::new();

    for line in lines {
        // Items without a recipe are not stock-tracked.
        let Some(recipe) = by_id.get(&line.menu_item_id) else {
            continue;
        };
        for ingredient in &recipe.ingredients {
            *requirements.entry(ingredient.inventory_item_id).or_insert(0.0) +=
                ingredient.quantity * f64::from(line.quantity);
        }
    }

    requirements
}

pub fn check_availability(requirements: &Requirements, inventory: &[InventoryItem]) -> Availability {
    let insufficient: Vec<String> = requirements
        .iter()
        .filter_map(|(item_id, required)| {
            match inventory.iter().find(|item| item.id == *item_id) {
                Some(item) if item.quantity >= *required => None,
                Some(item) => Some(item.name.clone()),
                None => Some(item_id.to_string()),
            }
        })
        .collect();

    Availability {
        available: insufficient.is_empty(),
        insufficient,
    }
}

pub fn deduct(requirements: &Requirements, inventory: &[InventoryItem]) -> Vec<InventoryItem> {
    inventory
        .iter()
        .map(|item| match requirements.get(&item.id) {
            Some(amount) => InventoryItem {
                quantity: clamped_sub(item.quantity, *amount),
                ..item.clone()
            },
            None => item.clone(),
        })
        .collect()
}

pub fn low_stock(inventory: &[InventoryItem]) -> Vec<InventoryItem> {
    inventory
        .iter()
        .filter(|item| item.is_low_stock())
        .cloned()
        .collect()
}

/// Strict variant: refuses to deduct anything when one ingredient is short.
pub fn process_order_inventory(
    lines: &[OrderLineItem],
    recipes: &[MenuItem],
    inventory: &[InventoryItem],
) -> Result<InventoryOutcome, InventoryError> {
    let requirements = requirements_for(lines, recipes);

    let availability = check_availability(&requirements, inventory);
    if !availability.available {
        return Err(InventoryError::Insufficient(availability.insufficient));
    }

    let updated = deduct(&requirements, inventory);
    let low_stock_warnings = low_stock(&updated);

    Ok(InventoryOutcome {
        updated,
        low_stock_warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn accumulates_shared_ingredients_across_lines() {
        let stall = Uuid::new_v4();
        let rice = fixtures::inventory_item(stall, "Rice", 10.0, 1.0);
        let eggs = fixtures::inventory_item(stall, "Eggs", 30.0, 6.0);
        let chicken = fixtures::menu_item(stall, "Dynamit Chicken", 150.0)
            .with_ingredient(rice.id, 0.2);
        let fried_rice = fixtures::menu_item(stall, "Egg Fried Rice", 120.0)
            .with_ingredient(rice.id, 0.3)
            .with_ingredient(eggs.id, 2.0);

        let lines = vec![fixtures::line(&chicken, 3), fixtures::line(&fried_rice, 2)];
        let req = requirements_for(&lines, &[chicken, fried_rice]);

        assert_eq!(req.len(), 2);
        assert!(approx(req[&rice.id], 0.2 * 3.0 + 0.3 * 2.0));
        assert!(approx(req[&eggs.id], 4.0));
    }

    #[test]
    fn items_without_recipe_contribute_nothing() {
        let stall = Uuid::new_v4();
        let soda = fixtures::menu_item(stall, "Soda", 40.0);
        let req = requirements_for(&[fixtures::line(&soda, 5)], &[soda.clone()]);
        assert!(req.is_empty());

        // Not even present in the recipe list.
        let req = requirements_for(&[fixtures::line(&soda, 5)], &[]);
        assert!(req.is_empty());
    }

    #[test]
    fn requirements_scale_linearly_with_quantity() {
        let stall = Uuid::new_v4();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let burger = fixtures::menu_item(stall, "Sunshine Burger", 180.0)
            .with_ingredient(a, 1.0)
            .with_ingredient(b, 0.15);
        let wrap = fixtures::menu_item(stall, "Chicken Wrap", 140.0).with_ingredient(b, 0.1);
        let recipes = vec![burger.clone(), wrap.clone()];

        let lines = vec![fixtures::line(&burger, 2), fixtures::line(&wrap, 3)];
        let doubled: Vec<OrderLineItem> = lines
            .iter()
            .map(|l| OrderLineItem {
                quantity: l.quantity * 2,
                ..l.clone()
            })
            .collect();

        let single = requirements_for(&lines, &recipes);
        let double = requirements_for(&doubled, &recipes);
        assert_eq!(single.keys().collect::<Vec<_>>(), double.keys().collect::<Vec<_>>());
        for (id, qty) in &single {
            assert!(approx(double[id], qty * 2.0));
        }
    }

    #[test]
    fn missing_or_short_items_are_insufficient() {
        let stall = Uuid::new_v4();
        let rice = fixtures::inventory_item(stall, "Rice", 0.5, 1.0);
        let oil = fixtures::inventory_item(stall, "Oil", 2.0, 0.5);
        let ghost = Uuid::new_v4();

        let req = Requirements::from([(rice.id, 0.6), (oil.id, 2.0), (ghost, 1.0)]);
        let availability = check_availability(&req, &[rice, oil]);

        assert!(!availability.available);
        assert_eq!(availability.insufficient.len(), 2);
        assert!(availability.insufficient.contains(&"Rice".to_string()));
        assert!(availability.insufficient.contains(&ghost.to_string()));
    }

    #[test]
    fn deduct_never_goes_negative() {
        let stall = Uuid::new_v4();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..200 {
            let inventory: Vec<InventoryItem> = (0..5)
                .map(|i| {
                    fixtures::inventory_item(stall, &format!("item-{i}"), rng.gen_range(0.0..20.0), 1.0)
                })
                .collect();
            let requirements: Requirements = inventory
                .iter()
                .filter_map(|item| rng.gen_bool(0.7).then(|| (item.id, rng.gen_range(0.0..40.0))))
                .collect();

            let updated = deduct(&requirements, &inventory);
            for (before, after) in inventory.iter().zip(&updated) {
                assert!(after.quantity >= 0.0);
                match requirements.get(&before.id) {
                    Some(amount) => assert!(approx(after.quantity, (before.quantity - amount).max(0.0))),
                    None => assert_eq!(after.quantity, before.quantity),
                }
            }
        }
    }

    #[test]
    fn three_chickens_take_point_six_kg_of_rice() {
        let stall = Uuid::new_v4();
        let rice = fixtures::inventory_item(stall, "Rice", 10.0, 1.0);
        let chicken = fixtures::menu_item(stall, "Dynamit Chicken", 150.0)
            .with_ingredient(rice.id, 0.2);

        let req = requirements_for(&[fixtures::line(&chicken, 3)], &[chicken]);
        assert!(approx(req[&rice.id], 0.6));

        let updated = deduct(&req, &[rice]);
        assert!(approx(updated[0].quantity, 9.4));
    }

    #[test]
    fn low_stock_includes_threshold_and_is_stable() {
        let stall = Uuid::new_v4();
        let at = fixtures::inventory_item(stall, "Buns", 5.0, 5.0);
        let below = fixtures::inventory_item(stall, "Cheese", 1.0, 2.0);
        let above = fixtures::inventory_item(stall, "Rice", 9.0, 2.0);
        let inventory = vec![at.clone(), below.clone(), above];

        let first = low_stock(&inventory);
        let second = low_stock(&inventory);
        assert_eq!(first, second);
        assert_eq!(first, vec![at, below]);
    }

    #[test]
    fn strict_processing_reports_shortfall_without_deducting() {
        let stall = Uuid::new_v4();
        let patty = fixtures::inventory_item(stall, "Beef Patty", 1.0, 2.0);
        let burger = fixtures::menu_item(stall, "Sunshine Burger", 180.0)
            .with_ingredient(patty.id, 1.0);

        let err = process_order_inventory(&[fixtures::line(&burger, 2)], &[burger.clone()], &[patty.clone()])
            .unwrap_err();
        assert_eq!(err, InventoryError::Insufficient(vec!["Beef Patty".into()]));
        assert_eq!(err.to_string(), "Insufficient stock for: Beef Patty");

        let outcome =
            process_order_inventory(&[fixtures::line(&burger, 1)], &[burger], &[patty]).unwrap();
        assert_eq!(outcome.updated[0].quantity, 0.0);
        assert_eq!(outcome.low_stock_warnings.len(), 1);
    }
}
