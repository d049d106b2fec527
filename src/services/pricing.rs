use crate::models::menu::{MenuItem, ModifierKind};
use crate::models::order::OrderLineItem;
use serde_json::Value;
use std::collections::BTreeMap;

/// Whether a submitted modifier value counts as selected.
fn is_selected(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(_) => true,
    }
}

/// `price × quantity` plus the surcharge of every selected toggle and of the
/// chosen radio option, each multiplied by the quantity.
pub fn line_subtotal(item: &MenuItem, quantity: i32, selected: &BTreeMap<String, Value>) -> f64 {
    let qty = f64::from(quantity);
    let mut subtotal = item.price * qty;

    for modifier in &item.modifiers {
        let Some(choice) = selected.get(&modifier.id).filter(|v| is_selected(v)) else {
            continue;
        };
        match modifier.kind {
            ModifierKind::Toggle => {
                if let Some(price) = modifier.price {
                    subtotal += price * qty;
                }
            }
            ModifierKind::Radio => {
                let label = choice.as_str().unwrap_or_default();
                if let Some(option) = modifier.options.iter().find(|o| o.label == label) {
                    subtotal += option.price * qty;
                }
            }
            // Counted add-ons are informational only.
            ModifierKind::Quantity => {}
        }
    }

    subtotal
}

/// Freezes a menu item into an order line.
pub fn snapshot_line(item: &MenuItem, quantity: i32, selected: BTreeMap<String, Value>) -> OrderLineItem {
    OrderLineItem {
        menu_item_id: item.id,
        name: item.name.clone(),
        price: item.price,
        image: item.image_url.clone(),
        quantity,
        subtotal: line_subtotal(item, quantity, &selected),
        selected_modifiers: selected,
    }
}

pub fn order_total(lines: &[OrderLineItem]) -> f64 {
    lines.iter().map(|l| l.subtotal).sum()
}
