//! Order assembly: flat rows to a hierarchical order graph.
//!
//! Assembly is purely structural and purely in-memory. It indexes every
//! row by identifier, then resolves parent/child links bottom-up
//! (discounts and modifiers first, then line items, then splits, then
//! the order), so each parent is constructed from already-built
//! children and the result is independent of row arrival order. Child
//! rows whose parent is absent from the supplied row set are reported
//! as [`EngineError::OrphanRow`], never silently dropped.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    Discount, DiscountKind, LineItem, LoyaltyInfo, Modifier, Order, OrderType, Payment,
    PaymentType, Split, TaxSettings,
};
use crate::rows::{
    DiscountRow, ItemRow, LoyaltyRow, ModifierRow, OrderRow, OrderRowSet, PaymentRow, SplitRow,
};

/// Assembles one order from its raw rows.
///
/// All row sets must belong to the single order described by
/// `order_row`; the external loader is responsible for fetching and
/// filtering them. Ordering of line items within a split and of
/// payments within the order follows the stored index fields and is
/// stable, since it is externally observable (receipt layout, CSV row
/// order).
///
/// An order with zero split rows is given one synthetic split (index 0)
/// holding all of its line items, so callers always see at least one
/// split.
///
/// # Errors
///
/// - [`EngineError::OrphanRow`] when a child row references a parent
///   identifier absent from the supplied rows.
/// - [`EngineError::InvalidRow`] when a row is structurally invalid
///   (e.g. a discount naming both an item and a modifier, or an
///   unrecognized payment type code).
pub fn assemble(
    order_row: &OrderRow,
    split_rows: &[SplitRow],
    item_rows: &[ItemRow],
    modifier_rows: &[ModifierRow],
    discount_rows: &[DiscountRow],
    payment_rows: &[PaymentRow],
    loyalty_row: Option<&LoyaltyRow>,
) -> EngineResult<Order> {
    // Pass 1: index the pro-ratable rows by identifier.
    let items_by_id: HashMap<i64, &ItemRow> =
        item_rows.iter().map(|r| (r.item_id, r)).collect();
    let modifiers_by_id: HashMap<i64, &ModifierRow> =
        modifier_rows.iter().map(|r| (r.modifier_id, r)).collect();

    // Pass 2: resolve links bottom-up, starting with discounts.
    let (mut item_discounts, mut modifier_discounts) =
        group_discounts(discount_rows, &items_by_id, &modifiers_by_id)?;

    let mut item_modifiers = group_modifiers(modifier_rows, &items_by_id, &mut modifier_discounts)?;

    let mut line_items: Vec<LineItem> = Vec::with_capacity(item_rows.len());
    for row in item_rows {
        line_items.push(build_line_item(
            row,
            item_modifiers.remove(&row.item_id).unwrap_or_default(),
            item_discounts.remove(&row.item_id).unwrap_or_default(),
        ));
    }

    let splits = group_splits(order_row, split_rows, item_rows, line_items)?;
    let payments = build_payments(order_row, payment_rows)?;
    let loyalty = build_loyalty(order_row, loyalty_row)?;

    debug!(
        order_id = order_row.order_id,
        splits = splits.len(),
        items = item_rows.len(),
        payments = payments.len(),
        "assembled order"
    );

    Ok(Order {
        id: order_row.order_id,
        uuid: order_row.uuid,
        order_number: order_row.order_number,
        bill_number: order_row.bill_number,
        table_name: order_row.table_name.clone(),
        party_name: order_row.party_name.clone(),
        party_size: order_row.party_size,
        order_type: order_type_of(order_row.takeout_type),
        custom_takeout_type: order_row.custom_takeout_type.clone(),
        waiter_name: order_row.waiter_name.clone(),
        tax: TaxSettings {
            rate1: order_row.tax_rate_1,
            rate2: order_row.tax_rate_2,
            rate3: order_row.tax_rate_3,
            stack_tax2_on_tax1: order_row.stack_tax2_on_tax1,
        },
        gratuity: order_row.gratuity,
        gratuity_before_tax: order_row.gratuity_before_tax,
        paid_at: order_row.paid_at,
        seated_at: order_row.seated_at,
        outstanding_balance: order_row.outstanding_balance,
        splits,
        payments,
        loyalty,
    })
}

/// Assembles one order from a loader-produced bundle.
pub fn assemble_set(rows: &OrderRowSet) -> EngineResult<Order> {
    assemble(
        &rows.order,
        &rows.splits,
        &rows.items,
        &rows.modifiers,
        &rows.discounts,
        &rows.payments,
        rows.loyalty.as_ref(),
    )
}

/// Maps the raw takeout-type code to an order type.
///
/// The source encodes dine-in as the absence of a takeout type and maps
/// any unrecognized code to dine-in as well.
fn order_type_of(takeout_type: Option<i64>) -> OrderType {
    match takeout_type {
        Some(0) => OrderType::Takeout,
        Some(1) => OrderType::Delivery,
        Some(2) => OrderType::BarTab,
        _ => OrderType::DineIn,
    }
}

/// Groups discount rows by their attachment point, validating that each
/// names exactly one parent and that the parent is present.
#[allow(clippy::type_complexity)]
fn group_discounts(
    discount_rows: &[DiscountRow],
    items_by_id: &HashMap<i64, &ItemRow>,
    modifiers_by_id: &HashMap<i64, &ModifierRow>,
) -> EngineResult<(HashMap<i64, Vec<Discount>>, HashMap<i64, Vec<Discount>>)> {
    let mut on_items: HashMap<i64, Vec<(u32, Discount)>> = HashMap::new();
    let mut on_modifiers: HashMap<i64, Vec<(u32, Discount)>> = HashMap::new();

    for row in discount_rows {
        let discount = build_discount(row)?;
        match (row.item_id, row.modifier_id) {
            (Some(item_id), None) => {
                if !items_by_id.contains_key(&item_id) {
                    return Err(EngineError::OrphanRow {
                        child_kind: "discount",
                        child_id: row.discount_id.to_string(),
                        parent_kind: "line item",
                        parent_id: item_id.to_string(),
                    });
                }
                on_items
                    .entry(item_id)
                    .or_default()
                    .push((row.discount_index, discount));
            }
            (None, Some(modifier_id)) => {
                if !modifiers_by_id.contains_key(&modifier_id) {
                    return Err(EngineError::OrphanRow {
                        child_kind: "discount",
                        child_id: row.discount_id.to_string(),
                        parent_kind: "modifier",
                        parent_id: modifier_id.to_string(),
                    });
                }
                on_modifiers
                    .entry(modifier_id)
                    .or_default()
                    .push((row.discount_index, discount));
            }
            (Some(_), Some(_)) => {
                return Err(EngineError::InvalidRow {
                    kind: "discount",
                    id: row.discount_id.to_string(),
                    message: "references both a line item and a modifier".to_string(),
                });
            }
            (None, None) => {
                return Err(EngineError::InvalidRow {
                    kind: "discount",
                    id: row.discount_id.to_string(),
                    message: "references neither a line item nor a modifier".to_string(),
                });
            }
        }
    }

    Ok((sort_grouped(on_items), sort_grouped(on_modifiers)))
}

/// Sorts each group by stored index (stable) and drops the keys.
fn sort_grouped<T>(grouped: HashMap<i64, Vec<(u32, T)>>) -> HashMap<i64, Vec<T>> {
    grouped
        .into_iter()
        .map(|(id, mut entries)| {
            entries.sort_by_key(|(index, _)| *index);
            (id, entries.into_iter().map(|(_, value)| value).collect())
        })
        .collect()
}

fn build_discount(row: &DiscountRow) -> EngineResult<Discount> {
    let kind = match row.kind_code {
        0 => DiscountKind::Void,
        1 => DiscountKind::Discount,
        other => {
            return Err(EngineError::InvalidRow {
                kind: "discount",
                id: row.discount_id.to_string(),
                message: format!("unrecognized discount type code {other}"),
            });
        }
    };
    Ok(Discount {
        id: row.discount_id,
        label: row.label.clone(),
        amount: row.amount,
        kind,
        taxable: row.taxable,
        returns_inventory: row.returns_inventory,
        waiter_name: row.waiter_name.clone(),
        authorizer_name: row.authorizer_name.clone(),
        applied_at: row.applied_at,
    })
}

/// Groups modifier rows by owning item, attaching each modifier's own
/// discounts and resolving a missing sales category to the owner's.
fn group_modifiers(
    modifier_rows: &[ModifierRow],
    items_by_id: &HashMap<i64, &ItemRow>,
    modifier_discounts: &mut HashMap<i64, Vec<Discount>>,
) -> EngineResult<HashMap<i64, Vec<Modifier>>> {
    let mut grouped: HashMap<i64, Vec<(u32, Modifier)>> = HashMap::new();
    for row in modifier_rows {
        let Some(owner) = items_by_id.get(&row.item_id) else {
            return Err(EngineError::OrphanRow {
                child_kind: "modifier",
                child_id: row.modifier_id.to_string(),
                parent_kind: "line item",
                parent_id: row.item_id.to_string(),
            });
        };
        let modifier = Modifier {
            id: row.modifier_id,
            name: row.name.clone(),
            amount: row.amount,
            sales_category: row
                .sales_category
                .clone()
                .unwrap_or_else(|| owner.sales_category.clone()),
            discounts: modifier_discounts.remove(&row.modifier_id).unwrap_or_default(),
        };
        grouped
            .entry(row.item_id)
            .or_default()
            .push((row.modifier_index, modifier));
    }
    Ok(sort_grouped(grouped))
}

fn build_line_item(
    row: &ItemRow,
    modifiers: Vec<Modifier>,
    discounts: Vec<Discount>,
) -> LineItem {
    LineItem {
        id: row.item_id,
        name: row.name.clone(),
        sales_category: row.sales_category.clone(),
        unit_price: row.unit_price,
        quantity: row.quantity,
        open_price: row.open_price,
        course: row.course,
        was_sent: row.was_sent,
        sent_at: row.sent_at,
        waiter_name: row.waiter_name.clone(),
        is_return: row.is_return,
        exempt_tax1: row.exempt_tax1,
        exempt_tax2: row.exempt_tax2,
        exempt_tax3: row.exempt_tax3,
        modifiers,
        discounts,
    }
}

/// Distributes built line items into their splits, in stored order.
///
/// When the order has no split rows, a single synthetic split (index 0)
/// receives every line item, ordered by stored item index.
fn group_splits(
    order_row: &OrderRow,
    split_rows: &[SplitRow],
    item_rows: &[ItemRow],
    line_items: Vec<LineItem>,
) -> EngineResult<Vec<Split>> {
    // Pair each built item with its row for index/split routing. Order
    // matches item_rows by construction.
    let mut tagged: Vec<(&ItemRow, LineItem)> =
        item_rows.iter().zip(line_items).collect();
    tagged.sort_by_key(|(row, _)| row.item_index);

    if split_rows.is_empty() {
        // A split reference with no split rows supplied is still a
        // dangling parent link, not a candidate for the synthetic
        // split.
        for (row, _) in &tagged {
            if let Some(split_id) = row.split_id {
                return Err(EngineError::OrphanRow {
                    child_kind: "item",
                    child_id: row.item_id.to_string(),
                    parent_kind: "split",
                    parent_id: split_id.to_string(),
                });
            }
        }
        let line_items: Vec<LineItem> = tagged.into_iter().map(|(_, item)| item).collect();
        return Ok(vec![Split {
            id: order_row.order_id,
            split_index: 0,
            order_number: Some(order_row.order_number),
            created_at: None,
            split_by: 1,
            line_items,
        }]);
    }

    let mut by_split: HashMap<i64, Vec<LineItem>> = HashMap::new();
    for (row, item) in tagged {
        let Some(split_id) = row.split_id else {
            return Err(EngineError::InvalidRow {
                kind: "item",
                id: row.item_id.to_string(),
                message: "has no split reference but the order has splits".to_string(),
            });
        };
        if !split_rows.iter().any(|s| s.split_id == split_id) {
            return Err(EngineError::OrphanRow {
                child_kind: "item",
                child_id: row.item_id.to_string(),
                parent_kind: "split",
                parent_id: split_id.to_string(),
            });
        }
        by_split.entry(split_id).or_default().push(item);
    }

    let mut splits: Vec<Split> = split_rows
        .iter()
        .map(|row| Split {
            id: row.split_id,
            split_index: row.split_index,
            order_number: row.order_number,
            created_at: row.created_at,
            split_by: row.split_by,
            line_items: by_split.remove(&row.split_id).unwrap_or_default(),
        })
        .collect();
    splits.sort_by_key(|s| s.split_index);
    Ok(splits)
}

/// Builds the order's payment list, in stored sequence order.
fn build_payments(
    order_row: &OrderRow,
    payment_rows: &[PaymentRow],
) -> EngineResult<Vec<Payment>> {
    let mut payments = Vec::with_capacity(payment_rows.len());
    for row in payment_rows {
        if row.payment_group_id != order_row.payment_group_id {
            return Err(EngineError::OrphanRow {
                child_kind: "payment",
                child_id: row.uuid.to_string(),
                parent_kind: "payment group",
                parent_id: row.payment_group_id.to_string(),
            });
        }
        let payment_type = match row.type_code {
            0 => PaymentType::Cash,
            1 => PaymentType::Electronic,
            5 => PaymentType::CustomerAccount,
            6 => PaymentType::Loyalty,
            other => {
                return Err(EngineError::InvalidRow {
                    kind: "payment",
                    id: row.uuid.to_string(),
                    message: format!("unrecognized payment type code {other}"),
                });
            }
        };
        payments.push(Payment {
            uuid: row.uuid,
            sequence: row.sequence,
            payment_type,
            amount: row.amount,
            tip: row.tip,
            change: row.change,
            refundable_amount: row.refundable_amount,
            card_type: row.card_type.clone(),
            auth_number: row.auth_number.clone(),
            customer_account_id: row.customer_account_id,
            original_payment_uuid: row.original_payment_uuid,
            paid_at: row.paid_at,
        });
    }
    payments.sort_by_key(|p| p.sequence);
    Ok(payments)
}

fn build_loyalty(
    order_row: &OrderRow,
    loyalty_row: Option<&LoyaltyRow>,
) -> EngineResult<Option<LoyaltyInfo>> {
    let Some(row) = loyalty_row else {
        return Ok(None);
    };
    if row.order_id != order_row.order_id {
        return Err(EngineError::OrphanRow {
            child_kind: "loyalty",
            child_id: row.order_id.to_string(),
            parent_kind: "order",
            parent_id: order_row.order_id.to_string(),
        });
    }
    Ok(Some(LoyaltyInfo {
        account_name: row.account_name.clone(),
        credit_balance: row.credit_balance,
        point_balance: row.point_balance,
        points_earned: row.points_earned,
        points_used: row.points_used,
        points_refunded: row.points_refunded,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rows::OrderRow;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use uuid::Uuid;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn order_row() -> OrderRow {
        OrderRow {
            order_id: 1201,
            uuid: Uuid::nil(),
            order_number: 40044,
            bill_number: Some(312),
            table_name: Some("Patio 4".to_string()),
            party_name: None,
            party_size: Some(2),
            takeout_type: None,
            custom_takeout_type: None,
            waiter_name: Some("Dana".to_string()),
            tax_rate_1: dec("0.05"),
            tax_rate_2: Decimal::ZERO,
            tax_rate_3: Decimal::ZERO,
            stack_tax2_on_tax1: false,
            gratuity: Decimal::ZERO,
            gratuity_before_tax: false,
            paid_at: NaiveDate::from_ymd_opt(2020, 6, 1)
                .unwrap()
                .and_hms_opt(19, 30, 0)
                .unwrap(),
            seated_at: None,
            outstanding_balance: Decimal::ZERO,
            payment_group_id: 77,
        }
    }

    fn item_row(item_id: i64, item_index: u32, split_id: Option<i64>) -> ItemRow {
        ItemRow {
            item_id,
            order_id: 1201,
            split_id,
            item_index,
            name: format!("Item {item_id}"),
            sales_category: "Food".to_string(),
            unit_price: dec("10.00"),
            quantity: Decimal::ONE,
            open_price: None,
            course: None,
            was_sent: true,
            sent_at: None,
            waiter_name: None,
            is_return: false,
            exempt_tax1: false,
            exempt_tax2: false,
            exempt_tax3: false,
        }
    }

    fn modifier_row(modifier_id: i64, item_id: i64, modifier_index: u32) -> ModifierRow {
        ModifierRow {
            modifier_id,
            item_id,
            modifier_index,
            name: format!("Modifier {modifier_id}"),
            amount: dec("2.00"),
            sales_category: None,
        }
    }

    fn item_discount_row(discount_id: i64, item_id: i64, discount_index: u32) -> DiscountRow {
        DiscountRow {
            discount_id,
            item_id: Some(item_id),
            modifier_id: None,
            discount_index,
            amount: dec("1.00"),
            label: "Comp".to_string(),
            kind_code: 1,
            taxable: false,
            returns_inventory: false,
            waiter_name: None,
            authorizer_name: None,
            applied_at: None,
        }
    }

    fn payment_row(sequence: u32, type_code: i64, amount: &str) -> PaymentRow {
        PaymentRow {
            uuid: Uuid::new_v4(),
            payment_group_id: 77,
            sequence,
            type_code,
            amount: dec(amount),
            tip: Decimal::ZERO,
            change: Decimal::ZERO,
            refundable_amount: dec(amount),
            card_type: None,
            auth_number: None,
            customer_account_id: None,
            original_payment_uuid: None,
            paid_at: None,
        }
    }

    /// AS-001: zero split rows produce exactly one synthetic split
    #[test]
    fn test_synthetic_split_for_unsplit_order() {
        let items = vec![
            item_row(3, 2, None),
            item_row(1, 0, None),
            item_row(2, 1, None),
        ];
        let order = assemble(&order_row(), &[], &items, &[], &[], &[], None).unwrap();

        assert_eq!(order.splits.len(), 1);
        let split = &order.splits[0];
        assert_eq!(split.split_index, 0);
        assert_eq!(split.order_number, Some(40044));
        let ids: Vec<i64> = split.line_items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    /// AS-002: explicit splits keep items routed and ordered
    #[test]
    fn test_items_grouped_into_splits_by_index() {
        let splits = vec![
            SplitRow {
                split_id: 21,
                order_id: 1201,
                split_index: 1,
                order_number: Some(40045),
                created_at: None,
                split_by: 2,
            },
            SplitRow {
                split_id: 20,
                order_id: 1201,
                split_index: 0,
                order_number: Some(40044),
                created_at: None,
                split_by: 2,
            },
        ];
        let items = vec![
            item_row(5, 1, Some(21)),
            item_row(4, 0, Some(20)),
            item_row(6, 2, Some(20)),
        ];
        let order = assemble(&order_row(), &splits, &items, &[], &[], &[], None).unwrap();

        assert_eq!(order.splits.len(), 2);
        assert_eq!(order.splits[0].split_index, 0);
        let first: Vec<i64> = order.splits[0].line_items.iter().map(|i| i.id).collect();
        assert_eq!(first, vec![4, 6]);
        let second: Vec<i64> = order.splits[1].line_items.iter().map(|i| i.id).collect();
        assert_eq!(second, vec![5]);
    }

    /// AS-003: modifiers and discounts land on their owners in index order
    #[test]
    fn test_modifiers_and_discounts_attached_in_order() {
        let items = vec![item_row(1, 0, None)];
        let modifiers = vec![modifier_row(11, 1, 1), modifier_row(10, 1, 0)];
        let discounts = vec![
            item_discount_row(101, 1, 1),
            item_discount_row(100, 1, 0),
        ];
        let order =
            assemble(&order_row(), &[], &items, &modifiers, &discounts, &[], None).unwrap();

        let item = &order.splits[0].line_items[0];
        let modifier_ids: Vec<i64> = item.modifiers.iter().map(|m| m.id).collect();
        assert_eq!(modifier_ids, vec![10, 11]);
        let discount_ids: Vec<i64> = item.discounts.iter().map(|d| d.id).collect();
        assert_eq!(discount_ids, vec![100, 101]);
    }

    /// AS-004: a modifier without its own category takes the item's
    #[test]
    fn test_modifier_inherits_item_sales_category() {
        let items = vec![item_row(1, 0, None)];
        let modifiers = vec![modifier_row(10, 1, 0)];
        let order =
            assemble(&order_row(), &[], &items, &modifiers, &[], &[], None).unwrap();
        assert_eq!(
            order.splits[0].line_items[0].modifiers[0].sales_category,
            "Food"
        );
    }

    /// AS-005: a modifier referencing a missing item is an orphan
    #[test]
    fn test_orphan_modifier_reported() {
        let items = vec![item_row(1, 0, None)];
        let modifiers = vec![modifier_row(10, 99, 0)];
        let err =
            assemble(&order_row(), &[], &items, &modifiers, &[], &[], None).unwrap_err();
        assert!(matches!(
            err,
            EngineError::OrphanRow {
                child_kind: "modifier",
                ..
            }
        ));
    }

    /// AS-006: a discount referencing a missing modifier is an orphan
    #[test]
    fn test_orphan_discount_reported() {
        let items = vec![item_row(1, 0, None)];
        let discounts = vec![DiscountRow {
            modifier_id: Some(50),
            item_id: None,
            ..item_discount_row(100, 1, 0)
        }];
        let err =
            assemble(&order_row(), &[], &items, &[], &discounts, &[], None).unwrap_err();
        assert!(matches!(
            err,
            EngineError::OrphanRow {
                child_kind: "discount",
                parent_kind: "modifier",
                ..
            }
        ));
    }

    /// AS-007: a discount naming both parents is invalid
    #[test]
    fn test_double_parented_discount_invalid() {
        let items = vec![item_row(1, 0, None)];
        let modifiers = vec![modifier_row(10, 1, 0)];
        let discounts = vec![DiscountRow {
            modifier_id: Some(10),
            ..item_discount_row(100, 1, 0)
        }];
        let err = assemble(&order_row(), &[], &items, &modifiers, &discounts, &[], None)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidRow { kind: "discount", .. }));
    }

    /// AS-008: payments are ordered by stored sequence
    #[test]
    fn test_payments_sorted_by_sequence() {
        let payments = vec![
            payment_row(1, 0, "10.00"),
            payment_row(0, 1, "25.00"),
        ];
        let order = assemble(&order_row(), &[], &[], &[], &[], &payments, None).unwrap();
        assert_eq!(order.payments.len(), 2);
        assert_eq!(order.payments[0].sequence, 0);
        assert_eq!(order.payments[0].payment_type, PaymentType::Electronic);
        assert_eq!(order.payments[1].payment_type, PaymentType::Cash);
    }

    /// AS-009: a payment from a different group is an orphan
    #[test]
    fn test_payment_from_wrong_group_reported() {
        let mut payment = payment_row(0, 0, "10.00");
        payment.payment_group_id = 99;
        let err = assemble(&order_row(), &[], &[], &[], &[], &[payment], None).unwrap_err();
        assert!(matches!(
            err,
            EngineError::OrphanRow {
                child_kind: "payment",
                ..
            }
        ));
    }

    /// AS-010: unknown payment type code is invalid
    #[test]
    fn test_unknown_payment_type_invalid() {
        let payment = payment_row(0, 3, "10.00");
        let err = assemble(&order_row(), &[], &[], &[], &[], &[payment], None).unwrap_err();
        assert!(matches!(err, EngineError::InvalidRow { kind: "payment", .. }));
    }

    /// AS-011: takeout-type codes map like the source export
    #[test]
    fn test_order_type_mapping() {
        assert_eq!(order_type_of(None), OrderType::DineIn);
        assert_eq!(order_type_of(Some(0)), OrderType::Takeout);
        assert_eq!(order_type_of(Some(1)), OrderType::Delivery);
        assert_eq!(order_type_of(Some(2)), OrderType::BarTab);
        assert_eq!(order_type_of(Some(9)), OrderType::DineIn);
    }

    /// AS-012: loyalty rows attach to their order
    #[test]
    fn test_loyalty_attached() {
        let loyalty = LoyaltyRow {
            order_id: 1201,
            account_name: Some("card-0042".to_string()),
            credit_balance: dec("12.00"),
            point_balance: dec("340"),
            points_earned: dec("20"),
            points_used: Decimal::ZERO,
            points_refunded: Decimal::ZERO,
        };
        let order =
            assemble(&order_row(), &[], &[], &[], &[], &[], Some(&loyalty)).unwrap();
        let info = order.loyalty.unwrap();
        assert_eq!(info.account_name.as_deref(), Some("card-0042"));
        assert_eq!(info.credit_balance, dec("12.00"));
    }

    /// AS-013: a loyalty row for another order is an orphan
    #[test]
    fn test_loyalty_for_wrong_order_reported() {
        let loyalty = LoyaltyRow {
            order_id: 9999,
            account_name: None,
            credit_balance: Decimal::ZERO,
            point_balance: Decimal::ZERO,
            points_earned: Decimal::ZERO,
            points_used: Decimal::ZERO,
            points_refunded: Decimal::ZERO,
        };
        let err = assemble(&order_row(), &[], &[], &[], &[], &[], Some(&loyalty)).unwrap_err();
        assert!(matches!(
            err,
            EngineError::OrphanRow {
                child_kind: "loyalty",
                ..
            }
        ));
    }

    /// AS-014: an item referencing a missing split is an orphan
    #[test]
    fn test_item_referencing_missing_split_reported() {
        let splits = vec![SplitRow {
            split_id: 20,
            order_id: 1201,
            split_index: 0,
            order_number: None,
            created_at: None,
            split_by: 2,
        }];
        let items = vec![item_row(1, 0, Some(99))];
        let err = assemble(&order_row(), &splits, &items, &[], &[], &[], None).unwrap_err();
        assert!(matches!(
            err,
            EngineError::OrphanRow {
                child_kind: "item",
                parent_kind: "split",
                ..
            }
        ));
    }

    /// AS-015: a split reference with zero split rows is still an orphan
    #[test]
    fn test_dangling_split_reference_reported_without_split_rows() {
        let items = vec![item_row(1, 0, Some(99))];
        let err = assemble(&order_row(), &[], &items, &[], &[], &[], None).unwrap_err();
        assert!(matches!(
            err,
            EngineError::OrphanRow {
                child_kind: "item",
                parent_kind: "split",
                ..
            }
        ));
    }
}
