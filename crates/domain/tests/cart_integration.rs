//! Integration tests for the cart aggregate and the checkout flow built on it.

use common::UserId;
use domain::{
    Cart, CartItem, CheckoutContext, CheckoutRequest, CheckoutStep, CheckoutTotals, Destination,
    ShippingMode, StepDecision,
};
use serde_json::json;

fn item(product_id: &str, variant_id: Option<&str>, price: i64, quantity: i64) -> CartItem {
    let mut builder = CartItem::builder()
        .product_id(product_id)
        .name(format!("Product {product_id}"))
        .unit_price_cents(price)
        .quantity(quantity)
        .creator_slug("studio-lune");
    if let Some(variant_id) = variant_id {
        builder = builder.variant_id(variant_id);
    }
    builder.build().unwrap()
}

fn relay_body() -> serde_json::Value {
    json!({
        "shippingAddress": {
            "firstName": "Camille",
            "lastName": "Durand",
            "street": "12 rue des Lilas",
            "city": "Lyon",
            "postalCode": "69003",
            "country": "FR"
        },
        "carrier": {
            "code": "mondial_relay",
            "name": "Mondial Relay",
            "price": 599,
            "estimatedDelivery": "3-5 days",
            "relayPoint": {
                "id": "FR-069123",
                "name": "Tabac du Parc",
                "address": "3 place du Parc",
                "city": "Lyon",
                "postalCode": "69006"
            }
        },
        "shippingMode": "RELAY_POINT"
    })
}

#[test]
fn test_total_is_sum_of_line_totals() {
    let mut cart = Cart::new();
    cart.add_item(item("p1", None, 2500, 2));
    cart.add_item(item("p2", Some("m"), 1250, 3));
    cart.add_item(item("p2", Some("l"), 1250, 1));

    let expected: i64 = cart
        .items()
        .iter()
        .map(|i| i.unit_price().cents() * i64::from(i.quantity()))
        .sum();
    assert_eq!(cart.total().unwrap().cents(), expected);
    assert_eq!(cart.total().unwrap().cents(), 10000);
    assert_eq!(cart.item_count(), 6);
}

#[test]
fn test_merge_equals_sequential_adds() {
    let guest_items = vec![
        item("p1", None, 1000, 2),
        item("p3", Some("red"), 700, 1),
        item("p1", None, 1000, 1),
    ];

    let mut merged = Cart::for_user(UserId::new("u1").unwrap());
    merged.add_item(item("p1", None, 1000, 1));
    merged.add_item(item("p2", None, 300, 4));
    let mut sequential = merged.clone();

    let mut guest = Cart::new();
    for i in guest_items.iter().cloned() {
        guest.add_item(i);
    }
    merged.merge(guest);

    for i in guest_items {
        sequential.add_item(i);
    }

    assert_eq!(merged.items(), sequential.items());
    assert_eq!(merged.get_item("p1", None).unwrap().quantity(), 4);
    assert_eq!(merged.total(), sequential.total());
}

#[test]
fn test_keys_stay_unique_and_quantities_positive() {
    let mut cart = Cart::new();
    for round in 0..3 {
        cart.add_item(item("p1", None, 100, 1));
        cart.add_item(item("p1", Some("s"), 100, 1));
        cart.add_item(item("p2", None, 100, round + 1));
    }
    cart.update_quantity("p2", 0, None).unwrap();

    let mut keys: Vec<_> = cart.items().iter().map(CartItem::key).collect();
    let before = keys.len();
    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), before);
    assert!(cart.items().iter().all(|i| i.quantity() > 0));
    assert_eq!(cart.line_count(), 2);
}

#[test]
fn test_snapshot_rebuilds_equivalent_cart() {
    let mut body = relay_body();
    body["items"] = json!([
        { "productId": "p1", "name": "Print", "price": 2500, "quantity": 2, "creatorSlug": "studio-lune" },
        { "productId": "p1", "name": "Print", "price": 2500, "quantity": 1, "creatorSlug": "studio-lune" }
    ]);
    let request = CheckoutRequest::parse(&serde_json::to_vec(&body).unwrap()).unwrap();

    let cart = Cart::restore(None, request.items.clone(), chrono::Utc::now());
    assert_eq!(cart.line_count(), 1);
    assert_eq!(cart.item_count(), 3);

    let totals = CheckoutTotals::compute(&cart, &request.carrier).unwrap();
    assert_eq!(totals.items_total.cents(), 7500);
    assert_eq!(totals.total.cents(), 8099);
}

#[test]
fn test_full_step_sequence_with_relay_point() {
    let mut cart = Cart::new();
    cart.add_item(item("p1", None, 2500, 2));
    let request =
        CheckoutRequest::parse(&serde_json::to_vec(&relay_body()).unwrap()).unwrap();
    let relay_point = request.carrier.relay_point.clone().unwrap();

    let mut ctx = CheckoutContext::for_cart(&cart);
    assert_eq!(ctx.enter(CheckoutStep::Identify), StepDecision::Proceed);
    assert_eq!(ctx.enter(CheckoutStep::Shipping), StepDecision::Proceed);

    ctx.set_shipping_address(request.shipping_address.clone());
    assert_eq!(ctx.enter(CheckoutStep::Carrier), StepDecision::Proceed);

    let mut selection = request.carrier.clone();
    selection.relay_point = None;
    ctx.select_carrier(selection, ShippingMode::RelayPoint);
    assert!(!ctx.can_advance_to_payment());

    ctx.choose_relay_point(relay_point).unwrap();
    assert_eq!(ctx.enter(CheckoutStep::Payment), StepDecision::Proceed);
    assert_eq!(
        ctx.carrier().unwrap().selection,
        request.carrier,
        "context selection should match what checkout submits"
    );

    ctx.confirm(common::OrderId::new());
    assert_eq!(ctx.enter(CheckoutStep::Confirmation), StepDecision::Proceed);
}

#[test]
fn test_cart_emptied_elsewhere_sends_back_to_cart() {
    let mut cart = Cart::new();
    cart.add_item(item("p1", None, 2500, 1));
    let mut ctx = CheckoutContext::for_cart(&cart);

    cart.clear();
    ctx.sync_cart(&cart);

    assert_eq!(
        ctx.enter(CheckoutStep::Shipping),
        StepDecision::Redirect(Destination::Cart)
    );
    assert_eq!(
        ctx.enter(CheckoutStep::Payment),
        StepDecision::Redirect(Destination::Cart)
    );
}
