use criterion::{Criterion, criterion_group, criterion_main};
use domain::{Cart, CartItem, CheckoutRequest, CheckoutTotals};

fn make_item(n: usize) -> CartItem {
    CartItem::builder()
        .product_id(format!("prod-{n:03}"))
        .variant_id(if n % 2 == 0 { "m" } else { "l" })
        .name(format!("Product {n}"))
        .unit_price_cents(100 * (n as i64 + 1))
        .quantity(1)
        .creator_slug("studio-lune")
        .build()
        .unwrap()
}

fn populated_cart(lines: usize) -> Cart {
    let mut cart = Cart::new();
    for n in 0..lines {
        cart.add_item(make_item(n));
    }
    cart
}

fn bench_add_item(c: &mut Criterion) {
    c.bench_function("cart/add_50_items", |b| {
        b.iter(|| populated_cart(50));
    });
}

fn bench_add_existing_line(c: &mut Criterion) {
    let cart = populated_cart(50);
    let last = make_item(49);

    c.bench_function("cart/increment_last_of_50", |b| {
        b.iter(|| {
            let mut cart = cart.clone();
            cart.add_item(last.clone());
        });
    });
}

fn bench_merge(c: &mut Criterion) {
    let user_cart = populated_cart(50);
    let guest_cart = populated_cart(25);

    c.bench_function("cart/merge_25_into_50", |b| {
        b.iter(|| {
            let mut cart = user_cart.clone();
            cart.merge(guest_cart.clone());
        });
    });
}

fn bench_total(c: &mut Criterion) {
    let cart = populated_cart(100);

    c.bench_function("cart/total_100_lines", |b| {
        b.iter(|| cart.total());
    });
}

fn bench_parse_checkout_request(c: &mut Criterion) {
    let items: Vec<_> = (0..20)
        .map(|n| {
            serde_json::json!({
                "productId": format!("prod-{n:03}"),
                "name": format!("Product {n}"),
                "price": 1500,
                "quantity": 2,
                "creatorSlug": "studio-lune",
            })
        })
        .collect();
    let body = serde_json::to_vec(&serde_json::json!({
        "shippingAddress": {
            "firstName": "Camille",
            "lastName": "Durand",
            "street": "12 rue des Lilas",
            "city": "Lyon",
            "postalCode": "69003",
            "country": "FR",
        },
        "carrier": {
            "code": "colissimo",
            "name": "Colissimo",
            "price": 599,
            "estimatedDelivery": "2-3 days",
        },
        "shippingMode": "HOME_DELIVERY",
        "items": items,
    }))
    .unwrap();

    c.bench_function("checkout/parse_request_20_items", |b| {
        b.iter(|| {
            let request = CheckoutRequest::parse(&body).unwrap();
            let mut cart = Cart::new();
            for item in request.items.iter().cloned() {
                cart.add_item(item);
            }
            CheckoutTotals::compute(&cart, &request.carrier)
        });
    });
}

criterion_group!(
    benches,
    bench_add_item,
    bench_add_existing_line,
    bench_merge,
    bench_total,
    bench_parse_checkout_request,
);
criterion_main!(benches);
