//! Integration tests for the consistency rules enforced by the Diesel
//! adapters: derived last purchase dates, guarded customer deletes and the
//! product delete cascade.
//!
//! Each test provisions its own database (see `support::TestDatabase`) and
//! is skipped when `TEST_DATABASE_URL` is unset.

mod support;

use backoffice::domain::ports::{
    CustomerRepository, CustomerRepositoryError, InventoryFilter, InventoryRepository,
    OrderRepository, OrderRepositoryError, ProductRepository, UserRepository,
};
use backoffice::domain::{
    CustomerDetails, CustomerDraft, CustomerId, InventoryDetails, InventoryDraft, Order,
    OrderDraft, OrderHeader, OrderId, OrderLineDetails, OrderLineDraft, ProductDetails,
    ProductDraft, ProductId, Restock, UserId,
};
use backoffice::outbound::persistence::{
    DieselCustomerRepository, DieselInventoryRepository, DieselOrderRepository,
    DieselProductRepository, DieselUserRepository,
};
use chrono::NaiveDate;
use pagination::{PageLimit, PageRequest};
use rstest::rstest;
use support::TestDatabase;

struct Repos {
    customers: DieselCustomerRepository,
    products: DieselProductRepository,
    inventory: DieselInventoryRepository,
    orders: DieselOrderRepository,
    clerk: UserId,
}

fn repos(db: &TestDatabase) -> Repos {
    let users = DieselUserRepository::new(db.pool());
    let clerk = db
        .block_on(users.create("clerk", "$argon2id$placeholder"))
        .expect("clerk account")
        .id();
    Repos {
        customers: DieselCustomerRepository::new(db.pool()),
        products: DieselProductRepository::new(db.pool()),
        inventory: DieselInventoryRepository::new(db.pool()),
        orders: DieselOrderRepository::new(db.pool()),
        clerk,
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn customer_id(raw: &str) -> CustomerId {
    CustomerId::new(raw).expect("valid customer id")
}

fn order_id(raw: &str) -> OrderId {
    OrderId::new(raw).expect("valid order id")
}

fn product_id(raw: &str) -> ProductId {
    ProductId::new(raw).expect("valid product id")
}

fn header(customer: Option<&str>, on: NaiveDate) -> OrderHeader {
    OrderHeader::try_from(OrderDraft {
        customer_id: customer.map(str::to_owned),
        order_date: Some(on),
        total_amount: Some(10.0),
        shipping_address: None,
    })
    .expect("valid header")
}

fn seed_customer(db: &TestDatabase, repos: &Repos, raw: &str) -> CustomerId {
    let id = customer_id(raw);
    let details = CustomerDetails::try_from(CustomerDraft {
        name: Some(format!("Customer {raw}")),
        country: Some("NZ".to_owned()),
        ..CustomerDraft::default()
    })
    .expect("valid customer");
    db.block_on(repos.customers.create(&id, &details))
        .expect("customer inserted");
    id
}

fn seed_product(db: &TestDatabase, repos: &Repos, raw: &str) -> ProductId {
    let id = product_id(raw);
    let details = ProductDetails::try_from(ProductDraft {
        name: Some(format!("Product {raw}")),
        category: Some("tea".to_owned()),
        unit_price: Some(2.5),
        description: None,
    })
    .expect("valid product");
    db.block_on(repos.products.create(&id, &details))
        .expect("product inserted");
    id
}

fn place_order(
    db: &TestDatabase,
    repos: &Repos,
    raw: &str,
    customer: Option<&str>,
    on: NaiveDate,
) -> Result<Order, OrderRepositoryError> {
    db.block_on(
        repos
            .orders
            .create(&order_id(raw), &header(customer, on), repos.clerk),
    )
}

fn last_purchase(db: &TestDatabase, repos: &Repos, id: &CustomerId) -> Option<NaiveDate> {
    db.block_on(repos.customers.find(id))
        .expect("customer lookup")
        .expect("customer exists")
        .last_purchase_date()
}

#[rstest]
fn last_purchase_date_tracks_order_inserts_updates_and_deletes() {
    let Some(db) = TestDatabase::provision("last_purchase_date_tracks_order_writes") else {
        return;
    };
    let repos = repos(&db);
    let alice = seed_customer(&db, &repos, "C-ALICE");
    assert_eq!(last_purchase(&db, &repos, &alice), None);

    let first = order_id("O-1");
    let second = order_id("O-2");
    place_order(&db, &repos, "O-1", Some("C-ALICE"), date(2025, 3, 1)).expect("first order");
    place_order(&db, &repos, "O-2", Some("C-ALICE"), date(2025, 1, 15)).expect("second order");
    assert_eq!(last_purchase(&db, &repos, &alice), Some(date(2025, 3, 1)));

    db.block_on(repos.orders.update(&second, &header(Some("C-ALICE"), date(2025, 6, 30))))
        .expect("order moved later");
    assert_eq!(last_purchase(&db, &repos, &alice), Some(date(2025, 6, 30)));

    db.block_on(repos.orders.delete(&second)).expect("later order deleted");
    assert_eq!(last_purchase(&db, &repos, &alice), Some(date(2025, 3, 1)));

    db.block_on(repos.orders.delete(&first)).expect("last order deleted");
    assert_eq!(last_purchase(&db, &repos, &alice), None);
}

#[rstest]
fn moving_an_order_recomputes_both_customers() {
    let Some(db) = TestDatabase::provision("moving_an_order_recomputes_both_customers") else {
        return;
    };
    let repos = repos(&db);
    let alice = seed_customer(&db, &repos, "C-ALICE");
    let bob = seed_customer(&db, &repos, "C-BOB");

    let order = order_id("O-1");
    place_order(&db, &repos, "O-1", Some("C-ALICE"), date(2025, 2, 2)).expect("order");
    db.block_on(repos.orders.update(&order, &header(Some("C-BOB"), date(2025, 2, 2))))
        .expect("order reassigned");

    assert_eq!(last_purchase(&db, &repos, &alice), None);
    assert_eq!(last_purchase(&db, &repos, &bob), Some(date(2025, 2, 2)));
}

#[rstest]
fn walk_in_orders_leave_customers_untouched() {
    let Some(db) = TestDatabase::provision("walk_in_orders_leave_customers_untouched") else {
        return;
    };
    let repos = repos(&db);
    let alice = seed_customer(&db, &repos, "C-ALICE");

    let order = place_order(&db, &repos, "O-WALK", None, date(2025, 5, 5)).expect("walk-in order");

    assert!(order.header().customer_id().is_none());
    assert_eq!(order.recorded_by(), Some(repos.clerk));
    assert_eq!(last_purchase(&db, &repos, &alice), None);
}

#[rstest]
fn orders_for_unknown_customers_are_rejected() {
    let Some(db) = TestDatabase::provision("orders_for_unknown_customers_are_rejected") else {
        return;
    };
    let repos = repos(&db);

    let err = place_order(&db, &repos, "O-1", Some("C-GHOST"), date(2025, 1, 1))
        .expect_err("unknown customer");

    assert!(
        matches!(&err, OrderRepositoryError::NotFound { code, .. } if code == "customer_not_found"),
        "unexpected error: {err:?}"
    );
}

#[rstest]
fn customers_with_orders_cannot_be_deleted() {
    let Some(db) = TestDatabase::provision("customers_with_orders_cannot_be_deleted") else {
        return;
    };
    let repos = repos(&db);
    let alice = seed_customer(&db, &repos, "C-ALICE");
    place_order(&db, &repos, "O-1", Some("C-ALICE"), date(2025, 1, 1)).expect("order");

    let err = db
        .block_on(repos.customers.delete(&alice))
        .expect_err("guarded delete");

    assert!(
        matches!(&err, CustomerRepositoryError::Conflict { code, .. } if code == "customer_has_orders"),
        "unexpected error: {err:?}"
    );
    assert!(
        db.block_on(repos.customers.find(&alice))
            .expect("lookup")
            .is_some(),
        "customer must survive a rejected delete"
    );

    db.block_on(repos.orders.delete(&order_id("O-1")))
        .expect("order deleted");
    db.block_on(repos.customers.delete(&alice))
        .expect("customer without orders is deletable");
    assert!(db.block_on(repos.customers.find(&alice)).expect("lookup").is_none());
}

#[rstest]
fn deleting_a_product_removes_lines_and_inventory() {
    let Some(db) = TestDatabase::provision("deleting_a_product_removes_lines_and_inventory") else {
        return;
    };
    let repos = repos(&db);
    let tea = seed_product(&db, &repos, "SKU-TEA");
    let mug = seed_product(&db, &repos, "SKU-MUG");
    place_order(&db, &repos, "O-1", None, date(2025, 1, 1)).expect("order");

    let line = |product: &str, quantity: i32| {
        OrderLineDetails::try_from(OrderLineDraft {
            order_id: "O-1".to_owned(),
            product_id: product.to_owned(),
            quantity,
            unit_price: Some(2.5),
        })
        .expect("valid line")
    };
    let tea_line = db
        .block_on(repos.orders.create_line(&line("SKU-TEA", 3)))
        .expect("tea line");
    let mug_line = db
        .block_on(repos.orders.create_line(&line("SKU-MUG", 1)))
        .expect("mug line");
    let stock = InventoryDetails::try_from(InventoryDraft {
        product_id: "SKU-TEA".to_owned(),
        stock_quantity: Some(40),
        last_restocked: None,
    })
    .expect("valid inventory");
    let tea_stock = db
        .block_on(repos.inventory.create(&stock))
        .expect("tea stock");

    db.block_on(repos.products.delete(&tea)).expect("product deleted");

    assert!(db.block_on(repos.products.find(&tea)).expect("lookup").is_none());
    assert!(
        db.block_on(repos.orders.find_line(tea_line.id()))
            .expect("lookup")
            .is_none()
    );
    assert!(
        db.block_on(repos.inventory.find(tea_stock.id()))
            .expect("lookup")
            .is_none()
    );
    assert!(
        db.block_on(repos.orders.find_line(mug_line.id()))
            .expect("lookup")
            .is_some(),
        "lines of other products are kept"
    );
    assert!(db.block_on(repos.products.find(&mug)).expect("lookup").is_some());
}

#[rstest]
fn restocking_adds_to_the_stock_level() {
    let Some(db) = TestDatabase::provision("restocking_adds_to_the_stock_level") else {
        return;
    };
    let repos = repos(&db);
    seed_product(&db, &repos, "SKU-TEA");
    let stock = InventoryDetails::try_from(InventoryDraft {
        product_id: "SKU-TEA".to_owned(),
        stock_quantity: Some(4),
        last_restocked: None,
    })
    .expect("valid inventory");
    let record = db
        .block_on(repos.inventory.create(&stock))
        .expect("stock record");

    let restock = Restock::new(6, date(2025, 4, 1)).expect("valid restock");
    let updated = db
        .block_on(repos.inventory.restock(record.id(), restock))
        .expect("restocked");

    assert_eq!(updated.details().stock_quantity(), Some(10));
    assert_eq!(updated.details().last_restocked(), Some(date(2025, 4, 1)));
}

#[rstest]
fn below_filter_counts_unknown_stock_as_empty() {
    let Some(db) = TestDatabase::provision("below_filter_counts_unknown_stock_as_empty") else {
        return;
    };
    let repos = repos(&db);
    for (raw, quantity) in [("SKU-LOW", Some(3)), ("SKU-NONE", None), ("SKU-FULL", Some(50))] {
        seed_product(&db, &repos, raw);
        let stock = InventoryDetails::try_from(InventoryDraft {
            product_id: raw.to_owned(),
            stock_quantity: quantity,
            last_restocked: None,
        })
        .expect("valid inventory");
        db.block_on(repos.inventory.create(&stock))
            .expect("stock record");
    }

    let filter = InventoryFilter { below: Some(5) };
    let page = db
        .block_on(
            repos
                .inventory
                .list(&filter, &PageRequest::first(PageLimit::new(None))),
        )
        .expect("filtered page");

    let products: Vec<&str> = page
        .items()
        .iter()
        .map(|record| record.details().product_id().as_str())
        .collect();
    assert_eq!(products, ["SKU-LOW", "SKU-NONE"]);
}
