//! Admin record pages fed with loose or oversized data.

use reqwest::StatusCode;
use segunda_mana_integration_tests::{
    FakeBackend, STAFF_EMAIL, admin_login, browser, location, order_doc, spawn_admin,
};

#[tokio::test]
async fn test_order_list_survives_null_payment_status() {
    let backend = FakeBackend::start().await;
    {
        let mut state = backend.state();
        state.orders.push(order_doc("o1", "Ana Santos"));
        let mut loose = order_doc("o2", "Lito Reyes");
        loose["paymentStatus"] = serde_json::Value::Null;
        state.orders.push(loose);
    }
    let base = spawn_admin(&backend).await;
    let browser = browser();
    admin_login(&browser, &base, STAFF_EMAIL).await;

    let resp = browser.get(format!("{base}/orders")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let page = resp.text().await.unwrap();
    assert!(page.contains("Ana Santos"));
    assert!(page.contains("Lito Reyes"));
}

#[tokio::test]
async fn test_oversized_collection_amounts_are_refused() {
    let backend = FakeBackend::start().await;
    let base = spawn_admin(&backend).await;
    let browser = browser();
    admin_login(&browser, &base, STAFF_EMAIL).await;

    let resp = browser
        .post(format!("{base}/dailycollection"))
        .form(&[
            ("branch", "Cubao"),
            ("date", "2024-07-01"),
            ("item_0", "Shirt"),
            ("qty_0", "99999999999999999999"),
            ("amount_0", "99999999999999999999"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/dailycollection");

    let page = browser
        .get(format!("{base}/dailycollection"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("Amounts are too large to total."));
}
