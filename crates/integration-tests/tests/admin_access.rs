//! Admin route guards, session expiry and CSV exports against the fake
//! backend.

use reqwest::StatusCode;
use serde_json::json;
use segunda_mana_integration_tests::{
    FakeBackend, PASSWORD, STAFF_EMAIL, SUPERADMIN_EMAIL, admin_login, browser, location,
    order_doc, spawn_admin,
};

#[tokio::test]
async fn test_guarded_pages_redirect_to_login_without_session() {
    let backend = FakeBackend::start().await;
    let base = spawn_admin(&backend).await;
    let browser = browser();

    for path in ["/dashboard", "/orders", "/inventory", "/staff-management", "/activity"] {
        let resp = browser.get(format!("{base}{path}")).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(location(&resp), "/login", "{path}");
    }
}

#[tokio::test]
async fn test_htmx_requests_get_hx_redirect() {
    let backend = FakeBackend::start().await;
    let base = spawn_admin(&backend).await;

    let resp = browser()
        .get(format!("{base}/dashboard/live"))
        .header("HX-Request", "true")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("hx-redirect").and_then(|v| v.to_str().ok()),
        Some("/login")
    );
}

#[tokio::test]
async fn test_rejected_login_rerenders_form() {
    let backend = FakeBackend::start().await;
    let base = spawn_admin(&backend).await;

    let resp = browser()
        .post(format!("{base}/login"))
        .form(&[("email", SUPERADMIN_EMAIL), ("password", "wrong")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let page = resp.text().await.unwrap();
    assert!(page.contains("Invalid email or password"));
    assert!(page.contains(SUPERADMIN_EMAIL));
    assert!(!page.contains(PASSWORD));
}

#[tokio::test]
async fn test_staff_is_sent_to_dashboard_from_superadmin_pages() {
    let backend = FakeBackend::start().await;
    let base = spawn_admin(&backend).await;
    let browser = browser();

    assert_eq!(admin_login(&browser, &base, STAFF_EMAIL).await, "/dashboard");

    for path in ["/staff-management", "/activity", "/activity/export"] {
        let resp = browser.get(format!("{base}{path}")).send().await.unwrap();
        assert_eq!(location(&resp), "/dashboard", "{path}");
    }

    let resp = browser.get(format!("{base}/orders")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_page_skips_when_logged_in() {
    let backend = FakeBackend::start().await;
    let base = spawn_admin(&backend).await;
    let browser = browser();

    admin_login(&browser, &base, SUPERADMIN_EMAIL).await;
    let resp = browser.get(format!("{base}/login")).send().await.unwrap();
    assert_eq!(location(&resp), "/dashboard");

    let resp = browser.post(format!("{base}/logout")).send().await.unwrap();
    assert_eq!(location(&resp), "/login");
    let resp = browser.get(format!("{base}/orders")).send().await.unwrap();
    assert_eq!(location(&resp), "/login");
}

#[tokio::test]
async fn test_empty_export_flashes_and_downloads_nothing() {
    let backend = FakeBackend::start().await;
    let base = spawn_admin(&backend).await;
    let browser = browser();
    admin_login(&browser, &base, SUPERADMIN_EMAIL).await;

    let resp = browser
        .get(format!("{base}/activity/export"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/activity");
    assert!(resp.headers().get("content-disposition").is_none());

    let page = browser
        .get(format!("{base}/activity"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("No activity data to export."));
}

#[tokio::test]
async fn test_order_export_is_a_csv_attachment() {
    let backend = FakeBackend::start().await;
    backend.state().orders.push(order_doc("65a1f0", "Ana Cruz"));
    backend.state().orders.push(order_doc("65a1f1", "Ben Santos"));
    let base = spawn_admin(&backend).await;
    let browser = browser();
    admin_login(&browser, &base, STAFF_EMAIL).await;

    let resp = browser
        .get(format!("{base}/orders/export?q=santos"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("content-type").and_then(|v| v.to_str().ok()),
        Some("text/csv; charset=utf-8")
    );
    assert_eq!(
        resp.headers()
            .get("content-disposition")
            .and_then(|v| v.to_str().ok()),
        Some("attachment; filename=\"orders.csv\"")
    );
    let body = resp.text().await.unwrap();
    assert!(body.contains("65a1f1"));
    assert!(!body.contains("65a1f0"));
}

#[tokio::test]
async fn test_activity_page_lists_logs() {
    let backend = FakeBackend::start().await;
    backend.state().activity.push(json!({
        "adminName": "Mila",
        "action": "DELETE_ORDER",
        "createdAt": "2024-06-01T02:30:00Z"
    }));
    let base = spawn_admin(&backend).await;
    let browser = browser();
    admin_login(&browser, &base, SUPERADMIN_EMAIL).await;

    let resp = browser.get(format!("{base}/activity")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let page = resp.text().await.unwrap();
    assert!(page.contains("DELETE_ORDER"));
    assert!(page.contains("Mila"));
}

#[tokio::test]
async fn test_revoked_token_ends_session() {
    let backend = FakeBackend::start().await;
    let base = spawn_admin(&backend).await;
    let browser = browser();
    admin_login(&browser, &base, SUPERADMIN_EMAIL).await;

    backend.state().tokens_revoked = true;
    let resp = browser.get(format!("{base}/orders")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");

    let page = browser
        .get(format!("{base}/login"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("Your session has expired. Please log in again."));

    backend.state().tokens_revoked = false;
    let resp = browser.get(format!("{base}/orders")).send().await.unwrap();
    assert_eq!(location(&resp), "/login");
}

#[tokio::test]
async fn test_revoked_token_on_htmx_poll_redirects_page() {
    let backend = FakeBackend::start().await;
    let base = spawn_admin(&backend).await;
    let browser = browser();
    admin_login(&browser, &base, SUPERADMIN_EMAIL).await;

    backend.state().tokens_revoked = true;
    let resp = browser
        .get(format!("{base}/orders"))
        .header("HX-Request", "true")
        .send()
        .await
        .unwrap();
    assert_eq!(
        resp.headers().get("hx-redirect").and_then(|v| v.to_str().ok()),
        Some("/login")
    );
}
