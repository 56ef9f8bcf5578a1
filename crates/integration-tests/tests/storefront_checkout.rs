//! Storefront checkout against the fake backend: OTP, vouchers and the
//! confirmation page.

use reqwest::StatusCode;
use reqwest::multipart::Form;
use segunda_mana_integration_tests::{
    FakeBackend, VALID_OTP, browser, cart_item, location, spawn_storefront,
};

fn pickup_form() -> Form {
    Form::new()
        .text("firstName", "Ana")
        .text("lastName", "Cruz")
        .text("phone", "09171234567")
        .text("email", "ana@example.ph")
        .text("orderType", "pickup")
        .text("paymentMethod", "cash")
}

async fn backend_with_cart() -> FakeBackend {
    let backend = FakeBackend::start().await;
    backend
        .state()
        .cart
        .push(cart_item("p1", "Denim Jacket", 350));
    backend
}

#[tokio::test]
async fn test_otp_required_keeps_cart_and_stays_on_checkout() {
    let backend = backend_with_cart().await;
    backend.state().requires_otp = true;
    let base = spawn_storefront(&backend).await;
    let browser = browser();

    let resp = browser
        .post(format!("{base}/checkout"))
        .multipart(pickup_form())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/checkout");
    assert_eq!(backend.state().cart_clears, 0);
    assert_eq!(backend.state().cart.len(), 1);

    let page = browser
        .get(format!("{base}/checkout"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("OTP sent to your email. Please verify."));
    assert!(page.contains("We sent a one-time code to <strong>ana@example.ph</strong>"));
}

#[tokio::test]
async fn test_wrong_otp_keeps_prompt_open() {
    let backend = backend_with_cart().await;
    backend.state().requires_otp = true;
    let base = spawn_storefront(&backend).await;
    let browser = browser();

    browser
        .post(format!("{base}/checkout"))
        .multipart(pickup_form())
        .send()
        .await
        .unwrap();
    let resp = browser
        .post(format!("{base}/checkout/verify-otp"))
        .form(&[("otp", "000000")])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&resp), "/checkout");

    let page = browser
        .get(format!("{base}/checkout"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("Invalid or expired OTP"));
    assert!(page.contains("/checkout/verify-otp"));
    assert_eq!(backend.state().cart_clears, 0);
}

#[tokio::test]
async fn test_verified_otp_clears_cart_and_shows_ticket_voucher() {
    let backend = backend_with_cart().await;
    backend.state().requires_otp = true;
    let base = spawn_storefront(&backend).await;
    let browser = browser();

    browser
        .post(format!("{base}/checkout"))
        .multipart(pickup_form())
        .send()
        .await
        .unwrap();
    let resp = browser
        .post(format!("{base}/checkout/verify-otp"))
        .form(&[("otp", VALID_OTP)])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&resp), "/thankyou");
    assert_eq!(backend.state().cart_clears, 1);

    let page = browser
        .get(format!("{base}/thankyou"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("TV-0001"));
    assert!(page.contains("OTP verified!"));
}

#[tokio::test]
async fn test_voucher_code_response_clears_cart_and_navigates() {
    let backend = backend_with_cart().await;
    backend.state().voucher_code = Some("SM-2024-0042".to_string());
    let base = spawn_storefront(&backend).await;
    let browser = browser();

    let resp = browser
        .post(format!("{base}/checkout"))
        .multipart(pickup_form())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/thankyou");
    assert_eq!(backend.state().cart_clears, 1);
    assert!(backend.state().cart.is_empty());

    let page = browser
        .get(format!("{base}/thankyou"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("SM-2024-0042"));
    assert!(page.contains("Thank you, Ana Cruz."));
    assert!(page.contains("<strong>3 meals</strong>"));
    assert!(page.contains("/thankyou/certificate"));
}

#[tokio::test]
async fn test_certificate_download_after_completed_order() {
    let backend = backend_with_cart().await;
    backend.state().voucher_code = Some("SM-2024-0042".to_string());
    let base = spawn_storefront(&backend).await;
    let browser = browser();

    let resp = browser
        .get(format!("{base}/thankyou/certificate"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");

    browser
        .post(format!("{base}/checkout"))
        .multipart(pickup_form())
        .send()
        .await
        .unwrap();
    let resp = browser
        .get(format!("{base}/thankyou/certificate"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "application/pdf"
    );
    assert_eq!(
        resp.headers().get("content-disposition").unwrap(),
        "attachment; filename=\"Donation-Certificate-SM-2024-0042.pdf\""
    );
    let body = resp.bytes().await.unwrap();
    assert!(body.starts_with(b"%PDF-"));
}

#[tokio::test]
async fn test_rejected_order_returns_checkout_to_the_form() {
    let backend = backend_with_cart().await;
    backend.state().order_rejection = Some("Item no longer available".to_string());
    let base = spawn_storefront(&backend).await;
    let browser = browser();

    let resp = browser
        .post(format!("{base}/checkout"))
        .multipart(pickup_form())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.unwrap().contains("Item no longer available"));

    backend.state().order_rejection = None;
    backend.state().voucher_code = Some("SM-2024-0043".to_string());
    let page = browser
        .get(format!("{base}/checkout"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(!page.contains("/checkout/verify-otp"));

    let resp = browser
        .post(format!("{base}/checkout"))
        .multipart(pickup_form())
        .send()
        .await
        .unwrap();
    assert_eq!(location(&resp), "/thankyou");
    assert_eq!(backend.state().orders.len(), 1);
}

#[tokio::test]
async fn test_thank_you_without_order_goes_home() {
    let backend = FakeBackend::start().await;
    let base = spawn_storefront(&backend).await;

    let resp = browser()
        .get(format!("{base}/thankyou"))
        .send()
        .await
        .unwrap();
    assert_eq!(location(&resp), "/");
}

#[tokio::test]
async fn test_empty_cart_rerenders_form_with_message() {
    let backend = FakeBackend::start().await;
    let base = spawn_storefront(&backend).await;

    let resp = browser()
        .post(format!("{base}/checkout"))
        .multipart(pickup_form())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let page = resp.text().await.unwrap();
    assert!(page.contains("Your cart is empty."));
    assert!(backend.state().orders.is_empty());
}

#[tokio::test]
async fn test_voucher_codes() {
    let backend = backend_with_cart().await;
    let base = spawn_storefront(&backend).await;
    let browser = browser();

    let resp = browser
        .post(format!("{base}/checkout/voucher"))
        .form(&[("code", "FREE")])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&resp), "/checkout");
    let page = browser
        .get(format!("{base}/checkout"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("Invalid voucher code"));

    browser
        .post(format!("{base}/checkout/voucher"))
        .form(&[("code", "discount50")])
        .send()
        .await
        .unwrap();
    let page = browser
        .get(format!("{base}/checkout"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("Voucher DISCOUNT50"));
}
