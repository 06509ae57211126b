//! Route configuration for the API.

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use axum::http::header::{REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS};
use axum::routing::{delete, get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::handlers::{admin, auth, docs, health_check, not_found, ramp, wallet};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = build_cors_layer(state.config());

    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/profile", get(auth::profile));

    let wallet_routes = Router::new()
        .route("/summary", get(wallet::wallet_summary))
        .route("/{address}", get(wallet::get_wallet))
        .route("/{address}/transaction", post(wallet::create_transaction))
        .route("/{address}/transactions", get(wallet::list_transactions));

    let ramp_routes = Router::new()
        .route("/onramp", post(ramp::create_on_ramp))
        .route("/offramp", post(ramp::create_off_ramp))
        .route("/quote", post(ramp::quote))
        .route("/orders", get(ramp::list_orders));

    let admin_routes = Router::new()
        .route("/verify", get(admin::verify))
        .route("/users", get(admin::list_users))
        .route("/users/{id}/status", post(admin::set_user_status))
        .route("/users/{id}", delete(admin::remove_user))
        .route("/wallets", get(admin::list_wallets))
        .route("/wallets/{address}/status", post(admin::set_wallet_status))
        .route("/wallets/{address}", delete(admin::remove_wallet));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/openapi.json", get(docs::openapi))
        .nest("/auth", auth_routes)
        .route("/wallet", post(wallet::create_wallet).get(wallet::list_wallets))
        .nest("/wallet", wallet_routes)
        .nest("/ramp", ramp_routes)
        .nest("/admin", admin_routes)
        .fallback(not_found)
        .with_state(state)
        .layer(cors)
        .layer(SetResponseHeaderLayer::if_not_present(
            X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(TraceLayer::new_for_http())
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    if config.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    const WALLET: &str = "0x71C7656EC7ab88b098defB751B7401B5f6d8976F";
    const SIGNER: &str = "0x7a16ff8270133f063aab6c9977183d9e72835428";

    fn make_test_state() -> Arc<AppState> {
        let config = ApiConfig::default().with_jwt_secret("t".repeat(32));
        Arc::new(AppState::new(config).unwrap())
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, json)
    }

    fn wallet_request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-wallet-address", WALLET);
        match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_router(make_test_state());

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(&app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert!(json["uptimeSecs"].is_u64());
    }

    #[tokio::test]
    async fn test_openapi_document() {
        let app = create_router(make_test_state());

        let request = Request::builder()
            .uri("/api/openapi.json")
            .body(Body::empty())
            .unwrap();
        let (status, doc) = send(&app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(doc["info"]["title"], "Daily Wallet API");
        assert!(doc["paths"]["/ramp/offramp"]["post"].is_object());
        assert!(doc["components"]["schemas"]["OffRampRequest"].is_object());
    }

    #[tokio::test]
    async fn test_security_headers() {
        let app = create_router(make_test_state());

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let headers = response.headers();

        assert_eq!(headers["x-content-type-options"], "nosniff");
        assert_eq!(headers["x-frame-options"], "DENY");
        assert_eq!(headers["referrer-policy"], "no-referrer");
    }

    #[tokio::test]
    async fn test_login_and_profile() {
        let app = create_router(make_test_state());

        let request = Request::builder()
            .method("POST")
            .uri("/auth/login")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({"email": "user@example.com", "password": "password123"}).to_string(),
            ))
            .unwrap();
        let (status, json) = send(&app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["user"]["id"], "1");
        assert_eq!(json["user"]["email"], "user@example.com");
        let token = json["access_token"].as_str().unwrap().to_string();

        let request = Request::builder()
            .uri("/auth/profile")
            .header("authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(&app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["userId"], "1");
        assert_eq!(json["role"], "user");
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let app = create_router(make_test_state());

        let request = Request::builder()
            .method("POST")
            .uri("/auth/login")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({"email": "user@example.com", "password": "not-the-password"}).to_string(),
            ))
            .unwrap();
        let (status, json) = send(&app, request).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"], "unauthorized");
    }

    #[tokio::test]
    async fn test_login_validation() {
        let app = create_router(make_test_state());

        let request = Request::builder()
            .method("POST")
            .uri("/auth/login")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({"email": "user@example.com", "password": "short"}).to_string(),
            ))
            .unwrap();
        let (status, json) = send(&app, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let app = create_router(make_test_state());

        let request = Request::builder()
            .method("POST")
            .uri("/auth/login")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, json) = send(&app, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "invalid_request");
    }

    #[tokio::test]
    async fn test_profile_requires_session() {
        let app = create_router(make_test_state());

        let (status, _) = send(&app, wallet_request("GET", "/auth/profile", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_wallet_requires_credentials() {
        let app = create_router(make_test_state());

        let request = Request::builder()
            .uri("/wallet")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(&app, request).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"], "unauthorized");
    }

    #[tokio::test]
    async fn test_bad_bearer_token() {
        let app = create_router(make_test_state());

        let request = Request::builder()
            .uri("/wallet")
            .header("authorization", "Bearer not.a.token")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, request).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_create_and_list_wallets() {
        let app = create_router(make_test_state());

        let body = json!({
            "name": "Team Treasury",
            "type": "multiparty",
            "signers": [SIGNER],
            "threshold": 2
        });
        let (status, created) = send(&app, wallet_request("POST", "/wallet", Some(body))).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["name"], "Team Treasury");
        assert_eq!(created["threshold"], 2);
        assert_eq!(created["signers"].as_array().unwrap().len(), 2);
        assert_eq!(created["balance"], "0.00");

        let (status, list) = send(&app, wallet_request("GET", "/wallet", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 1);

        let address = created["address"].as_str().unwrap();
        let (status, fetched) =
            send(&app, wallet_request("GET", &format!("/wallet/{address}"), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["address"], address);
    }

    #[tokio::test]
    async fn test_create_wallet_threshold_too_high() {
        let app = create_router(make_test_state());

        let body = json!({"name": "Team", "signers": [SIGNER], "threshold": 3});
        let (status, json) = send(&app, wallet_request("POST", "/wallet", Some(body))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["message"].as_str().unwrap().contains("threshold"));
    }

    #[tokio::test]
    async fn test_unknown_wallet() {
        let app = create_router(make_test_state());

        let (status, json) =
            send(&app, wallet_request("GET", &format!("/wallet/{SIGNER}"), None)).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "not_found");
    }

    #[tokio::test]
    async fn test_transaction_flow() {
        let app = create_router(make_test_state());

        let (_, created) = send(
            &app,
            wallet_request("POST", "/wallet", Some(json!({"name": "Solo", "type": "personal"}))),
        )
        .await;
        let address = created["address"].as_str().unwrap();

        let body = json!({"to": SIGNER, "value": "1000000000000000000", "data": "0x"});
        let (status, tx) = send(
            &app,
            wallet_request("POST", &format!("/wallet/{address}/transaction"), Some(body)),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(tx["status"], "pending");
        assert_eq!(tx["requiredSignatures"], 1);
        assert_eq!(tx["transactionHash"].as_str().unwrap().len(), 66);

        let (status, history) = send(
            &app,
            wallet_request("GET", &format!("/wallet/{address}/transactions"), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(history.as_array().unwrap().len(), 1);

        let (_, summary) = send(&app, wallet_request("GET", "/wallet/summary", None)).await;
        assert_eq!(summary["walletCount"], 1);
        assert_eq!(summary["totalBalance"], "0.00");
        assert_eq!(summary["recentTransactions"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_quote_endpoint() {
        let app = create_router(make_test_state());

        let body = json!({"type": "on_ramp", "amount": 100, "fiatCurrency": "USD", "cryptoAsset": "ETH"});
        let (status, quote) = send(&app, wallet_request("POST", "/ramp/quote", Some(body))).await;

        assert_eq!(status, StatusCode::OK);
        assert!((quote["fee"].as_f64().unwrap() - 3.0).abs() < 1e-9);
        assert!((quote["totalFiatAmount"].as_f64().unwrap() - 103.0).abs() < 1e-9);
        assert!(quote["expiresAt"].is_string());
    }

    #[tokio::test]
    async fn test_offramp_endpoint() {
        let app = create_router(make_test_state());

        let body = json!({
            "amount": 0.5,
            "cryptoAsset": "ETH",
            "bankAccountId": "acct-1234",
            "fiatCurrency": "USD"
        });
        let (status, order) = send(&app, wallet_request("POST", "/ramp/offramp", Some(body))).await;

        assert_eq!(status, StatusCode::CREATED);
        assert!(order["id"].as_str().unwrap().starts_with("offramp-"));
        assert_eq!(order["status"], "pending");
        assert_eq!(order["bankAccountId"], "acct-1234");
        assert!(order["estimatedArrival"].is_string());
        let gross = order["estimatedFiatAmount"].as_f64().unwrap();
        let net = order["netFiatAmount"].as_f64().unwrap();
        assert!(gross > 0.0);
        assert!((net - gross * 0.97).abs() < 1e-6);
        assert!((order["fee"].as_f64().unwrap() - gross * 0.03).abs() < 1e-6);

        let (status, orders) = send(&app, wallet_request("GET", "/ramp/orders", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(orders.as_array().unwrap().len(), 1);
        assert_eq!(orders[0]["type"], "off_ramp");
        assert_eq!(orders[0]["id"], order["id"]);
    }

    #[tokio::test]
    async fn test_offramp_validation() {
        let app = create_router(make_test_state());

        let too_small = json!({
            "amount": 0.001,
            "cryptoAsset": "ETH",
            "bankAccountId": "acct-1234",
            "fiatCurrency": "USD"
        });
        let (status, json) =
            send(&app, wallet_request("POST", "/ramp/offramp", Some(too_small))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "validation_error");
        assert!(json["message"].as_str().unwrap().contains("'amount'"));

        let no_account = json!({
            "amount": 1,
            "cryptoAsset": "ETH",
            "bankAccountId": "   ",
            "fiatCurrency": "USD"
        });
        let (status, json) =
            send(&app, wallet_request("POST", "/ramp/offramp", Some(no_account))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["message"].as_str().unwrap().contains("'bankAccountId'"));

        let (_, orders) = send(&app, wallet_request("GET", "/ramp/orders", None)).await;
        assert!(orders.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_offramp_requires_credentials() {
        let app = create_router(make_test_state());

        let request = Request::builder()
            .method("POST")
            .uri("/ramp/offramp")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({"amount": 1, "cryptoAsset": "ETH", "bankAccountId": "a", "fiatCurrency": "USD"})
                    .to_string(),
            ))
            .unwrap();
        let (status, _) = send(&app, request).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_admin_requires_admin_role() {
        let app = create_router(make_test_state());

        let (status, json) = send(&app, wallet_request("GET", "/admin/verify", None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["error"], "forbidden");

        let request = Request::builder()
            .uri("/admin/verify")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_cors_any_origin() {
        let app = create_router(make_test_state());

        let request = Request::builder()
            .method("OPTIONS")
            .uri("/health")
            .header("Origin", "http://example.com")
            .header("Access-Control-Request-Method", "GET")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert!(response.status().is_success());
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
    }

    #[tokio::test]
    async fn test_cors_specific_origins() {
        let config = ApiConfig::default()
            .with_jwt_secret("t".repeat(32))
            .with_cors_origin("http://localhost:3000");
        let app = create_router(Arc::new(AppState::new(config).unwrap()));

        let request = Request::builder()
            .method("OPTIONS")
            .uri("/health")
            .header("Origin", "http://localhost:3000")
            .header("Access-Control-Request-Method", "GET")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "http://localhost:3000"
        );
    }

    #[tokio::test]
    async fn test_unknown_endpoint() {
        let app = create_router(make_test_state());

        let request = Request::builder()
            .uri("/unknown")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(&app, request).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "not_found");
    }
}
