//! OpenAPI description of the HTTP surface.

use axum::Json;
use serde_json::{Map, Value, json};

/// Credentials an endpoint accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Public,
    /// Bearer token or `x-wallet-address`.
    Caller,
    /// Bearer token only.
    Session,
    /// Bearer token of an administrator.
    Admin,
}

#[derive(Debug)]
struct Endpoint {
    method: &'static str,
    path: &'static str,
    tag: &'static str,
    summary: &'static str,
    access: Access,
    body: Option<&'static str>,
    query: &'static [&'static str],
    success: u16,
}

/// Routes whose JSON body may be omitted.
const OPTIONAL_BODY: &[&str] = &["/admin/users/{id}/status"];

const ENDPOINTS: &[Endpoint] = &[
    Endpoint {
        method: "get",
        path: "/health",
        tag: "health",
        summary: "Liveness and uptime",
        access: Access::Public,
        body: None,
        query: &[],
        success: 200,
    },
    Endpoint {
        method: "post",
        path: "/auth/login",
        tag: "authentication",
        summary: "Exchange email and password for a token",
        access: Access::Public,
        body: Some("LoginRequest"),
        query: &[],
        success: 200,
    },
    Endpoint {
        method: "get",
        path: "/auth/profile",
        tag: "authentication",
        summary: "Profile of the session user",
        access: Access::Session,
        body: None,
        query: &[],
        success: 200,
    },
    Endpoint {
        method: "post",
        path: "/wallet",
        tag: "wallets",
        summary: "Create a personal or multiparty wallet",
        access: Access::Caller,
        body: Some("NewWallet"),
        query: &[],
        success: 201,
    },
    Endpoint {
        method: "get",
        path: "/wallet",
        tag: "wallets",
        summary: "The caller's wallets",
        access: Access::Caller,
        body: None,
        query: &[],
        success: 200,
    },
    Endpoint {
        method: "get",
        path: "/wallet/summary",
        tag: "wallets",
        summary: "Wallet count, total balance and recent activity",
        access: Access::Caller,
        body: None,
        query: &[],
        success: 200,
    },
    Endpoint {
        method: "get",
        path: "/wallet/{address}",
        tag: "wallets",
        summary: "One wallet",
        access: Access::Caller,
        body: None,
        query: &[],
        success: 200,
    },
    Endpoint {
        method: "post",
        path: "/wallet/{address}/transaction",
        tag: "wallets",
        summary: "Record a pending transaction",
        access: Access::Caller,
        body: Some("NewTransaction"),
        query: &[],
        success: 201,
    },
    Endpoint {
        method: "get",
        path: "/wallet/{address}/transactions",
        tag: "wallets",
        summary: "Transaction history, newest first",
        access: Access::Caller,
        body: None,
        query: &[],
        success: 200,
    },
    Endpoint {
        method: "post",
        path: "/ramp/quote",
        tag: "ramp",
        summary: "Price an on-ramp or off-ramp conversion",
        access: Access::Caller,
        body: Some("QuoteRequest"),
        query: &[],
        success: 200,
    },
    Endpoint {
        method: "post",
        path: "/ramp/onramp",
        tag: "ramp",
        summary: "Buy crypto with fiat",
        access: Access::Caller,
        body: Some("OnRampRequest"),
        query: &[],
        success: 201,
    },
    Endpoint {
        method: "post",
        path: "/ramp/offramp",
        tag: "ramp",
        summary: "Sell crypto for fiat",
        access: Access::Caller,
        body: Some("OffRampRequest"),
        query: &[],
        success: 201,
    },
    Endpoint {
        method: "get",
        path: "/ramp/orders",
        tag: "ramp",
        summary: "The caller's ramp orders, newest first",
        access: Access::Caller,
        body: None,
        query: &[],
        success: 200,
    },
    Endpoint {
        method: "get",
        path: "/admin/verify",
        tag: "admin",
        summary: "Confirm admin access",
        access: Access::Admin,
        body: None,
        query: &[],
        success: 200,
    },
    Endpoint {
        method: "get",
        path: "/admin/users",
        tag: "admin",
        summary: "List users",
        access: Access::Admin,
        body: None,
        query: &["search", "status"],
        success: 200,
    },
    Endpoint {
        method: "post",
        path: "/admin/users/{id}/status",
        tag: "admin",
        summary: "Set a user's status, or toggle it when the body is empty",
        access: Access::Admin,
        body: Some("UserStatusUpdate"),
        query: &[],
        success: 200,
    },
    Endpoint {
        method: "delete",
        path: "/admin/users/{id}",
        tag: "admin",
        summary: "Remove a user with their wallets and orders",
        access: Access::Admin,
        body: None,
        query: &[],
        success: 200,
    },
    Endpoint {
        method: "get",
        path: "/admin/wallets",
        tag: "admin",
        summary: "List every wallet",
        access: Access::Admin,
        body: None,
        query: &["search", "status", "sort", "order"],
        success: 200,
    },
    Endpoint {
        method: "post",
        path: "/admin/wallets/{address}/status",
        tag: "admin",
        summary: "Activate or deactivate a wallet",
        access: Access::Admin,
        body: Some("WalletStatusUpdate"),
        query: &[],
        success: 200,
    },
    Endpoint {
        method: "delete",
        path: "/admin/wallets/{address}",
        tag: "admin",
        summary: "Remove a wallet",
        access: Access::Admin,
        body: None,
        query: &[],
        success: 200,
    },
];

/// Handle GET /api/openapi.json - machine-readable API description.
pub async fn openapi() -> Json<Value> {
    Json(openapi_document())
}

/// Build the OpenAPI 3.0 document for every route the server mounts.
#[must_use]
pub fn openapi_document() -> Value {
    let mut paths = Map::new();
    for endpoint in ENDPOINTS {
        let item = paths
            .entry(endpoint.path)
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(methods) = item {
            methods.insert(endpoint.method.to_string(), operation(endpoint));
        }
    }

    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "Daily Wallet API",
            "description": "Smart-wallet backend: accounts, wallets, transactions and fiat ramps.",
            "version": env!("CARGO_PKG_VERSION"),
        },
        "tags": [
            {"name": "health"},
            {"name": "authentication"},
            {"name": "wallets"},
            {"name": "ramp"},
            {"name": "admin"},
        ],
        "paths": paths,
        "components": {
            "securitySchemes": {
                "bearerAuth": {"type": "http", "scheme": "bearer", "bearerFormat": "JWT"},
                "walletAddress": {"type": "apiKey", "in": "header", "name": "x-wallet-address"},
            },
            "schemas": schemas(),
        },
    })
}

fn operation(endpoint: &Endpoint) -> Value {
    let mut op = Map::new();
    op.insert("tags".into(), json!([endpoint.tag]));
    op.insert("summary".into(), json!(endpoint.summary));

    let mut parameters: Vec<Value> = path_params(endpoint.path)
        .map(|name| json!({"name": name, "in": "path", "required": true, "schema": {"type": "string"}}))
        .collect();
    parameters.extend(endpoint.query.iter().map(|name| {
        json!({"name": name, "in": "query", "required": false, "schema": {"type": "string"}})
    }));
    if !parameters.is_empty() {
        op.insert("parameters".into(), Value::Array(parameters));
    }

    if let Some(schema) = endpoint.body {
        op.insert(
            "requestBody".into(),
            json!({
                "required": !OPTIONAL_BODY.contains(&endpoint.path),
                "content": {"application/json": {"schema": schema_ref(schema)}},
            }),
        );
    }

    let security = match endpoint.access {
        Access::Public => json!([]),
        Access::Caller => json!([{"bearerAuth": []}, {"walletAddress": []}]),
        Access::Session | Access::Admin => json!([{"bearerAuth": []}]),
    };
    op.insert("security".into(), security);

    let mut responses = Map::new();
    responses.insert(endpoint.success.to_string(), json!({"description": "Success"}));
    if endpoint.body.is_some() {
        responses.insert("400".into(), error_response("Invalid or malformed input"));
    }
    if endpoint.access != Access::Public {
        responses.insert("401".into(), error_response("Missing or rejected credentials"));
        responses.insert("403".into(), error_response("Caller may not do this"));
    }
    if endpoint.path.contains('{') {
        responses.insert("404".into(), error_response("No such resource"));
    }
    op.insert("responses".into(), Value::Object(responses));

    Value::Object(op)
}

fn path_params(path: &str) -> impl Iterator<Item = &str> {
    path.split('/')
        .filter_map(|segment| segment.strip_prefix('{')?.strip_suffix('}'))
}

fn schema_ref(name: &str) -> Value {
    json!({"$ref": format!("#/components/schemas/{name}")})
}

fn error_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": {"application/json": {"schema": schema_ref("ErrorResponse")}},
    })
}

fn schemas() -> Value {
    let fiat = json!({"type": "string", "enum": ["USD", "EUR", "GBP"]});
    json!({
        "ErrorResponse": {
            "type": "object",
            "required": ["error", "message"],
            "properties": {
                "error": {"type": "string"},
                "message": {"type": "string"},
            },
        },
        "LoginRequest": {
            "type": "object",
            "required": ["email", "password"],
            "properties": {
                "email": {"type": "string", "format": "email"},
                "password": {"type": "string", "minLength": 8},
            },
        },
        "NewWallet": {
            "type": "object",
            "required": ["name"],
            "properties": {
                "name": {"type": "string", "maxLength": 100},
                "type": {"type": "string", "enum": ["personal", "multiparty"], "default": "multiparty"},
                "signers": {"type": "array", "items": {"type": "string"}},
                "threshold": {"type": "integer", "minimum": 1},
            },
        },
        "NewTransaction": {
            "type": "object",
            "required": ["to", "value"],
            "properties": {
                "to": {"type": "string"},
                "value": {"type": "string", "description": "Amount in wei"},
                "data": {"type": "string"},
            },
        },
        "QuoteRequest": {
            "type": "object",
            "required": ["type", "amount", "fiatCurrency", "cryptoAsset"],
            "properties": {
                "type": {"type": "string", "enum": ["on_ramp", "off_ramp"]},
                "amount": {"type": "number", "minimum": 1},
                "fiatCurrency": fiat,
                "cryptoAsset": {"type": "string"},
            },
        },
        "OnRampRequest": {
            "type": "object",
            "required": ["amount", "fiatCurrency", "cryptoAsset", "walletAddress", "paymentMethod"],
            "properties": {
                "amount": {"type": "number", "minimum": 1},
                "fiatCurrency": fiat,
                "cryptoAsset": {"type": "string"},
                "walletAddress": {"type": "string"},
                "paymentMethod": {"type": "string", "enum": ["credit_card", "debit_card", "bank_transfer"]},
            },
        },
        "OffRampRequest": {
            "type": "object",
            "required": ["amount", "cryptoAsset", "bankAccountId", "fiatCurrency"],
            "properties": {
                "amount": {"type": "number", "minimum": 0.01},
                "cryptoAsset": {"type": "string"},
                "bankAccountId": {"type": "string"},
                "fiatCurrency": fiat,
            },
        },
        "UserStatusUpdate": {
            "type": "object",
            "required": ["status"],
            "properties": {
                "status": {"type": "string", "enum": ["active", "inactive", "pending"]},
            },
        },
        "WalletStatusUpdate": {
            "type": "object",
            "required": ["status"],
            "properties": {
                "status": {"type": "string", "enum": ["active", "inactive"]},
            },
        },
    })
}
